//! JSON payload dumps, one file per scan under a dated directory.

use crate::models::Payload;
use chrono::Local;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

/// Write a [`Payload`] to `{dump_dir}/{date}/{platform}_{HHMMSSmmm}.json`.
///
/// Creates the dated directory if needed and returns the path written.
#[instrument(level = "info", skip_all, fields(dump_dir = %dump_dir, platform = %payload.platform))]
pub async fn write_payload(payload: &Payload, dump_dir: &str) -> Result<String, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(payload)?;

    let day_dir = format!(
        "{}/{}",
        dump_dir.trim_end_matches('/'),
        Local::now().date_naive()
    );
    fs::create_dir_all(&day_dir).await?;

    let path = format!(
        "{}/{}_{}.json",
        day_dir,
        payload.platform,
        Local::now().format("%H%M%S%3f")
    );
    fs::write(&path, json).await?;
    info!(path = %path, "Wrote payload dump");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;

    #[tokio::test]
    async fn test_write_payload_round_trips() {
        let dir = std::env::temp_dir().join(format!("course_sync_dump_{}", std::process::id()));
        let dir = dir.to_str().unwrap().to_string();

        let payload = Payload::new(Platform::Teams, Some("https://teams.microsoft.com/_#/school"));
        let path = write_payload(&payload, &dir).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: Payload = serde_json::from_str(&text).unwrap();
        assert_eq!(back, payload);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
