use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Summary of one submission round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferMetrics {
    pub team_id: String,
    pub server_address: String,
    pub file_path: String,
    pub started_at: String, // local time, RFC 3339

    pub file_size: u32,
    pub result_size: u32,
    pub best_result: String,

    // Totals include credentials, headers and trailer
    pub bytes_sent: u64,
    pub bytes_received: u64,

    pub upload_ms: u64,
    pub result_ms: u64,
    pub total_ms: u64,
}

impl TransferMetrics {
    pub fn new(team_id: &str, server_address: &str, file_path: &str) -> Self {
        Self {
            team_id: team_id.to_string(),
            server_address: server_address.to_string(),
            file_path: file_path.to_string(),
            started_at: chrono::Local::now().to_rfc3339(),
            ..Default::default()
        }
    }

    pub fn record_upload(&mut self, file_size: u32, elapsed: Duration) {
        self.file_size = file_size;
        self.upload_ms = elapsed.as_millis() as u64;
    }

    pub fn record_result(&mut self, result_size: u32, best_result: String, elapsed: Duration) {
        self.result_size = result_size;
        self.best_result = best_result;
        self.result_ms = elapsed.as_millis() as u64;
    }

    pub fn finish(&mut self, bytes_sent: u64, bytes_received: u64, total: Duration) {
        self.bytes_sent = bytes_sent;
        self.bytes_received = bytes_received;
        self.total_ms = total.as_millis() as u64;
    }

    pub fn export_to_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let mut metrics = TransferMetrics::new("team1", "127.0.0.1:8000", "src/mm.c");
        metrics.record_upload(12, Duration::from_millis(40));
        metrics.record_result(30, "95".to_string(), Duration::from_millis(250));
        metrics.finish(194, 203, Duration::from_millis(300));

        assert_eq!(metrics.file_size, 12);
        assert_eq!(metrics.upload_ms, 40);
        assert_eq!(metrics.result_size, 30);
        assert_eq!(metrics.best_result, "95");
        assert_eq!(metrics.bytes_sent, 194);
        assert_eq!(metrics.total_ms, 300);
        assert!(chrono::DateTime::parse_from_rfc3339(&metrics.started_at).is_ok());
    }

    #[test]
    fn test_export_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");

        let mut metrics = TransferMetrics::new("team1", "127.0.0.1:8000", "src/mm.c");
        metrics.record_result(5, "best!".to_string(), Duration::from_millis(1));
        metrics.export_to_json(&path).unwrap();

        let loaded: TransferMetrics =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, metrics);
    }
}
