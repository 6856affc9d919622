//! # Transfer Client
//!
//! Performs one submission against the grading server:
//! 1. Connect to the configured address
//! 2. Send the team id and password
//! 3. Send the upload header followed by the file bytes
//! 4. Read the response header and stream the result to the output
//! 5. Read and print the best result, then close the connection
//!
//! There is no retry and no timeout; any failure ends the run with an error.
//! The file and socket are owned by [`TransferClient::run`] and released when it
//! returns, on success or failure.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let client = TransferClient::new(ClientConfig::default());
//! let credentials = Credentials::new("team1", "secret");
//! let metrics = client.run(&credentials, &mut tokio::io::stdout()).await?;
//! ```

use anyhow::{Context, Result};
use log::info;
use std::time::Instant;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::client::metrics::TransferMetrics;
use crate::common::config::ClientConfig;
use crate::common::connection::Connection;
use crate::common::error::TransferError;
use crate::common::messages::{Credentials, FileHeader};

/// Printed before the streamed result.
pub const RESULT_BANNER: &str = "your result :\n\n";

/// Printed in front of the best result.
pub const BEST_RESULT_PREFIX: &str = "The Best Result Till Now: ";

pub struct TransferClient {
    config: ClientConfig,
}

impl TransferClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Submit the configured file and write the server's answer to `out`.
    ///
    /// The file is opened and its header built before connecting, so a missing
    /// or oversized file fails without any network traffic.
    ///
    /// # Errors
    ///
    /// * The upload file cannot be opened or is larger than `u32::MAX` bytes
    /// * The upload path does not fit in the 128-byte filename field
    /// * The connection cannot be established or drops mid-exchange
    /// * Writing to `out` fails
    pub async fn run<W>(&self, credentials: &Credentials, out: &mut W) -> Result<TransferMetrics>
    where
        W: AsyncWrite + Unpin,
    {
        let started = Instant::now();
        let address = self.config.server.address;
        let path = self.config.upload.file_path.as_str();
        let chunk_size = self.config.upload.chunk_size;

        let mut metrics = TransferMetrics::new(&credentials.team_id, &address.to_string(), path);

        let mut file = File::open(path)
            .await
            .with_context(|| format!("failed to open {}", path))?;
        let len = file
            .metadata()
            .await
            .with_context(|| format!("failed to stat {}", path))?
            .len();
        let file_size = u32::try_from(len).map_err(|_| TransferError::FileTooLarge(len))?;
        let header = FileHeader::new(path, file_size)?;

        info!(
            "📤 Team {} submitting {} ({} bytes) to {}",
            credentials.team_id, path, file_size, address
        );

        let mut conn = Connection::connect(address)
            .await
            .with_context(|| format!("failed to connect to {}", address))?;

        conn.send_credentials(credentials)
            .await
            .context("failed to send credentials")?;
        conn.send_file_header(&header)
            .await
            .context("failed to send file header")?;
        conn.upload(&mut file, file_size, chunk_size)
            .await
            .with_context(|| format!("failed to upload {}", path))?;
        metrics.record_upload(file_size, started.elapsed());

        info!("waiting for result...");
        let waiting = Instant::now();

        let response = conn
            .read_response_header()
            .await
            .context("failed to read response header")?;
        info!(
            "📥 Server reports {} result bytes for {}",
            response.payload_size, response.filename
        );

        out.write_all(RESULT_BANNER.as_bytes()).await?;
        conn.stream_result(response.payload_size, chunk_size, out)
            .await
            .context("failed to read result")?;

        let best_result = conn
            .read_trailer(self.config.protocol.trailer_length)
            .await
            .context("failed to read best result")?;
        let best_line = format!("\n{}{}\n", BEST_RESULT_PREFIX, best_result);
        out.write_all(best_line.as_bytes()).await?;
        out.flush().await?;
        metrics.record_result(response.payload_size, best_result, waiting.elapsed());

        conn.shutdown().await.context("failed to close connection")?;
        metrics.finish(conn.bytes_sent(), conn.bytes_received(), started.elapsed());

        info!(
            "✅ Submission complete: sent {} bytes, received {} bytes in {} ms",
            metrics.bytes_sent, metrics.bytes_received, metrics.total_ms
        );

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    fn client_for(path: &str) -> TransferClient {
        let mut config = ClientConfig::default();
        // Nothing listens on port 1; tests here must fail before connecting.
        config.server.address = SocketAddr::from(([127, 0, 0, 1], 1));
        config.upload.file_path = path.to_string();
        TransferClient::new(config)
    }

    #[tokio::test]
    async fn test_missing_file_fails_before_connecting() {
        let client = client_for("/nonexistent/mm.c");
        let mut out = Vec::new();

        let err = client
            .run(&Credentials::new("team1", "pw1"), &mut out)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("failed to open /nonexistent/mm.c"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_long_path_fails_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m".repeat(130));
        std::fs::write(&path, b"int main(){}").unwrap();

        let client = client_for(path.to_str().unwrap());
        let mut out = Vec::new();

        let err = client
            .run(&Credentials::new("team1", "pw1"), &mut out)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<TransferError>(),
            Some(TransferError::FilenameTooLong { .. })
        ));
    }

    #[tokio::test]
    async fn test_oversized_file_fails_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mm.c");
        // Sparse, so no disk space is actually used.
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(u32::MAX as u64 + 1).unwrap();
        drop(file);

        let client = client_for(path.to_str().unwrap());
        let mut out = Vec::new();

        let err = client
            .run(&Credentials::new("team1", "pw1"), &mut out)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<TransferError>(),
            Some(TransferError::FileTooLarge(4_294_967_296))
        ));
        assert!(out.is_empty());
    }
}
