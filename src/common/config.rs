//! # Configuration Utilities
//!
//! Client configuration and the TOML loader. Every field has a default, so
//! the client runs without a config file against the fixed grading endpoint.
//!
//! # Example TOML
//!
//! ```toml
//! [server]
//! address = "127.0.0.1:8000"
//!
//! [upload]
//! file_path = "src/mm.c"
//! chunk_size = 1024
//!
//! [protocol]
//! trailer_length = "ascii-digit"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use super::messages::TrailerLength;

/// Address of the grading server.
pub const DEFAULT_SERVER_ADDRESS: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(211, 87, 235, 74), 8000));

/// File submitted when no other path is configured.
pub const DEFAULT_FILE_PATH: &str = "src/mm.c";

/// Block size for both the upload copy loop and result reads.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Arguments
/// - `path`: Path to the TOML configuration file
///
/// # Returns
/// - `Ok(T)`: Successfully loaded and parsed configuration
/// - `Err`: File I/O or parsing error
///
/// # Example
/// ```ignore
/// let config: ClientConfig = load_config("config/client.toml")?;
/// ```
pub fn load_config<T>(path: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read config {}", path))?;
    let config: T =
        toml::from_str(&content).with_context(|| format!("failed to parse config {}", path))?;
    Ok(config)
}

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Where to connect
    pub server: ServerInfo,
    /// What to upload and how
    pub upload: UploadConfig,
    /// Wire format knobs
    pub protocol: ProtocolConfig,
}

/// Grading server endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerInfo {
    /// IP address and port, no DNS names (e.g., "211.87.235.74:8000")
    pub address: SocketAddr,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            address: DEFAULT_SERVER_ADDRESS,
        }
    }
}

/// Upload source and block size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Path of the file to submit; also sent verbatim in the header's filename field
    pub file_path: String,
    /// Bytes per read/write in the copy loops
    pub chunk_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            file_path: DEFAULT_FILE_PATH.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Interpretation of the trailer's length byte
    pub trailer_length: TrailerLength,
}

impl ClientConfig {
    /// Loads client configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let config: ClientConfig = load_config(path)?;
        if config.upload.chunk_size == 0 {
            anyhow::bail!("upload.chunk_size must be greater than zero");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_match_grading_endpoint() {
        let config = ClientConfig::default();
        assert_eq!(config.server.address.to_string(), "211.87.235.74:8000");
        assert_eq!(config.upload.file_path, "src/mm.c");
        assert_eq!(config.upload.chunk_size, 1024);
        assert_eq!(config.protocol.trailer_length, TrailerLength::Raw);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let file = write_config("[server]\naddress = \"127.0.0.1:9000\"\n");
        let config = ClientConfig::from_file(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.server.address.port(), 9000);
        assert_eq!(config.upload, UploadConfig::default());
    }

    #[test]
    fn test_full_config() {
        let file = write_config(
            r#"
            [server]
            address = "10.0.0.5:8000"

            [upload]
            file_path = "lab/mm.c"
            chunk_size = 4096

            [protocol]
            trailer_length = "ascii-digit"
            "#,
        );
        let config = ClientConfig::from_file(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.upload.file_path, "lab/mm.c");
        assert_eq!(config.upload.chunk_size, 4096);
        assert_eq!(config.protocol.trailer_length, TrailerLength::AsciiDigit);
    }

    #[test]
    fn test_rejects_host_names_and_zero_chunks() {
        let file = write_config("[server]\naddress = \"grader.example.com:8000\"\n");
        assert!(ClientConfig::from_file(file.path().to_str().unwrap()).is_err());

        let file = write_config("[upload]\nchunk_size = 0\n");
        assert!(ClientConfig::from_file(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = ClientConfig::from_file("/nonexistent/client.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/client.toml"));
    }
}
