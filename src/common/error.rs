//! # Transfer Errors
//!
//! Typed failures raised by the wire layer. The client and binary wrap these
//! in `anyhow` with context about which step of the exchange failed.

use thiserror::Error;

/// Errors produced while encoding, sending or receiving a submission.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Socket or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The upload path does not fit in the fixed filename field.
    #[error("filename is {len} bytes, the header field holds at most {max}")]
    FilenameTooLong { len: usize, max: usize },

    /// The upload file is larger than the 32-bit size field.
    #[error("file is {0} bytes, too large for the 32-bit size field")]
    FileTooLarge(u64),

    /// The file produced fewer bytes than the header declared.
    #[error("file ended early: declared {declared} bytes, sent {sent}")]
    ShortFile { declared: u32, sent: u64 },

    /// The server closed the connection before the declared result was read.
    #[error("connection closed with {remaining} of {declared} result bytes outstanding")]
    ConnectionClosed { declared: u32, remaining: u32 },

    /// A buffer handed to a decoder was not the fixed header size.
    #[error("malformed header: expected {expected} bytes, got {actual}")]
    MalformedHeader { expected: usize, actual: usize },

    /// The trailer length byte is not valid for the configured encoding.
    #[error("invalid trailer length byte {0:#04x}")]
    InvalidTrailerLength(u8),
}

/// Result type alias for the wire layer.
pub type Result<T> = std::result::Result<T, TransferError>;
