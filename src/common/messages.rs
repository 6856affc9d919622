//! # Wire Structures
//!
//! Fixed-layout records exchanged with the grading server:
//! - credentials: two strings, each prefixed by its length as decimal text
//! - upload header: `[128 bytes filename][11 x u32]`, only field 8 is used (file size)
//! - response header: `[128 bytes filename][32 bytes][u32 size][8 bytes]`
//! - trailer: one length byte followed by the best-result string
//!
//! All integers are little-endian and there is no padding between fields.

use bytes::{Buf, BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use super::error::{Result, TransferError};

/// Width of the null-padded filename field in both headers.
pub const FILENAME_FIELD_LEN: usize = 128;

/// Number of `u32` fields following the filename in the upload header.
pub const FILE_HEADER_FIELDS: usize = 11;

/// Index of the file-size field among the upload header's integers.
pub const FILE_SIZE_FIELD: usize = 8;

/// Total size of the upload header (172 bytes).
pub const FILE_HEADER_SIZE: usize = FILENAME_FIELD_LEN + FILE_HEADER_FIELDS * 4;

/// Width of the opaque field after the filename in the response header.
pub const RESPONSE_RESERVED_LEN: usize = 32;

/// Width of the opaque field after the size in the response header.
pub const RESPONSE_TRAILING_LEN: usize = 8;

/// Total size of the response header (172 bytes).
pub const RESPONSE_HEADER_SIZE: usize =
    FILENAME_FIELD_LEN + RESPONSE_RESERVED_LEN + 4 + RESPONSE_TRAILING_LEN;

// ============================================================================
// CREDENTIALS
// ============================================================================

/// Team id and password sent in the clear at the start of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub team_id: String,
    pub password: String,
}

impl Credentials {
    pub fn new(team_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            password: password.into(),
        }
    }

    /// Encode as `len(team_id) team_id len(password) password`.
    ///
    /// Lengths are byte counts written as decimal text with no delimiter.
    /// The server cannot tell where a multi-digit length ends, so values of
    /// ten bytes or more are sent as-is but flagged by [`Self::has_ambiguous_length`].
    ///
    /// # Example
    /// ```
    /// use lab_submit::common::messages::Credentials;
    ///
    /// let creds = Credentials::new("team1", "pw1");
    /// assert_eq!(creds.to_bytes(), b"5team13pw1".to_vec());
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();
        put_length_prefixed(&mut buf, &self.team_id);
        put_length_prefixed(&mut buf, &self.password);
        buf.to_vec()
    }

    /// True when either length prefix needs more than one digit.
    pub fn has_ambiguous_length(&self) -> bool {
        self.team_id.len() >= 10 || self.password.len() >= 10
    }
}

fn put_length_prefixed(buf: &mut BytesMut, value: &str) {
    buf.put_slice(value.len().to_string().as_bytes());
    buf.put_slice(value.as_bytes());
}

// ============================================================================
// UPLOAD HEADER
// ============================================================================

/// Header describing the file that follows it on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub filename: String,
    pub fields: [u32; FILE_HEADER_FIELDS],
}

impl FileHeader {
    /// Build a header for `filename` with the given size; every other field is zero.
    pub fn new(filename: &str, file_size: u32) -> Result<Self> {
        check_filename(filename)?;
        let mut fields = [0u32; FILE_HEADER_FIELDS];
        fields[FILE_SIZE_FIELD] = file_size;
        Ok(Self {
            filename: filename.to_string(),
            fields,
        })
    }

    pub fn file_size(&self) -> u32 {
        self.fields[FILE_SIZE_FIELD]
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(FILE_HEADER_SIZE);
        put_filename(&mut buf, &self.filename);
        for field in self.fields {
            buf.put_u32_le(field);
        }
        buf.to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_len(bytes, FILE_HEADER_SIZE)?;
        let mut buf = bytes;
        let filename = take_filename(&mut buf);
        let mut fields = [0u32; FILE_HEADER_FIELDS];
        for field in fields.iter_mut() {
            *field = buf.get_u32_le();
        }
        Ok(Self { filename, fields })
    }
}

// ============================================================================
// RESPONSE HEADER
// ============================================================================

/// Header the server sends before the result payload.
///
/// Only `payload_size` drives the client; the other fields are kept so the
/// record can be logged and re-encoded by test servers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHeader {
    pub filename: String,
    pub reserved: [u8; RESPONSE_RESERVED_LEN],
    pub payload_size: u32,
    pub trailing: [u8; RESPONSE_TRAILING_LEN],
}

impl ResponseHeader {
    pub fn new(filename: &str, payload_size: u32) -> Result<Self> {
        check_filename(filename)?;
        Ok(Self {
            filename: filename.to_string(),
            reserved: [0; RESPONSE_RESERVED_LEN],
            payload_size,
            trailing: [0; RESPONSE_TRAILING_LEN],
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(RESPONSE_HEADER_SIZE);
        put_filename(&mut buf, &self.filename);
        buf.put_slice(&self.reserved);
        buf.put_u32_le(self.payload_size);
        buf.put_slice(&self.trailing);
        buf.to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_len(bytes, RESPONSE_HEADER_SIZE)?;
        let mut buf = bytes;
        let filename = take_filename(&mut buf);
        let mut reserved = [0u8; RESPONSE_RESERVED_LEN];
        buf.copy_to_slice(&mut reserved);
        let payload_size = buf.get_u32_le();
        let mut trailing = [0u8; RESPONSE_TRAILING_LEN];
        buf.copy_to_slice(&mut trailing);
        Ok(Self {
            filename,
            reserved,
            payload_size,
            trailing,
        })
    }
}

// ============================================================================
// TRAILER
// ============================================================================

/// How the single length byte in front of the best result is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrailerLength {
    /// The byte value is the length (0-255).
    #[default]
    Raw,
    /// The byte is an ASCII digit `'0'..='9'`.
    AsciiDigit,
}

impl TrailerLength {
    /// Decode the length byte into a byte count.
    pub fn decode(self, byte: u8) -> Result<usize> {
        match self {
            TrailerLength::Raw => Ok(byte as usize),
            TrailerLength::AsciiDigit if byte.is_ascii_digit() => Ok((byte - b'0') as usize),
            TrailerLength::AsciiDigit => Err(TransferError::InvalidTrailerLength(byte)),
        }
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn check_filename(filename: &str) -> Result<()> {
    if filename.len() > FILENAME_FIELD_LEN {
        return Err(TransferError::FilenameTooLong {
            len: filename.len(),
            max: FILENAME_FIELD_LEN,
        });
    }
    Ok(())
}

fn check_len(bytes: &[u8], expected: usize) -> Result<()> {
    if bytes.len() != expected {
        return Err(TransferError::MalformedHeader {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

fn put_filename(buf: &mut BytesMut, filename: &str) {
    buf.put_slice(filename.as_bytes());
    buf.put_bytes(0, FILENAME_FIELD_LEN - filename.len());
}

fn take_filename(buf: &mut &[u8]) -> String {
    let mut field = [0u8; FILENAME_FIELD_LEN];
    buf.copy_to_slice(&mut field);
    let end = field
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(FILENAME_FIELD_LEN);
    String::from_utf8_lossy(&field[..end]).into_owned()
}
