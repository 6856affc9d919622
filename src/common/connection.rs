//! # Grading Connection
//!
//! Wraps one byte stream to the grading server and exposes each step of the
//! submission exchange in wire order:
//!
//! ```text
//! client -> server   [len][team id][len][password]
//! client -> server   [172 bytes: upload header][N bytes: file]
//! server -> client   [172 bytes: response header][M bytes: result]
//! server -> client   [1 byte: L][L bytes: best result]
//! ```
//!
//! Sizes read from the server are trusted as declared. The stream type is
//! generic so tests can drive the exchange over in-memory pipes.

use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use super::error::{Result, TransferError};
use super::messages::{
    Credentials, FileHeader, ResponseHeader, TrailerLength, RESPONSE_HEADER_SIZE,
};

/// Stream wrapper that speaks the submission protocol and counts traffic.
pub struct Connection<S = TcpStream> {
    /// Underlying byte stream
    stream: S,
    bytes_sent: u64,
    bytes_received: u64,
}

impl Connection<TcpStream> {
    /// Open a TCP connection to the grading server.
    pub async fn connect(address: std::net::SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(address).await?;
        Ok(Self::new(stream))
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create a new Connection from an established stream.
    ///
    /// # Example
    /// ```ignore
    /// let stream = TcpStream::connect("127.0.0.1:8000").await?;
    /// let mut conn = Connection::new(stream);
    /// ```
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            bytes_sent: 0,
            bytes_received: 0,
        }
    }

    /// Bytes written so far, including credentials and headers.
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    /// Bytes read so far, including the response header and trailer.
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    /// Send both credential strings.
    ///
    /// # Arguments
    /// - `credentials`: Team id and password, sent in the clear
    ///
    /// # Protocol
    /// Writes `[len(team_id)][team_id][len(password)][password]`, lengths as
    /// decimal text. A warning is logged when a length needs two digits.
    pub async fn send_credentials(&mut self, credentials: &Credentials) -> Result<()> {
        if credentials.has_ambiguous_length() {
            warn!("⚠️  Credential of 10+ bytes: its length prefix is ambiguous to the server");
        }
        self.send(&credentials.to_bytes()).await
    }

    /// Send the 172-byte upload header.
    ///
    /// # Arguments
    /// - `header`: Filename and size of the file about to be uploaded
    ///
    /// # Returns
    /// - `Ok(())`: Header written and flushed
    /// - `Err`: I/O error
    pub async fn send_file_header(&mut self, header: &FileHeader) -> Result<()> {
        debug!(
            "Sending header for {} ({} bytes)",
            header.filename,
            header.file_size()
        );
        self.send(&header.to_bytes()).await
    }

    /// Copy exactly `declared` bytes from `source` to the server in `chunk_size` blocks.
    ///
    /// # Arguments
    /// - `source`: Reader positioned at the start of the file
    /// - `declared`: Size announced in the upload header
    /// - `chunk_size`: Bytes per read/write
    ///
    /// # Returns
    /// - `Ok(n)`: Number of bytes sent, always equal to `declared`
    /// - `Err(TransferError::ShortFile)`: `source` ended first
    /// - `Err`: I/O error
    ///
    /// Bytes past `declared` are never read.
    pub async fn upload<R>(
        &mut self,
        source: &mut R,
        declared: u32,
        chunk_size: usize,
    ) -> Result<u64>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; chunk_size.max(1)];
        let mut remaining = declared as u64;
        let mut sent = 0u64;

        while remaining > 0 {
            let want = remaining.min(buf.len() as u64) as usize;
            let n = source.read(&mut buf[..want]).await?;
            if n == 0 {
                return Err(TransferError::ShortFile { declared, sent });
            }
            self.stream.write_all(&buf[..n]).await?;
            sent += n as u64;
            remaining -= n as u64;
        }

        self.stream.flush().await?;
        self.bytes_sent += sent;
        Ok(sent)
    }

    /// Read the 172-byte response header.
    ///
    /// # Returns
    /// - `Ok(ResponseHeader)`: Header with the declared result size
    /// - `Err`: I/O error, including the peer closing before the header is complete
    ///
    /// # Protocol
    /// The declared size is returned as-is and not checked against anything.
    pub async fn read_response_header(&mut self) -> Result<ResponseHeader> {
        let mut buf = [0u8; RESPONSE_HEADER_SIZE];
        self.stream.read_exact(&mut buf).await?;
        self.bytes_received += RESPONSE_HEADER_SIZE as u64;
        ResponseHeader::from_bytes(&buf)
    }

    /// Read `declared` result bytes, writing each chunk to `out` as it arrives.
    ///
    /// # Arguments
    /// - `declared`: Result size from the response header
    /// - `chunk_size`: Upper bound on each read
    /// - `out`: Destination, flushed after every chunk
    ///
    /// # Returns
    /// - `Ok(n)`: All `declared` bytes were copied
    /// - `Err(TransferError::ConnectionClosed)`: Peer closed early
    /// - `Err`: I/O error on either side
    pub async fn stream_result<W>(
        &mut self,
        declared: u32,
        chunk_size: usize,
        out: &mut W,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let mut buf = vec![0u8; chunk_size.max(1)];
        let mut remaining = declared;

        while remaining > 0 {
            let want = (remaining as usize).min(buf.len());
            let n = self.stream.read(&mut buf[..want]).await?;
            if n == 0 {
                return Err(TransferError::ConnectionClosed {
                    declared,
                    remaining,
                });
            }
            out.write_all(&buf[..n]).await?;
            out.flush().await?;
            self.bytes_received += n as u64;
            remaining -= n as u32;
        }

        Ok(declared as u64)
    }

    /// Read the length-prefixed best result that closes the exchange.
    ///
    /// # Arguments
    /// - `encoding`: How to interpret the length byte
    ///
    /// # Returns
    /// - `Ok(String)`: The best result, invalid UTF-8 replaced
    /// - `Err`: Bad length byte, or the peer closed before `L` bytes arrived
    pub async fn read_trailer(&mut self, encoding: TrailerLength) -> Result<String> {
        let len_byte = self.stream.read_u8().await?;
        let len = encoding.decode(len_byte)?;

        let mut buf = vec![0u8; len];
        self.stream.read_exact(&mut buf).await?;
        self.bytes_received += 1 + len as u64;

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Close the write side so the server sees a clean end of stream.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.stream.write_all(data).await?;
        self.stream.flush().await?;
        self.bytes_sent += data.len() as u64;
        Ok(())
    }
}
