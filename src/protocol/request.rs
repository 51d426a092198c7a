use bytes::BytesMut;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::RequestError;

/// Only method the server answers
pub const ALLOWED_METHOD: &str = "GET";
/// Protocol versions accepted on the request line
pub const SUPPORTED_VERSIONS: [&str; 2] = ["HTTP/1.0", "HTTP/1.1"];
/// Version used in the status line when the request line is unusable
pub const FALLBACK_VERSION: &str = "HTTP/1.1";

/// `METHOD SP TARGET SP VERSION`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub target: String,
    pub version: String,
}

impl RequestLine {
    /// Parse the first line of a request head
    ///
    /// Fewer than three tokens is malformed; anything after the third token
    /// is ignored. Header lines are never looked at.
    pub fn parse(head: &[u8]) -> Result<Self, RequestError> {
        let line_end = head
            .iter()
            .position(|&b| b == b'\n')
            .unwrap_or(head.len());
        let line = String::from_utf8_lossy(&head[..line_end]);

        let mut tokens = line.split_whitespace();
        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(method), Some(target), Some(version)) => Ok(Self {
                method: method.to_string(),
                target: target.to_string(),
                version: version.to_string(),
            }),
            _ => Err(RequestError::Malformed),
        }
    }

    /// Method is checked before version
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.method != ALLOWED_METHOD {
            return Err(RequestError::MethodNotAllowed(self.method.clone()));
        }
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            return Err(RequestError::VersionNotSupported(self.version.clone()));
        }
        Ok(())
    }
}

/// True once the blank line ending the header block has arrived
fn head_complete(buf: &[u8]) -> bool {
    buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.windows(2).any(|w| w == b"\n\n")
}

/// Bytes read for one request head
#[derive(Debug)]
pub struct RequestHead {
    pub bytes: BytesMut,
    /// The size limit was hit before the header block ended
    pub truncated: bool,
}

impl RequestHead {
    /// True when the request line itself did not fit under the limit
    pub fn line_truncated(&self) -> bool {
        self.truncated && !self.bytes.contains(&b'\n')
    }
}

/// Read a request head of at most `limit` bytes
///
/// Stops at the end of the header block, at EOF, or when `limit` is reached,
/// whichever comes first. Whatever arrived is returned; the caller decides
/// whether it forms a request line.
pub async fn read_request_head<R>(reader: &mut R, limit: usize) -> io::Result<RequestHead>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = BytesMut::with_capacity(limit.min(8 * 1024));
    let mut limited = reader.take(limit as u64);

    loop {
        let n = limited.read_buf(&mut bytes).await?;
        if head_complete(&bytes) {
            return Ok(RequestHead {
                bytes,
                truncated: false,
            });
        }
        if n == 0 {
            let truncated = limited.limit() == 0;
            return Ok(RequestHead { bytes, truncated });
        }
    }
}
