use http::StatusCode;
use mime::Mime;
use std::fmt;

/// Status line plus the two headers every response carries
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub version: String,
    pub status: StatusCode,
    pub content_type: Mime,
    pub content_length: u64,
}

impl ResponseHead {
    /// Head of a response whose body is the file that follows
    pub fn ok(version: impl Into<String>, content_type: Mime, content_length: u64) -> Self {
        Self {
            version: version.into(),
            status: StatusCode::OK,
            content_type,
            content_length,
        }
    }

    /// Bodiless plain-text response for an error status
    pub fn empty(version: impl Into<String>, status: StatusCode) -> Self {
        Self {
            version: version.into(),
            status,
            content_type: mime::TEXT_PLAIN,
            content_length: 0,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for ResponseHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
            self.version,
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or(""),
            self.content_type.essence_str(),
            self.content_length,
        )
    }
}
