use async_trait::async_trait;
use http::StatusCode;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::handler::ConnectionHandler;
use crate::config::ServerConfig;
use crate::observability::ServerMetrics;
use crate::protocol::{
    DocumentRoot, FALLBACK_VERSION, RequestError, RequestHead, RequestLine, ResponseHead,
    StaticFile, read_request_head,
};

/// How long a closing connection waits for the client to stop sending
const LINGER_TIME: Duration = Duration::from_millis(500);
/// Most unread input swallowed before closing anyway
const LINGER_BYTES: u64 = 64 * 1024;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("client sent no request within {0:?}")]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// What to send back for one request
#[derive(Debug)]
enum Reply {
    File { version: String, file: StaticFile },
    Error { version: String, error: RequestError },
}

impl Reply {
    fn error(version: impl Into<String>, error: RequestError) -> Self {
        Reply::Error {
            version: version.into(),
            error,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Reply::File { .. } => StatusCode::OK,
            Reply::Error { error, .. } => error.status_code(),
        }
    }
}

/// Serves files below a [`DocumentRoot`], one request per connection
#[derive(Debug)]
pub struct StaticFiles {
    site: DocumentRoot,
    max_request_bytes: usize,
    read_timeout: Duration,
    metrics: Arc<ServerMetrics>,
}

impl StaticFiles {
    pub fn new(
        site: DocumentRoot,
        max_request_bytes: usize,
        read_timeout: Duration,
        metrics: Arc<ServerMetrics>,
    ) -> Self {
        Self {
            site,
            max_request_bytes,
            read_timeout,
            metrics,
        }
    }

    pub fn from_config(config: &ServerConfig, metrics: Arc<ServerMetrics>) -> Self {
        Self::new(
            DocumentRoot::new(&config.document_root, &config.index_document),
            config.max_request_bytes.as_usize(),
            config.read_timeout(),
            metrics,
        )
    }

    /// Read one request from `stream` and write the full response
    pub async fn exchange<S>(&self, stream: &mut S) -> Result<StatusCode, ExchangeError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let head = match timeout(
            self.read_timeout,
            read_request_head(stream, self.max_request_bytes),
        )
        .await
        {
            Ok(head) => head?,
            Err(_) => {
                self.metrics.connection_timed_out();
                return Err(ExchangeError::Timeout(self.read_timeout));
            }
        };

        let reply = self.route(&head).await;
        let status = reply.status();
        self.write_reply(stream, reply).await?;
        self.metrics.response_sent(status);

        Ok(status)
    }

    async fn route(&self, head: &RequestHead) -> Reply {
        let too_large = RequestError::HeadTooLarge {
            limit: self.max_request_bytes,
        };
        if head.line_truncated() {
            return Reply::error(FALLBACK_VERSION, too_large);
        }

        let line = match RequestLine::parse(&head.bytes) {
            Ok(line) => line,
            Err(err) => return Reply::error(FALLBACK_VERSION, err),
        };

        if let Err(err) = line.validate() {
            return Reply::error(line.version, err);
        }
        if head.truncated {
            return Reply::error(line.version, too_large);
        }

        info!(method = %line.method, target = %line.target, "Request");

        match self.site.open(&line.target).await {
            Ok(file) => Reply::File {
                version: line.version,
                file,
            },
            Err(err) => Reply::error(line.version, err),
        }
    }

    async fn write_reply<S>(&self, stream: &mut S, reply: Reply) -> io::Result<()>
    where
        S: AsyncWrite + Unpin,
    {
        match reply {
            Reply::File { version, file } => {
                let head = ResponseHead::ok(version, file.content_type, file.len);
                stream.write_all(&head.to_bytes()).await?;

                // never send more than the advertised length, even if the file grew
                let mut body = file.file.take(file.len);
                let sent = tokio::io::copy(&mut body, &mut *stream).await?;
                if sent < file.len {
                    warn!(
                        path = %file.path.display(),
                        expected = file.len,
                        sent,
                        "File shrank while streaming"
                    );
                }
            }
            Reply::Error { version, error } => {
                debug!(error = %error, "Request rejected");
                let head = ResponseHead::empty(version, error.status_code());
                stream.write_all(&head.to_bytes()).await?;
            }
        }

        stream.flush().await
    }
}

#[async_trait]
impl ConnectionHandler for StaticFiles {
    async fn handle(&self, mut stream: TcpStream, peer: SocketAddr) {
        match self.exchange(&mut stream).await {
            Ok(status) => debug!(%peer, status = status.as_u16(), "Response sent"),
            Err(ExchangeError::Timeout(after)) => {
                warn!(%peer, ?after, "Client sent no request, closing")
            }
            Err(ExchangeError::Io(err)) => debug!(%peer, error = %err, "Connection I/O failed"),
        }

        if let Err(err) = stream.shutdown().await {
            debug!(%peer, error = %err, "Shutdown failed");
        }
        match discard_unread(&mut stream).await {
            Ok(0) => {}
            Ok(discarded) => debug!(%peer, discarded, "Discarded unread input"),
            Err(err) => debug!(%peer, error = %err, "Client did not finish sending"),
        }
    }
}

/// Read and drop whatever the client is still sending
///
/// Closing a socket with unread input resets the connection, which can cut
/// off a response the client has not read yet. Bounded by [`LINGER_TIME`]
/// and [`LINGER_BYTES`].
async fn discard_unread<R>(stream: &mut R) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut rest = stream.take(LINGER_BYTES);
    match timeout(LINGER_TIME, tokio::io::copy(&mut rest, &mut tokio::io::sink())).await {
        Ok(copied) => copied,
        Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "linger timed out")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tokio::io::duplex;

    fn handler(dir: &TempDir, read_timeout: Duration) -> StaticFiles {
        StaticFiles::new(
            DocumentRoot::new(dir.path(), "index.html"),
            2048,
            read_timeout,
            Arc::new(ServerMetrics::new()),
        )
    }

    async fn roundtrip(files: &StaticFiles, request: &[u8]) -> (StatusCode, String) {
        let (mut client, mut server) = duplex(64 * 1024);
        client.write_all(request).await.unwrap();
        client.shutdown().await.unwrap();

        let status = files.exchange(&mut server).await.unwrap();
        drop(server);

        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();
        (status, response)
    }

    #[tokio::test]
    async fn test_serves_file_with_headers() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>hi</h1>").unwrap();
        let files = handler(&dir, Duration::from_secs(1));

        let (status, response) = roundtrip(&files, b"GET /index.html HTTP/1.0\r\n\r\n").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            response,
            "HTTP/1.0 200 OK\r\nContent-Type: text/html\r\nContent-Length: 11\r\n\r\n<h1>hi</h1>"
        );
        assert_eq!(files.metrics.snapshot().responses_success, 1);
    }

    #[tokio::test]
    async fn test_error_statuses_echo_version() {
        let dir = TempDir::new().unwrap();
        let files = handler(&dir, Duration::from_secs(1));

        let (status, response) = roundtrip(&files, b"DELETE /x HTTP/1.0\r\n\r\n").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.starts_with("HTTP/1.0 405 Method Not Allowed\r\n"));
        assert!(response.ends_with("Content-Length: 0\r\n\r\n"));

        let (status, response) = roundtrip(&files, b"GET /x HTTP/3\r\n\r\n").await;
        assert_eq!(status, StatusCode::HTTP_VERSION_NOT_SUPPORTED);
        assert!(response.starts_with("HTTP/3 505 HTTP Version Not Supported\r\n"));
    }

    #[tokio::test]
    async fn test_malformed_request_uses_fallback_version() {
        let dir = TempDir::new().unwrap();
        let files = handler(&dir, Duration::from_secs(1));

        let (status, response) = roundtrip(&files, b"GET\r\n\r\n").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn test_traversal_is_forbidden() {
        let dir = TempDir::new().unwrap();
        let files = handler(&dir, Duration::from_secs(1));

        let (status, _) = roundtrip(&files, b"GET /../etc/passwd HTTP/1.1\r\n\r\n").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_oversized_headers_are_refused() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>hi</h1>").unwrap();
        let files = handler(&dir, Duration::from_secs(1));

        let cookie = "c".repeat(4000);
        let request = format!("GET /index.html HTTP/1.0\r\nCookie: {cookie}\r\n\r\n");
        let (status, response) = roundtrip(&files, request.as_bytes()).await;

        assert_eq!(status, StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE);
        assert!(response.starts_with("HTTP/1.0 431 Request Header Fields Too Large\r\n"));
        assert!(response.ends_with("Content-Length: 0\r\n\r\n"));
    }

    #[tokio::test]
    async fn test_oversized_request_line_uses_fallback_version() {
        let dir = TempDir::new().unwrap();
        let files = handler(&dir, Duration::from_secs(1));

        let request = format!("GET /{} HTTP/1.0\r\n\r\n", "a".repeat(4000));
        let (status, response) = roundtrip(&files, request.as_bytes()).await;

        assert_eq!(status, StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE);
        assert!(response.starts_with("HTTP/1.1 431 "));
    }

    #[tokio::test]
    async fn test_wrong_method_wins_over_oversized_headers() {
        let dir = TempDir::new().unwrap();
        let files = handler(&dir, Duration::from_secs(1));

        let cookie = "c".repeat(4000);
        let request = format!("POST / HTTP/1.1\r\nCookie: {cookie}\r\n\r\n");
        let (status, _) = roundtrip(&files, request.as_bytes()).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_discard_unread_drains_until_eof() {
        let (mut client, mut server) = duplex(1024);
        client.write_all(&[b'x'; 300]).await.unwrap();
        drop(client);

        assert_eq!(discard_unread(&mut server).await.unwrap(), 300);
    }

    #[tokio::test]
    async fn test_discard_unread_gives_up_on_open_client() {
        let (_client, mut server) = duplex(1024);

        let err = discard_unread(&mut server).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[tokio::test]
    async fn test_silent_client_times_out() {
        let dir = TempDir::new().unwrap();
        let files = handler(&dir, Duration::from_millis(50));
        let (_client, mut server) = duplex(1024);

        let result = files.exchange(&mut server).await;

        assert!(matches!(result, Err(ExchangeError::Timeout(_))));
        assert_eq!(files.metrics.snapshot().connections_timed_out, 1);
    }
}
