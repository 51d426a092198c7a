use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tracing::{Instrument, debug, error, info_span};

use crate::registry::{HandleRegistry, HandlerId};

/// Serves one accepted connection
///
/// Implementations own the stream and should close it before returning.
/// Deregistration from the [`HandleRegistry`] is done by the caller, so an
/// implementation never touches the registry.
#[async_trait]
pub trait ConnectionHandler: Send + Sync + 'static {
    async fn handle(&self, stream: TcpStream, peer: SocketAddr);
}

/// Run `handler` for one connection, then release exactly one registry slot
///
/// The handler runs in its own task so a panic inside it still ends with the
/// slot being released.
pub async fn serve_connection(
    handler: Arc<dyn ConnectionHandler>,
    registry: Arc<HandleRegistry>,
    stream: TcpStream,
    peer: SocketAddr,
    handle: HandlerId,
) {
    let span = info_span!("connection", handle = %handle, %peer);

    async move {
        let served =
            tokio::spawn(async move { handler.handle(stream, peer).await }.in_current_span())
                .await;

        if let Err(err) = served {
            error!(error = %err, "Connection handler failed");
        }

        match registry.release().await {
            Ok(popped) => debug!(popped = %popped, "Slot released"),
            Err(err) => error!(error = %err, "Failed to release slot"),
        }
    }
    .instrument(span)
    .await
}
