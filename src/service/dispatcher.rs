use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

use super::error::{Result, ServerError};
use super::handler::{ConnectionHandler, serve_connection};
use super::shutdown;
use super::static_files::StaticFiles;
use crate::config::ServerConfig;
use crate::observability::ServerMetrics;
use crate::registry::{HandleIssuer, HandleRegistry};

/// Accept loop plus the registry that bounds it
///
/// Flow per connection:
/// 1. Accept on the listener
/// 2. Admit a fresh handle (waits while the registry is full)
/// 3. Spawn the handler task and detach it
///
/// The spawned task releases one slot when the handler returns, which is
/// what lets a waiting admission through.
pub struct Server {
    listener: TcpListener,
    registry: Arc<HandleRegistry>,
    issuer: HandleIssuer,
    handler: Arc<dyn ConnectionHandler>,
    metrics: Arc<ServerMetrics>,
}

impl Server {
    /// Bind `config.bind_addr()` and serve static files from the configured root
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let metrics = Arc::new(ServerMetrics::new());
        let handler = Arc::new(StaticFiles::from_config(config, metrics.clone()));
        let server =
            Self::bind_with_handler(config.bind_addr(), config.capacity, handler, metrics).await?;

        info!(
            root = %config.document_root.display(),
            index = %config.index_document,
            "Serving static files"
        );
        Ok(server)
    }

    pub async fn bind_with_handler(
        addr: SocketAddr,
        capacity: usize,
        handler: Arc<dyn ConnectionHandler>,
        metrics: Arc<ServerMetrics>,
    ) -> Result<Self> {
        let registry = Arc::new(HandleRegistry::new(capacity)?);
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        info!(address = %listener.local_addr()?, capacity, "pagegate listening");

        Ok(Self {
            listener,
            registry,
            issuer: HandleIssuer::new(),
            handler,
            metrics,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn registry(&self) -> Arc<HandleRegistry> {
        self.registry.clone()
    }

    pub fn metrics(&self) -> Arc<ServerMetrics> {
        self.metrics.clone()
    }

    /// Serve until `shutdown` resolves, then drain and close the registry
    ///
    /// Accept failures end the server immediately with an error; in-flight
    /// handlers are not waited for in that case.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        self.dispatch(&mut shutdown).await?;

        // new connections are refused while the drain runs
        let Server {
            listener,
            registry,
            metrics,
            ..
        } = self;
        drop(listener);

        shutdown::drain(&registry, &metrics).await?;
        Ok(())
    }

    /// Returns `Ok` once shutdown is requested
    async fn dispatch<F>(&self, shutdown: &mut F) -> Result<()>
    where
        F: Future<Output = ()> + Unpin,
    {
        loop {
            let (stream, peer) = tokio::select! {
                biased;
                _ = &mut *shutdown => {
                    info!("Shutdown requested, no longer accepting");
                    return Ok(());
                }
                accepted = self.listener.accept() => accepted.map_err(ServerError::Accept)?,
            };
            self.metrics.connection_accepted();

            let handle = self.issuer.next();
            if self.registry.occupancy() >= self.registry.capacity() {
                self.metrics.admission_waited();
                debug!(handle = %handle, %peer, "Registry full, waiting for a slot");
            }

            tokio::select! {
                biased;
                _ = &mut *shutdown => {
                    info!(
                        %peer,
                        "Shutdown requested while waiting for a slot, dropping connection"
                    );
                    return Ok(());
                }
                admitted = self.registry.admit(handle) => admitted?,
            }

            debug!(handle = %handle, %peer, "Connection admitted");
            // detached: the task outlives this iteration and releases its own slot
            tokio::spawn(serve_connection(
                self.handler.clone(),
                self.registry.clone(),
                stream,
                peer,
                handle,
            ));
        }
    }
}
