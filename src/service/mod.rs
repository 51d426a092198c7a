//! Accept loop, per-connection handlers and shutdown
//!
//! ## Key Components
//!
//! - [`Server`] - Owns the listener and the handle registry
//! - [`ConnectionHandler`] - Trait for whatever serves an accepted connection
//! - [`StaticFiles`] - Built-in handler answering `GET` from a document root
//! - [`drain`] - Shutdown step that waits for active handlers, then closes
//!   the registry
//!
//! ## Example
//!
//! ```rust,ignore
//! use pagegate::config::Config;
//! use pagegate::service::Server;
//!
//! let config = Config::load(None)?;
//! let server = Server::bind(&config.server).await?;
//! server.run_until(async { tokio::signal::ctrl_c().await.ok(); }).await?;
//! ```

mod dispatcher;
mod error;
mod handler;
mod shutdown;
mod static_files;

pub use dispatcher::Server;
pub use error::{Result, ServerError};
pub use handler::{ConnectionHandler, serve_connection};
pub use shutdown::drain;
pub use static_files::{ExchangeError, StaticFiles};
