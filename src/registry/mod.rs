//! Bounded handle registry
//!
//! The registry caps how many connection handlers may be active at once and
//! lets shutdown wait for the active ones to finish.
//!
//! ## Key Components
//!
//! - [`HandleRegistry`] - Fixed-capacity stack of live handler ids
//! - [`HandlerId`] - Opaque token identifying one connection handler
//! - [`HandleIssuer`] - Mints unique [`HandlerId`]s
//!
//! ## Example
//!
//! ```rust,ignore
//! use pagegate::registry::{HandleIssuer, HandleRegistry};
//!
//! let registry = HandleRegistry::new(8)?;
//! let issuer = HandleIssuer::new();
//!
//! registry.admit(issuer.next()).await?;   // waits while 8 are active
//! let popped = registry.release().await?; // top of stack, not necessarily ours
//! ```

mod error;
mod handle;
mod slots;

pub use error::{RegistryError, Result};
pub use handle::{HandleIssuer, HandlerId};
pub use slots::{DEFAULT_CAPACITY, HandleRegistry};
