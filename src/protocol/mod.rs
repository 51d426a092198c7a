//! The HTTP exchange for a single connection
//!
//! One request line in, one status line with `Content-Type` and
//! `Content-Length` out, optionally followed by a file body. Headers sent by
//! the client are read but not interpreted, and the connection is closed
//! after the response.

mod content_type;
mod error;
mod request;
mod response;
mod site;

pub use content_type::content_type_for;
pub use error::RequestError;
pub use request::{
    ALLOWED_METHOD, FALLBACK_VERSION, RequestHead, RequestLine, SUPPORTED_VERSIONS,
    read_request_head,
};
pub use response::ResponseHead;
pub use site::{DocumentRoot, StaticFile};
