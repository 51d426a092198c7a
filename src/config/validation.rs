use super::models::Config;
use crate::humanize::ByteSize;
use thiserror::Error;

/// Upper bound for the handler registry
pub const MAX_CAPACITY: usize = 4096;
const MIN_REQUEST_BYTES: ByteSize = ByteSize(64);
const MAX_REQUEST_BYTES: ByteSize = ByteSize::kib(64);

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("capacity must be between 1 and {max}, got {actual}")]
    InvalidCapacity { actual: usize, max: usize },

    #[error("index_document must be a plain file name, got '{0}'")]
    InvalidIndexDocument(String),

    #[error("max_request_bytes ({actual}) must be between {min} and {max}")]
    RequestLimitOutOfRange {
        actual: ByteSize,
        min: ByteSize,
        max: ByteSize,
    },

    #[error("read_timeout_ms must be positive")]
    ZeroReadTimeout,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_capacity(config)?;
    validate_index_document(config)?;
    validate_request_limits(config)?;
    Ok(())
}

fn validate_capacity(config: &Config) -> Result<(), ValidationError> {
    let capacity = config.server.capacity;
    if capacity == 0 || capacity > MAX_CAPACITY {
        return Err(ValidationError::InvalidCapacity {
            actual: capacity,
            max: MAX_CAPACITY,
        });
    }
    Ok(())
}

/// The index name is appended to a directory path, so it must not walk out of it
fn validate_index_document(config: &Config) -> Result<(), ValidationError> {
    let index = &config.server.index_document;
    let plain = !index.is_empty()
        && index != "."
        && index != ".."
        && !index.contains(['/', '\\']);

    if !plain {
        return Err(ValidationError::InvalidIndexDocument(index.clone()));
    }
    Ok(())
}

fn validate_request_limits(config: &Config) -> Result<(), ValidationError> {
    let limit = config.server.max_request_bytes;
    if limit < MIN_REQUEST_BYTES || limit > MAX_REQUEST_BYTES {
        return Err(ValidationError::RequestLimitOutOfRange {
            actual: limit,
            min: MIN_REQUEST_BYTES,
            max: MAX_REQUEST_BYTES,
        });
    }

    if config.server.read_timeout_ms == 0 {
        return Err(ValidationError::ZeroReadTimeout);
    }

    Ok(())
}
