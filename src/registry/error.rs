use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("registry capacity must be positive")]
    ZeroCapacity,

    #[error("registry is closed")]
    Closed,

    #[error("registry still has {active} active handles")]
    NotDrained { active: usize },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
