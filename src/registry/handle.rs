use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque token for one live connection handler
///
/// Carries no payload beyond being unique within the issuing process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{:016x}", self.0)
    }
}

impl From<u64> for HandlerId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Hands out sequential handler ids
#[derive(Debug, Default)]
pub struct HandleIssuer {
    next: AtomicU64,
}

impl HandleIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> HandlerId {
        HandlerId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
