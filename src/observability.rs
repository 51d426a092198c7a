//! In-process counters for the dispatcher and request handlers

use http::StatusCode;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct ServerMetrics {
    connections_accepted: AtomicU64,
    admissions_waited: AtomicU64,
    responses_success: AtomicU64,
    responses_client_error: AtomicU64,
    responses_server_error: AtomicU64,
    connections_timed_out: AtomicU64,
}

impl ServerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_accepted(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "connections_accepted", "Metric incremented");
    }

    /// The dispatcher found every slot taken and had to wait
    pub fn admission_waited(&self) {
        self.admissions_waited.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "admissions_waited", "Metric incremented");
    }

    pub fn response_sent(&self, status: StatusCode) {
        let (counter, name) = if status.is_success() {
            (&self.responses_success, "responses_success")
        } else if status.is_client_error() {
            (&self.responses_client_error, "responses_client_error")
        } else {
            (&self.responses_server_error, "responses_server_error")
        };
        counter.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = name, status = status.as_u16(), "Metric incremented");
    }

    pub fn connection_timed_out(&self) {
        self.connections_timed_out.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "connections_timed_out", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_accepted: self.connections_accepted.load(Ordering::Relaxed),
            admissions_waited: self.admissions_waited.load(Ordering::Relaxed),
            responses_success: self.responses_success.load(Ordering::Relaxed),
            responses_client_error: self.responses_client_error.load(Ordering::Relaxed),
            responses_server_error: self.responses_server_error.load(Ordering::Relaxed),
            connections_timed_out: self.connections_timed_out.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub connections_accepted: u64,
    pub admissions_waited: u64,
    pub responses_success: u64,
    pub responses_client_error: u64,
    pub responses_server_error: u64,
    pub connections_timed_out: u64,
}
