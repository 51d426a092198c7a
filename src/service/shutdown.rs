use tracing::info;

use crate::observability::ServerMetrics;
use crate::registry::{HandleRegistry, RegistryError};

/// Wait for every active handler to finish, then close the registry
///
/// Must only run once the dispatcher has stopped admitting; in-flight
/// handlers are never cancelled.
pub async fn drain(
    registry: &HandleRegistry,
    metrics: &ServerMetrics,
) -> Result<(), RegistryError> {
    let active = registry.snapshot().await;
    info!(
        active = active.len(),
        capacity = registry.capacity(),
        "Waiting for active handlers to finish"
    );
    for (slot, handle) in active.iter().enumerate() {
        info!(slot, handle = %handle, "Active handler");
    }

    registry.wait_drained().await;
    registry.destroy().await?;

    let totals = metrics.snapshot();
    info!(
        accepted = totals.connections_accepted,
        waited = totals.admissions_waited,
        ok = totals.responses_success,
        client_errors = totals.responses_client_error,
        server_errors = totals.responses_server_error,
        timed_out = totals.connections_timed_out,
        "Registry drained, server closed"
    );
    Ok(())
}
