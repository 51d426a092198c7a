use tokio::sync::{Mutex, Semaphore, watch};
use tracing::debug;

use super::error::{RegistryError, Result};
use super::handle::HandlerId;

/// Default number of handlers allowed to run at once
pub const DEFAULT_CAPACITY: usize = 8;

/// Fixed-capacity registry of live handler ids
///
/// Architecture:
/// - `slots`: stack of admitted ids, guarded by a mutex
/// - `fill`: semaphore counting free slots (starts at `capacity`)
/// - `drain`: semaphore counting occupied slots (starts at 0)
/// - `occupancy`: watch channel mirroring `slots.len()` so shutdown can wait
///   for zero without polling
///
/// `admit` blocks while every slot is taken, which is how the dispatcher
/// applies backpressure. `release` pops whatever is on top of the stack, so
/// the returned id is not necessarily the caller's own; the registry behaves
/// as a counting gate and callers never inspect the popped value for
/// correctness.
///
/// Both semaphore permits are consumed only after the slot mutation has
/// happened, so dropping a pending `admit`/`release` future leaves the
/// registry untouched.
#[derive(Debug)]
pub struct HandleRegistry {
    capacity: usize,
    slots: Mutex<Vec<HandlerId>>,
    fill: Semaphore,
    drain: Semaphore,
    occupancy: watch::Sender<usize>,
}

impl HandleRegistry {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(RegistryError::ZeroCapacity);
        }

        let (occupancy, _) = watch::channel(0);

        Ok(Self {
            capacity,
            slots: Mutex::new(Vec::with_capacity(capacity)),
            fill: Semaphore::new(capacity),
            drain: Semaphore::new(0),
            occupancy,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of occupied slots right now
    pub fn occupancy(&self) -> usize {
        *self.occupancy.borrow()
    }

    pub fn is_closed(&self) -> bool {
        self.fill.is_closed()
    }

    /// Push `handle` onto the stack, waiting for a free slot first
    pub async fn admit(&self, handle: HandlerId) -> Result<()> {
        let permit = self
            .fill
            .acquire()
            .await
            .map_err(|_| RegistryError::Closed)?;

        let mut slots = self.slots.lock().await;
        // destroy() may have run between acquiring the permit and the lock
        if self.fill.is_closed() {
            return Err(RegistryError::Closed);
        }

        permit.forget();
        slots.push(handle);
        let active = slots.len();
        self.occupancy.send_replace(active);
        drop(slots);

        self.drain.add_permits(1);
        debug!(handle = %handle, active, "Handle admitted");
        Ok(())
    }

    /// Pop the most recently admitted handle, waiting for one to exist
    pub async fn release(&self) -> Result<HandlerId> {
        let permit = self
            .drain
            .acquire()
            .await
            .map_err(|_| RegistryError::Closed)?;

        let mut slots = self.slots.lock().await;
        // a drain permit always has a pushed slot behind it
        let handle = slots.pop().ok_or(RegistryError::Closed)?;

        permit.forget();
        let active = slots.len();
        self.occupancy.send_replace(active);
        drop(slots);

        self.fill.add_permits(1);
        debug!(handle = %handle, active, "Handle released");
        Ok(handle)
    }

    /// Copy of the occupied slots, bottom of the stack first
    pub async fn snapshot(&self) -> Vec<HandlerId> {
        self.slots.lock().await.clone()
    }

    /// Resolve once no handles are registered
    pub async fn wait_drained(&self) {
        let mut rx = self.occupancy.subscribe();
        // the sender lives in `self`, so the channel cannot close under us
        let _ = rx.wait_for(|active| *active == 0).await;
    }

    /// Close the registry; every later admit or release fails with `Closed`
    pub async fn destroy(&self) -> Result<()> {
        let slots = self.slots.lock().await;

        if self.fill.is_closed() {
            return Err(RegistryError::Closed);
        }
        if !slots.is_empty() {
            return Err(RegistryError::NotDrained {
                active: slots.len(),
            });
        }

        self.fill.close();
        self.drain.close();
        debug!(capacity = self.capacity, "Registry destroyed");
        Ok(())
    }
}
