//! Worker lease recycler
//!
//! At most one live privileged-worker connection exists per recycler.
//! The first caller performs the gated connect; everyone else shares the
//! cached lease until the remote end dies or the last sharer releases it.

use pkgrelay_errors::Error;
use pkgrelay_events::{AppEvent, EventEmitter, EventSender, WorkerEvent};
use pkgrelay_service::{PermissionGate, PrivilegedOps, WorkerConnection, WorkerConnector};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared, reference-counted handle to one worker connection.
pub struct WorkerLease {
    connection: Arc<dyn WorkerConnection>,
    sharers: AtomicUsize,
    alive: AtomicBool,
}

impl WorkerLease {
    /// Privileged operations on the leased connection.
    #[must_use]
    pub fn privileged(&self) -> Arc<dyn PrivilegedOps> {
        self.connection.privileged()
    }

    /// Whether the remote end was still alive at last notice.
    ///
    /// A lease can die moments after this returns true; callers tolerate
    /// that by re-acquiring on failure.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Current number of logical sharers.
    #[must_use]
    pub fn sharers(&self) -> usize {
        self.sharers.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for WorkerLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerLease")
            .field("sharers", &self.sharers())
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}

/// Process-scoped registry for the shared worker lease.
pub struct WorkerRecycler {
    connector: Arc<dyn WorkerConnector>,
    gate: Arc<dyn PermissionGate>,
    // Creation is mutually exclusive; resolved leases are shared freely.
    slot: Mutex<Option<Arc<WorkerLease>>>,
    tx: Option<EventSender>,
}

impl EventEmitter for WorkerRecycler {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl WorkerRecycler {
    /// Create a recycler over the given connector and gate.
    #[must_use]
    pub fn new(connector: Arc<dyn WorkerConnector>, gate: Arc<dyn PermissionGate>) -> Arc<Self> {
        Arc::new(Self {
            connector,
            gate,
            slot: Mutex::new(None),
            tx: None,
        })
    }

    /// Create a recycler that reports lease lifecycle events.
    #[must_use]
    pub fn with_events(
        connector: Arc<dyn WorkerConnector>,
        gate: Arc<dyn PermissionGate>,
        tx: EventSender,
    ) -> Arc<Self> {
        Arc::new(Self {
            connector,
            gate,
            slot: Mutex::new(None),
            tx: Some(tx),
        })
    }

    /// Acquire the shared lease, establishing the connection when no live
    /// one is cached.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityError::PermissionDenied` when the gate refuses,
    /// or `CapabilityError::ConnectionFailed` when the connect fails.
    pub async fn acquire(self: &Arc<Self>) -> Result<Arc<WorkerLease>, Error> {
        let mut slot = self.slot.lock().await;
        if let Some(lease) = slot.as_ref() {
            if lease.is_alive() {
                lease.sharers.fetch_add(1, Ordering::SeqCst);
                self.emit(AppEvent::Worker(WorkerEvent::Reused {
                    target: self.connector.target().to_string(),
                    sharers: lease.sharers(),
                }));
                return Ok(lease.clone());
            }
            // Cached lease died without a notification reaching us yet.
            *slot = None;
        }

        let _grant = self.gate.acquire().await?;
        let connection = self.connector.connect().await?;
        let lease = Arc::new(WorkerLease {
            connection,
            sharers: AtomicUsize::new(1),
            alive: AtomicBool::new(true),
        });
        *slot = Some(lease.clone());
        self.spawn_death_watcher(&lease);
        self.emit(AppEvent::Worker(WorkerEvent::Established {
            target: self.connector.target().to_string(),
        }));
        Ok(lease)
    }

    /// Drop one sharer; the last one out unbinds the connection.
    ///
    /// The decrement-to-zero check runs under the slot lock so a racing
    /// `acquire` cannot be handed the cached lease between the last
    /// release and the unbind.
    pub async fn release(&self, lease: Arc<WorkerLease>) {
        let mut slot = self.slot.lock().await;
        if lease.sharers.fetch_sub(1, Ordering::SeqCst) != 1 {
            return;
        }
        lease.connection.unbind();
        if let Some(current) = slot.as_ref() {
            if Arc::ptr_eq(current, &lease) {
                *slot = None;
            }
        }
        drop(slot);
        self.emit(AppEvent::Worker(WorkerEvent::Released {
            target: self.connector.target().to_string(),
        }));
    }

    /// Force-invalidate the cached lease if `dead` is still the one
    /// cached. Idempotent.
    pub async fn invalidate(&self, dead: &Arc<WorkerLease>) {
        dead.alive.store(false, Ordering::SeqCst);
        let mut slot = self.slot.lock().await;
        if let Some(current) = slot.as_ref() {
            if Arc::ptr_eq(current, dead) {
                *slot = None;
                tracing::debug!(
                    target = self.connector.target(),
                    "worker lease invalidated after remote death"
                );
                self.emit(AppEvent::Worker(WorkerEvent::Died {
                    target: self.connector.target().to_string(),
                }));
            }
        }
    }

    fn spawn_death_watcher(self: &Arc<Self>, lease: &Arc<WorkerLease>) {
        let recycler = Arc::downgrade(self);
        let watched = lease.clone();
        tokio::spawn(async move {
            watched.connection.dead().await;
            if let Some(recycler) = recycler.upgrade() {
                recycler.invalidate(&watched).await;
            } else {
                watched.alive.store(false, Ordering::SeqCst);
            }
        });
    }
}
