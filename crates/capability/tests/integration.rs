//! Integration tests for the worker lease recycler

use async_trait::async_trait;
use pkgrelay_capability::WorkerRecycler;
use pkgrelay_errors::{CapabilityError, Error};
use pkgrelay_service::{
    PermissionGate, PermissionGrant, PrivilegedOps, WorkerConnection, WorkerConnector,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug)]
struct FakeOps;

#[async_trait]
impl PrivilegedOps for FakeOps {
    async fn delete_paths(&self, _paths: &[PathBuf]) -> Result<(), Error> {
        Ok(())
    }
}

struct FakeConnection {
    death: Notify,
    unbound: AtomicBool,
}

impl FakeConnection {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            death: Notify::new(),
            unbound: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl WorkerConnection for FakeConnection {
    fn privileged(&self) -> Arc<dyn PrivilegedOps> {
        Arc::new(FakeOps)
    }

    async fn dead(&self) {
        self.death.notified().await;
    }

    fn unbind(&self) {
        self.unbound.store(true, Ordering::SeqCst);
    }
}

struct FakeConnector {
    connects: AtomicUsize,
    fail: bool,
    last: std::sync::Mutex<Option<Arc<FakeConnection>>>,
}

impl FakeConnector {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            connects: AtomicUsize::new(0),
            fail,
            last: std::sync::Mutex::new(None),
        })
    }

    fn last_connection(&self) -> Arc<FakeConnection> {
        self.last.lock().unwrap().clone().unwrap()
    }
}

#[async_trait]
impl WorkerConnector for FakeConnector {
    fn target(&self) -> &str {
        "worker.test"
    }

    async fn connect(&self) -> Result<Arc<dyn WorkerConnection>, Error> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CapabilityError::ConnectionFailed {
                message: "remote service failed to start".into(),
            }
            .into());
        }
        let connection = FakeConnection::new();
        *self.last.lock().unwrap() = Some(connection.clone());
        Ok(connection)
    }
}

struct OpenGate {
    denied: bool,
    checks: AtomicUsize,
}

#[async_trait]
impl PermissionGate for OpenGate {
    async fn acquire(&self) -> Result<PermissionGrant, Error> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if self.denied {
            return Err(CapabilityError::PermissionDenied {
                operation: "worker bind".into(),
            }
            .into());
        }
        Ok(PermissionGrant::new())
    }

    async fn owner_identity(&self, _grant: &PermissionGrant) -> Result<String, Error> {
        Ok("com.example.owner".into())
    }
}

fn open_gate() -> Arc<OpenGate> {
    Arc::new(OpenGate {
        denied: false,
        checks: AtomicUsize::new(0),
    })
}

async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}

#[tokio::test]
async fn concurrent_acquires_share_one_lease() {
    let connector = FakeConnector::new(false);
    let recycler = WorkerRecycler::new(connector.clone(), open_gate());

    let (a, b) = tokio::join!(recycler.acquire(), recycler.acquire());
    let (a, b) = (a.unwrap(), b.unwrap());

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.sharers(), 2);
    assert_eq!(connector.connects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn death_notification_forces_a_new_lease() {
    let connector = FakeConnector::new(false);
    let recycler = WorkerRecycler::new(connector.clone(), open_gate());

    let first = recycler.acquire().await.unwrap();
    connector.last_connection().death.notify_one();
    let watched = first.clone();
    wait_until(move || !watched.is_alive()).await;

    let second = recycler.acquire().await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(connector.connects.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn simulated_invalidation_is_idempotent() {
    let connector = FakeConnector::new(false);
    let recycler = WorkerRecycler::new(connector.clone(), open_gate());

    let lease = recycler.acquire().await.unwrap();
    recycler.invalidate(&lease).await;
    recycler.invalidate(&lease).await;
    assert!(!lease.is_alive());

    // Release after invalidation must not panic or double-clear.
    recycler.release(lease).await;
    assert!(connector.last_connection().unbound.load(Ordering::SeqCst));
}

#[tokio::test]
async fn connect_failure_surfaces_connection_failed() {
    let connector = FakeConnector::new(true);
    let recycler = WorkerRecycler::new(connector, open_gate());

    let error = recycler.acquire().await.unwrap_err();
    assert!(matches!(
        error,
        Error::Capability(CapabilityError::ConnectionFailed { .. })
    ));
}

#[tokio::test]
async fn denied_gate_blocks_establishment() {
    let connector = FakeConnector::new(false);
    let gate = Arc::new(OpenGate {
        denied: true,
        checks: AtomicUsize::new(0),
    });
    let recycler = WorkerRecycler::new(connector.clone(), gate);

    let error = recycler.acquire().await.unwrap_err();
    assert!(matches!(
        error,
        Error::Capability(CapabilityError::PermissionDenied { .. })
    ));
    assert_eq!(connector.connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn lease_debug_reports_sharing_state() {
    let connector = FakeConnector::new(false);
    let recycler = WorkerRecycler::new(connector, open_gate());

    let lease = recycler.acquire().await.unwrap();
    let rendered = format!("{lease:?}");
    assert!(rendered.contains("sharers: 1"));
    assert!(rendered.contains("alive: true"));
}

#[tokio::test]
async fn racing_acquire_after_last_release_gets_a_fresh_lease() {
    let connector = FakeConnector::new(false);
    let recycler = WorkerRecycler::new(connector.clone(), open_gate());

    let first = recycler.acquire().await.unwrap();
    let kept = first.clone();
    let ((), second) = tokio::join!(recycler.release(first), recycler.acquire());
    let second = second.unwrap();

    // The racing acquire must never be handed the lease whose connection
    // the release just unbound.
    assert!(!Arc::ptr_eq(&kept, &second));
    assert!(second.is_alive());
    assert_eq!(connector.connects.load(Ordering::SeqCst), 2);
    assert!(!connector.last_connection().unbound.load(Ordering::SeqCst));
}

#[tokio::test]
async fn last_release_unbinds_and_clears_cache() {
    let connector = FakeConnector::new(false);
    let recycler = WorkerRecycler::new(connector.clone(), open_gate());

    let a = recycler.acquire().await.unwrap();
    let b = recycler.acquire().await.unwrap();

    recycler.release(a).await;
    assert!(!connector.last_connection().unbound.load(Ordering::SeqCst));

    recycler.release(b).await;
    assert!(connector.last_connection().unbound.load(Ordering::SeqCst));

    // Cache is empty again: the next acquire reconnects.
    recycler.acquire().await.unwrap();
    assert_eq!(connector.connects.load(Ordering::SeqCst), 2);
}
