//! Privileged worker contracts

use async_trait::async_trait;
use pkgrelay_errors::Error;
use std::path::PathBuf;
use std::sync::Arc;

/// Connector to a remote privileged worker process.
#[async_trait]
pub trait WorkerConnector: Send + Sync {
    /// Identity of the worker this connector targets (diagnostic only).
    fn target(&self) -> &str;

    /// Single-shot connect. Resolves exactly once: with a live
    /// connection, or with `CapabilityError::ConnectionFailed`.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityError::ConnectionFailed` when the worker
    /// cannot be reached or refuses the bind.
    async fn connect(&self) -> Result<Arc<dyn WorkerConnection>, Error>;
}

/// A live connection to the privileged worker.
#[async_trait]
pub trait WorkerConnection: Send + Sync {
    /// Privileged operations exposed by the remote worker.
    fn privileged(&self) -> Arc<dyn PrivilegedOps>;

    /// Resolves when the remote end dies. Used by the lease recycler to
    /// invalidate its cache; may be awaited at most once per watcher.
    async fn dead(&self);

    /// Tear down connection-bound resources (unbind). Idempotent.
    fn unbind(&self);
}

/// Operations that require elevated rights, reachable either directly or
/// through a leased worker connection.
#[async_trait]
pub trait PrivilegedOps: Send + Sync {
    /// Delete the given source files.
    ///
    /// # Errors
    ///
    /// Returns an error when any path cannot be removed.
    async fn delete_paths(&self, paths: &[PathBuf]) -> Result<(), Error>;
}
