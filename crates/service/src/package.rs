//! Package-management service contracts
//!
//! Operation shapes mirror the platform installer service: a session is
//! created from params, opened by id, fed one write slot per file, and
//! committed with a completion sink. The session/commit protocol itself
//! is a black box behind these traits.

use crate::bridge::ResultSink;
use crate::endpoint::Endpoint;
use async_trait::async_trait;
use pkgrelay_errors::Error;
use pkgrelay_types::{Attribution, SessionId, SessionParams};
use std::sync::Arc;
use tokio::io::AsyncWrite;

/// Entry point to the package-management service.
///
/// The raw installer endpoint is exposed so the capability wrapper can
/// decorate it *before* a typed facade is bound over it; the facade never
/// has to be patched after construction.
#[async_trait]
pub trait PackageService: Send + Sync {
    /// Raw handle to the installer endpoint beneath this service.
    ///
    /// # Errors
    ///
    /// Returns an error when the service cannot be reached.
    async fn installer_endpoint(&self) -> Result<Endpoint, Error>;

    /// Bind an installer facade over a (possibly wrapped) endpoint,
    /// attributing its sessions to the given installer identity and user.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint does not speak the installer
    /// protocol.
    async fn bind_installer(
        &self,
        endpoint: Endpoint,
        attribution: Attribution,
    ) -> Result<Arc<dyn PackageInstaller>, Error>;
}

/// Installer facade bound to one attribution.
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    /// Create a new install session.
    ///
    /// # Errors
    ///
    /// Returns an error when the service rejects the parameters.
    async fn create_session(&self, params: &SessionParams) -> Result<SessionId, Error>;

    /// Open a previously created session.
    ///
    /// # Errors
    ///
    /// Returns an error when the session id is unknown or the open fails.
    async fn open_session(&self, id: SessionId) -> Result<Box<dyn Session>, Error>;
}

/// Typed capability injection point on a session.
///
/// Session objects carry their own reference to the service; that
/// reference must be routed through the same escalation path as the
/// installer endpoint. Sessions that expose no endpoint are tolerated -
/// the wrapper skips rebinding and emits a diagnostic.
pub trait EndpointInject {
    /// Current internal endpoint, when the session exposes one.
    fn endpoint(&self) -> Option<Endpoint>;

    /// Replace the internal endpoint with a wrapped equivalent.
    fn inject_endpoint(&mut self, endpoint: Endpoint);
}

/// One in-progress install transaction.
///
/// Lifecycle: open -> `open_write`/`fsync` per file -> `commit` ->
/// `abandon` + `close`. Abandon after a successful commit is a no-op on
/// the service side; callers run it unconditionally.
#[async_trait]
pub trait Session: EndpointInject + Send {
    /// Open a named write slot of the given length at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error when the slot cannot be allocated.
    async fn open_write(
        &mut self,
        name: &str,
        offset: u64,
        length: u64,
    ) -> Result<Box<dyn WriteSlot>, Error>;

    /// Durably persist everything written to `slot` so far.
    ///
    /// # Errors
    ///
    /// Returns an error when the sync fails.
    async fn fsync(&mut self, slot: &mut dyn WriteSlot) -> Result<(), Error>;

    /// Commit the session. The verdict arrives asynchronously on `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error when the commit cannot even be issued.
    async fn commit(&mut self, sink: ResultSink) -> Result<(), Error>;

    /// Cancel any state that has not been committed.
    ///
    /// # Errors
    ///
    /// Returns an error when the service rejects the abandon call.
    async fn abandon(&mut self) -> Result<(), Error>;

    /// Release the session's resources. Never fails.
    async fn close(&mut self);
}

/// Writable sink for one file inside a session.
///
/// Closing is `AsyncWrite::poll_shutdown`; callers shut the slot down
/// after `Session::fsync`.
pub trait WriteSlot: AsyncWrite + Send + Unpin {
    /// Name the slot was opened under.
    fn name(&self) -> &str;
}
