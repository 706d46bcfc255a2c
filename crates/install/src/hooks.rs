//! Fire-and-forget post-install work

use async_trait::async_trait;
use pkgrelay_capability::WorkerRecycler;
use pkgrelay_errors::Error;
use pkgrelay_service::PrivilegedOps;
use pkgrelay_types::Authorizer;
use std::path::PathBuf;
use std::sync::Arc;

/// Extra work scheduled after a batch installs successfully.
///
/// Runs on its own task; failures are logged, never surfaced to the
/// `do_work` caller.
#[async_trait]
pub trait PostInstallHook: Send + Sync {
    /// Run the hook.
    ///
    /// # Errors
    ///
    /// Errors are captured into the event stream by the orchestrator.
    async fn run(&self) -> Result<(), Error>;
}

/// Delete installed source files through a privileged capability.
///
/// `None` and `DelegatedOwner` can delete directly; every other
/// authorizer goes through a leased worker connection, released again
/// once the delete resolves.
pub(crate) async fn delete_sources(
    authorizer: &Authorizer,
    direct: Arc<dyn PrivilegedOps>,
    recycler: Arc<WorkerRecycler>,
    paths: &[PathBuf],
) -> Result<(), Error> {
    match authorizer {
        Authorizer::None | Authorizer::DelegatedOwner => direct.delete_paths(paths).await,
        Authorizer::Explicit(_) => {
            let lease = recycler.acquire().await?;
            let result = lease.privileged().delete_paths(paths).await;
            recycler.release(lease).await;
            result
        }
    }
}
