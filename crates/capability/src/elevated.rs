//! In-process elevated execution context

use async_trait::async_trait;
use pkgrelay_errors::Error;
use std::fmt;
use std::sync::Arc;

/// Spawns or attaches to the side execution context used by the
/// no-escalation strategy.
#[async_trait]
pub trait ElevatedSpawner: Send + Sync {
    /// Attach to the elevated context, starting it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error when the context cannot be started.
    async fn attach(&self) -> Result<Arc<dyn ElevatedContext>, Error>;
}

/// A running elevated execution context.
///
/// Endpoints routed through it are only valid while it is alive.
pub trait ElevatedContext: Send + Sync + fmt::Debug {
    /// Whether the context still holds its rights.
    fn is_alive(&self) -> bool;
}
