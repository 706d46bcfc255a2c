//! Permission gate contract

use async_trait::async_trait;
use pkgrelay_errors::Error;

/// Proof that the permission gate admitted the caller.
///
/// Holding a grant is what authorizes the gated calls that follow it;
/// the token itself carries no data.
#[derive(Debug)]
pub struct PermissionGrant(());

impl PermissionGrant {
    /// Construct a grant. Only gate implementations should call this.
    #[must_use]
    pub fn new() -> Self {
        Self(())
    }
}

impl Default for PermissionGrant {
    fn default() -> Self {
        Self::new()
    }
}

/// Gate in front of privileged operations.
///
/// `acquire` blocks until the platform answers the permission request and
/// fails with `CapabilityError::PermissionDenied` when it is refused.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Request the privileged grant.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityError::PermissionDenied` when the gate refuses.
    async fn acquire(&self) -> Result<PermissionGrant, Error>;

    /// Resolve the delegated owner identity. Callers must hold a grant.
    ///
    /// # Errors
    ///
    /// Returns an error when the owning identity cannot be resolved.
    async fn owner_identity(&self, grant: &PermissionGrant) -> Result<String, Error>;
}
