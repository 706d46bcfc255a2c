//! Privilege escalation and worker connection error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CapabilityError {
    #[error("permission denied: {operation}")]
    PermissionDenied { operation: String },

    #[error("privileged worker connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("elevated execution context is no longer alive")]
    ElevatedContextDead,
}
