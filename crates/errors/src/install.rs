//! Installation session error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstallError {
    #[error("multiple base files in one session for package {package}")]
    MultipleBaseFiles { package: String },

    #[error("cannot open input stream for {name}")]
    StreamUnavailable { name: String },

    #[error("install commit failed: {reason}")]
    CommitFailed { reason: String },

    #[error("no install result within {seconds}s")]
    CommitTimeout { seconds: u64 },
}
