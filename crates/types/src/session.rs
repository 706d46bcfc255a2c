//! Session parameter and outcome types

use crate::InstallFlags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one install session at the package service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u32);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// How the session relates to an already-installed package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// The session delivers a complete package (exactly one base file)
    FullInstall,
    /// The session only adds splits to an existing install (no base file)
    InheritExisting,
}

/// Parameters for creating one install session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionParams {
    pub mode: SessionMode,
    /// Package the session installs into
    pub package_name: String,
    /// Effective flag word (caller flags ORed with replace-existing)
    pub install_flags: InstallFlags,
}

/// Identity an installer facade acts under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    /// Installer package the install is attributed to
    pub installer: String,
    /// User the install targets
    pub user: u32,
}

impl Attribution {
    /// Create an attribution
    pub fn new(installer: impl Into<String>, user: u32) -> Self {
        Self {
            installer: installer.into(),
            user,
        }
    }
}

/// Verdict of one committed session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStatus {
    Success,
    Failure,
}

/// Completion payload delivered through the result bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOutcome {
    pub status: CommitStatus,
    /// Service-provided failure detail, when there is one
    pub message: Option<String>,
}

impl CommitOutcome {
    /// Successful install outcome
    #[must_use]
    pub fn success() -> Self {
        Self {
            status: CommitStatus::Success,
            message: None,
        }
    }

    /// Failed install outcome with the service's reason
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: CommitStatus::Failure,
            message: Some(message.into()),
        }
    }

    /// Whether the install succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == CommitStatus::Success
    }
}
