use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Install session domain events - one stream per batch, stitched by the
/// batch correlation id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstallEvent {
    /// Session processing started for one package group
    GroupStarted {
        correlation_id: Uuid,
        package: String,
        files: usize,
    },

    /// One file was fully written and synced into the session
    FileWritten {
        correlation_id: Uuid,
        package: String,
        name: String,
        bytes: u64,
    },

    /// The session was committed and is awaiting the service's verdict
    Committed {
        correlation_id: Uuid,
        package: String,
    },

    /// One package group installed successfully
    GroupCompleted {
        correlation_id: Uuid,
        package: String,
    },

    /// One package group failed
    GroupFailed {
        correlation_id: Uuid,
        package: String,
        error: String,
    },

    /// The whole batch finished (all groups processed)
    BatchCompleted {
        correlation_id: Uuid,
        groups: usize,
        success: bool,
    },

    /// A session exposed no injectable endpoint; escalation rebinding
    /// was skipped
    RebindSkipped {
        correlation_id: Uuid,
        package: String,
    },
}
