use serde::{Deserialize, Serialize};

// Declare all domain modules
pub mod general;
pub mod install;
pub mod worker;

pub use general::GeneralEvent;
pub use install::InstallEvent;
pub use worker::WorkerEvent;

/// Top-level event wrapper dispatching to domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum AppEvent {
    /// Install session lifecycle and progress
    Install(InstallEvent),
    /// Privileged worker lease lifecycle
    Worker(WorkerEvent),
    /// Warnings, errors, debug logging
    General(GeneralEvent),
}

impl From<InstallEvent> for AppEvent {
    fn from(event: InstallEvent) -> Self {
        Self::Install(event)
    }
}

impl From<WorkerEvent> for AppEvent {
    fn from(event: WorkerEvent) -> Self {
        Self::Worker(event)
    }
}

impl From<GeneralEvent> for AppEvent {
    fn from(event: GeneralEvent) -> Self {
        Self::General(event)
    }
}
