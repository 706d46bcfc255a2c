#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Install session orchestration for pkgrelay
//!
//! Drives privileged multi-file installs end to end: a batch is
//! partitioned into one transactional session per target package, each
//! session is opened through the capability wrapper, fed its files in
//! order, committed, and always abandoned and closed afterwards.
//! Post-install hooks run fire-and-forget once a batch succeeds.

mod hooks;
mod orchestrator;

pub use hooks::PostInstallHook;
pub use orchestrator::SessionOrchestrator;

// Re-export the commit bridge so callers wiring up service
// implementations only need this crate.
pub use pkgrelay_service::{ResultBridge, ResultSink, RESULT_TIMEOUT};
