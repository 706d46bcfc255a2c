#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the pkgrelay privileged-install relay
//!
//! This crate provides the data model shared across the system: install
//! items and batches, per-run configuration, session parameters, and the
//! commit outcome payload. No I/O lives here.

pub mod batch;
pub mod config;
pub mod session;
pub mod source;

// Re-export commonly used types
pub use batch::{FileRole, InstallBatch, InstallItem};
pub use config::{Authorizer, InstallConfig, InstallFlags};
pub use session::{Attribution, CommitOutcome, CommitStatus, SessionId, SessionMode, SessionParams};
pub use source::{DataSource, SourceStream};
pub use uuid::Uuid;
