#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Collaborator contracts for the pkgrelay core
//!
//! The package-management service, permission gate, privileged-worker
//! connector, and byte-stream sources are consumed as contracts; the
//! platform supplies real implementations, tests supply scripted ones.
//! Traits are object-safe so capabilities can be passed around as
//! `Arc<dyn ...>` handles.

mod bridge;
mod endpoint;
mod fs;
mod gate;
mod package;
mod worker;

pub use bridge::{ResultBridge, ResultSink, RESULT_TIMEOUT};
pub use endpoint::{Endpoint, ServiceEndpoint};
pub use fs::FileDataSource;
pub use gate::{PermissionGate, PermissionGrant};
pub use package::{EndpointInject, PackageInstaller, PackageService, Session, WriteSlot};
pub use worker::{PrivilegedOps, WorkerConnection, WorkerConnector};
