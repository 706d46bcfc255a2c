#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Privilege-escalation layer for pkgrelay
//!
//! Two concerns live here. The capability wrapper turns raw service
//! endpoints into privileged ones, one escalation strategy per
//! authorizer, and rebinds the endpoint a session carries internally.
//! The worker lease recycler owns the process's single shared connection
//! to the remote privileged worker.

mod elevated;
mod recycler;
mod wrapper;

pub use elevated::{ElevatedContext, ElevatedSpawner};
pub use recycler::{WorkerLease, WorkerRecycler};
pub use wrapper::{CapabilityWrapper, EscalationRoute, RoutedEndpoint};
