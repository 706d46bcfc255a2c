use serde::{Deserialize, Serialize};

/// Privileged worker lease domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkerEvent {
    /// A new worker connection was established
    Established { target: String },

    /// An existing live lease was handed to another sharer
    Reused { target: String, sharers: usize },

    /// The remote end of the cached lease died
    Died { target: String },

    /// The last sharer released the lease and the connection was unbound
    Released { target: String },
}
