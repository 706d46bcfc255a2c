//! Opaque service endpoint handles

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared, opaque handle to a system-service endpoint.
pub type Endpoint = Arc<dyn ServiceEndpoint>;

/// A raw handle to a remote service endpoint.
///
/// The capability wrapper layers escalation routes on top of these by
/// decoration; the package service binds typed facades back out of them.
/// The transport behind an endpoint is deliberately not modeled here.
pub trait ServiceEndpoint: Send + Sync + fmt::Debug {
    /// Interface descriptor of the endpoint (diagnostic only).
    fn descriptor(&self) -> &str;

    /// Downcast seam for concrete service implementations that need to
    /// recover their own endpoint type behind the wrapping.
    fn as_any(&self) -> &dyn Any;
}
