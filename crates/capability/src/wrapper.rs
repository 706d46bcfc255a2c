//! Capability wrapper: one escalation strategy per authorizer

use crate::elevated::{ElevatedContext, ElevatedSpawner};
use pkgrelay_errors::{CapabilityError, Error};
use pkgrelay_service::{Endpoint, PermissionGate, ServiceEndpoint, Session};
use pkgrelay_types::{Attribution, Authorizer};
use std::any::Any;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Escalation path an endpoint has been routed through.
#[derive(Debug, Clone)]
pub enum EscalationRoute {
    /// In-process elevated execution context (no external escalation)
    Elevated(Arc<dyn ElevatedContext>),
    /// Delegated-owner escalation
    Delegated,
}

/// An endpoint decorated with an escalation route.
///
/// Calls bound over this handle travel the wrapped path; the raw
/// endpoint stays reachable for service implementations that need it.
#[derive(Debug)]
pub struct RoutedEndpoint {
    inner: Endpoint,
    route: EscalationRoute,
}

impl RoutedEndpoint {
    /// The undecorated endpoint.
    #[must_use]
    pub fn inner(&self) -> &Endpoint {
        &self.inner
    }

    /// The escalation path this endpoint travels.
    #[must_use]
    pub fn route(&self) -> &EscalationRoute {
        &self.route
    }
}

impl ServiceEndpoint for RoutedEndpoint {
    fn descriptor(&self) -> &str {
        self.inner.descriptor()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Wraps raw service endpoints for the escalation strategy selected by
/// the authorizer, and resolves the installer identity installs are
/// attributed to.
pub struct CapabilityWrapper {
    gate: Arc<dyn PermissionGate>,
    spawner: Arc<dyn ElevatedSpawner>,
    self_identity: String,
    // Lazily started and then reused for the lifetime of the wrapper.
    elevated: OnceCell<Arc<dyn ElevatedContext>>,
}

impl CapabilityWrapper {
    /// Create a wrapper.
    ///
    /// `self_identity` is the relay's own package identity, used for
    /// attribution under the no-escalation strategy.
    pub fn new(
        gate: Arc<dyn PermissionGate>,
        spawner: Arc<dyn ElevatedSpawner>,
        self_identity: impl Into<String>,
    ) -> Self {
        Self {
            gate,
            spawner,
            self_identity: self_identity.into(),
            elevated: OnceCell::new(),
        }
    }

    /// Wrap a raw endpoint for the chosen escalation strategy.
    ///
    /// `Explicit` is identity passthrough: the raw endpoint is returned
    /// unwrapped.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityError::ElevatedContextDead` when the
    /// no-escalation context has died, or whatever the spawner reports
    /// when it cannot start.
    pub async fn wrap(&self, authorizer: &Authorizer, raw: Endpoint) -> Result<Endpoint, Error> {
        match authorizer {
            Authorizer::None => {
                let context = self.elevated_context().await?;
                if !context.is_alive() {
                    return Err(CapabilityError::ElevatedContextDead.into());
                }
                Ok(Arc::new(RoutedEndpoint {
                    inner: raw,
                    route: EscalationRoute::Elevated(context),
                }))
            }
            Authorizer::DelegatedOwner => Ok(Arc::new(RoutedEndpoint {
                inner: raw,
                route: EscalationRoute::Delegated,
            })),
            Authorizer::Explicit(_) => Ok(raw),
        }
    }

    /// Resolve the installer identity for the chosen strategy.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityError::PermissionDenied` when the delegated
    /// owner lookup is refused by the gate.
    pub async fn attribution(
        &self,
        authorizer: &Authorizer,
        user: u32,
    ) -> Result<Attribution, Error> {
        let installer = match authorizer {
            Authorizer::None => self.self_identity.clone(),
            Authorizer::DelegatedOwner => {
                let grant = self.gate.acquire().await?;
                self.gate.owner_identity(&grant).await?
            }
            Authorizer::Explicit(name) => name.clone(),
        };
        Ok(Attribution::new(installer, user))
    }

    /// Rebind the endpoint a session carries internally through the same
    /// escalation path as its installer.
    ///
    /// Returns `false` when the session exposes no injection point; the
    /// caller decides how loudly to diagnose that.
    ///
    /// # Errors
    ///
    /// Propagates wrap failures.
    pub async fn rebind_session(
        &self,
        authorizer: &Authorizer,
        session: &mut dyn Session,
    ) -> Result<bool, Error> {
        let Some(raw) = session.endpoint() else {
            return Ok(false);
        };
        let wrapped = self.wrap(authorizer, raw).await?;
        session.inject_endpoint(wrapped);
        Ok(true)
    }

    async fn elevated_context(&self) -> Result<Arc<dyn ElevatedContext>, Error> {
        let context = self
            .elevated
            .get_or_try_init(|| self.spawner.attach())
            .await?;
        Ok(context.clone())
    }
}
