//! Application state shared across handlers

use std::sync::Arc;

use crate::breaker::{BreakerPolicy, CircuitBreaker};
use crate::db::Connector;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    connector: Box<dyn Connector>,
    breaker: CircuitBreaker,
    expose_errors: bool,
}

impl AppState {
    pub fn new(connector: impl Connector + 'static, policy: BreakerPolicy) -> Self {
        Self::with_error_exposure(connector, policy, false)
    }

    /// Like [`AppState::new`], but 500 responses carry the raw store error
    /// when `expose_errors` is set.
    pub fn with_error_exposure(
        connector: impl Connector + 'static,
        policy: BreakerPolicy,
        expose_errors: bool,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                connector: Box::new(connector),
                breaker: CircuitBreaker::new(policy),
                expose_errors,
            }),
        }
    }

    pub fn connector(&self) -> &dyn Connector {
        self.inner.connector.as_ref()
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.inner.breaker
    }

    pub fn expose_errors(&self) -> bool {
        self.inner.expose_errors
    }
}
