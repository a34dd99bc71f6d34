//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::UserRegistry;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registration use-cases backing the `/api/users` routes.
    pub users: Arc<dyn UserRegistry>,
}

impl HttpState {
    /// Construct state from the registry port.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use user_registry::domain::RegistrationService;
    /// use user_registry::domain::ports::InMemoryUserStore;
    /// use user_registry::inbound::http::state::HttpState;
    ///
    /// let store = Arc::new(InMemoryUserStore::new(Arc::new(DefaultClock)));
    /// let state = HttpState::new(Arc::new(RegistrationService::new(store)));
    /// # drop(state);
    /// ```
    pub fn new(users: Arc<dyn UserRegistry>) -> Self {
        Self { users }
    }
}
