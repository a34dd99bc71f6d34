//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod user_registry;
mod user_store;

#[cfg(test)]
pub use user_registry::MockUserRegistry;
pub use user_registry::UserRegistry;
#[cfg(test)]
pub use user_store::MockUserStore;
pub use user_store::{InMemoryUserStore, UserStore, UserStoreError};
