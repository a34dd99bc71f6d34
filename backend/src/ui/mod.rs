//! Registration form controller and the client it submits through.
//!
//! ```text
//! FormEvent -> RegistrationForm::dispatch -> RegistrationApi::create_user
//!                                         -> FormView (rendered response)
//! ```

mod client;
mod form;

#[cfg(test)]
pub use client::MockRegistrationApi;
pub use client::{HttpRegistrationApi, RegistrationApi, RegistrationApiError};
pub use form::{FormEvent, FormView, RegistrationForm, RenderedUser};
