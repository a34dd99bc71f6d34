//! Registration form state machine.
//!
//! Input events are applied through [`RegistrationForm::dispatch`]. A submit
//! runs in two halves, [`RegistrationForm::begin_submit`] and
//! [`RegistrationForm::complete_submit`], so an event loop can keep the form
//! responsive while the request is in flight. The success panel only ever
//! shows what the server returned.

use std::sync::Arc;

use chrono::SecondsFormat;
use tracing::{debug, info};

use super::client::{RegistrationApi, RegistrationApiError};
use crate::domain::{RegistrationRequest, User};

/// User-driven form events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// Username input changed.
    UsernameChanged(String),
    /// Email input changed.
    EmailChanged(String),
    /// Age input changed; kept as typed.
    AgeChanged(String),
    /// Submit button pressed.
    Submit,
}

/// The four stored fields plus the id, as text shown in the success panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedUser {
    /// Store-assigned id.
    pub id: String,
    /// Stored username.
    pub username: String,
    /// Stored email.
    pub email: String,
    /// Stored age.
    pub age: String,
    /// Store-assigned creation timestamp, RFC 3339 in UTC.
    pub created_at: String,
}

impl From<&User> for RenderedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_owned(),
            email: user.email().to_owned(),
            age: user.age().to_string(),
            created_at: user
                .created_at()
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

/// Snapshot of what the form currently displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    /// Whether the submit control accepts a click.
    pub submit_enabled: bool,
    /// Success panel contents, if the last submit stored a user.
    pub success: Option<RenderedUser>,
    /// Error panel contents, if the last submit failed.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Registered(RenderedUser),
    Failed(String),
}

/// Controller behind the three-field registration form.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use user_registry::ui::{FormEvent, HttpRegistrationApi, RegistrationForm};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let base = reqwest::Url::parse("http://127.0.0.1:3000/")?;
/// let api = HttpRegistrationApi::new(&base, Duration::from_secs(5))?;
/// let mut form = RegistrationForm::new(Arc::new(api));
/// form.dispatch(FormEvent::UsernameChanged("ada".into())).await;
/// form.dispatch(FormEvent::EmailChanged("ada@example.com".into())).await;
/// form.dispatch(FormEvent::AgeChanged("36".into())).await;
/// form.dispatch(FormEvent::Submit).await;
/// println!("{:?}", form.view());
/// # Ok(())
/// # }
/// ```
pub struct RegistrationForm {
    api: Arc<dyn RegistrationApi>,
    username: String,
    email: String,
    age: String,
    in_flight: bool,
    outcome: Option<Outcome>,
}

impl RegistrationForm {
    /// Create an empty form that submits through `api`.
    pub fn new(api: Arc<dyn RegistrationApi>) -> Self {
        Self {
            api,
            username: String::new(),
            email: String::new(),
            age: String::new(),
            in_flight: false,
            outcome: None,
        }
    }

    /// Apply one event. `Submit` performs the full round trip.
    pub async fn dispatch(&mut self, event: FormEvent) {
        match event {
            FormEvent::UsernameChanged(value) => self.username = value,
            FormEvent::EmailChanged(value) => self.email = value,
            FormEvent::AgeChanged(value) => self.age = value,
            FormEvent::Submit => {
                let Some(request) = self.begin_submit() else {
                    return;
                };
                let result = self.api.create_user(&request).await;
                self.complete_submit(result);
            }
        }
    }

    /// Disable submission and build the request from the current inputs.
    ///
    /// Returns `None` while a previous submit is still in flight. Blank or
    /// non-numeric age text is sent as absent; whole numbers too large for
    /// `i64` saturate so the server reports them as out of range.
    pub fn begin_submit(&mut self) -> Option<RegistrationRequest> {
        if self.in_flight {
            debug!("submit ignored while a registration is in flight");
            return None;
        }
        self.in_flight = true;
        self.outcome = None;
        Some(RegistrationRequest {
            username: Some(self.username.clone()),
            email: Some(self.email.clone()),
            age: age_from_text(&self.age),
        })
    }

    /// Re-enable submission and render the server's answer.
    pub fn complete_submit(&mut self, result: Result<User, RegistrationApiError>) {
        self.in_flight = false;
        self.outcome = Some(match result {
            Ok(user) => {
                info!(user_id = %user.id(), "registration rendered");
                Outcome::Registered(RenderedUser::from(&user))
            }
            Err(error) => {
                info!(%error, "registration failed");
                Outcome::Failed(error.to_string())
            }
        });
    }

    /// Whether a submit is waiting on the server.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Current rendered state.
    pub fn view(&self) -> FormView {
        let (success, error) = match &self.outcome {
            Some(Outcome::Registered(user)) => (Some(user.clone()), None),
            Some(Outcome::Failed(message)) => (None, Some(message.clone())),
            None => (None, None),
        };
        FormView {
            submit_enabled: !self.in_flight,
            success,
            error,
        }
    }
}

/// Interpret typed age text as a whole number of years.
fn age_from_text(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let saturated = if negative { i64::MIN } else { i64::MAX };
    Some(
        digits
            .parse::<i64>()
            .map_or(saturated, |value| if negative { -value } else { value }),
    )
}
