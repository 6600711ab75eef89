//! Flow logic behind the pages. Rendering lives elsewhere; these types own
//! the loading/error state a page binds to and the navigation that follows
//! a successful submit.

use std::sync::{Mutex, PoisonError};

use crate::auth::AuthApi;
use crate::error::Error;
use crate::guard::Route;
use crate::models::{Token, User, UserCreate, UserLogin};
use crate::session::Session;
use crate::validation::ValidationError;

/// State a form binds its spinner, error banner and submit button to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormStatus {
    pub loading: bool,
    pub error: Option<String>,
    pub submitted: bool,
}

/// What happened to a submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Succeeded,
    Failed,
    /// A request from this form was already in flight.
    Ignored,
}

#[derive(Debug, Default)]
struct Tracker(Mutex<FormStatus>);

impl Tracker {
    fn snapshot(&self) -> FormStatus {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Mark in flight. `false` if already in flight (submit button disabled).
    fn begin(&self) -> bool {
        let mut status = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if status.loading {
            return false;
        }
        status.loading = true;
        status.error = None;
        true
    }

    fn succeed(&self) -> SubmitOutcome {
        let mut status = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        status.loading = false;
        status.submitted = true;
        SubmitOutcome::Succeeded
    }

    fn fail(&self, err: &Error) -> SubmitOutcome {
        let mut status = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        status.loading = false;
        status.error = Some(err.user_message());
        SubmitOutcome::Failed
    }

    fn reset(&self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = FormStatus::default();
    }
}

fn sign_in(session: &Session, token: Token) -> Result<(), Error> {
    session.store_token(token.access_token)?;
    session.navigate(Route::Home.path());
    Ok(())
}

/// Login page.
#[derive(Debug)]
pub struct LoginView {
    api: AuthApi,
    status: Tracker,
}

impl LoginView {
    #[must_use]
    pub fn new(api: AuthApi) -> Self {
        Self {
            api,
            status: Tracker::default(),
        }
    }

    #[must_use]
    pub fn status(&self) -> FormStatus {
        self.status.snapshot()
    }

    /// On success the token is stored and the user lands on `/home`.
    pub async fn submit(&self, credentials: UserLogin) -> SubmitOutcome {
        if !self.status.begin() {
            return SubmitOutcome::Ignored;
        }
        let session = self.api.client().session();
        let result = match self.api.login(&credentials).await {
            Ok(token) => sign_in(session, token),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => self.status.succeed(),
            Err(e) => self.status.fail(&e),
        }
    }
}

/// Registration page.
#[derive(Debug)]
pub struct RegisterView {
    api: AuthApi,
    status: Tracker,
}

impl RegisterView {
    #[must_use]
    pub fn new(api: AuthApi) -> Self {
        Self {
            api,
            status: Tracker::default(),
        }
    }

    #[must_use]
    pub fn status(&self) -> FormStatus {
        self.status.snapshot()
    }

    /// Local validation failures show inline without a request.
    pub async fn submit(&self, payload: UserCreate) -> SubmitOutcome {
        if !self.status.begin() {
            return SubmitOutcome::Ignored;
        }
        let session = self.api.client().session();
        let result = match self.api.register(&payload).await {
            Ok(token) => sign_in(session, token),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => self.status.succeed(),
            Err(e) => self.status.fail(&e),
        }
    }
}

/// Home page: loads the signed-in member's profile.
#[derive(Debug)]
pub struct HomeView {
    api: AuthApi,
    user: Mutex<Option<User>>,
    status: Tracker,
}

impl HomeView {
    #[must_use]
    pub fn new(api: AuthApi) -> Self {
        Self {
            api,
            user: Mutex::new(None),
            status: Tracker::default(),
        }
    }

    #[must_use]
    pub fn status(&self) -> FormStatus {
        self.status.snapshot()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn load(&self) -> SubmitOutcome {
        if !self.status.begin() {
            return SubmitOutcome::Ignored;
        }
        match self.api.get_me().await {
            Ok(user) => {
                *self.user.lock().unwrap_or_else(PoisonError::into_inner) = Some(user);
                self.status.succeed()
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load user data");
                self.status.fail(&e)
            }
        }
    }
}

/// Contact form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }
}

/// Contact page. Delivery is stubbed: a complete message is accepted
/// locally and nothing is sent.
#[derive(Debug, Default)]
pub struct ContactView {
    draft: Mutex<ContactMessage>,
    status: Tracker,
}

impl ContactView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> FormStatus {
        self.status.snapshot()
    }

    #[must_use]
    pub fn draft(&self) -> ContactMessage {
        self.draft
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn edit(&self, message: ContactMessage) {
        *self.draft.lock().unwrap_or_else(PoisonError::into_inner) = message;
    }

    /// Accept the current draft and clear the form.
    pub fn submit(&self) -> SubmitOutcome {
        if !self.status.begin() {
            return SubmitOutcome::Ignored;
        }
        let draft = self.draft();
        let missing = [
            ("name", &draft.name),
            ("email", &draft.email),
            ("message", &draft.message),
        ]
        .into_iter()
        .find(|(_, v)| v.trim().is_empty());
        if let Some((field, _)) = missing {
            return self.status.fail(&ValidationError::MissingField(field).into());
        }

        tracing::info!(from = %draft.email, "Contact message accepted");
        self.edit(ContactMessage::default());
        self.status.succeed()
    }

    /// "Send another message".
    pub fn reset(&self) {
        self.status.reset();
    }
}
