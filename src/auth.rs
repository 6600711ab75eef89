use crate::error::Error;
use crate::http::ApiClient;
use crate::models::{Token, User, UserCreate, UserLogin};
use crate::validation;

/// Typed façade over the auth endpoints.
///
/// Stateless: a successful `register`/`login` returns the [`Token`] but does
/// not store it. The caller writes it into the [`Session`](crate::Session)
/// and navigates onward.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Create an account via `POST /register`.
    ///
    /// Password length (6–72) and age (18–120) are checked locally first; a
    /// failing check never reaches the network.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for local rejections, or
    /// [`Error::Api`] if the backend refuses the registration.
    pub async fn register(&self, payload: &UserCreate) -> Result<Token, Error> {
        validation::validate_registration(payload)?;
        let token: Token = self.client.post("register", "/register", payload).await?;
        tracing::info!(email = %payload.email, "Registered");
        Ok(token)
    }

    /// Exchange credentials for a token via `POST /login`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a field is empty, or [`Error::Api`]
    /// on bad credentials or transport failure.
    pub async fn login(&self, credentials: &UserLogin) -> Result<Token, Error> {
        validation::validate_login(credentials)?;
        let token: Token = self.client.post("login", "/login", credentials).await?;
        tracing::info!(email = %credentials.email, "Logged in");
        Ok(token)
    }

    /// Fetch the user the current token belongs to via `GET /me`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`]; without a valid token this is a 401.
    pub async fn get_me(&self) -> Result<User, Error> {
        self.client.get("get_me", "/me").await
    }

    /// List newsletter subscribers via `GET /newsletter`.
    ///
    /// The backend restricts this to admins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`], typically 403 for non-admin tokens.
    pub async fn get_newsletter_subscribers(&self) -> Result<Vec<User>, Error> {
        self.client.get("get_newsletter_subscribers", "/newsletter").await
    }
}
