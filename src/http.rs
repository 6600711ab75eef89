use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Failure};
use crate::session::Session;

/// HTTP transport for the membership API.
///
/// Every request reads the session's token and, if one is present, sends it
/// as `Authorization: Bearer <token>`. Any 401 response wipes the token and
/// redirects to the login view before the error is returned; callers still
/// receive the error.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ClientConfig,
    http: reqwest::Client,
    session: Session,
}

impl ApiClient {
    /// Build a client with the configured base URL and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            config: config.clone(),
            http,
            session,
        })
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    ///
    /// The configured timeout is not applied to a client supplied here.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `GET` `path` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] for transport failures, non-2xx statuses and
    /// undecodable bodies.
    pub async fn get<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
    ) -> Result<T, Error> {
        let url = self.config.endpoint(path)?;
        self.send(operation, self.http.get(url)).await
    }

    /// `POST` a JSON body to `path` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn post<B, T>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
    ) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path)?;
        self.send(operation, self.http.post(url).json(body)).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, Error> {
        let request = match self.session.token() {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        };

        tracing::debug!(operation, "Sending request");

        let response = request
            .send()
            .await
            .map_err(|e| Self::failed(operation, Failure::from_transport(e)))?;

        let response = self.ensure_success(response, operation).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| Self::failed(operation, Failure::from_transport(e)))
    }

    /// Checks HTTP response status; returns the response on success or an error with details.
    async fn ensure_success(
        &self,
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!(operation, "Unauthorized response, clearing session");
            self.session.handle_unauthorized();
        }

        // A body that stalls past the timeout is a timeout, not a status error.
        let body = response
            .text()
            .await
            .map_err(|e| Self::failed(operation, Failure::from_transport(e)))?;
        Err(Self::failed(
            operation,
            Failure::from_status(status.as_u16(), body),
        ))
    }

    fn failed(operation: &'static str, failure: Failure) -> Error {
        let err = ApiError::new(operation, failure);
        tracing::warn!(
            operation,
            status = ?err.status(),
            user_message = err.user_message(),
            error = %err,
            "Request failed"
        );
        Error::Api(err)
    }
}
