use crate::messages::{self, ErrorBody, ErrorCode};
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Rejected locally before any request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request was sent and failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Token store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Text suitable for showing next to the form or page that failed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Api(e) => e.user_message().to_owned(),
            Self::Config(_) | Self::Store(_) => messages::generic_message(&self.to_string()),
        }
    }

    /// `true` if the backend answered 401.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_unauthorized())
    }
}

/// What went wrong on the wire, before any rewording.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Failure {
    /// Non-2xx response.
    #[error("HTTP {status}: {body}")]
    Status {
        status: u16,
        body: String,
        structured: Option<ErrorBody>,
    },

    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("server unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// 2xx response whose body did not match the expected shape.
    #[error("invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl Failure {
    /// Classify a `reqwest` error by symptom.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else if err.is_connect() {
            Self::Unreachable(err)
        } else if err.is_decode() {
            Self::Decode(err)
        } else {
            Self::Transport(err)
        }
    }

    pub(crate) fn from_status(status: u16, body: String) -> Self {
        let structured = ErrorBody::parse(&body);
        Self::Status {
            status,
            body,
            structured,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Status {
                status, structured, ..
            } => structured
                .as_ref()
                .and_then(ErrorBody::user_message)
                .unwrap_or_else(|| {
                    messages::user_message_for_status(
                        *status,
                        &format!("Request failed with status code {status}"),
                    )
                }),
            Self::Timeout(_) => messages::TIMEOUT_MESSAGE.to_owned(),
            Self::Unreachable(_) => messages::UNREACHABLE_MESSAGE.to_owned(),
            Self::Transport(e) | Self::Decode(e) => messages::generic_message(&e.to_string()),
        }
    }
}

/// A failed request: the raw [`Failure`] plus its display text.
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed: {failure}")]
pub struct ApiError {
    operation: &'static str,
    #[source]
    failure: Failure,
    user_message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(operation: &'static str, failure: Failure) -> Self {
        let user_message = failure.user_message();
        Self {
            operation,
            failure,
            user_message,
        }
    }

    #[must_use]
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    #[must_use]
    pub fn failure(&self) -> &Failure {
        &self.failure
    }

    #[must_use]
    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match &self.failure {
            Failure::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw backend detail, if the body carried one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match &self.failure {
            Failure::Status {
                structured: Some(body),
                ..
            } => body.detail.as_deref(),
            _ => None,
        }
    }

    /// Known failure reason: the structured code if sent, else the detail table.
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        let Failure::Status {
            structured: Some(body),
            ..
        } = &self.failure
        else {
            return None;
        };
        body.code
            .filter(|c| *c != ErrorCode::Unknown)
            .or_else(|| body.detail.as_deref().and_then(ErrorCode::from_detail))
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.failure, Failure::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_with_detail_uses_mapped_message() {
        let err = ApiError::new(
            "register",
            Failure::from_status(400, r#"{"detail":"Email already registered"}"#.into()),
        );
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.detail(), Some("Email already registered"));
        assert_eq!(err.code(), Some(ErrorCode::EmailAlreadyRegistered));
        assert_eq!(
            err.user_message(),
            "An account with this email already exists. Try logging in instead."
        );
        assert!(err.to_string().contains("Email already registered"));
    }

    #[test]
    fn status_without_detail_is_classified() {
        let err = ApiError::new("get_me", Failure::from_status(500, "oops".into()));
        assert_eq!(err.user_message(), messages::SERVER_ERROR_MESSAGE);
        assert!(err.detail().is_none());

        let err = ApiError::new("get_me", Failure::from_status(502, String::new()));
        assert_eq!(
            err.user_message(),
            "Something went wrong: Request failed with status code 502"
        );
    }

    #[test]
    fn detail_takes_precedence_over_status_class() {
        let err = ApiError::new(
            "get_newsletter_subscribers",
            Failure::from_status(403, r#"{"detail":"Not enough permissions"}"#.into()),
        );
        assert_eq!(err.user_message(), "Not enough permissions");
    }

    #[test]
    fn validation_error_message_is_inline_text() {
        let err = Error::from(ValidationError::PasswordTooShort);
        assert_eq!(err.user_message(), "Password must be at least 6 characters long.");
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn unauthorized_detection() {
        let err = Error::from(ApiError::new(
            "get_me",
            Failure::from_status(401, r#"{"detail":"Could not validate credentials"}"#.into()),
        ));
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "Could not validate credentials");
    }
}
