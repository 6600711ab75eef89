use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Numeric user identifier assigned by the backend.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    From,
    Into,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// Opaque bearer credential issued by `/login` or `/register`.
///
/// The client never inspects the contents. `Debug` is redacted so the token
/// cannot leak through `tracing` fields or panic messages.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tokens made only of whitespace are treated as absent.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

impl From<&str> for AccessToken {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
