//! Display text for failed requests.
//!
//! Structured [`ErrorCode`]s from the backend are preferred. Bodies that only
//! carry a free-text `detail` go through [`ErrorCode::from_detail`], a
//! substring table kept for the legacy untyped error format; anything it does
//! not recognise is shown verbatim.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub const UNREACHABLE_MESSAGE: &str =
    "Unable to reach the server. Please check your connection and try again.";
pub const TIMEOUT_MESSAGE: &str = concat!(
    "The server is taking too long to respond. ",
    "It may be waking up, so please try again in a moment."
);
pub const SERVER_ERROR_MESSAGE: &str = "The server ran into a problem. Please try again later.";
pub const NOT_FOUND_MESSAGE: &str = "The requested resource could not be found.";
pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to do that.";

/// Machine-readable failure reasons the backend may attach as `code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorCode {
    EmailAlreadyRegistered,
    InvalidCredentials,
    PasswordTooShort,
    PasswordTooLong,
    InvalidEmail,
    AgeOutOfRange,
    MissingField,
    #[serde(other)]
    Unknown,
}

// Order matters: the first matching row wins.
const DETAIL_PATTERNS: &[(&[&str], ErrorCode)] = &[
    (
        &["email already registered", "email already exists"],
        ErrorCode::EmailAlreadyRegistered,
    ),
    (
        &["incorrect email or password", "invalid credentials"],
        ErrorCode::InvalidCredentials,
    ),
    (
        &["at least 6 characters", "password too short", "password is too short"],
        ErrorCode::PasswordTooShort,
    ),
    (
        &["longer than 72", "at most 72 characters", "password too long"],
        ErrorCode::PasswordTooLong,
    ),
    (&["valid email", "invalid email"], ErrorCode::InvalidEmail),
    (
        &["age must be between", "greater than or equal to 18", "less than or equal to 120"],
        ErrorCode::AgeOutOfRange,
    ),
    (
        &["field required", "missing required", "is required"],
        ErrorCode::MissingField,
    ),
];

impl ErrorCode {
    /// Recognise a known failure from free-text backend detail.
    #[must_use]
    pub fn from_detail(detail: &str) -> Option<Self> {
        let lowered = detail.to_lowercase();
        DETAIL_PATTERNS
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| lowered.contains(n)))
            .map(|(_, code)| *code)
    }

    /// Friendly text for this code, `None` for [`ErrorCode::Unknown`].
    #[must_use]
    pub fn user_message(self) -> Option<&'static str> {
        let msg = match self {
            Self::EmailAlreadyRegistered => {
                "An account with this email already exists. Try logging in instead."
            }
            Self::InvalidCredentials => "The email or password you entered is incorrect.",
            Self::PasswordTooShort => "Password must be at least 6 characters long.",
            Self::PasswordTooLong => "Password cannot be longer than 72 characters.",
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::AgeOutOfRange => "Age must be between 18 and 120 years.",
            Self::MissingField => "Please fill in all required fields.",
            Self::Unknown => return None,
        };
        Some(msg)
    }
}

/// Map a raw backend detail to display text. Unknown details pass through.
#[must_use]
pub fn user_message_for_detail(detail: &str) -> String {
    ErrorCode::from_detail(detail)
        .and_then(ErrorCode::user_message)
        .map_or_else(|| detail.to_owned(), str::to_owned)
}

/// Structured part of an error body, if the backend sent one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: Option<ErrorCode>,
    pub detail: Option<String>,
}

impl ErrorBody {
    /// Parse `{"detail": "..."}`, FastAPI's `{"detail": [{"loc": [..], "msg": ".."}]}`,
    /// and an optional `code`. Non-JSON bodies yield `None`.
    #[must_use]
    pub fn parse(body: &str) -> Option<Self> {
        let json: JsonValue = serde_json::from_str(body).ok()?;
        let code = json
            .get("code")
            .and_then(|c| serde_json::from_value::<ErrorCode>(c.clone()).ok());
        let detail = json.get("detail").and_then(detail_text);
        if code.is_none() && detail.is_none() {
            return None;
        }
        Some(Self { code, detail })
    }

    /// Known code first, then the detail table, then the raw detail.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        if let Some(msg) = self.code.and_then(ErrorCode::user_message) {
            return Some(msg.to_owned());
        }
        self.detail.as_deref().map(user_message_for_detail)
    }
}

fn detail_text(detail: &JsonValue) -> Option<String> {
    match detail {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.clone()),
        JsonValue::Array(items) => items.first().and_then(validation_item_text),
        _ => None,
    }
}

fn validation_item_text(item: &JsonValue) -> Option<String> {
    let msg = item.get("msg").and_then(JsonValue::as_str)?;
    let field = item
        .get("loc")
        .and_then(JsonValue::as_array)
        .and_then(|loc| loc.last())
        .and_then(JsonValue::as_str);
    Some(match field {
        Some(field) if msg.eq_ignore_ascii_case("field required") => {
            format!("Field required: {field}")
        }
        _ => msg.to_owned(),
    })
}

/// Message for a failed status when the body carried no structured detail.
#[must_use]
pub fn user_message_for_status(status: u16, raw: &str) -> String {
    match status {
        500 => SERVER_ERROR_MESSAGE.to_owned(),
        404 => NOT_FOUND_MESSAGE.to_owned(),
        403 => FORBIDDEN_MESSAGE.to_owned(),
        _ => generic_message(raw),
    }
}

/// Fallback when nothing more specific applies.
#[must_use]
pub fn generic_message(raw: &str) -> String {
    format!("Something went wrong: {raw}")
}
