use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::{AccessToken, UserId};

/// Token response from `/login` and `/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Token {
    pub access_token: AccessToken,
    pub token_type: String,
}

impl Token {
    #[must_use]
    pub fn new(access_token: impl Into<AccessToken>, token_type: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
        }
    }
}

/// Member record as returned by `/me` and `/newsletter`.
///
/// Read-only from the client's side; nothing here is mutated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Unconstrained on the backend; stored rows may hold any integer.
    pub age: i32,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub is_subscribed: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(with = "timestamp")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<OffsetDateTime>,
}

/// Registration payload for `POST /register`.
///
/// Required fields are constructor parameters; contact fields are set with
/// the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct UserCreate {
    pub name: String,
    pub age: u16,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default)]
    pub is_subscribed: bool,
}

impl UserCreate {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        age: u16,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            email: email.into(),
            password: password.into(),
            phone: None,
            street: None,
            city: None,
            state: None,
            zip: None,
            country: None,
            is_subscribed: false,
        }
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Set the postal address fields in one go.
    #[must_use]
    pub fn with_address(
        mut self,
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        self.street = Some(street.into());
        self.city = Some(city.into());
        self.state = Some(state.into());
        self.zip = Some(zip.into());
        self.country = Some(country.into());
        self
    }

    #[must_use]
    pub fn with_subscription(mut self, subscribed: bool) -> Self {
        self.is_subscribed = subscribed;
        self
    }
}

/// Login credentials. Never stored.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct UserLogin {
    pub email: String,
    pub password: String,
}

impl UserLogin {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for UserLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserLogin")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Backend timestamps: RFC 3339, or naive ISO 8601 which is read as UTC.
pub(crate) mod timestamp {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::format_description::well_known::{Iso8601, Rfc3339};
    use time::{OffsetDateTime, PrimitiveDateTime};

    pub(crate) fn parse(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
        OffsetDateTime::parse(raw, &Rfc3339).or_else(|_| {
            PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT).map(PrimitiveDateTime::assume_utc)
        })
    }

    pub(crate) fn serialize<S: Serializer>(
        value: &OffsetDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        time::serde::rfc3339::serialize(value, serializer)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<OffsetDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub(crate) mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use time::OffsetDateTime;

        pub(crate) fn serialize<S: Serializer>(
            value: &Option<OffsetDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            time::serde::rfc3339::option::serialize(value, serializer)
        }

        pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<OffsetDateTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::parse(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
