#![doc = include_str!("../README.md")]

pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod messages;
pub mod models;
pub mod session;
pub mod types;
pub mod validation;
pub mod views;

// Re-exports for convenient access
pub use auth::AuthApi;
pub use config::ClientConfig;
pub use error::{ApiError, Error, Failure};
pub use guard::{GuardDecision, Route, RouteGuard, guard};
pub use http::ApiClient;
pub use messages::{ErrorCode, user_message_for_detail};
pub use models::{Token, User, UserCreate, UserLogin};
pub use session::{
    FileTokenStore, MemoryTokenStore, Navigator, Session, TOKEN_STORAGE_KEY, TokenStore,
    token_store_for,
};
pub use types::{AccessToken, UserId};
pub use validation::{ValidationError, validate_age, validate_password, validate_registration};
pub use views::{
    ContactMessage, ContactView, FormStatus, HomeView, LoginView, RegisterView, SubmitOutcome,
};
