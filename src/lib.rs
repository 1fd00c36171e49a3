//! Core library for the Vocero campaign console.
//!
//! This crate owns the authenticated session lifecycle of the console:
//! login/logout, durable session storage, token expiry detection, and
//! permission-drift reconciliation against the server. The UI layer consumes
//! the [`SessionManager`]'s published state through [`SessionManager::subscribe`]
//! and never mutates the session directly.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod shell;

pub use api::{ApiClient, ApiError, AuthApi, LoginResponse};
pub use auth::{
    CredentialStore, LoginError, Session, SessionManager, SessionState, SessionStore,
};
pub use config::Config;
pub use models::{Role, UserProfile};
pub use shell::{NavTarget, Navigator, Notifier, NoticeLevel};
