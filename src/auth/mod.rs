//! Authentication module for managing the console session.
//!
//! This module provides:
//! - `Session` and `SessionStore`: the persisted session record
//! - `SessionManager`: login/logout protocol, rehydration, and the two
//!   background sentinels (token expiry, permission drift)
//! - `CredentialStore`: remember-me storage via the OS keychain

pub mod credentials;
pub mod manager;
pub mod session;
pub mod token;

pub use credentials::CredentialStore;
pub use manager::{LoginError, SessionManager, SessionState};
pub use session::{Session, SessionStore, STORAGE_KEY};
