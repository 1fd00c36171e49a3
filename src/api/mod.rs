//! HTTP client for the Vocero backend.
//!
//! [`ApiClient`] speaks to the four auth endpoints the session layer needs.
//! The [`AuthApi`] trait is the seam between the session manager and the
//! transport: the console injects an `ApiClient`, tests inject a fake.

pub mod client;
pub mod error;

pub use client::{ApiClient, LoginResponse};
pub use error::ApiError;

use async_trait::async_trait;

use crate::models::UserProfile;

/// Auth endpoints consumed by the session manager.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// `POST /auth/logout` (bearer)
    async fn logout(&self, token: &str) -> Result<(), ApiError>;

    /// `POST /auth/force/logout`, notifying the server that the client
    /// detected an invalid session for `user_id`.
    async fn force_logout(&self, token: &str, user_id: i64) -> Result<(), ApiError>;

    /// `GET /auth/me` (bearer)
    async fn fetch_profile(&self, token: &str) -> Result<UserProfile, ApiError>;
}
