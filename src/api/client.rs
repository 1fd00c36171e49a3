//! Reqwest-backed implementation of the auth endpoints.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::models::UserProfile;

use super::{ApiError, AuthApi};

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserProfile,
}

/// API client for the Vocero backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client against `base_url`.
    ///
    /// The bearer token is passed per call rather than held here: the session
    /// manager owns the token's lifecycle and a stale copy inside the client
    /// would outlive a logout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint("/auth/login");
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("login response: {e}")))
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        let url = self.endpoint("/auth/logout");
        let response = self.client.post(&url).bearer_auth(token).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn force_logout(&self, token: &str, user_id: i64) -> Result<(), ApiError> {
        let url = self.endpoint("/auth/force/logout");
        let body = serde_json::json!({ "userId": user_id });

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn fetch_profile(&self, token: &str) -> Result<UserProfile, ApiError> {
        let url = self.endpoint("/auth/me");
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("profile response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_normalizes_trailing_slash() {
        let api = ApiClient::new("https://api.vocero.example/").unwrap();
        assert_eq!(
            api.endpoint("/auth/login"),
            "https://api.vocero.example/auth/login"
        );
    }

    #[test]
    fn test_parse_login_response() {
        let json = r#"{
            "access_token": "T",
            "user": {
                "id": 1,
                "firstName": "Ana",
                "lastName": "Lopez",
                "email": "ana@vocero.example",
                "role": "ADMIN",
                "canAccessIvrs": true,
                "canAccessWhatsapp": false
            }
        }"#;

        let parsed: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.access_token, "T");
        assert_eq!(parsed.user.first_name, "Ana");
    }
}
