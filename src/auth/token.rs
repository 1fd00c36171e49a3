//! Optimistic decoding of the bearer token's payload.
//!
//! The console reads the token's expiry claim purely as a client-side hint to
//! log the user out before the server starts rejecting requests. Signatures
//! are NOT verified here - this is not a security check, expiry is enforced by
//! the server.

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde::Deserialize;

/// Claims the console cares about. Everything else in the payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Expiry, in seconds since the Unix epoch.
    pub exp: i64,
}

impl TokenClaims {
    /// True when the current time is at or past the expiry claim.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Decode the payload segment of `token` without verifying its signature.
pub fn peek_claims(token: &str) -> Result<TokenClaims> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| anyhow!("token has no payload segment"))?;
    // Some issuers pad their base64url; strip it before the no-pad decode.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .context("token payload is not valid base64")?;
    serde_json::from_slice(&bytes).context("token payload is not valid claims JSON")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_token(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload =
            URL_SAFE_NO_PAD.encode(serde_json::json!({ "sub": 7, "exp": exp }).to_string());
        format!("{header}.{payload}.signature")
    }

    #[test]
    fn test_peek_reads_expiry() {
        let exp = Utc::now().timestamp() + 3600;
        let claims = peek_claims(&make_token(exp)).unwrap();
        assert_eq!(claims.exp, exp);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_expired_token() {
        let claims = peek_claims(&make_token(Utc::now().timestamp() - 60)).unwrap();
        assert!(claims.is_expired());
    }

    #[test]
    fn test_padded_payload_is_accepted() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
        let mut payload = URL_SAFE_NO_PAD.encode(br#"{"exp":1}"#);
        payload.push('=');
        let token = format!("{header}.{payload}.sig");
        assert_eq!(peek_claims(&token).unwrap().exp, 1);
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        assert!(peek_claims("no-dots-at-all").is_err());
        assert!(peek_claims("a.!!!not-base64!!!.c").is_err());

        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
        let payload = URL_SAFE_NO_PAD.encode(b"not json");
        assert!(peek_claims(&format!("{header}.{payload}.sig")).is_err());
    }
}
