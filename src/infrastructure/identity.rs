use crate::domain::Account;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing or invalid authorization token")]
    MissingToken,
    #[error("Session rejected by identity provider")]
    InvalidToken,
    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Identity established by the identity provider for a bearer token.
/// This is the only source of account identity; ids supplied in request
/// bodies are never consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedSession {
    pub subject: String,
    pub email: String,
}

#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedSession, AuthError>;
}

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
    email: Option<String>,
}

/// Verifies bearer tokens against the identity provider's session endpoint.
pub struct HttpSessionVerifier {
    client: Client,
    base_url: String,
}

impl HttpSessionVerifier {
    pub fn new(base_url: String) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .connect_timeout(Duration::from_secs(3))
            .build()
            .map_err(|e| {
                AuthError::InvalidConfig(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl SessionVerifier for HttpSessionVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedSession, AuthError> {
        let resp = self
            .client
            .get(format!("{}/v1/sessions/me", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        let status = resp.status();
        if status.as_u16() == 401 || status.as_u16() == 404 {
            return Err(AuthError::InvalidToken);
        }
        if !status.is_success() {
            error!(status = %status, "Session verification failed");
            return Err(AuthError::ProviderUnavailable(format!("status {}", status)));
        }

        let claims: SessionClaims = resp
            .json()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        let email = claims
            .email
            .unwrap_or_else(|| Account::placeholder_email(&claims.sub));

        Ok(VerifiedSession {
            subject: claims.sub,
            email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_without_email_get_placeholder() {
        let claims: SessionClaims =
            serde_json::from_str(r#"{"sub": "user_42"}"#).unwrap();
        let email = claims
            .email
            .unwrap_or_else(|| Account::placeholder_email(&claims.sub));
        assert_eq!(email, "user_42@placeholder.email");
    }
}
