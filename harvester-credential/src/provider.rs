//! The credential-provider boundary. The concrete model-invocation
//! credential endpoint (e.g. a Bedrock-style signed token service) is
//! injected by the caller; this crate only owns the refresh lifecycle.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CredentialError;

/// A fetched credential plus when it expires, so the refresher can compute
/// its own next-refresh delay from a live response instead of a fixed
/// configured lifetime.
#[derive(Debug, Clone)]
pub struct Credential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    #[must_use]
    pub fn lifetime_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn fetch(&self) -> Result<Credential, CredentialError>;
}

/// A provider backed by an HTTP token endpoint returning
/// `{"token": "...", "expires_in_secs": N}`.
pub struct HttpCredentialProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCredentialProvider {
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    token: String,
    expires_in_secs: i64,
}

#[async_trait]
impl CredentialProvider for HttpCredentialProvider {
    async fn fetch(&self) -> Result<Credential, CredentialError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| CredentialError::Provider(e.to_string()))?
            .error_for_status()
            .map_err(|e| CredentialError::Provider(e.to_string()))?
            .json::<TokenResponse>()
            .await
            .map_err(|e| CredentialError::Provider(e.to_string()))?;

        Ok(Credential {
            token: response.token,
            expires_at: Utc::now() + chrono::Duration::seconds(response.expires_in_secs),
        })
    }
}
