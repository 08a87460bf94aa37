use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("{provider}: {reason}")]
    Unavailable {
        provider: &'static str,
        reason: String,
    },

    #[error("no credential source produced a bearer token")]
    Exhausted,
}

impl CredentialError {
    fn unavailable(provider: &'static str, reason: impl Into<String>) -> Self {
        CredentialError::Unavailable {
            provider,
            reason: reason.into(),
        }
    }
}

/// One way of obtaining a bearer token for the engine audience.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn try_obtain(
        &self,
        audience: &str,
    ) -> Result<String, CredentialError>;
}

/// Signs a short-lived assertion with configured service-account key
/// material. Works in any deployment context that can carry a secret.
pub struct ServiceAccountCredential {
    key_json: String,
}

impl std::fmt::Debug for ServiceAccountCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredential")
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

const ASSERTION_LIFETIME_SECONDS: i64 = 3600;

impl ServiceAccountCredential {
    pub fn new(key_json: String) -> Self {
        Self { key_json }
    }
}

#[async_trait]
impl CredentialProvider for ServiceAccountCredential {
    fn name(&self) -> &'static str {
        "service_account"
    }

    async fn try_obtain(
        &self,
        audience: &str,
    ) -> Result<String, CredentialError> {
        let key: ServiceAccountKey = serde_json::from_str(&self.key_json)
            .map_err(|e| {
                CredentialError::unavailable(
                    self.name(),
                    format!("invalid key material: {e}"),
                )
            })?;

        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &key.client_email,
            sub: &key.client_email,
            aud: audience,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECONDS,
        };

        let encoding_key = EncodingKey::from_rsa_pem(
            key.private_key.as_bytes(),
        )
        .map_err(|e| {
            CredentialError::unavailable(
                self.name(),
                format!("unusable private key: {e}"),
            )
        })?;

        encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|e| {
                CredentialError::unavailable(
                    self.name(),
                    format!("signing failed: {e}"),
                )
            })
    }
}

/// Fetches an identity token from the platform metadata endpoint. Only
/// reachable when running on managed infrastructure, hence the short timeout.
#[derive(Debug)]
pub struct MetadataServerCredential {
    http: reqwest::Client,
    endpoint: String,
}

const METADATA_IDENTITY_URL: &str = "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/identity";
const METADATA_TIMEOUT: Duration = Duration::from_secs(2);

impl Default for MetadataServerCredential {
    fn default() -> Self {
        Self::new(METADATA_IDENTITY_URL.to_string())
    }
}

impl MetadataServerCredential {
    pub fn new(endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl CredentialProvider for MetadataServerCredential {
    fn name(&self) -> &'static str {
        "metadata_server"
    }

    async fn try_obtain(
        &self,
        audience: &str,
    ) -> Result<String, CredentialError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("audience", audience), ("format", "full")])
            .header("Metadata-Flavor", "Google")
            .timeout(METADATA_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                CredentialError::unavailable(self.name(), e.to_string())
            })?;

        if !response.status().is_success() {
            return Err(CredentialError::unavailable(
                self.name(),
                format!("metadata endpoint returned {}", response.status()),
            ));
        }

        let token = response.text().await.map_err(|e| {
            CredentialError::unavailable(self.name(), e.to_string())
        })?;

        let token = token.trim().to_string();
        if token.is_empty() {
            return Err(CredentialError::unavailable(
                self.name(),
                "metadata endpoint returned an empty token",
            ));
        }
        Ok(token)
    }
}

/// Shells out to the developer CLI. Last resort for local development where
/// neither key material nor a metadata endpoint exists.
#[derive(Debug, Default)]
pub struct CliCredential;

const CLI_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
impl CredentialProvider for CliCredential {
    fn name(&self) -> &'static str {
        "gcloud_cli"
    }

    async fn try_obtain(
        &self,
        _audience: &str,
    ) -> Result<String, CredentialError> {
        let mut command = tokio::process::Command::new("gcloud");
        command.args(["auth", "print-identity-token"]);

        let output = tokio::time::timeout(CLI_TIMEOUT, command.output())
            .await
            .map_err(|_| {
                CredentialError::unavailable(self.name(), "gcloud timed out")
            })?
            .map_err(|e| {
                CredentialError::unavailable(self.name(), e.to_string())
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CredentialError::unavailable(
                self.name(),
                format!("gcloud exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(CredentialError::unavailable(
                self.name(),
                "gcloud printed an empty token",
            ));
        }
        Ok(token)
    }
}

/// Ordered fallback over credential providers; the first success wins.
pub struct CredentialChain {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl std::fmt::Debug for CredentialChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialChain")
            .field("providers", &self.providers.len())
            .finish()
    }
}

impl CredentialChain {
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }

    /// The standard three-tier chain: explicit key material, then the
    /// platform metadata endpoint, then the developer CLI.
    pub fn standard(service_account_json: Option<String>) -> Self {
        let mut providers: Vec<Box<dyn CredentialProvider>> = Vec::new();
        if let Some(key_json) = service_account_json {
            providers.push(Box::new(ServiceAccountCredential::new(key_json)));
        }
        providers.push(Box::new(MetadataServerCredential::default()));
        providers.push(Box::new(CliCredential));
        Self::new(providers)
    }

    pub async fn bearer_token(
        &self,
        audience: &str,
    ) -> Result<String, CredentialError> {
        for provider in &self.providers {
            match provider.try_obtain(audience).await {
                Ok(token) => {
                    debug!(provider = provider.name(), "bearer token obtained");
                    return Ok(token);
                }
                Err(err) => {
                    debug!(
                        provider = provider.name(),
                        error = %err,
                        "credential source unavailable"
                    );
                }
            }
        }

        Err(CredentialError::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticProvider {
        name: &'static str,
        token: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl StaticProvider {
        fn success(name: &'static str, token: &'static str) -> Self {
            Self {
                name,
                token: Some(token),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(name: &'static str) -> Self {
            Self {
                name,
                token: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CredentialProvider for StaticProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn try_obtain(
            &self,
            _audience: &str,
        ) -> Result<String, CredentialError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.token {
                Some(token) => Ok(token.to_string()),
                None => Err(CredentialError::unavailable(self.name, "nope")),
            }
        }
    }

    #[tokio::test]
    async fn first_successful_provider_wins() {
        let chain = CredentialChain::new(vec![
            Box::new(StaticProvider::failing("first")),
            Box::new(StaticProvider::success("second", "token-2")),
            Box::new(StaticProvider::success("third", "token-3")),
        ]);

        let token = chain.bearer_token("https://engine.example").await.unwrap();
        assert_eq!(token, "token-2");
    }

    #[tokio::test]
    async fn exhausted_chain_reports_auth_unavailable() {
        let chain = CredentialChain::new(vec![
            Box::new(StaticProvider::failing("first")),
            Box::new(StaticProvider::failing("second")),
        ]);

        let err = chain
            .bearer_token("https://engine.example")
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::Exhausted));
    }

    #[tokio::test]
    async fn empty_chain_is_exhausted() {
        let chain = CredentialChain::new(Vec::new());
        let err = chain.bearer_token("aud").await.unwrap_err();
        assert!(matches!(err, CredentialError::Exhausted));
    }

    #[tokio::test]
    async fn service_account_rejects_malformed_key_material() {
        let provider =
            ServiceAccountCredential::new("not json".to_string());
        let err = provider.try_obtain("aud").await.unwrap_err();
        assert!(matches!(err, CredentialError::Unavailable { .. }));
    }
}
