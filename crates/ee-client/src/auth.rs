//! OAuth2 access tokens for Earth Engine.
//!
//! Three credential sources are supported, in order of preference:
//! - a service account key file, exchanged for a token with a signed JWT
//! - a static token from `EE_ACCESS_TOKEN`
//! - the GCE metadata server
//!
//! Failures while loading credentials are logged and deferred so the
//! service still starts; every remote call then fails with
//! [`GatewayError::Auth`].

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{GatewayError, GatewayResult};

pub const EARTH_ENGINE_SCOPE: &str =
    "https://www.googleapis.com/auth/earthengine https://www.googleapis.com/auth/cloud-platform";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const ACCESS_TOKEN_ENV: &str = "EE_ACCESS_TOKEN";

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const JWT_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Fields of a service account key file that are needed for signing.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> GatewayResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GatewayError::Auth(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| GatewayError::Auth(format!("Invalid key file {}: {}", path.display(), e)))
    }
}

#[derive(Debug, Clone)]
pub enum Credentials {
    ServiceAccount(ServiceAccountKey),
    StaticToken(String),
    Metadata,
    /// Loading failed; the reason is reported on first use.
    Unavailable(String),
}

impl Credentials {
    /// Resolve credentials from configuration and the environment.
    ///
    /// A service account email without a key file, or a key file that
    /// cannot be read, yields [`Credentials::Unavailable`].
    pub fn resolve(service_account: Option<&str>, private_key: Option<&Path>) -> Self {
        match (service_account, private_key) {
            (Some(email), Some(path)) => match ServiceAccountKey::from_file(path) {
                Ok(key) => {
                    if key.client_email != email {
                        warn!(
                            configured = %email,
                            key_file = %key.client_email,
                            "Service account email does not match key file, using key file"
                        );
                    }
                    info!(account = %key.client_email, "Using service account credentials");
                    Credentials::ServiceAccount(key)
                }
                Err(e) => {
                    warn!(error = %e, "Unable to load service account credentials");
                    Credentials::Unavailable(e.to_string())
                }
            },
            (Some(email), None) => {
                warn!(account = %email, "Service account configured without a private key file");
                Credentials::Unavailable(format!("no private key file for {}", email))
            }
            _ => match std::env::var(ACCESS_TOKEN_ENV) {
                Ok(token) if !token.trim().is_empty() => {
                    info!("Using access token from {}", ACCESS_TOKEN_ENV);
                    Credentials::StaticToken(token.trim().to_string())
                }
                _ => {
                    info!("Using metadata server credentials");
                    Credentials::Metadata
                }
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Hands out access tokens, refreshing them shortly before expiry.
pub struct TokenSource {
    credentials: Credentials,
    http: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(credentials: Credentials, http: Client) -> Self {
        Self {
            credentials,
            http,
            cached: Mutex::new(None),
        }
    }

    /// A valid access token.
    pub async fn token(&self) -> GatewayResult<String> {
        match &self.credentials {
            Credentials::StaticToken(token) => return Ok(token.clone()),
            Credentials::Unavailable(reason) => return Err(GatewayError::Auth(reason.clone())),
            _ => {}
        }

        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - chrono::Duration::seconds(REFRESH_MARGIN_SECS) > now {
                return Ok(token.token.clone());
            }
        }

        let response = match &self.credentials {
            Credentials::ServiceAccount(key) => self.exchange_jwt(key, now).await?,
            _ => self.fetch_metadata_token().await?,
        };
        let expires_at = now + chrono::Duration::seconds(response.expires_in.unwrap_or(JWT_LIFETIME_SECS));
        debug!(%expires_at, "Obtained Earth Engine access token");

        *cached = Some(CachedToken {
            token: response.access_token.clone(),
            expires_at,
        });
        Ok(response.access_token)
    }

    async fn exchange_jwt(
        &self,
        key: &ServiceAccountKey,
        now: DateTime<Utc>,
    ) -> GatewayResult<TokenResponse> {
        let assertion = sign_assertion(key, now)?;
        let response = self
            .http
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(auth_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Auth(format!(
                "token exchange failed with {}: {}",
                status, body
            )));
        }
        response
            .json()
            .await
            .map_err(|e| GatewayError::Auth(format!("invalid token response: {}", e)))
    }

    async fn fetch_metadata_token(&self) -> GatewayResult<TokenResponse> {
        let response = self
            .http
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(auth_transport)?;

        if !response.status().is_success() {
            return Err(GatewayError::Auth(format!(
                "metadata server returned {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| GatewayError::Auth(format!("invalid metadata token: {}", e)))
    }
}

fn auth_transport(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Auth(format!("token request failed: {}", e))
    }
}

/// Sign the RS256 JWT assertion for a service account token exchange.
pub fn sign_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> GatewayResult<String> {
    let claims = Claims {
        iss: &key.client_email,
        scope: EARTH_ENGINE_SCOPE,
        aud: &key.token_uri,
        iat: now.timestamp(),
        exp: now.timestamp() + JWT_LIFETIME_SECS,
    };
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| GatewayError::Auth(format!("invalid private key: {}", e)))?;
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| GatewayError::Auth(format!("failed to sign assertion: {}", e)))
}
