//! Bearer token verification against an external OpenID issuer
//!
//! Tokens are RS256 JWTs. Signing keys come from the issuer's JWK set, located
//! through OpenID discovery and cached in memory. An unknown `kid` triggers a
//! refresh of the key set, which covers issuer key rotation. Refreshes are
//! serialized and at most one happens per cooldown window, so tokens with
//! made-up key ids cannot drive traffic to the issuer.

use std::time::{Duration, Instant};

use jsonwebtoken::{
    decode, decode_header,
    jwk::JwkSet,
    Algorithm, DecodingKey, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::{config::AuthConfig, error::AppError};

const DISCOVERY_PATH: &str = "/.well-known/openid-configuration";

/// Minimum time between two successful key set fetches
const REFRESH_COOLDOWN: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingToken,

    #[error("Invalid authorization header format")]
    MalformedHeader,

    #[error("Unsupported token algorithm {0:?}")]
    UnsupportedAlgorithm(Algorithm),

    #[error("Token header has no key id")]
    MissingKeyId,

    #[error("No signing key matches key id {0}")]
    UnknownKey(String),

    #[error("Invalid token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Issuer unreachable: {0}")]
    Discovery(#[from] reqwest::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Discovery(e) => {
                tracing::error!("Token issuer discovery failed: {}", e);
                AppError::Unavailable("Authorization server unavailable".to_string())
            }
            other => AppError::Authentication(other.to_string()),
        }
    }
}

/// Claims extracted from a verified access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub exp: u64,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Subset of the OpenID provider metadata the verifier needs
#[derive(Debug, Deserialize)]
struct OpenIdConfiguration {
    issuer: String,
    jwks_uri: String,
}

#[derive(Clone)]
struct IssuerKeys {
    issuer: String,
    jwks: JwkSet,
}

#[derive(Default)]
struct KeyCache {
    keys: Option<IssuerKeys>,
    /// Time of the last successful fetch; `None` until the first one
    refreshed_at: Option<Instant>,
}

enum KeySource {
    Discovery {
        discovery_url: String,
        client: reqwest::Client,
    },
    Fixed,
}

/// Verifies RS256 bearer tokens for one audience
pub struct JwksVerifier {
    audience: String,
    source: KeySource,
    cache: RwLock<KeyCache>,
    /// Held for the duration of a fetch so concurrent misses share it
    refresh_lock: Mutex<()>,
    cooldown: Duration,
}

impl JwksVerifier {
    /// Verifier that discovers the issuer's keys on first use
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let discovery_url = format!(
            "{}{}",
            config.issuer_base_url.trim_end_matches('/'),
            DISCOVERY_PATH
        );
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            audience: config.audience.clone(),
            source: KeySource::Discovery {
                discovery_url,
                client,
            },
            cache: RwLock::new(KeyCache::default()),
            refresh_lock: Mutex::new(()),
            cooldown: REFRESH_COOLDOWN,
        })
    }

    /// Verifier with a pinned issuer and key set, never refreshed
    pub fn with_keys(issuer: impl Into<String>, audience: impl Into<String>, jwks: JwkSet) -> Self {
        Self {
            audience: audience.into(),
            source: KeySource::Fixed,
            cache: RwLock::new(KeyCache {
                keys: Some(IssuerKeys {
                    issuer: issuer.into(),
                    jwks,
                }),
                refreshed_at: None,
            }),
            refresh_lock: Mutex::new(()),
            cooldown: REFRESH_COOLDOWN,
        }
    }

    /// Validate signature, expiry, audience and issuer of `token`
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token)?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::UnsupportedAlgorithm(header.alg));
        }
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;

        let (issuer, key) = self.key_for(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&issuer]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);

        let data = decode::<Claims>(token, &key, &validation)?;
        Ok(data.claims)
    }

    async fn key_for(&self, kid: &str) -> Result<(String, DecodingKey), AuthError> {
        if let Some(found) = self.cached_key(kid).await? {
            return Ok(found);
        }

        if let KeySource::Discovery { .. } = self.source {
            let _refreshing = self.refresh_lock.lock().await;

            // Another request may have refreshed while this one waited
            if let Some(found) = self.cached_key(kid).await? {
                return Ok(found);
            }

            if self.cooling_down().await {
                tracing::debug!(kid, "Key set refreshed recently, not refetching");
            } else {
                self.refresh().await?;
                if let Some(found) = self.cached_key(kid).await? {
                    return Ok(found);
                }
            }
        }

        tracing::warn!(kid, "Token signed with unknown key");
        Err(AuthError::UnknownKey(kid.to_string()))
    }

    async fn cached_key(&self, kid: &str) -> Result<Option<(String, DecodingKey)>, AuthError> {
        let cache = self.cache.read().await;
        let Some(keys) = cache.keys.as_ref() else {
            return Ok(None);
        };
        match keys.jwks.find(kid) {
            Some(jwk) => Ok(Some((keys.issuer.clone(), DecodingKey::from_jwk(jwk)?))),
            None => Ok(None),
        }
    }

    async fn cooling_down(&self) -> bool {
        self.cache
            .read()
            .await
            .refreshed_at
            .is_some_and(|at| at.elapsed() < self.cooldown)
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        let KeySource::Discovery {
            discovery_url,
            client,
        } = &self.source
        else {
            return Ok(());
        };

        let metadata: OpenIdConfiguration = client
            .get(discovery_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let jwks: JwkSet = client
            .get(&metadata.jwks_uri)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::info!(
            issuer = %metadata.issuer,
            keys = jwks.keys.len(),
            "Refreshed token signing keys"
        );

        *self.cache.write().await = KeyCache {
            keys: Some(IssuerKeys {
                issuer: metadata.issuer,
                jwks,
            }),
            refreshed_at: Some(Instant::now()),
        };
        Ok(())
    }
}
