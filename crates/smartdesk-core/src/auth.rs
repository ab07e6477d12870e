//! Bearer token verification
//!
//! A token is accepted when it matches one of the static API keys or when
//! Supabase Auth resolves it to a user. With neither configured every
//! protected route fails closed.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};

const INVALID_TOKEN: &str = "Invalid auth token";

/// The caller behind a verified token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthUser {
    /// Identity used for static API key callers
    fn api_key() -> Self {
        Self {
            id: "api-key".to_string(),
            email: None,
        }
    }
}

/// Supabase Auth client
#[derive(Clone)]
pub struct SupabaseAuth {
    http_client: Client,
    base_url: String,
    key: String,
}

impl SupabaseAuth {
    pub fn new(base_url: &str, key: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        }
    }

    /// Resolve a session token with `GET /auth/v1/user`
    pub async fn user(&self, token: &str) -> Result<AuthUser> {
        let response = self
            .http_client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Auth service unreachable");
                Error::Auth(INVALID_TOKEN.to_string())
            })?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "Token rejected");
            return Err(Error::Auth(INVALID_TOKEN.to_string()));
        }

        response
            .json::<AuthUser>()
            .await
            .map_err(|_| Error::Auth(INVALID_TOKEN.to_string()))
    }
}

/// Token verifier shared by every protected route
#[derive(Clone, Default)]
pub struct Authenticator {
    supabase: Option<SupabaseAuth>,
    api_keys: Vec<String>,
}

impl Authenticator {
    pub fn new(supabase: Option<SupabaseAuth>, api_keys: Vec<String>) -> Self {
        Self { supabase, api_keys }
    }

    pub fn from_config(config: &Config) -> Self {
        let supabase = config
            .supabase
            .credentials()
            .map(|(url, key)| SupabaseAuth::new(url, key));
        Self::new(supabase, config.api_keys.clone())
    }

    /// Whether any verification method is available
    pub fn is_configured(&self) -> bool {
        self.supabase.is_some() || !self.api_keys.is_empty()
    }

    /// Verify a bearer token
    pub async fn verify(&self, token: &str) -> Result<AuthUser> {
        if !self.is_configured() {
            return Err(Error::NotConfigured(
                "Supabase auth is not configured.".to_string(),
            ));
        }
        if validate_api_key(token, &self.api_keys) {
            return Ok(AuthUser::api_key());
        }
        match &self.supabase {
            Some(auth) => auth.user(token).await,
            None => Err(Error::Auth(INVALID_TOKEN.to_string())),
        }
    }
}

/// Constant-time match against the configured keys
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    let provided = provided.as_bytes();
    valid_keys.iter().any(|key| {
        let key = key.as_bytes();
        provided.len() == key.len() && bool::from(provided.ct_eq(key))
    })
}
