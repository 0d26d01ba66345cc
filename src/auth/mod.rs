use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::api::backend_error;
use crate::config::Config;
use crate::models::{Claims, RegisterUser};

/// On-disk bearer token storage, one token per file.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the stored token, None when nobody is logged in.
    pub fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim().to_string();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token))
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).context("Failed to read token file"),
        }
    }

    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create token directory")?;
        }
        fs::write(&self.path, token).context("Failed to write token file")
    }

    /// Remove the stored token. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err).context("Failed to remove token file"),
        }
    }
}

/// Decode the payload segment of a JWT without verifying the signature.
/// Verification is the backend's job; the client only needs the user id.
pub fn decode_claims(token: &str) -> Result<Claims> {
    let mut segments = token.split('.');
    let payload = segments
        .nth(1)
        .context("Token is not a JWT (no payload segment)")?;

    // Payloads are base64url, usually unpadded, occasionally padded
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| URL_SAFE.decode(payload))
        .context("Token payload is not valid base64url")?;

    serde_json::from_slice(&bytes).context("Token payload is not valid JSON")
}

/// The logged-in user as far as the client can tell: the raw token plus
/// whatever claims could be decoded from it.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub token: String,
    pub claims: Option<Claims>,
}

impl CurrentUser {
    pub fn user_id(&self) -> Option<&str> {
        self.claims.as_ref()?.user_id.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.claims.as_ref()?.email.as_deref()
    }

    /// Whether the token's exp claim has passed. Tokens without one never
    /// expire as far as the client can tell.
    pub fn is_expired(&self) -> bool {
        match self.claims.as_ref().and_then(|claims| claims.exp) {
            Some(exp) => exp < Utc::now().timestamp(),
            None => false,
        }
    }
}

/// Client for the /auth endpoints plus the local token store.
pub struct AuthClient {
    http: Client,
    base_url: String,
    store: TokenStore,
}

impl AuthClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            store: TokenStore::new(config.token_path.clone()),
        })
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// POST /auth/register. The backend's response body is returned so the
    /// caller can surface any message it carries.
    pub async fn register(&self, user: &RegisterUser) -> Result<Value> {
        let url = format!("{}/auth/register", self.base_url);
        debug!("Registering {} via {}", user.email, url);

        let response = self
            .http
            .post(&url)
            .json(user)
            .send()
            .await
            .context("Failed to reach backend for register")?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        response
            .json()
            .await
            .context("Failed to read register response")
    }

    /// POST /auth/login; the returned token is persisted on success.
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser> {
        let url = format!("{}/auth/login", self.base_url);
        debug!("Logging in {} via {}", email, url);

        let response = self
            .http
            .post(&url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .context("Failed to reach backend for login")?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        let body: Value = response.json().await.context("Failed to read login response")?;
        let token = body
            .get("token")
            .and_then(Value::as_str)
            .context("Login succeeded but the response carried no token")?
            .to_string();

        self.store.save(&token)?;

        let claims = match decode_claims(&token) {
            Ok(claims) => Some(claims),
            Err(err) => {
                warn!("Stored token but could not decode its payload: {:#}", err);
                None
            }
        };

        Ok(CurrentUser { token, claims })
    }

    /// Drop the stored token. A missing token is not an error.
    pub fn logout(&self) -> Result<bool> {
        self.store.clear()
    }

    /// Who is logged in, judged purely by the stored token. An undecodable
    /// token still counts as logged in, just without claims.
    pub fn current_user(&self) -> Result<Option<CurrentUser>> {
        let Some(token) = self.store.load()? else {
            return Ok(None);
        };

        let claims = match decode_claims(&token) {
            Ok(claims) => Some(claims),
            Err(err) => {
                warn!("Stored token payload could not be decoded: {:#}", err);
                None
            }
        };

        Ok(Some(CurrentUser { token, claims }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_jwt(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        format!("{}.{}.signature", header, body)
    }

    #[test]
    fn decodes_user_id_from_payload() {
        let token = fake_jwt(r#"{"_id":"u42","email":"who@example.com","exp":1999999999}"#);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.user_id.as_deref(), Some("u42"));
        assert_eq!(claims.email.as_deref(), Some("who@example.com"));
    }

    #[test]
    fn decodes_padded_payloads_too() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
        let body = URL_SAFE.encode(br#"{"userId":"u7"}"#);
        let token = format!("{}.{}.sig", header, body);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.user_id.as_deref(), Some("u7"));
    }

    #[test]
    fn rejects_tokens_without_a_payload_segment() {
        assert!(decode_claims("not-a-jwt").is_err());
        assert!(decode_claims("").is_err());
    }

    #[test]
    fn rejects_garbage_payloads() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
        let token = format!("{}.!!!not-base64!!!.sig", header);
        assert!(decode_claims(&token).is_err());
    }

    #[test]
    fn token_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nested").join("token"));

        assert!(store.load().unwrap().is_none());
        store.save("abc.def.ghi").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc.def.ghi"));
        assert!(store.clear().unwrap());
        assert!(store.load().unwrap().is_none());
        // Clearing twice is a no-op
        assert!(!store.clear().unwrap());
    }

    #[test]
    fn blank_token_file_reads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        fs::write(&path, "\n").unwrap();
        let store = TokenStore::new(path);
        assert!(store.load().unwrap().is_none());
    }
}
