//! Service-account credentials and token exchange.

use std::fmt;
use std::io::Read;

use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use cellfeed_core::{FeedError, FeedResult};
use chrono::{DateTime, Duration, Utc};
use ring::signature::RsaKeyPair;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each signed assertion.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before the server says they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The fields of a service-account key file this crate uses.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("private_key_id", &self.private_key_id)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct JwtHeader<'a> {
    alg: &'static str,
    typ: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_at: DateTime<Utc>,
}

/// A service-account credential scoped to a single permission.
///
/// The bearer token is exchanged on first use and kept until shortly before it
/// expires. Sessions are `Send + Sync` and may be shared between concurrent
/// fetches.
pub struct ServiceAccountSession {
    key: ServiceAccountKey,
    key_pair: RsaKeyPair,
    scope: String,
    token: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for ServiceAccountSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountSession")
            .field("key", &self.key)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Read a service-account key from `credential` and scope it to `required_scope`.
///
/// The reader is consumed and dropped before this returns, whether or not the
/// credential is valid. No network request is made; the token exchange happens
/// on the first call to [`ServiceAccountSession::access_token`].
///
/// # Errors
///
/// Returns [`FeedError::Credential`] if the bytes are not a service-account key,
/// the private key cannot be used for RS256 signing, or the scope is malformed.
pub fn obtain_session<R: Read>(credential: R, required_scope: &str) -> FeedResult<ServiceAccountSession> {
    let bytes = read_credential(credential)?;
    let scope = validate_scope(required_scope)?;

    let key: ServiceAccountKey = serde_json::from_slice(&bytes)
        .map_err(|e| FeedError::credential(format!("invalid service account key: {e}")))?;
    Url::parse(&key.token_uri).map_err(|e| {
        FeedError::credential(format!("invalid token_uri '{}': {e}", key.token_uri))
    })?;
    let key_pair = parse_private_key(&key.private_key)?;

    debug!(client_email = %key.client_email, scope, "loaded service account");

    Ok(ServiceAccountSession {
        key,
        key_pair,
        scope: scope.to_string(),
        token: Mutex::new(None),
    })
}

fn read_credential<R: Read>(mut credential: R) -> FeedResult<Vec<u8>> {
    let mut bytes = Vec::new();
    credential
        .read_to_end(&mut bytes)
        .map_err(|e| FeedError::credential(format!("failed to read credential: {e}")))?;
    Ok(bytes)
}

fn validate_scope(scope: &str) -> FeedResult<&str> {
    if scope.is_empty() || scope.chars().any(char::is_whitespace) {
        return Err(FeedError::credential(format!(
            "scope must be a single URL, got '{scope}'"
        )));
    }
    Url::parse(scope)
        .map_err(|e| FeedError::credential(format!("invalid scope '{scope}': {e}")))?;
    Ok(scope)
}

fn parse_private_key(pem: &str) -> FeedResult<RsaKeyPair> {
    let mut reader = std::io::Cursor::new(pem.as_bytes());
    let item = rustls_pemfile::read_one(&mut reader)
        .map_err(|e| FeedError::credential(format!("invalid PEM private key: {e}")))?;

    match item {
        Some(rustls_pemfile::Item::Pkcs8Key(der)) => RsaKeyPair::from_pkcs8(der.secret_pkcs8_der())
            .map_err(|e| FeedError::credential(format!("rejected pkcs8 private key: {e}"))),
        Some(rustls_pemfile::Item::Pkcs1Key(der)) => RsaKeyPair::from_der(der.secret_pkcs1_der())
            .map_err(|e| FeedError::credential(format!("rejected pkcs1 private key: {e}"))),
        _ => Err(FeedError::credential("missing RSA private key")),
    }
}

impl ServiceAccountSession {
    /// The permission scope every token of this session is requested for.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// The parsed key file. Its `Debug` output omits the private key.
    pub fn key(&self) -> &ServiceAccountKey {
        &self.key
    }

    /// Return a bearer token, exchanging a fresh assertion when needed.
    pub async fn access_token(&self, client: &reqwest::Client) -> FeedResult<String> {
        let mut slot = self.token.lock().await;
        let now = Utc::now();

        if let Some(cached) = slot.as_ref() {
            if now < cached.refresh_at {
                return Ok(cached.access_token.clone());
            }
        }

        let response = self.exchange(client, now).await?;
        let lifetime = response.expires_in.clamp(0, 86_400);
        let cached = CachedToken {
            access_token: response.access_token,
            refresh_at: now + Duration::seconds(lifetime - EXPIRY_MARGIN_SECS),
        };
        let token = cached.access_token.clone();
        *slot = Some(cached);

        Ok(token)
    }

    /// Build and sign the RS256 assertion for this account and scope.
    fn signed_assertion(&self, now: DateTime<Utc>) -> FeedResult<String> {
        let iat = now.timestamp();
        let claims = JwtClaims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let header = JwtHeader {
            alg: "RS256",
            typ: "JWT",
            kid: self.key.private_key_id.as_deref(),
        };

        let header_b64 = BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?);
        let claims_b64 = BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signing_input = format!("{header_b64}.{claims_b64}");

        let mut signature = vec![0; self.key_pair.public().modulus_len()];
        self.key_pair
            .sign(
                &ring::signature::RSA_PKCS1_SHA256,
                &ring::rand::SystemRandom::new(),
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|_| FeedError::credential("failed to sign assertion"))?;

        Ok(format!(
            "{signing_input}.{}",
            BASE64_URL_SAFE_NO_PAD.encode(&signature)
        ))
    }

    async fn exchange(&self, client: &reqwest::Client, now: DateTime<Utc>) -> FeedResult<TokenResponse> {
        let assertion = self.signed_assertion(now)?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        debug!(token_uri = %self.key.token_uri, scope = %self.scope, "exchanging assertion");
        let response = client
            .post(&self.key.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                FeedError::credential(format!(
                    "token request to {} failed: {e}",
                    self.key.token_uri
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::credential(format!(
                "token request rejected with HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| FeedError::credential(format!("invalid token response: {e}")))
    }
}
