//! Bearer-token caller identification.
//!
//! Tokens are JWTs issued by the identity provider and signed with a shared
//! HS256 secret. The `sub` claim is the buyer id. Anything that prevents
//! reading a subject (no header, wrong scheme, bad signature, expired, empty
//! subject) is an [`AuthError`]; the transport logs it and treats the
//! caller as anonymous, and the RPC layer rejects anonymous callers.

use std::time::Duration;

use axum::http::{HeaderMap, header::AUTHORIZATION};
use eshop_core::BuyerId;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;

/// Errors that prevent resolving a caller identity.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization` header.
    #[error("missing credential")]
    MissingCredential,

    /// `Authorization` header is not `Bearer <token>`.
    #[error("malformed authorization header")]
    MalformedHeader,

    /// Token failed signature, expiry, issuer or audience checks.
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// Token is valid but names no usable subject.
    #[error("token subject is not a valid buyer id")]
    InvalidSubject,

    /// System clock is before the unix epoch.
    #[error("system clock error")]
    Clock,
}

/// JWT claims read from (and written to) bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (buyer id)
    pub sub: String,
    /// Expiration timestamp
    pub exp: u64,
    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// # Errors
///
/// Returns `MissingCredential` if there is no header and `MalformedHeader`
/// if it is not a non-empty bearer token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MalformedHeader)?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}

/// Validates bearer tokens and resolves the buyer they identify.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("key", &"[REDACTED]")
            .field("issuer", &self.validation.iss)
            .field("audience", &self.validation.aud)
            .finish()
    }
}

impl TokenVerifier {
    /// Create a verifier from auth configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let key = DecodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        let mut required = vec!["exp", "sub"];
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
            required.push("iss");
        }
        match &config.audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                required.push("aud");
            }
            None => validation.validate_aud = false,
        }
        // Configured claims must be present, not just correct when present.
        validation.set_required_spec_claims(&required);

        Self { key, validation }
    }

    /// Validate `token` and return the buyer it identifies.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` if validation fails and `InvalidSubject` if the
    /// subject is empty.
    pub fn verify(&self, token: &str) -> Result<BuyerId, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)?;
        BuyerId::parse(&data.claims.sub).map_err(|_| AuthError::InvalidSubject)
    }

    /// Resolve the caller from request headers.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] describing why no identity could be resolved.
    pub fn identify(&self, headers: &HeaderMap) -> Result<BuyerId, AuthError> {
        self.verify(bearer_token(headers)?)
    }
}

/// Mints bearer tokens with the shared secret.
///
/// For development and tests; in production tokens come from the identity
/// provider.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    issuer: Option<String>,
    audience: Option<String>,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("key", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl TokenIssuer {
    /// Create an issuer from auth configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            key: EncodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        }
    }

    /// Issue a token for `subject` valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns `Clock` if the system time is unusable and `InvalidToken` if
    /// encoding fails.
    pub fn issue(&self, subject: &BuyerId, ttl: Duration) -> Result<String, AuthError> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|_| AuthError::Clock)?
            .as_secs();

        let claims = Claims {
            sub: subject.to_string(),
            exp: now.saturating_add(ttl.as_secs()),
            iat: Some(now),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.key,
        )?)
    }
}
