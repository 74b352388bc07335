//! JWT encoding and decoding utilities.

use std::fmt;

use error::AuthError;
use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use sha2::Sha256;

use crate::claims::{Claims, Role};

type HmacSha256 = Hmac<Sha256>;

/// JWT configuration.
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token issuer
    pub issuer: String,
    /// Token validity duration in seconds
    pub expires_in_secs: i64,
}

impl JwtConfig {
    /// Create a new JWT configuration.
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>, expires_in_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            expires_in_secs,
        }
    }

    /// Sign a token for `subject` with this configuration's issuer and lifetime.
    pub fn issue(&self, subject: &str, name: Option<&str>, role: Role) -> Result<String, AuthError> {
        let mut claims = Claims::new(subject, role, self.issuer.as_str(), self.expires_in_secs);
        if let Some(name) = name {
            claims = claims.with_name(name);
        }
        encode_token(&claims, &self.secret)
    }

    /// Validate a token against this configuration.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode_token(token, &self.secret, &self.issuer)
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("expires_in_secs", &self.expires_in_secs)
            .finish()
    }
}

fn signing_key(secret: &str) -> Result<HmacSha256, AuthError> {
    HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| {
        tracing::error!("Failed to create HMAC key: {}", e);
        AuthError::InvalidToken
    })
}

/// Encode claims into a JWT token.
pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    let key = signing_key(secret).map_err(|_| AuthError::TokenCreationFailed)?;

    claims.sign_with_key(&key).map_err(|e| {
        tracing::error!("Failed to encode JWT: {}", e);
        AuthError::TokenCreationFailed
    })
}

/// Decode and validate a JWT token.
pub fn decode_token(token: &str, secret: &str, issuer: &str) -> Result<Claims, AuthError> {
    let key = signing_key(secret)?;

    let claims: Claims = token.verify_with_key(&key).map_err(|e| {
        tracing::warn!("Failed to decode JWT: {}", e);
        AuthError::InvalidToken
    })?;

    if claims.iss != issuer {
        tracing::warn!("Invalid issuer: expected {}, got {}", issuer, claims.iss);
        return Err(AuthError::InvalidToken);
    }

    if claims.is_expired() {
        return Err(AuthError::TokenExpired);
    }

    Ok(claims)
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingCredentials)?;
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::InvalidToken)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidToken);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(token)
}
