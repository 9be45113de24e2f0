//! Signed, expiring tokens.
//!
//! Access and refresh tokens are HS256 JWTs carrying the user's id and email,
//! an issue time, an expiry and a unique token id. The two kinds are signed
//! with different secrets so one can never be accepted as the other.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::auth::models::TokenPair;
use crate::auth::user::UserClaims;
use crate::config::AuthConfig;
use crate::domain::{TokenId, UserId};

/// Payload of every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: UserId,
    pub email: String,
    pub jti: TokenId,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn user_claims(&self) -> UserClaims {
        UserClaims { id: self.sub.clone(), email: self.email.clone() }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
    #[error("failed to sign token")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

/// HMAC key material derived from one secret.
#[derive(Clone)]
pub struct TokenSecret {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenSecret {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenSecret([redacted])")
    }
}

/// Sign `claims` into a token that expires `ttl` from now.
///
/// Expiry has one-second resolution; a non-positive ttl yields a token that is
/// already expired. `exp` never goes below zero since decoders read it as
/// unsigned.
pub fn sign(claims: &UserClaims, ttl: Duration, secret: &TokenSecret) -> Result<String, TokenError> {
    let now = Utc::now().timestamp();
    let payload = TokenClaims {
        sub: claims.id.clone(),
        email: claims.email.clone(),
        jti: TokenId::new(),
        iat: now,
        exp: now.saturating_add(ttl.num_seconds()).max(0),
    };

    encode(&Header::new(Algorithm::HS256), &payload, &secret.encoding).map_err(TokenError::Encoding)
}

/// Check signature and expiry. A token is expired once `exp <= now`.
pub fn verify(token: &str, secret: &TokenSecret) -> Result<TokenClaims, TokenError> {
    let claims = verify_signature(token, secret)?;
    if claims.exp <= Utc::now().timestamp() {
        return Err(TokenError::Expired);
    }
    Ok(claims)
}

/// Check the signature only. Expired tokens decode successfully.
pub fn verify_signature(token: &str, secret: &TokenSecret) -> Result<TokenClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["sub", "iat", "exp"]);

    decode::<TokenClaims>(token, &secret.decoding, &validation)
        .map(|data| data.claims)
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })
}

/// Issues and verifies access/refresh pairs with their configured lifetimes.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    access: TokenSecret,
    access_ttl: Duration,
    refresh: TokenSecret,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(access: TokenSecret, access_ttl: Duration, refresh: TokenSecret, refresh_ttl: Duration) -> Self {
        Self { access, access_ttl, refresh, refresh_ttl }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            TokenSecret::new(config.access_secret.as_bytes()),
            config.access_token_ttl(),
            TokenSecret::new(config.refresh_secret.as_bytes()),
            config.refresh_token_ttl(),
        )
    }

    pub fn issue_pair(&self, claims: &UserClaims) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: sign(claims, self.access_ttl, &self.access)?,
            refresh_token: sign(claims, self.refresh_ttl, &self.refresh)?,
        })
    }

    pub fn verify_access(&self, token: &str) -> Result<TokenClaims, TokenError> {
        verify(token, &self.access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<TokenClaims, TokenError> {
        verify(token, &self.refresh)
    }

    /// Owner of a refresh token whose signature checks out, expired or not.
    pub fn refresh_owner(&self, token: &str) -> Option<UserId> {
        verify_signature(token, &self.refresh).ok().map(|claims| claims.sub)
    }
}
