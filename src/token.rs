//! Token codec.
//!
//! Signs and verifies HS256 JWTs. Each [`TokenClass`] has its own secret and default
//! lifetime, so a sign-up token can never pass as an access token and vice versa.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{config::TokenSecrets, id::ObjectId};

/// The purpose a token was minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Access,
    Refresh,
    ForgotPassword,
    SignUp,
    ChangeEmail,
}

impl TokenClass {
    /// Lifetime applied by [`TokenCodec::issue`]. `None` means the token carries no `exp`.
    pub fn default_ttl(self) -> Option<Duration> {
        match self {
            TokenClass::Refresh => None,
            TokenClass::Access
            | TokenClass::ForgotPassword
            | TokenClass::SignUp
            | TokenClass::ChangeEmail => Some(Duration::hours(1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token signature or format is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token could not be signed: {0}")]
    Encoding(String),
}

/// SessionClaims
///
/// Identity carried by access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: ObjectId,
    #[serde(rename = "isAdmin", default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

/// EmailClaims
///
/// Payload of the single-purpose, email-bound tokens (password reset, sign-up, email change).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailClaims {
    pub email: String,
}

// Registered claims wrapped around the caller's payload.
#[derive(Serialize, Deserialize)]
struct Envelope<C> {
    #[serde(flatten)]
    claims: C,
    iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

struct ClassKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl ClassKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

struct Keyring {
    access: ClassKeys,
    refresh: ClassKeys,
    forgot_password: ClassKeys,
    sign_up: ClassKeys,
    change_email: ClassKeys,
}

/// TokenCodec
///
/// Cheap to clone; the key material is shared behind an `Arc`.
#[derive(Clone)]
pub struct TokenCodec {
    keys: Arc<Keyring>,
}

impl TokenCodec {
    pub fn new(secrets: &TokenSecrets) -> Self {
        Self {
            keys: Arc::new(Keyring {
                access: ClassKeys::from_secret(&secrets.access),
                refresh: ClassKeys::from_secret(&secrets.refresh),
                forgot_password: ClassKeys::from_secret(&secrets.forgot_password),
                sign_up: ClassKeys::from_secret(&secrets.sign_up),
                change_email: ClassKeys::from_secret(&secrets.change_email),
            }),
        }
    }

    fn keys(&self, class: TokenClass) -> &ClassKeys {
        match class {
            TokenClass::Access => &self.keys.access,
            TokenClass::Refresh => &self.keys.refresh,
            TokenClass::ForgotPassword => &self.keys.forgot_password,
            TokenClass::SignUp => &self.keys.sign_up,
            TokenClass::ChangeEmail => &self.keys.change_email,
        }
    }

    /// Signs `claims` for `class` with the class's default lifetime.
    pub fn issue<C: Serialize>(&self, class: TokenClass, claims: &C) -> Result<String, TokenError> {
        self.issue_with_ttl(class, claims, class.default_ttl())
    }

    /// Signs `claims` for `class`, expiring after `ttl` (never, when `None`).
    pub fn issue_with_ttl<C: Serialize>(
        &self,
        class: TokenClass,
        claims: &C,
        ttl: Option<Duration>,
    ) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let envelope = Envelope {
            claims,
            iat: now,
            exp: ttl.map(|ttl| (now + ttl.num_seconds()).max(0)),
        };

        encode(&Header::default(), &envelope, &self.keys(class).encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verifies signature and expiry under `class` and returns the original claims.
    pub fn verify<C: DeserializeOwned>(&self, class: TokenClass, token: &str) -> Result<C, TokenError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;
        // Refresh tokens carry no `exp`; expiry is still enforced whenever it is present.
        validation.required_spec_claims.clear();

        match decode::<Envelope<C>>(token, &self.keys(class).decoding, &validation) {
            Ok(data) => Ok(data.claims.claims),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                _ => Err(TokenError::InvalidSignature),
            },
        }
    }
}
