use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use std::convert::Infallible;

use crate::{
    error::ApiError,
    id::ObjectId,
    token::{SessionClaims, TokenClass, TokenCodec},
};

/// bearer_token
///
/// Returns the credential of an `Authorization: Bearer <token>` header, or `None` when
/// the header is absent, not valid UTF-8, or uses another scheme.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// AuthUser
///
/// The caller identity decoded from a valid access token. Taking it as a handler
/// argument makes the route require authentication: any failure rejects with 401
/// before the handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: ObjectId,
    pub is_admin: bool,
}

impl AuthUser {
    fn from_headers(headers: &HeaderMap, tokens: &TokenCodec) -> Result<Self, ApiError> {
        let token = bearer_token(headers).ok_or(ApiError::Unauthorized)?;
        let claims: SessionClaims = tokens.verify(TokenClass::Access, token)?;

        Ok(AuthUser {
            id: claims.sub,
            is_admin: claims.is_admin.unwrap_or(false),
        })
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenCodec: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = TokenCodec::from_ref(state);
        AuthUser::from_headers(&parts.headers, &tokens)
    }
}

/// `Option<AuthUser>` as an extractor behaves like [`MaybeAuthUser`].
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenCodec: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let tokens = TokenCodec::from_ref(state);
        Ok(AuthUser::from_headers(&parts.headers, &tokens).ok())
    }
}

/// AdminUser
///
/// Like [`AuthUser`], but the token must also carry `isAdmin: true`. A valid token
/// without the flag is rejected with the same 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    TokenCodec: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = <AuthUser as FromRequestParts<S>>::from_request_parts(parts, state).await?;
        if !user.is_admin {
            tracing::debug!(user_id = %user.id, "Admin route refused");
            return Err(ApiError::Unauthorized);
        }
        Ok(AdminUser(user))
    }
}

/// MaybeAuthUser
///
/// Optional identity for routes that personalise their answer. Never rejects: an
/// absent, malformed or invalid token simply yields `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn id(&self) -> Option<&ObjectId> {
        self.0.as_ref().map(|user| &user.id)
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    TokenCodec: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = <AuthUser as OptionalFromRequestParts<S>>::from_request_parts(parts, state).await?;
        Ok(MaybeAuthUser(user))
    }
}
