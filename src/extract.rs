//! Request body extractors.
//!
//! Body failures are answered like every other failure: a JSON string through
//! `ApiError`, never the framework's plain-text rejection.

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::ApiError;

pub const INVALID_BODY: &str = "Invalid request body";

/// Json
///
/// Stands in for `axum::Json` on both sides of a handler. A missing, blank or
/// non-JSON body reads as `{}`, so the field rules report what is missing. A JSON
/// body that does not parse into `T` is a 400 with a fixed message.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let declares_json = is_json_content_type(req.headers());
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(%rejection, "Request body unreadable");
            ApiError::validation(INVALID_BODY)
        })?;

        let raw: &[u8] = if !declares_json || bytes.iter().all(u8::is_ascii_whitespace) {
            &b"{}"[..]
        } else {
            &bytes[..]
        };

        serde_json::from_slice(raw).map(Json).map_err(|e| {
            tracing::debug!(error = %e, "Request body rejected");
            ApiError::validation(INVALID_BODY)
        })
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// `application/json` or any `+json` media type, parameters ignored.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// FormData
///
/// `multipart/form-data` body. A request that is not multipart carries no parts,
/// the same as an empty form.
pub struct FormData(pub Option<Multipart>);

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Multipart::from_request(req, state).await {
            Ok(multipart) => Ok(FormData(Some(multipart))),
            Err(rejection) => {
                tracing::debug!(%rejection, "Request is not multipart; reading it as an empty form");
                Ok(FormData(None))
            }
        }
    }
}
