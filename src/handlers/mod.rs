//! Resource services.
//!
//! One module per resource. Handlers take their gate as an extractor argument
//! (`AuthUser`, `AdminUser`, `MaybeAuthUser`), validate with `crate::validation`,
//! and talk to the collaborators held in `AppState`.

use axum::http::StatusCode;

use crate::{
    error::{ApiError, ApiResult},
    extract::Json,
    id::ObjectId,
    models::User,
    repository::RepositoryState,
};

pub mod account;
pub mod categories;
pub mod news;

/// A plain JSON-string answer, e.g. `"Category deleted successfully"`.
pub type Message = (StatusCode, Json<&'static str>);

pub(crate) fn message(status: StatusCode, text: &'static str) -> Message {
    (status, Json(text))
}

/// current_user
///
/// Loads the record behind an authenticated identity. A token can outlive its user,
/// in which case the caller gets 404.
pub(crate) async fn current_user(repo: &RepositoryState, id: &ObjectId) -> ApiResult<User> {
    repo.find_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User does not exist"))
}

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}
