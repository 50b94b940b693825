use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::{Message, message};
use crate::{
    AppState,
    auth::AdminUser,
    error::{ApiError, ApiResult},
    extract::Json,
    id::ObjectId,
    models::{Category, CategoryRequest, NewsSummary},
    repository::{NewsOrder, NewsQuery},
    validation::{self, Pagination},
};

/// list_categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    responses((status = 200, description = "All categories", body = [Category]))
)]
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.repo.list_categories().await?))
}

/// create_category
///
/// Names are compared after trimming and case-sensitively.
#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Validation failure", body = String),
        (status = 401, description = "Admin token required", body = String),
        (status = 409, description = "Name already exists", body = String)
    )
)]
pub async fn create_category(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let name = validation::CATEGORY_NAME.check(payload.name.as_ref())?;

    if state.repo.find_category_by_name(&name).await?.is_some() {
        return Err(ApiError::conflict("Name already exists"));
    }

    let category = state.repo.create_category(&name).await?;
    tracing::info!(admin_id = %admin.id, category_id = %category.id, "Category created");

    Ok((StatusCode::CREATED, Json(category)))
}

/// category_news
///
/// News of one category, oldest first.
#[utoipa::path(
    get,
    path = "/categories/{id}/news",
    tag = "categories",
    params(("id" = String, Path, description = "Category id"), Pagination),
    responses(
        (status = 200, description = "News in the category", body = [NewsSummary]),
        (status = 400, description = "Invalid category id", body = String)
    )
)]
pub async fn category_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<NewsSummary>>> {
    let id = validation::parse_id(&id, || ApiError::validation("Invalid category id"))?;

    let news = state
        .repo
        .query_news(&NewsQuery {
            category_ids: Some(vec![id]),
            order: NewsOrder::Oldest,
            page: pagination.page(),
            ..NewsQuery::default()
        })
        .await?;

    Ok(Json(news.into_iter().map(NewsSummary::from).collect()))
}

/// update_category
#[utoipa::path(
    patch,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = String, Path, description = "Category id")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category renamed", body = String),
        (status = 400, description = "Validation failure", body = String),
        (status = 401, description = "Admin token required", body = String),
        (status = 404, description = "Category does not exist", body = String),
        (status = 409, description = "Name already exists", body = String)
    )
)]
pub async fn update_category(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryRequest>,
) -> ApiResult<Message> {
    let name = validation::CATEGORY_NAME.check(payload.name.as_ref())?;
    let id = validation::parse_id(&id, || ApiError::not_found("Category does not exist"))?;

    if state.repo.find_category(&id).await?.is_none() {
        return Err(ApiError::not_found("Category does not exist"));
    }

    if let Some(existing) = state.repo.find_category_by_name(&name).await? {
        if existing.id != id {
            return Err(ApiError::conflict("Name already exists"));
        }
    }

    if !state.repo.rename_category(&id, &name).await? {
        return Err(ApiError::not_found("Category does not exist"));
    }

    tracing::info!(admin_id = %admin.id, category_id = %id, "Category renamed");
    Ok(message(StatusCode::OK, "Category saved successfully"))
}

/// delete_category
///
/// Always answers 200; an id that is not well-formed never reaches the store.
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = String, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted", body = String),
        (status = 401, description = "Admin token required", body = String)
    )
)]
pub async fn delete_category(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    if let Some(id) = ObjectId::parse(&id) {
        let deleted = state.repo.delete_category(&id).await?;
        tracing::info!(admin_id = %admin.id, category_id = %id, deleted, "Category delete requested");
    }

    Ok(message(StatusCode::OK, "Category deleted successfully"))
}
