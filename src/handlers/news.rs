use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::Value;

use super::{Message, current_user, message};
use crate::{
    AppState,
    auth::{AdminUser, AuthUser, MaybeAuthUser},
    error::{ApiError, ApiResult},
    extract::{FormData, Json},
    id::ObjectId,
    models::{
        Comment, CommentRequest, CommentView, NewComment, NewNews, News, NewsChanges, NewsDetail,
        NewsForm, NewsSummary,
    },
    repository::{NewsOrder, NewsQuery},
    validation::{self, ImageUpload, Pagination},
};

// --- Multipart Form ---

/// Raw multipart body: text parts as JSON strings, plus the first `image` file part.
#[derive(Debug, Default)]
struct RawNewsForm {
    fields: HashMap<String, Value>,
    image: Option<ImageUpload>,
}

impl RawNewsForm {
    async fn read(FormData(multipart): FormData) -> ApiResult<Self> {
        let mut form = RawNewsForm::default();
        let Some(mut multipart) = multipart else {
            return Ok(form);
        };

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| ApiError::validation("Invalid form data"))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "image" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::validation("Invalid form data"))?;

                // An empty file input is the same as no image at all.
                if form.image.is_none() && !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::validation("Invalid form data"))?;
                form.fields.insert(name, Value::String(text));
            }
        }

        Ok(form)
    }
}

/// Validated title, description and category of a news form.
struct NewsFields {
    title: String,
    description: String,
    category_id: ObjectId,
}

async fn check_news_fields(state: &AppState, form: &RawNewsForm) -> ApiResult<NewsFields> {
    let title = validation::NEWS_TITLE.check(form.fields.get("title"))?;
    let description = validation::NEWS_DESCRIPTION.check(form.fields.get("description"))?;
    let raw_category = validation::CATEGORY_ID.check(form.fields.get("categoryId"))?;

    let category_id = validation::parse_id(&raw_category, || ApiError::validation("Invalid category id"))?;
    if state.repo.find_category(&category_id).await?.is_none() {
        return Err(ApiError::validation("Invalid category id"));
    }

    Ok(NewsFields {
        title,
        description,
        category_id,
    })
}

fn parse_news_id(raw: &str) -> ApiResult<ObjectId> {
    validation::parse_id(raw, || ApiError::validation("Invalid news id"))
}

/// Removes a stored image; failure is logged and otherwise ignored.
async fn discard_image(state: &AppState, name: &str) {
    if let Err(e) = state.storage.delete(name).await {
        tracing::warn!(image = %name, error = %e, "Failed to remove stored image");
    }
}

// --- Handlers ---

/// list_news
///
/// Newest first. A signed-in caller with favorite categories only sees those categories.
#[utoipa::path(
    get,
    path = "/news",
    tag = "news",
    params(Pagination),
    responses((status = 200, description = "News feed", body = [NewsSummary]))
)]
pub async fn list_news(
    caller: MaybeAuthUser,
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<NewsSummary>>> {
    let mut category_ids = None;
    if let Some(id) = caller.id() {
        if let Some(user) = state.repo.find_user(id).await? {
            if !user.favorite_category_ids.is_empty() {
                category_ids = Some(user.favorite_category_ids);
            }
        }
    }

    let news = state
        .repo
        .query_news(&NewsQuery {
            category_ids,
            order: NewsOrder::Newest,
            page: pagination.page(),
            ..NewsQuery::default()
        })
        .await?;

    Ok(Json(news.into_iter().map(NewsSummary::from).collect()))
}

/// search_news
///
/// Exact title match, oldest first.
#[utoipa::path(
    get,
    path = "/news/search/{query}",
    tag = "news",
    params(("query" = String, Path, description = "Exact title"), Pagination),
    responses((status = 200, description = "Matching news", body = [NewsSummary]))
)]
pub async fn search_news(
    State(state): State<AppState>,
    Path(query): Path<String>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<NewsSummary>>> {
    let news = state
        .repo
        .query_news(&NewsQuery {
            title: Some(query),
            order: NewsOrder::Oldest,
            page: pagination.page(),
            ..NewsQuery::default()
        })
        .await?;

    Ok(Json(news.into_iter().map(NewsSummary::from).collect()))
}

/// create_news
///
/// The image is written before the record is inserted.
#[utoipa::path(
    post,
    path = "/news",
    tag = "news",
    request_body(content = NewsForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "News created", body = News),
        (status = 400, description = "Validation failure", body = String),
        (status = 401, description = "Admin token required", body = String)
    )
)]
pub async fn create_news(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    form: FormData,
) -> ApiResult<(StatusCode, Json<News>)> {
    let form = RawNewsForm::read(form).await?;
    let fields = check_news_fields(&state, &form).await?;
    let image = validation::check_image(form.image.as_ref(), true)?
        .ok_or_else(|| ApiError::validation("Image is required"))?;

    let image_name = image.stored_name();
    state.storage.write(&image_name, &image.bytes).await?;

    let news = state
        .repo
        .create_news(NewNews {
            title: fields.title,
            description: fields.description,
            image: image_name,
            category_id: fields.category_id,
        })
        .await?;

    tracing::info!(admin_id = %admin.id, news_id = %news.id, "News created");
    Ok((StatusCode::CREATED, Json(news)))
}

/// get_news
#[utoipa::path(
    get,
    path = "/news/{id}",
    tag = "news",
    params(("id" = String, Path, description = "News id")),
    responses(
        (status = 200, description = "News with favorite flag", body = NewsDetail),
        (status = 400, description = "Invalid news id", body = String),
        (status = 404, description = "News does not exist", body = String)
    )
)]
pub async fn get_news(
    caller: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<NewsDetail>> {
    let id = parse_news_id(&id)?;
    let news = state
        .repo
        .find_news(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("News does not exist"))?;

    let is_favorite = match caller.id() {
        Some(user_id) => state
            .repo
            .find_user(user_id)
            .await?
            .is_some_and(|user| user.favorite_news_ids.contains(&news.id)),
        None => false,
    };

    Ok(Json(NewsDetail { news, is_favorite }))
}

/// update_news
///
/// Title, description and category are replaced; the image only when a new file is sent.
#[utoipa::path(
    patch,
    path = "/news/{id}",
    tag = "news",
    params(("id" = String, Path, description = "News id")),
    request_body(content = NewsForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "News updated", body = String),
        (status = 400, description = "Validation failure", body = String),
        (status = 401, description = "Admin token required", body = String),
        (status = 404, description = "News does not exist", body = String)
    )
)]
pub async fn update_news(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormData,
) -> ApiResult<Message> {
    let id = parse_news_id(&id)?;
    let existing = state
        .repo
        .find_news(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("News does not exist"))?;

    let form = RawNewsForm::read(form).await?;
    let fields = check_news_fields(&state, &form).await?;

    let mut image_name = None;
    if let Some(image) = validation::check_image(form.image.as_ref(), false)? {
        let name = image.stored_name();
        state.storage.write(&name, &image.bytes).await?;
        discard_image(&state, &existing.image).await;
        image_name = Some(name);
    }

    state
        .repo
        .update_news(
            &id,
            NewsChanges {
                title: fields.title,
                description: fields.description,
                category_id: fields.category_id,
                image: image_name,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("News does not exist"))?;

    tracing::info!(admin_id = %admin.id, news_id = %id, "News updated");
    Ok(message(StatusCode::OK, "News updated successfully"))
}

/// delete_news
#[utoipa::path(
    delete,
    path = "/news/{id}",
    tag = "news",
    params(("id" = String, Path, description = "News id")),
    responses(
        (status = 200, description = "News deleted", body = String),
        (status = 400, description = "Invalid news id", body = String),
        (status = 401, description = "Admin token required", body = String),
        (status = 404, description = "News does not exist", body = String)
    )
)]
pub async fn delete_news(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    let id = parse_news_id(&id)?;
    let news = state
        .repo
        .find_news(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("News does not exist"))?;

    discard_image(&state, &news.image).await;
    state.repo.delete_news(&id).await?;

    tracing::info!(admin_id = %admin.id, news_id = %id, "News deleted");
    Ok(message(StatusCode::OK, "News deleted successfully"))
}

/// list_comments
///
/// Newest first; `isCommented` marks the caller's own comments.
#[utoipa::path(
    get,
    path = "/news/{id}/comments",
    tag = "news",
    params(("id" = String, Path, description = "News id"), Pagination),
    responses(
        (status = 200, description = "Comments", body = [CommentView]),
        (status = 400, description = "Invalid news id", body = String)
    )
)]
pub async fn list_comments(
    caller: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<CommentView>>> {
    let id = parse_news_id(&id)?;
    let comments = state.repo.list_comments(&id, pagination.page()).await?;

    let views = comments
        .into_iter()
        .map(|comment| CommentView {
            is_commented: caller.id() == Some(&comment.user_id),
            comment,
        })
        .collect();

    Ok(Json(views))
}

/// add_comment
///
/// Stores the caller's current name alongside the comment.
#[utoipa::path(
    post,
    path = "/news/{id}/comments",
    tag = "news",
    params(("id" = String, Path, description = "News id")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment added", body = Comment),
        (status = 400, description = "Validation failure", body = String),
        (status = 401, description = "Unauthorized", body = String),
        (status = 404, description = "Post does not exists", body = String)
    )
)]
pub async fn add_comment(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let text = validation::COMMENT.check(payload.comment.as_ref())?;
    let news_id = parse_news_id(&id)?;

    if state.repo.find_news(&news_id).await?.is_none() {
        return Err(ApiError::not_found("Post does not exists"));
    }

    let user = current_user(&state.repo, &user_id).await?;
    let comment = state
        .repo
        .create_comment(NewComment {
            user_name: user.name,
            comment: text,
            user_id: user.id,
            news_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}
