use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::id::ObjectId;

// --- Stored Documents ---

/// User
///
/// The full account record as held by the store. Carries the password hash, so it is
/// never serialized; responses use [`UserProfile`].
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: ObjectId,
    pub name: String,
    // Unique across all users.
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    // Set semantics: duplicates are rejected before insert.
    pub favorite_category_ids: Vec<ObjectId>,
    pub favorite_news_ids: Vec<ObjectId>,
}

/// UserProfile
///
/// Public projection of [`User`]: every field except the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserProfile {
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub favorite_category_ids: Vec<ObjectId>,
    pub favorite_news_ids: Vec<ObjectId>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            is_admin: user.is_admin,
            favorite_category_ids: user.favorite_category_ids,
            favorite_news_ids: user.favorite_news_ids,
        }
    }
}

/// Category
///
/// A flat taxonomy entry. `name` is unique and 2-20 characters after trimming.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    pub id: ObjectId,
    pub name: String,
}

/// News
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct News {
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    // Stored file name inside the `uploads/` namespace.
    pub image: String,
    pub category_id: ObjectId,
}

/// NewsSummary
///
/// Listing projection of [`News`]; the description is left out of feeds.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewsSummary {
    pub id: ObjectId,
    pub title: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub image: String,
    pub category_id: ObjectId,
}

impl From<News> for NewsSummary {
    fn from(news: News) -> Self {
        Self {
            id: news.id,
            title: news.title,
            created_at: news.created_at,
            image: news.image,
            category_id: news.category_id,
        }
    }
}

/// NewsDetail
///
/// A single article as seen by a particular caller. `is_favorite` is false for
/// anonymous callers.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewsDetail {
    #[serde(flatten)]
    pub news: News,
    pub is_favorite: bool,
}

/// Comment
///
/// `user_name` is a snapshot of the author's name, re-synced when the author renames.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Comment {
    pub id: ObjectId,
    pub user_name: String,
    pub comment: String,
    pub user_id: ObjectId,
    pub news_id: ObjectId,
    #[ts(type = "string")]
    pub commented_at: DateTime<Utc>,
}

/// CommentView
///
/// A comment plus whether the current caller wrote it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub is_commented: bool,
}

// --- Store Inputs ---

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewNews {
    pub title: String,
    pub description: String,
    pub image: String,
    pub category_id: ObjectId,
}

/// NewsChanges
///
/// Full replacement of the editable fields; `image` is only `Some` when a new file was uploaded.
#[derive(Debug, Clone)]
pub struct NewsChanges {
    pub title: String,
    pub description: String,
    pub category_id: ObjectId,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub user_name: String,
    pub comment: String,
    pub user_id: ObjectId,
    pub news_id: ObjectId,
}

// --- Token Responses ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

// --- Request Payloads (Input Schemas) ---
//
// Fields are kept as raw JSON values so the validation layer can tell "missing"
// from "wrong type" and answer with the matching message.

#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
pub struct LoginRequest {
    #[schema(value_type = Option<String>, example = "reader@example.com")]
    pub email: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub password: Option<Value>,
}

/// EmailRequest
///
/// Body of `/account/forgot-password-link` and `/account/sign-up-link`.
#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
pub struct EmailRequest {
    #[schema(value_type = Option<String>, example = "reader@example.com")]
    pub email: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[schema(value_type = Option<String>)]
    pub new_password: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
pub struct SignUpRequest {
    #[schema(value_type = Option<String>, example = "Alice")]
    pub name: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub password: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[schema(value_type = Option<String>)]
    pub old_password: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub new_password: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
pub struct ChangeEmailRequest {
    #[schema(value_type = Option<String>)]
    pub email: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub password: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
pub struct EditAccountRequest {
    #[schema(value_type = Option<String>)]
    pub name: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteCategoriesRequest {
    #[schema(value_type = Option<Vec<String>>)]
    pub category_ids: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
pub struct CategoryRequest {
    #[schema(value_type = Option<String>, example = "Politics")]
    pub name: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
pub struct CommentRequest {
    #[schema(value_type = Option<String>)]
    pub comment: Option<Value>,
}

/// NewsForm
///
/// Documentation shape of the multipart body accepted by `POST /news` and `PATCH /news/{id}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsForm {
    pub title: String,
    pub description: String,
    pub category_id: String,
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}
