use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::{
    id::ObjectId,
    models::{Category, Comment, NewComment, NewNews, NewUser, News, NewsChanges, User},
};

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// RepositoryError
///
/// Any failure of the backing store. Handlers never inspect it; it maps to a 500.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Page
///
/// Normalised `limit`/`skip` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub skip: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self { limit: 10, skip: 0 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NewsOrder {
    #[default]
    Newest,
    Oldest,
}

/// NewsQuery
///
/// Filter, order and window for news listings. Every `Some` filter narrows the result.
#[derive(Debug, Clone, Default)]
pub struct NewsQuery {
    pub category_ids: Option<Vec<ObjectId>>,
    pub ids: Option<Vec<ObjectId>>,
    // Exact title match.
    pub title: Option<String>,
    pub order: NewsOrder,
    pub page: Page,
}

/// Repository Trait
///
/// The document-store contract. Handlers only talk to `Arc<dyn Repository>`, so the
/// Postgres store and the in-memory store are interchangeable.
///
/// Uniqueness (user email, category name) is checked by the callers before writing;
/// the check and the write are not atomic.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn find_user(&self, id: &ObjectId) -> RepositoryResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn create_user(&self, user: NewUser) -> RepositoryResult<User>;
    async fn set_password(&self, id: &ObjectId, password_hash: &str) -> RepositoryResult<()>;
    // Returns false when no user has that email.
    async fn set_password_by_email(&self, email: &str, password_hash: &str) -> RepositoryResult<bool>;
    async fn set_email(&self, id: &ObjectId, email: &str) -> RepositoryResult<()>;
    async fn set_name(&self, id: &ObjectId, name: &str) -> RepositoryResult<()>;

    // --- Favorites ---
    // Appends unconditionally; callers check membership first.
    async fn push_favorite_news(&self, user_id: &ObjectId, news_id: &ObjectId) -> RepositoryResult<()>;
    // Removing an id that is not present is a no-op.
    async fn pull_favorite_news(&self, user_id: &ObjectId, news_id: &ObjectId) -> RepositoryResult<()>;
    async fn set_favorite_categories(&self, user_id: &ObjectId, ids: &[ObjectId]) -> RepositoryResult<()>;

    // --- Categories ---
    async fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
    async fn find_category(&self, id: &ObjectId) -> RepositoryResult<Option<Category>>;
    async fn find_category_by_name(&self, name: &str) -> RepositoryResult<Option<Category>>;
    async fn create_category(&self, name: &str) -> RepositoryResult<Category>;
    async fn rename_category(&self, id: &ObjectId, name: &str) -> RepositoryResult<bool>;
    async fn delete_category(&self, id: &ObjectId) -> RepositoryResult<bool>;
    // Number of stored categories whose id is in `ids`.
    async fn count_categories(&self, ids: &[ObjectId]) -> RepositoryResult<u64>;

    // --- News ---
    async fn query_news(&self, query: &NewsQuery) -> RepositoryResult<Vec<News>>;
    async fn find_news(&self, id: &ObjectId) -> RepositoryResult<Option<News>>;
    async fn create_news(&self, news: NewNews) -> RepositoryResult<News>;
    async fn update_news(&self, id: &ObjectId, changes: NewsChanges) -> RepositoryResult<Option<News>>;
    async fn delete_news(&self, id: &ObjectId) -> RepositoryResult<bool>;

    // --- Comments ---
    // Newest first.
    async fn list_comments(&self, news_id: &ObjectId, page: Page) -> RepositoryResult<Vec<Comment>>;
    async fn create_comment(&self, comment: NewComment) -> RepositoryResult<Comment>;
    // Re-syncs the denormalized `user_name` on every comment by `user_id`.
    async fn rename_comment_author(&self, user_id: &ObjectId, name: &str) -> RepositoryResult<u64>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
