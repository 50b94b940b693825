use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};

use super::{NewsOrder, NewsQuery, Page, Repository, RepositoryResult};
use crate::{
    id::ObjectId,
    models::{Category, Comment, NewComment, NewNews, NewUser, News, NewsChanges, User},
};

/// PostgresRepository
///
/// Document-style store on Postgres. Ids are `TEXT` object ids and favorite sets are
/// `TEXT[]` columns; there are no foreign keys, matching document-store semantics.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_user(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, name, email, password_hash, is_admin, favorite_category_ids, favorite_news_ids
               FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, name, email, password_hash, is_admin, favorite_category_ids, favorite_news_ids
               FROM users WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> RepositoryResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, name, email, password_hash)
               VALUES ($1, $2, $3, $4)
               RETURNING id, name, email, password_hash, is_admin, favorite_category_ids, favorite_news_ids"#,
        )
        .bind(ObjectId::new())
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn set_password(&self, id: &ObjectId, password_hash: &str) -> RepositoryResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_password_by_email(&self, email: &str, password_hash: &str) -> RepositoryResult<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE email = $1")
            .bind(email)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_email(&self, id: &ObjectId, email: &str) -> RepositoryResult<()> {
        sqlx::query("UPDATE users SET email = $2 WHERE id = $1")
            .bind(id)
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_name(&self, id: &ObjectId, name: &str) -> RepositoryResult<()> {
        sqlx::query("UPDATE users SET name = $2 WHERE id = $1")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn push_favorite_news(&self, user_id: &ObjectId, news_id: &ObjectId) -> RepositoryResult<()> {
        sqlx::query("UPDATE users SET favorite_news_ids = array_append(favorite_news_ids, $2) WHERE id = $1")
            .bind(user_id)
            .bind(news_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn pull_favorite_news(&self, user_id: &ObjectId, news_id: &ObjectId) -> RepositoryResult<()> {
        sqlx::query("UPDATE users SET favorite_news_ids = array_remove(favorite_news_ids, $2) WHERE id = $1")
            .bind(user_id)
            .bind(news_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_favorite_categories(&self, user_id: &ObjectId, ids: &[ObjectId]) -> RepositoryResult<()> {
        sqlx::query("UPDATE users SET favorite_category_ids = $2 WHERE id = $1")
            .bind(user_id)
            .bind(ids.to_vec())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn find_category(&self, id: &ObjectId) -> RepositoryResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn find_category_by_name(&self, name: &str) -> RepositoryResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn create_category(&self, name: &str) -> RepositoryResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(ObjectId::new())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    async fn rename_category(&self, id: &ObjectId, name: &str) -> RepositoryResult<bool> {
        let result = sqlx::query("UPDATE categories SET name = $2 WHERE id = $1")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_category(&self, id: &ObjectId) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_categories(&self, ids: &[ObjectId]) -> RepositoryResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    /// query_news
    ///
    /// Builds the listing query with `QueryBuilder` so every filter value is bound, never interpolated.
    async fn query_news(&self, query: &NewsQuery) -> RepositoryResult<Vec<News>> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            "SELECT id, title, description, created_at, image, category_id FROM news WHERE TRUE",
        );

        if let Some(category_ids) = &query.category_ids {
            builder.push(" AND category_id = ANY(");
            builder.push_bind(category_ids.clone());
            builder.push(")");
        }

        if let Some(ids) = &query.ids {
            builder.push(" AND id = ANY(");
            builder.push_bind(ids.clone());
            builder.push(")");
        }

        if let Some(title) = &query.title {
            builder.push(" AND title = ");
            builder.push_bind(title.clone());
        }

        builder.push(match query.order {
            NewsOrder::Newest => " ORDER BY created_at DESC, id DESC",
            NewsOrder::Oldest => " ORDER BY created_at ASC, id ASC",
        });

        let Page { limit, skip } = query.page;
        builder.push(" LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(skip);

        let news = builder.build_query_as::<News>().fetch_all(&self.pool).await?;
        Ok(news)
    }

    async fn find_news(&self, id: &ObjectId) -> RepositoryResult<Option<News>> {
        let news = sqlx::query_as::<_, News>(
            "SELECT id, title, description, created_at, image, category_id FROM news WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(news)
    }

    async fn create_news(&self, news: NewNews) -> RepositoryResult<News> {
        let created = sqlx::query_as::<_, News>(
            r#"INSERT INTO news (id, title, description, created_at, image, category_id)
               VALUES ($1, $2, $3, NOW(), $4, $5)
               RETURNING id, title, description, created_at, image, category_id"#,
        )
        .bind(ObjectId::new())
        .bind(news.title)
        .bind(news.description)
        .bind(news.image)
        .bind(news.category_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// update_news
    ///
    /// Replaces the editable fields; `COALESCE` keeps the stored image when no new one was uploaded.
    async fn update_news(&self, id: &ObjectId, changes: NewsChanges) -> RepositoryResult<Option<News>> {
        let updated = sqlx::query_as::<_, News>(
            r#"UPDATE news
               SET title = $2,
                   description = $3,
                   category_id = $4,
                   image = COALESCE($5, image)
               WHERE id = $1
               RETURNING id, title, description, created_at, image, category_id"#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.category_id)
        .bind(changes.image)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_news(&self, id: &ObjectId) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_comments(&self, news_id: &ObjectId, page: Page) -> RepositoryResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"SELECT id, user_name, comment, user_id, news_id, commented_at
               FROM comments
               WHERE news_id = $1
               ORDER BY commented_at DESC, id DESC
               LIMIT $2 OFFSET $3"#,
        )
        .bind(news_id)
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn create_comment(&self, comment: NewComment) -> RepositoryResult<Comment> {
        let created = sqlx::query_as::<_, Comment>(
            r#"INSERT INTO comments (id, user_name, comment, user_id, news_id, commented_at)
               VALUES ($1, $2, $3, $4, $5, NOW())
               RETURNING id, user_name, comment, user_id, news_id, commented_at"#,
        )
        .bind(ObjectId::new())
        .bind(comment.user_name)
        .bind(comment.comment)
        .bind(comment.user_id)
        .bind(comment.news_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn rename_comment_author(&self, user_id: &ObjectId, name: &str) -> RepositoryResult<u64> {
        let result = sqlx::query("UPDATE comments SET user_name = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
