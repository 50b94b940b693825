use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{NewsOrder, NewsQuery, Page, Repository, RepositoryResult};
use crate::{
    id::ObjectId,
    models::{Category, Comment, NewComment, NewNews, NewUser, News, NewsChanges, User},
};

/// InMemoryRepository
///
/// Process-local store used when no database is configured in local mode and by the
/// test-suite. Each collection is kept in insertion order, which also breaks
/// timestamp ties.
#[derive(Default)]
pub struct InMemoryRepository {
    state: RwLock<Collections>,
}

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    categories: Vec<Category>,
    news: Vec<News>,
    comments: Vec<Comment>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully formed user, e.g. an administrator that no API can create.
    pub async fn seed_user(&self, user: User) -> User {
        self.state.write().await.users.push(user.clone());
        user
    }
}

fn window<T>(items: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    items
        .skip(page.skip.max(0) as usize)
        .take(page.limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_user(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| &u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> RepositoryResult<User> {
        let created = User {
            id: ObjectId::new(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            is_admin: false,
            favorite_category_ids: Vec::new(),
            favorite_news_ids: Vec::new(),
        };
        self.state.write().await.users.push(created.clone());
        Ok(created)
    }

    async fn set_password(&self, id: &ObjectId, password_hash: &str) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.iter_mut().find(|u| &u.id == id) {
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn set_password_by_email(&self, email: &str, password_hash: &str) -> RepositoryResult<bool> {
        let mut state = self.state.write().await;
        match state.users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_email(&self, id: &ObjectId, email: &str) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.iter_mut().find(|u| &u.id == id) {
            user.email = email.to_string();
        }
        Ok(())
    }

    async fn set_name(&self, id: &ObjectId, name: &str) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.iter_mut().find(|u| &u.id == id) {
            user.name = name.to_string();
        }
        Ok(())
    }

    async fn push_favorite_news(&self, user_id: &ObjectId, news_id: &ObjectId) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.iter_mut().find(|u| &u.id == user_id) {
            user.favorite_news_ids.push(news_id.clone());
        }
        Ok(())
    }

    async fn pull_favorite_news(&self, user_id: &ObjectId, news_id: &ObjectId) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.iter_mut().find(|u| &u.id == user_id) {
            user.favorite_news_ids.retain(|id| id != news_id);
        }
        Ok(())
    }

    async fn set_favorite_categories(&self, user_id: &ObjectId, ids: &[ObjectId]) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.iter_mut().find(|u| &u.id == user_id) {
            user.favorite_category_ids = ids.to_vec();
        }
        Ok(())
    }

    async fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        Ok(self.state.read().await.categories.clone())
    }

    async fn find_category(&self, id: &ObjectId) -> RepositoryResult<Option<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.iter().find(|c| &c.id == id).cloned())
    }

    async fn find_category_by_name(&self, name: &str) -> RepositoryResult<Option<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.iter().find(|c| c.name == name).cloned())
    }

    async fn create_category(&self, name: &str) -> RepositoryResult<Category> {
        let category = Category {
            id: ObjectId::new(),
            name: name.to_string(),
        };
        self.state.write().await.categories.push(category.clone());
        Ok(category)
    }

    async fn rename_category(&self, id: &ObjectId, name: &str) -> RepositoryResult<bool> {
        let mut state = self.state.write().await;
        match state.categories.iter_mut().find(|c| &c.id == id) {
            Some(category) => {
                category.name = name.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_category(&self, id: &ObjectId) -> RepositoryResult<bool> {
        let mut state = self.state.write().await;
        let before = state.categories.len();
        state.categories.retain(|c| &c.id != id);
        Ok(state.categories.len() < before)
    }

    async fn count_categories(&self, ids: &[ObjectId]) -> RepositoryResult<u64> {
        let state = self.state.read().await;
        Ok(state.categories.iter().filter(|c| ids.contains(&c.id)).count() as u64)
    }

    async fn query_news(&self, query: &NewsQuery) -> RepositoryResult<Vec<News>> {
        let state = self.state.read().await;

        let mut matching: Vec<&News> = state
            .news
            .iter()
            .filter(|n| query.category_ids.as_ref().is_none_or(|ids| ids.contains(&n.category_id)))
            .filter(|n| query.ids.as_ref().is_none_or(|ids| ids.contains(&n.id)))
            .filter(|n| query.title.as_ref().is_none_or(|title| &n.title == title))
            .collect();

        // Stable sort: equal timestamps keep insertion order.
        matching.sort_by_key(|n| n.created_at);
        if query.order == NewsOrder::Newest {
            matching.reverse();
        }

        Ok(window(matching.into_iter().cloned(), query.page))
    }

    async fn find_news(&self, id: &ObjectId) -> RepositoryResult<Option<News>> {
        let state = self.state.read().await;
        Ok(state.news.iter().find(|n| &n.id == id).cloned())
    }

    async fn create_news(&self, news: NewNews) -> RepositoryResult<News> {
        let created = News {
            id: ObjectId::new(),
            title: news.title,
            description: news.description,
            created_at: Utc::now(),
            image: news.image,
            category_id: news.category_id,
        };
        self.state.write().await.news.push(created.clone());
        Ok(created)
    }

    async fn update_news(&self, id: &ObjectId, changes: NewsChanges) -> RepositoryResult<Option<News>> {
        let mut state = self.state.write().await;
        let Some(news) = state.news.iter_mut().find(|n| &n.id == id) else {
            return Ok(None);
        };

        news.title = changes.title;
        news.description = changes.description;
        news.category_id = changes.category_id;
        if let Some(image) = changes.image {
            news.image = image;
        }
        Ok(Some(news.clone()))
    }

    async fn delete_news(&self, id: &ObjectId) -> RepositoryResult<bool> {
        let mut state = self.state.write().await;
        let before = state.news.len();
        state.news.retain(|n| &n.id != id);
        Ok(state.news.len() < before)
    }

    async fn list_comments(&self, news_id: &ObjectId, page: Page) -> RepositoryResult<Vec<Comment>> {
        let state = self.state.read().await;

        let mut matching: Vec<&Comment> = state.comments.iter().filter(|c| &c.news_id == news_id).collect();
        matching.sort_by_key(|c| c.commented_at);
        matching.reverse();

        Ok(window(matching.into_iter().cloned(), page))
    }

    async fn create_comment(&self, comment: NewComment) -> RepositoryResult<Comment> {
        let created = Comment {
            id: ObjectId::new(),
            user_name: comment.user_name,
            comment: comment.comment,
            user_id: comment.user_id,
            news_id: comment.news_id,
            commented_at: Utc::now(),
        };
        self.state.write().await.comments.push(created.clone());
        Ok(created)
    }

    async fn rename_comment_author(&self, user_id: &ObjectId, name: &str) -> RepositoryResult<u64> {
        let mut state = self.state.write().await;
        let mut renamed = 0;
        for comment in state.comments.iter_mut().filter(|c| &c.user_id == user_id) {
            comment.user_name = name.to_string();
            renamed += 1;
        }
        Ok(renamed)
    }
}
