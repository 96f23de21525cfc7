//! In-memory storage driver: satisfies the same repository contracts as
//! [`crate::repository::postgres`], used for tests and the `storage.driver:
//! memory` configuration. Guarded by a single reader/writer lock; returned
//! entities are cloned so callers can never mutate stored state.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Comment, Post, User};
use crate::error::ServiceResult;
use crate::security::{hash_password, verify_password};

use super::{CommentRepository, PostRepository, UserRepository};

struct Store {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

/// The one in-memory store shared by the three repository facades below
/// (mirrors the source's one-`Store`-three-repos split).
pub struct MemoryStore {
    inner: RwLock<Store>,
}

impl MemoryStore {
    pub fn empty() -> Self {
        Self {
            inner: RwLock::new(Store {
                users: HashMap::new(),
                posts: HashMap::new(),
                comments: HashMap::new(),
            }),
        }
    }

    /// Seeds the well-known end-to-end test user (spec §8 scenario 1):
    /// login `Ivan`, password `MoscowNeverSleep`.
    pub fn seeded() -> Self {
        let store = Self::empty();
        let password_hash = hash_password("MoscowNeverSleep");
        let seed = User {
            id: Uuid::new_v4(),
            login: "Ivan".to_owned(),
            password_hash,
            name: "Иван".to_owned(),
            surname: "Грозный".to_owned(),
        };
        store
            .inner
            .write()
            .expect("lock not poisoned")
            .users
            .insert(seed.id, seed);
        store
    }
}

fn sort_key(created_at: DateTime<Utc>, id: Uuid) -> (std::cmp::Reverse<DateTime<Utc>>, std::cmp::Reverse<Uuid>) {
    (std::cmp::Reverse(created_at), std::cmp::Reverse(id))
}

/// True if `(created_at, id)` sorts strictly after the exclusive lower
/// bound `after` under `(createdAt DESC, id DESC)` ordering.
fn passes_cursor(created_at: DateTime<Utc>, id: Uuid, after: Option<(DateTime<Utc>, Uuid)>) -> bool {
    match after {
        None => true,
        Some((after_created_at, after_id)) => (created_at, id) < (after_created_at, after_id),
    }
}

pub struct MemoryPostRepository {
    store: Arc<MemoryStore>,
}

impl MemoryPostRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn create(&self, author_id: Uuid, text: &str, comments_enabled: bool) -> ServiceResult<Post> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            author_id,
            text: text.to_owned(),
            comments_enabled,
            created_at: now,
            updated_at: now,
        };
        self.store
            .inner
            .write()
            .expect("lock not poisoned")
            .posts
            .insert(post.id, post.clone());
        Ok(post)
    }

    async fn get_by_id(&self, id: Uuid) -> ServiceResult<Option<Post>> {
        Ok(self.store.inner.read().expect("lock not poisoned").posts.get(&id).cloned())
    }

    async fn comments_enabled(&self, post_id: Uuid) -> ServiceResult<Option<bool>> {
        Ok(self
            .store
            .inner
            .read()
            .expect("lock not poisoned")
            .posts
            .get(&post_id)
            .map(|p| p.comments_enabled))
    }

    async fn page(&self, first: i64, after: Option<(DateTime<Utc>, Uuid)>) -> ServiceResult<Vec<Post>> {
        let guard = self.store.inner.read().expect("lock not poisoned");
        let mut posts: Vec<Post> = guard
            .posts
            .values()
            .filter(|p| passes_cursor(p.created_at, p.id, after))
            .cloned()
            .collect();
        drop(guard);
        posts.sort_by_key(|p| sort_key(p.created_at, p.id));
        posts.truncate(first.max(0) as usize);
        Ok(posts)
    }
}

pub struct MemoryCommentRepository {
    store: Arc<MemoryStore>,
}

impl MemoryCommentRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn create_root(&self, post_id: Uuid, author_id: Uuid, text: &str) -> ServiceResult<Comment> {
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            parent_id: None,
            text: text.to_owned(),
            created_at: Utc::now(),
        };
        self.store
            .inner
            .write()
            .expect("lock not poisoned")
            .comments
            .insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn reply(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        parent_id: Uuid,
        text: &str,
    ) -> ServiceResult<Comment> {
        let mut guard = self.store.inner.write().expect("lock not poisoned");
        let parent_belongs_to_post = guard
            .comments
            .get(&parent_id)
            .map(|parent| parent.post_id == post_id)
            .unwrap_or(false);
        if !parent_belongs_to_post {
            return Err(crate::error::ServiceError::ParentNotFound);
        }
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            parent_id: Some(parent_id),
            text: text.to_owned(),
            created_at: Utc::now(),
        };
        guard.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn page(
        &self,
        post_id: Uuid,
        parent_id: Option<Uuid>,
        limit: i64,
        after: Option<(DateTime<Utc>, Uuid)>,
    ) -> ServiceResult<Vec<Comment>> {
        let guard = self.store.inner.read().expect("lock not poisoned");
        let mut comments: Vec<Comment> = guard
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .filter(|c| c.parent_id == parent_id)
            .filter(|c| passes_cursor(c.created_at, c.id, after))
            .cloned()
            .collect();
        drop(guard);
        comments.sort_by_key(|c| sort_key(c.created_at, c.id));
        comments.truncate(limit.max(0) as usize);
        Ok(comments)
    }
}

pub struct MemoryUserRepository {
    store: Arc<MemoryStore>,
}

impl MemoryUserRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn get_all(&self) -> ServiceResult<Vec<User>> {
        Ok(self.store.inner.read().expect("lock not poisoned").users.values().cloned().collect())
    }

    async fn get_by_id(&self, id: Uuid) -> ServiceResult<Option<User>> {
        Ok(self.store.inner.read().expect("lock not poisoned").users.get(&id).cloned())
    }

    async fn get_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<User>> {
        let guard = self.store.inner.read().expect("lock not poisoned");
        Ok(ids
            .iter()
            .filter_map(|raw| Uuid::parse_str(raw).ok())
            .filter_map(|id| guard.users.get(&id).cloned())
            .collect())
    }

    async fn get_by_login_and_password(&self, login: &str, password: &str) -> ServiceResult<Option<User>> {
        let guard = self.store.inner.read().expect("lock not poisoned");
        let Some(user) = guard.users.values().find(|u| u.login == login) else {
            return Ok(None);
        };
        if verify_password(password, &user.password_hash) {
            Ok(Some(user.clone()))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posts_repo() -> (Arc<MemoryStore>, MemoryPostRepository) {
        let store = Arc::new(MemoryStore::empty());
        let repo = MemoryPostRepository::new(store.clone());
        (store, repo)
    }

    #[tokio::test]
    async fn seeded_login_verifies() {
        let store = Arc::new(MemoryStore::seeded());
        let repo = MemoryUserRepository::new(store);
        let user = repo
            .get_by_login_and_password("Ivan", "MoscowNeverSleep")
            .await
            .unwrap();
        assert!(user.is_some());
    }

    #[tokio::test]
    async fn wrong_password_returns_none() {
        let store = Arc::new(MemoryStore::seeded());
        let repo = MemoryUserRepository::new(store);
        let user = repo.get_by_login_and_password("Ivan", "wrong").await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn page_orders_by_created_at_desc_then_id_desc_and_respects_cursor() {
        let (_store, repo) = posts_repo();
        let base = Utc::now();
        let author = Uuid::new_v4();
        // Three posts at the same timestamp: ordering must tie-break on id.
        let mut ids = Vec::new();
        for _ in 0..3 {
            let p = repo.create(author, "hello", true).await.unwrap();
            ids.push(p.id);
        }
        let _ = base;

        let first_page = repo.page(2, None).await.unwrap();
        assert_eq!(first_page.len(), 2);
        assert!(first_page[0].created_at >= first_page[1].created_at);

        let after = (first_page[1].created_at, first_page[1].id);
        let second_page = repo.page(2, Some(after)).await.unwrap();
        assert_eq!(second_page.len(), 1);
    }

    #[tokio::test]
    async fn reply_requires_parent_on_same_post() {
        let store = Arc::new(MemoryStore::empty());
        let posts = MemoryPostRepository::new(store.clone());
        let comments = MemoryCommentRepository::new(store.clone());
        let author = Uuid::new_v4();

        let post_a = posts.create(author, "a", true).await.unwrap();
        let post_b = posts.create(author, "b", true).await.unwrap();
        let root = comments.create_root(post_a.id, author, "root").await.unwrap();

        let ok = comments.reply(post_a.id, author, root.id, "reply").await;
        assert!(ok.is_ok());

        let cross_post = comments.reply(post_b.id, author, root.id, "reply").await;
        assert!(matches!(cross_post, Err(crate::error::ServiceError::ParentNotFound)));
    }
}
