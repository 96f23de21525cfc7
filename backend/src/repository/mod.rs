pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Comment, Post, User};
use crate::error::ServiceResult;

/// Storage-agnostic contract for posts. Both the Postgres driver and the
/// in-memory driver satisfy this identically (spec §4.2).
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(
        &self,
        author_id: Uuid,
        text: &str,
        comments_enabled: bool,
    ) -> ServiceResult<Post>;

    async fn get_by_id(&self, id: Uuid) -> ServiceResult<Option<Post>>;

    /// Returns `Ok(None)` if the post does not exist.
    async fn comments_enabled(&self, post_id: Uuid) -> ServiceResult<Option<bool>>;

    /// Keyset page ordered `(createdAt DESC, id DESC)`. `first` is the
    /// number of rows requested, not `first + 1`: callers wanting an
    /// overflow probe pass `first + 1` and trim themselves.
    async fn page(
        &self,
        first: i64,
        after: Option<(DateTime<Utc>, Uuid)>,
    ) -> ServiceResult<Vec<Post>>;
}

/// Storage-agnostic contract for comments (spec §4.2).
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create_root(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        text: &str,
    ) -> ServiceResult<Comment>;

    /// Inserts a reply under `parent_id`. Implementations must verify the
    /// parent exists and belongs to `post_id`, returning
    /// [`crate::error::ServiceError::ParentNotFound`] otherwise (spec §9
    /// open question: parent-same-post).
    async fn reply(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        parent_id: Uuid,
        text: &str,
    ) -> ServiceResult<Comment>;

    /// `parent_id = None` returns only root comments on `post_id`;
    /// `Some(id)` returns only direct children of `id`. `limit` is the raw
    /// row count requested (service layer passes `first + 1`).
    async fn page(
        &self,
        post_id: Uuid,
        parent_id: Option<Uuid>,
        limit: i64,
        after: Option<(DateTime<Utc>, Uuid)>,
    ) -> ServiceResult<Vec<Comment>>;
}

/// Storage-agnostic contract for users (spec §4.2).
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_all(&self) -> ServiceResult<Vec<User>>;
    async fn get_by_id(&self, id: Uuid) -> ServiceResult<Option<User>>;

    /// Ids that don't parse as UUIDs are silently ignored; ids with no
    /// matching row are simply omitted from the result.
    async fn get_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<User>>;

    /// Verifies `password` against the stored hash internally; returns
    /// `Ok(None)` on either an unknown login or a password mismatch (the
    /// caller cannot distinguish the two, matching spec §4.2).
    async fn get_by_login_and_password(
        &self,
        login: &str,
        password: &str,
    ) -> ServiceResult<Option<User>>;
}
