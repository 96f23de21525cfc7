//! Postgres storage driver: keyset-ordered queries backing the same
//! repository contracts as [`crate::repository::memory`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Comment, Post, User};
use crate::error::{ServiceError, ServiceResult};
use crate::security::verify_password;

use super::{CommentRepository, PostRepository, UserRepository};

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    author_id: Uuid,
    text: String,
    without_comment: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            author_id: row.author_id,
            text: row.text,
            comments_enabled: row.without_comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    parent_comment_id: Option<Uuid>,
    text: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            parent_id: row.parent_comment_id,
            text: row.text,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    login: String,
    password_hash: String,
    name: String,
    surname: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            login: row.login,
            password_hash: row.password_hash,
            name: row.name,
            surname: row.surname,
        }
    }
}

pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create(&self, author_id: Uuid, text: &str, comments_enabled: bool) -> ServiceResult<Post> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (author_id, text, without_comment)
            VALUES ($1, $2, $3)
            RETURNING id, author_id, text, without_comment, created_at, updated_at
            "#,
        )
        .bind(author_id)
        .bind(text)
        .bind(comments_enabled)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn get_by_id(&self, id: Uuid) -> ServiceResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, text, without_comment, created_at, updated_at
            FROM posts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn comments_enabled(&self, post_id: Uuid) -> ServiceResult<Option<bool>> {
        let value: Option<bool> = sqlx::query_scalar(
            "SELECT without_comment FROM posts WHERE id = $1",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn page(&self, first: i64, after: Option<(DateTime<Utc>, Uuid)>) -> ServiceResult<Vec<Post>> {
        let (after_created_at, after_id) = match after {
            Some((t, i)) => (Some(t), Some(i)),
            None => (None, None),
        };
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, text, without_comment, created_at, updated_at
            FROM posts
            WHERE $1::timestamptz IS NULL OR (created_at, id) < ($1::timestamptz, $2::uuid)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(after_created_at)
        .bind(after_id)
        .bind(first)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create_root(&self, post_id: Uuid, author_id: Uuid, text: &str) -> ServiceResult<Comment> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (post_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, parent_comment_id, text, created_at
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn reply(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        parent_id: Uuid,
        text: &str,
    ) -> ServiceResult<Comment> {
        // The WHERE EXISTS guard enforces parent.post_id == reply.post_id
        // (spec §9 open question) atomically with the insert.
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (post_id, author_id, parent_comment_id, text)
            SELECT $1, $2, $3, $4
            WHERE EXISTS (SELECT 1 FROM comments WHERE id = $3 AND post_id = $1)
            RETURNING id, post_id, author_id, parent_comment_id, text, created_at
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(parent_id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Into::into).ok_or(ServiceError::ParentNotFound)
    }

    async fn page(
        &self,
        post_id: Uuid,
        parent_id: Option<Uuid>,
        limit: i64,
        after: Option<(DateTime<Utc>, Uuid)>,
    ) -> ServiceResult<Vec<Comment>> {
        let (after_created_at, after_id) = match after {
            Some((t, i)) => (Some(t), Some(i)),
            None => (None, None),
        };
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, post_id, author_id, parent_comment_id, text, created_at
            FROM comments
            WHERE post_id = $1
              AND parent_comment_id IS NOT DISTINCT FROM $2::uuid
              AND ($3::timestamptz IS NULL OR (created_at, id) < ($3::timestamptz, $4::uuid))
            ORDER BY created_at DESC, id DESC
            LIMIT $5
            "#,
        )
        .bind(post_id)
        .bind(parent_id)
        .bind(after_created_at)
        .bind(after_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_all(&self) -> ServiceResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, login, password_hash, name, surname FROM users ORDER BY login",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_by_id(&self, id: Uuid) -> ServiceResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, login, password_hash, name, surname FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn get_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<User>> {
        let parsed: Vec<Uuid> = ids.iter().filter_map(|raw| Uuid::parse_str(raw).ok()).collect();
        if parsed.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, login, password_hash, name, surname FROM users WHERE id = ANY($1)",
        )
        .bind(&parsed)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_by_login_and_password(&self, login: &str, password: &str) -> ServiceResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, login, password_hash, name, surname FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;
        let Some(user) = row.map(User::from) else {
            return Ok(None);
        };
        if verify_password(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}
