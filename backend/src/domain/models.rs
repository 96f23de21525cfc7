use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A registered account. `password_hash` never leaves this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    pub password_hash: String,
    pub name: String,
    pub surname: String,
}

/// A post. `comments_enabled` is the corrected name for the storage
/// layer's `without_comment` column: despite the name, the column has
/// always meant "comments are allowed on this post" (see DESIGN.md).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub comments_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment, optionally a reply to another comment on the same post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
