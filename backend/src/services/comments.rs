use std::sync::Arc;

use cursor_codec::CursorKey;
use uuid::Uuid;

use crate::domain::Comment;
use crate::error::{ServiceError, ServiceResult};
use crate::repository::{CommentRepository, PostRepository};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;
const MAX_TEXT_CODE_POINTS: usize = 2000;

pub struct CommentsService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentsService {
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    /// Validation order per spec §4.4: trim/empty, length, then the
    /// caller checks identity fields in order (author, post, [parent]).
    fn validate_text(text: &str) -> ServiceResult<String> {
        let trimmed = text.trim().to_owned();
        if trimmed.is_empty() {
            return Err(ServiceError::TextRequired);
        }
        if trimmed.chars().count() > MAX_TEXT_CODE_POINTS {
            return Err(ServiceError::TextTooLong);
        }
        Ok(trimmed)
    }

    /// Creates a root comment. Checks `CanWriteComment` — replies do not
    /// (mirrors the source: only the root-comment path enforces the
    /// post's comment-permission flag).
    pub async fn create(&self, post_id: Uuid, author_id: Uuid, text: &str) -> ServiceResult<Comment> {
        let text = Self::validate_text(text)?;
        if author_id.is_nil() {
            return Err(ServiceError::AuthorRequired);
        }
        if post_id.is_nil() {
            return Err(ServiceError::PostRequired);
        }

        let enabled = self
            .posts
            .comments_enabled(post_id)
            .await?
            .ok_or(ServiceError::PostNotFound)?;
        if !enabled {
            return Err(ServiceError::CommentsDisabled);
        }

        self.comments.create_root(post_id, author_id, &text).await
    }

    pub async fn reply(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        parent_id: Uuid,
        text: &str,
    ) -> ServiceResult<Comment> {
        let text = Self::validate_text(text)?;
        if author_id.is_nil() {
            return Err(ServiceError::AuthorRequired);
        }
        if post_id.is_nil() {
            return Err(ServiceError::PostRequired);
        }
        if parent_id.is_nil() {
            return Err(ServiceError::ParentRequired);
        }

        self.comments.reply(post_id, author_id, parent_id, &text).await
    }

    /// Keyset page over a post's comments (spec §4.4). `parent_id = None`
    /// returns only root comments.
    pub async fn get_page(
        &self,
        post_id: Uuid,
        parent_id: Option<Uuid>,
        first: i64,
        after_cursor: &str,
    ) -> ServiceResult<(Vec<Comment>, String, bool)> {
        let first = match first {
            0 => DEFAULT_PAGE_SIZE,
            n if n < 0 => return Err(ServiceError::BadFirst),
            n => n.min(MAX_PAGE_SIZE),
        };
        let after = if after_cursor.is_empty() {
            None
        } else {
            let key = CursorKey::decode(after_cursor).map_err(|_| ServiceError::InvalidCursor)?;
            Some((key.created_at, key.id))
        };

        let mut comments = self.comments.page(post_id, parent_id, first + 1, after).await?;
        let has_next = comments.len() as i64 > first;
        if has_next {
            comments.truncate(first as usize);
        }
        let end_cursor = comments
            .last()
            .map(|c| CursorKey::new(c.created_at, c.id).encode())
            .unwrap_or_default();
        Ok((comments, end_cursor, has_next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::{MemoryCommentRepository, MemoryPostRepository, MemoryStore};
    use std::sync::Arc as StdArc;

    fn service() -> (CommentsService, PostsServiceStub) {
        let store = StdArc::new(MemoryStore::empty());
        let posts_repo: StdArc<dyn PostRepository> = StdArc::new(MemoryPostRepository::new(store.clone()));
        let comments_repo: StdArc<dyn CommentRepository> =
            StdArc::new(MemoryCommentRepository::new(store.clone()));
        (
            CommentsService::new(comments_repo, posts_repo.clone()),
            PostsServiceStub { repo: posts_repo },
        )
    }

    struct PostsServiceStub {
        repo: StdArc<dyn PostRepository>,
    }

    #[tokio::test]
    async fn create_rejects_blank_text() {
        let (svc, _posts) = service();
        let err = svc.create(Uuid::new_v4(), Uuid::new_v4(), "   ").await.unwrap_err();
        assert!(matches!(err, ServiceError::TextRequired));
    }

    #[tokio::test]
    async fn create_rejects_text_over_2000_code_points() {
        let (svc, _posts) = service();
        let long_text: String = std::iter::repeat('a').take(2001).collect();
        let err = svc
            .create(Uuid::new_v4(), Uuid::new_v4(), &long_text)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::TextTooLong));
    }

    #[tokio::test]
    async fn create_rejects_zero_author() {
        let (svc, _posts) = service();
        let err = svc.create(Uuid::new_v4(), Uuid::nil(), "hi").await.unwrap_err();
        assert!(matches!(err, ServiceError::AuthorRequired));
    }

    #[tokio::test]
    async fn reply_rejects_zero_parent_id() {
        let (svc, _posts) = service();
        let err = svc
            .reply(Uuid::new_v4(), Uuid::new_v4(), Uuid::nil(), "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ParentRequired));
    }

    #[tokio::test]
    async fn create_denied_when_post_disallows_comments() {
        let (svc, posts) = service();
        let author = Uuid::new_v4();
        let post = posts.repo.create(author, "hello", false).await.unwrap();
        let err = svc.create(post.id, author, "hi").await.unwrap_err();
        assert!(matches!(err, ServiceError::CommentsDisabled));
    }

    #[tokio::test]
    async fn root_then_reply_builds_a_thread() {
        let (svc, posts) = service();
        let author = Uuid::new_v4();
        let post = posts.repo.create(author, "hello", true).await.unwrap();

        let root = svc.create(post.id, author, "root").await.unwrap();
        assert_eq!(root.parent_id, None);

        let reply = svc.reply(post.id, author, root.id, "reply").await.unwrap();
        assert_eq!(reply.parent_id, Some(root.id));

        let (roots, _, _) = svc.get_page(post.id, None, 10, "").await.unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, root.id);

        let (replies, _, _) = svc.get_page(post.id, Some(root.id), 10, "").await.unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].id, reply.id);
    }
}
