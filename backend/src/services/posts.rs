use std::sync::Arc;

use cursor_codec::CursorKey;
use uuid::Uuid;

use crate::domain::Post;
use crate::error::{ServiceError, ServiceResult};
use crate::repository::PostRepository;

const DEFAULT_PAGE_SIZE: i64 = 20;

pub struct PostsService {
    repo: Arc<dyn PostRepository>,
}

impl PostsService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, author_id: Uuid, text: &str, comments_enabled: bool) -> ServiceResult<Post> {
        if author_id.is_nil() {
            return Err(ServiceError::AuthorRequired);
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::TextRequired);
        }
        self.repo.create(author_id, trimmed, comments_enabled).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> ServiceResult<Post> {
        self.repo.get_by_id(id).await?.ok_or(ServiceError::PostNotFound)
    }

    /// Resolves whether `post_id` accepts new comments right now.
    pub async fn can_write_comment(&self, post_id: Uuid) -> ServiceResult<()> {
        let enabled = self
            .repo
            .comments_enabled(post_id)
            .await?
            .ok_or(ServiceError::PostNotFound)?;
        if !enabled {
            return Err(ServiceError::CommentsDisabled);
        }
        Ok(())
    }

    /// Keyset page over posts (spec §4.3). `first <= 0` substitutes the
    /// default page size; an empty `after_cursor` means "from the start".
    pub async fn get_page(&self, first: i64, after_cursor: &str) -> ServiceResult<(Vec<Post>, String, bool)> {
        let first = if first <= 0 { DEFAULT_PAGE_SIZE } else { first };
        let after = if after_cursor.is_empty() {
            None
        } else {
            let key = CursorKey::decode(after_cursor).map_err(|_| ServiceError::InvalidCursor)?;
            Some((key.created_at, key.id))
        };

        let mut posts = self.repo.page(first + 1, after).await?;
        let has_next = posts.len() as i64 > first;
        if has_next {
            posts.truncate(first as usize);
        }
        let end_cursor = posts
            .last()
            .map(|p| CursorKey::new(p.created_at, p.id).encode())
            .unwrap_or_default();
        Ok((posts, end_cursor, has_next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::{MemoryPostRepository, MemoryStore};
    use std::sync::Arc as StdArc;

    fn service() -> PostsService {
        let store = StdArc::new(MemoryStore::empty());
        PostsService::new(StdArc::new(MemoryPostRepository::new(store)))
    }

    #[tokio::test]
    async fn rejects_zero_author_id() {
        let svc = service();
        let err = svc.create(Uuid::nil(), "hello", true).await.unwrap_err();
        assert!(matches!(err, ServiceError::AuthorRequired));
    }

    #[tokio::test]
    async fn rejects_blank_text() {
        let svc = service();
        let err = svc.create(Uuid::new_v4(), "   ", true).await.unwrap_err();
        assert!(matches!(err, ServiceError::TextRequired));
    }

    #[tokio::test]
    async fn page_reports_has_next_and_end_cursor() {
        let svc = service();
        let author = Uuid::new_v4();
        for _ in 0..3 {
            svc.create(author, "hello", true).await.unwrap();
        }
        let (posts, end_cursor, has_next) = svc.get_page(2, "").await.unwrap();
        assert_eq!(posts.len(), 2);
        assert!(has_next);
        assert!(!end_cursor.is_empty());

        let (posts2, _end_cursor2, has_next2) = svc.get_page(2, &end_cursor).await.unwrap();
        assert_eq!(posts2.len(), 1);
        assert!(!has_next2);
    }

    #[tokio::test]
    async fn invalid_cursor_is_rejected() {
        let svc = service();
        let err = svc.get_page(10, "not a cursor").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCursor));
    }
}
