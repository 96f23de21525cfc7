use std::sync::Arc;

use uuid::Uuid;

use crate::domain::User;
use crate::error::ServiceResult;
use crate::repository::UserRepository;

/// Thin pass-through over the user repository; no validation lives here
/// beyond what the repository already guarantees (spec §4.2).
pub struct UsersService {
    repo: Arc<dyn UserRepository>,
}

impl UsersService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<User>> {
        self.repo.get_all().await
    }

    pub async fn get_by_id(&self, id: Uuid) -> ServiceResult<Option<User>> {
        self.repo.get_by_id(id).await
    }

    pub async fn get_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<User>> {
        self.repo.get_by_ids(ids).await
    }
}
