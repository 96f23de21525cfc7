use std::sync::Arc;

use token_auth::TokenService;

use crate::error::{ServiceError, ServiceResult};
use crate::repository::UserRepository;

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    pub async fn login(&self, login: &str, password: &str) -> ServiceResult<String> {
        if login.is_empty() || password.is_empty() {
            return Err(ServiceError::EmptyCredentials);
        }

        let user = self
            .users
            .get_by_login_and_password(login, password)
            .await?
            .ok_or(ServiceError::BadCredentials)?;

        self.tokens
            .issue(user.id, &user.login, &user.name, &user.surname)
            .map_err(Into::into)
    }
}
