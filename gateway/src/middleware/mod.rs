mod auth;

pub use auth::{AuthMiddleware, Identity};
