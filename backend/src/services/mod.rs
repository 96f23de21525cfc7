pub mod auth;
pub mod comments;
pub mod posts;
pub mod users;

pub use auth::AuthService;
pub use comments::CommentsService;
pub use posts::PostsService;
pub use users::UsersService;
