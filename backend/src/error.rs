use thiserror::Error;
use tonic::Status;

/// Domain error taxonomy (spec §7). RPC handlers map each kind to a status
/// code; services never construct a `tonic::Status` directly.
#[derive(Debug, Error)]
pub enum ServiceError {
    // -- validation --
    #[error("authorID is required")]
    AuthorRequired,
    #[error("text is required")]
    TextRequired,
    #[error("text max 2000 symbols")]
    TextTooLong,
    #[error("postID is required")]
    PostRequired,
    #[error("parentID is required")]
    ParentRequired,
    #[error("invalid cursor")]
    InvalidCursor,
    #[error("invalid parent id")]
    InvalidParentId,
    #[error("first must not be negative")]
    BadFirst,
    #[error("malformed uuid: {0}")]
    MalformedUuid(String),

    // -- authentication --
    #[error("login or password is empty")]
    EmptyCredentials,
    #[error("login or password is incorrect")]
    BadCredentials,

    // -- authorization / permission --
    #[error("comments are disabled on this post")]
    CommentsDisabled,

    // -- not found --
    #[error("user not found")]
    UserNotFound,
    #[error("post not found")]
    PostNotFound,
    #[error("parent comment not found")]
    ParentNotFound,

    // -- infrastructure --
    #[error("storage failure: {0}")]
    StorageFailure(#[from] sqlx::Error),
    #[error("rpc failure: {0}")]
    RpcFailure(String),
    #[error("token sign failure: {0}")]
    TokenSignFailure(#[from] token_auth::TokenError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<ServiceError> for Status {
    fn from(err: ServiceError) -> Self {
        use ServiceError::*;
        match err {
            AuthorRequired
            | TextRequired
            | TextTooLong
            | PostRequired
            | ParentRequired
            | InvalidCursor
            | InvalidParentId
            | BadFirst
            | MalformedUuid(_) => Status::invalid_argument(err.to_string()),
            EmptyCredentials => Status::invalid_argument(err.to_string()),
            BadCredentials => Status::unauthenticated("invalid login or password"),
            CommentsDisabled => Status::permission_denied(err.to_string()),
            UserNotFound | PostNotFound | ParentNotFound => Status::not_found(err.to_string()),
            StorageFailure(_) | RpcFailure(_) | TokenSignFailure(_) => {
                Status::internal("internal error")
            }
        }
    }
}
