//! Wires the four RPC services (spec §4.9) onto the domain service layer:
//! UUID parsing at the boundary, error-to-status mapping, and protobuf
//! `Timestamp` serialization.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rpc_proto::social::{
    auth_service_server::AuthService as AuthServiceTrait,
    comment_service_server::CommentService as CommentServiceTrait,
    post_service_server::PostService as PostServiceTrait,
    user_service_server::UserService as UserServiceTrait,
    Comment as ProtoComment, CreateCommentRequest, CreateCommentResponse, CreatePostRequest,
    CreatePostResponse, GetCommentsRequest, GetCommentsResponse, GetPostRequest, GetPostResponse,
    GetPostsRequest, GetPostsResponse, GetUsersRequest, GetUsersResponse, LoginRequest,
    LoginResponse, Post as ProtoPost, User as ProtoUser,
};
use tonic::{Request, Response, Status};
use uuid::Uuid;

use crate::domain::{Comment, Post, User};
use crate::error::ServiceError;
use crate::services::{AuthService, CommentsService, PostsService, UsersService};

fn parse_uuid(raw: &str, field: &str) -> Result<Uuid, Status> {
    Uuid::parse_str(raw).map_err(|_| Status::invalid_argument(format!("{field} must be a valid UUID")))
}

fn timestamp(dt: DateTime<Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: dt.timestamp(),
        nanos: dt.timestamp_subsec_nanos() as i32,
    }
}

fn to_proto_user(u: User) -> ProtoUser {
    ProtoUser {
        id: u.id.to_string(),
        login: u.login,
        name: u.name,
        surname: u.surname,
    }
}

fn to_proto_post(p: Post) -> ProtoPost {
    ProtoPost {
        id: p.id.to_string(),
        author_id: p.author_id.to_string(),
        text: p.text,
        without_comment: p.comments_enabled,
        created_at: Some(timestamp(p.created_at)),
        updated_at: Some(timestamp(p.updated_at)),
    }
}

fn to_proto_comment(c: Comment) -> ProtoComment {
    ProtoComment {
        id: c.id.to_string(),
        post_id: c.post_id.to_string(),
        author_id: c.author_id.to_string(),
        parent_id: c.parent_id.map(|id| id.to_string()).unwrap_or_default(),
        text: c.text,
        created_at: Some(timestamp(c.created_at)),
    }
}

#[derive(Clone)]
pub struct RpcHandlers {
    pub auth: Arc<AuthService>,
    pub users: Arc<UsersService>,
    pub posts: Arc<PostsService>,
    pub comments: Arc<CommentsService>,
}

#[tonic::async_trait]
impl AuthServiceTrait for RpcHandlers {
    async fn login(&self, request: Request<LoginRequest>) -> Result<Response<LoginResponse>, Status> {
        let req = request.into_inner();
        let token = self.auth.login(&req.login, &req.password).await?;
        Ok(Response::new(LoginResponse { token }))
    }
}

#[tonic::async_trait]
impl UserServiceTrait for RpcHandlers {
    async fn get_users(
        &self,
        request: Request<GetUsersRequest>,
    ) -> Result<Response<GetUsersResponse>, Status> {
        let req = request.into_inner();
        let users = self.users.get_by_ids(&req.ids).await?;
        Ok(Response::new(GetUsersResponse {
            users: users.into_iter().map(to_proto_user).collect(),
        }))
    }
}

#[tonic::async_trait]
impl PostServiceTrait for RpcHandlers {
    async fn create_post(
        &self,
        request: Request<CreatePostRequest>,
    ) -> Result<Response<CreatePostResponse>, Status> {
        let req = request.into_inner();
        let author_id = parse_uuid(&req.author_id, "author_id")?;
        let post = self
            .posts
            .create(author_id, &req.text, req.without_comment)
            .await?;
        Ok(Response::new(CreatePostResponse {
            post: Some(to_proto_post(post)),
        }))
    }

    async fn get_post(
        &self,
        request: Request<GetPostRequest>,
    ) -> Result<Response<GetPostResponse>, Status> {
        let req = request.into_inner();
        let id = parse_uuid(&req.id, "id")?;
        let post = self.posts.get_by_id(id).await?;
        Ok(Response::new(GetPostResponse {
            post: Some(to_proto_post(post)),
        }))
    }

    async fn get_posts(
        &self,
        request: Request<GetPostsRequest>,
    ) -> Result<Response<GetPostsResponse>, Status> {
        let req = request.into_inner();
        let (posts, end_cursor, has_next_page) = self
            .posts
            .get_page(req.first as i64, &req.after_cursor)
            .await?;
        Ok(Response::new(GetPostsResponse {
            posts: posts.into_iter().map(to_proto_post).collect(),
            end_cursor,
            has_next_page,
        }))
    }
}

#[tonic::async_trait]
impl CommentServiceTrait for RpcHandlers {
    async fn create_comment(
        &self,
        request: Request<CreateCommentRequest>,
    ) -> Result<Response<CreateCommentResponse>, Status> {
        let req = request.into_inner();
        let post_id = parse_uuid(&req.post_id, "post_id")?;
        let author_id = parse_uuid(&req.author_id, "author_id")?;

        let result = if req.parent_id.is_empty() {
            self.comments.create(post_id, author_id, &req.text).await
        } else {
            let parent_id = parse_uuid(&req.parent_id, "parent_id")?;
            self.comments.reply(post_id, author_id, parent_id, &req.text).await
        };

        let comment = result.map_err(|err| {
            // CreateComment surfaces a disallowed post as InvalidArgument
            // rather than the generic PermissionDenied mapping (spec §7).
            if matches!(err, ServiceError::CommentsDisabled) {
                Status::invalid_argument(err.to_string())
            } else {
                Status::from(err)
            }
        })?;

        Ok(Response::new(CreateCommentResponse {
            comment: Some(to_proto_comment(comment)),
        }))
    }

    async fn get_comments(
        &self,
        request: Request<GetCommentsRequest>,
    ) -> Result<Response<GetCommentsResponse>, Status> {
        let req = request.into_inner();
        let post_id = parse_uuid(&req.post_id, "post_id")?;
        let parent_id = if req.parent_id.is_empty() {
            None
        } else {
            Some(parse_uuid(&req.parent_id, "parent_id")?)
        };
        let (comments, end_cursor, has_next_page) = self
            .comments
            .get_page(post_id, parent_id, req.first as i64, &req.after_cursor)
            .await?;
        Ok(Response::new(GetCommentsResponse {
            comments: comments.into_iter().map(to_proto_comment).collect(),
            end_cursor,
            has_next_page,
        }))
    }
}
