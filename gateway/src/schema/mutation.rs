use std::sync::Arc;

use async_graphql::{Context, Object, Result, ID};
use uuid::Uuid;

use crate::broker::CommentBroker;
use crate::clients::ServiceClients;
use crate::schema::types::{Comment, Post};
use rpc_proto::social::{CreateCommentRequest, CreatePostRequest, LoginRequest};

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn login(&self, ctx: &Context<'_>, login: String, password: String) -> Result<String> {
        let clients = ctx.data::<ServiceClients>()?;
        let mut client = clients.auth.clone();
        let response = client.login(LoginRequest { login, password }).await?.into_inner();
        Ok(response.token)
    }

    async fn create_post(
        &self,
        ctx: &Context<'_>,
        author_id: ID,
        text: String,
        without_comment: Option<bool>,
    ) -> Result<Post> {
        let clients = ctx.data::<ServiceClients>()?;
        let mut client = clients.posts.clone();
        let response = client
            .create_post(CreatePostRequest {
                author_id: author_id.to_string(),
                text,
                without_comment: without_comment.unwrap_or(true),
            })
            .await?
            .into_inner();
        response
            .post
            .map(Post)
            .ok_or_else(|| async_graphql::Error::new("backend returned no post"))
    }

    async fn create_comment(
        &self,
        ctx: &Context<'_>,
        post_id: ID,
        author_id: ID,
        parent_id: Option<ID>,
        text: String,
    ) -> Result<Comment> {
        let clients = ctx.data::<ServiceClients>()?;
        let mut client = clients.comments.clone();
        let response = client
            .create_comment(CreateCommentRequest {
                post_id: post_id.to_string(),
                author_id: author_id.to_string(),
                parent_id: parent_id.map(|id| id.to_string()).unwrap_or_default(),
                text,
            })
            .await?
            .into_inner();
        let comment = response
            .comment
            .ok_or_else(|| async_graphql::Error::new("backend returned no comment"))?;

        if let Some(broker) = ctx.data_opt::<Arc<CommentBroker>>() {
            if let Ok(id) = Uuid::parse_str(&comment.post_id) {
                broker.publish(id, comment.clone());
            }
        }

        Ok(Comment(comment))
    }
}
