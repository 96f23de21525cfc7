use async_graphql::{Context, Object, Result, ID};
use uuid::Uuid;

use crate::clients::ServiceClients;
use crate::schema::types::{Post, PostConnection, User};
use rpc_proto::social::{GetPostRequest, GetPostsRequest, GetUsersRequest};

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn posts(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
    ) -> Result<PostConnection> {
        let clients = ctx.data::<ServiceClients>()?;
        let mut client = clients.posts.clone();
        let response = client
            .get_posts(GetPostsRequest {
                first: first.unwrap_or_default(),
                after_cursor: after.unwrap_or_default(),
            })
            .await?
            .into_inner();

        Ok(PostConnection {
            edges: response.posts.into_iter().map(Post).collect(),
            end_cursor: response.end_cursor,
            has_next_page: response.has_next_page,
        })
    }

    async fn post(&self, ctx: &Context<'_>, id: ID) -> Result<Post> {
        let clients = ctx.data::<ServiceClients>()?;
        let mut client = clients.posts.clone();
        let response = client
            .get_post(GetPostRequest { id: id.to_string() })
            .await?
            .into_inner();
        response
            .post
            .map(Post)
            .ok_or_else(|| async_graphql::Error::new("post not found"))
    }

    async fn users(&self, ctx: &Context<'_>, ids: Option<Vec<ID>>) -> Result<Vec<User>> {
        let clients = ctx.data::<ServiceClients>()?;
        let mut client = clients.users.clone();
        let ids = ids
            .unwrap_or_default()
            .into_iter()
            .map(|id| id.to_string())
            .filter(|id| Uuid::parse_str(id).is_ok())
            .collect();
        let response = client.get_users(GetUsersRequest { ids }).await?.into_inner();
        Ok(response.users.into_iter().map(User).collect())
    }
}
