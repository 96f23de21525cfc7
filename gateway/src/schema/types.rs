//! GraphQL object types (spec §6), each a thin projection over the
//! backend's wire messages. `author` fields route through the
//! per-request dataloader rather than the service clients directly.

use async_graphql::{Context, Object, Result, ID};
use uuid::Uuid;

use crate::clients::ServiceClients;
use crate::loaders::UserDataLoader;
use rpc_proto::social::GetCommentsRequest;

pub struct User(pub rpc_proto::social::User);

#[Object]
impl User {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn login(&self) -> &str {
        &self.0.login
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn surname(&self) -> &str {
        &self.0.surname
    }
}

pub struct Post(pub rpc_proto::social::Post);

#[Object]
impl Post {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn text(&self) -> &str {
        &self.0.text
    }

    async fn without_comment(&self) -> bool {
        self.0.without_comment
    }

    async fn created_at(&self) -> String {
        format_timestamp(self.0.created_at.as_ref())
    }

    async fn updated_at(&self) -> String {
        format_timestamp(self.0.updated_at.as_ref())
    }

    async fn author(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        resolve_author(ctx, &self.0.author_id).await
    }

    async fn comments(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
        parent_id: Option<ID>,
    ) -> Result<CommentConnection> {
        let clients = ctx.data::<ServiceClients>()?;
        let mut client = clients.comments.clone();
        let response = client
            .get_comments(GetCommentsRequest {
                post_id: self.0.id.clone(),
                parent_id: parent_id.map(|id| id.to_string()).unwrap_or_default(),
                first: first.unwrap_or_default(),
                after_cursor: after.unwrap_or_default(),
            })
            .await?
            .into_inner();

        Ok(CommentConnection {
            edges: response.comments.into_iter().map(Comment).collect(),
            end_cursor: response.end_cursor,
            has_next_page: response.has_next_page,
        })
    }
}

pub struct Comment(pub rpc_proto::social::Comment);

#[Object]
impl Comment {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn post_id(&self) -> ID {
        ID(self.0.post_id.clone())
    }

    async fn parent_id(&self) -> Option<ID> {
        if self.0.parent_id.is_empty() {
            None
        } else {
            Some(ID(self.0.parent_id.clone()))
        }
    }

    async fn text(&self) -> &str {
        &self.0.text
    }

    async fn created_at(&self) -> String {
        format_timestamp(self.0.created_at.as_ref())
    }

    async fn author(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        resolve_author(ctx, &self.0.author_id).await
    }
}

#[derive(async_graphql::SimpleObject)]
pub struct PostConnection {
    pub edges: Vec<Post>,
    pub end_cursor: String,
    pub has_next_page: bool,
}

#[derive(async_graphql::SimpleObject)]
pub struct CommentConnection {
    pub edges: Vec<Comment>,
    pub end_cursor: String,
    pub has_next_page: bool,
}

fn format_timestamp(ts: Option<&prost_types::Timestamp>) -> String {
    let Some(ts) = ts else { return String::new() };
    let dt = chrono::DateTime::from_timestamp(ts.seconds, ts.nanos.max(0) as u32)
        .unwrap_or_default();
    dt.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}

async fn resolve_author(ctx: &Context<'_>, author_id: &str) -> Result<Option<User>> {
    if author_id.is_empty() {
        return Ok(None);
    }
    let Ok(id) = Uuid::parse_str(author_id) else {
        return Ok(None);
    };
    let loader = ctx
        .data::<std::sync::Arc<UserDataLoader>>()
        .map_err(|_| async_graphql::Error::new("dataloader not injected"))?;
    Ok(loader.load_one(id).await?.map(User))
}
