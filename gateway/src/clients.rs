//! gRPC clients to the backend's four services, sharing one multiplexed
//! `Channel` (tonic channels are cheap to clone and handle concurrent
//! requests internally, so no per-request connection setup is needed).

use anyhow::{Context, Result};
use tonic::transport::Channel;

use rpc_proto::social::auth_service_client::AuthServiceClient;
use rpc_proto::social::comment_service_client::CommentServiceClient;
use rpc_proto::social::post_service_client::PostServiceClient;
use rpc_proto::social::user_service_client::UserServiceClient;

#[derive(Clone)]
pub struct ServiceClients {
    pub auth: AuthServiceClient<Channel>,
    pub users: UserServiceClient<Channel>,
    pub posts: PostServiceClient<Channel>,
    pub comments: CommentServiceClient<Channel>,
}

impl ServiceClients {
    pub async fn connect(addr: &str) -> Result<Self> {
        let channel = Channel::from_shared(addr.to_owned())
            .with_context(|| format!("invalid backend address `{addr}`"))?
            .connect()
            .await
            .with_context(|| format!("connecting to backend at `{addr}`"))?;

        Ok(Self {
            auth: AuthServiceClient::new(channel.clone()),
            users: UserServiceClient::new(channel.clone()),
            posts: PostServiceClient::new(channel.clone()),
            comments: CommentServiceClient::new(channel),
        })
    }
}
