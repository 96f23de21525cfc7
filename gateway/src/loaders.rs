//! Per-request author batcher (spec §4.6), grounded in the original
//! `dataloader.New` / `batchUsers`: collect `Load` calls within a short
//! window, de-duplicate, issue one `GetUsers` call, and fan the results
//! back out by id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_graphql::dataloader::Loader;
use thiserror::Error;
use tonic::Request;
use uuid::Uuid;

use rpc_proto::social::user_service_client::UserServiceClient;
use rpc_proto::social::{GetUsersRequest, User};
use tonic::transport::Channel;

const BATCH_WINDOW: Duration = Duration::from_millis(2);
const BATCH_CAP: usize = 200;
const RPC_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Error)]
pub enum LoaderError {
    #[error("dataloader not injected in request context")]
    NotInjected,
    #[error("backend call failed: {0}")]
    Rpc(String),
}

pub struct UserLoader {
    client: UserServiceClient<Channel>,
}

impl UserLoader {
    pub fn new(client: UserServiceClient<Channel>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Loader<Uuid> for UserLoader {
    type Value = User;
    type Error = LoaderError;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        let ids: Vec<String> = keys.iter().map(Uuid::to_string).collect();

        let mut client = self.client.clone();
        let mut request = Request::new(GetUsersRequest { ids });
        request.set_timeout(RPC_TIMEOUT);

        let response = client
            .get_users(request)
            .await
            .map_err(|status| LoaderError::Rpc(status.message().to_owned()))?
            .into_inner();

        let mut out = HashMap::with_capacity(response.users.len());
        for user in response.users {
            if let Ok(id) = Uuid::parse_str(&user.id) {
                out.insert(id, user);
            }
        }
        Ok(out)
    }
}

pub type UserDataLoader = async_graphql::dataloader::DataLoader<UserLoader>;

pub fn build(client: UserServiceClient<Channel>) -> Arc<UserDataLoader> {
    Arc::new(
        async_graphql::dataloader::DataLoader::new(UserLoader::new(client), tokio::spawn)
            .delay(BATCH_WINDOW)
            .max_batch_size(BATCH_CAP),
    )
}
