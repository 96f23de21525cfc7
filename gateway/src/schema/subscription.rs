use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};

use async_graphql::{Context, Result, Subscription};
use futures::Stream;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::broker::{CommentBroker, Subscription as BrokerSubscription};
use crate::schema::types::Comment;

#[derive(Default)]
pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    async fn comment_added(
        &self,
        ctx: &Context<'_>,
        post_id: async_graphql::ID,
    ) -> Result<impl Stream<Item = Comment>> {
        let broker = ctx.data::<Arc<CommentBroker>>()?.clone();
        let id = Uuid::parse_str(post_id.as_str())
            .map_err(|_| async_graphql::Error::new("postId must be a valid UUID"))?;
        let (sub, rx) = broker.subscribe(id);
        Ok(CommentStream {
            broker,
            sub: Some(sub),
            rx,
        })
    }
}

/// Wraps the broker's receiver so dropping the GraphQL subscription
/// (client disconnect) unsubscribes exactly once (spec §5).
struct CommentStream {
    broker: Arc<CommentBroker>,
    sub: Option<BrokerSubscription>,
    rx: mpsc::Receiver<rpc_proto::social::Comment>,
}

impl Stream for CommentStream {
    type Item = Comment;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx).map(|item| item.map(Comment))
    }
}

impl Drop for CommentStream {
    fn drop(&mut self) {
        if let Some(sub) = self.sub.take() {
            self.broker.unsubscribe(&sub);
        }
    }
}
