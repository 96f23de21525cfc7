//! Topic-keyed comment broker (spec §4.5), grounded in the original
//! `subscriptions.Subscription` type: a `postId -> set of channels` map
//! behind a single reader/writer lock, non-blocking fan-out on publish.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::mpsc;
use uuid::Uuid;

use rpc_proto::social::Comment;

const SUBSCRIBER_BUFFER: usize = 16;

struct Subscriber {
    id: u64,
    tx: mpsc::Sender<Comment>,
}

#[derive(Default)]
pub struct CommentBroker {
    topics: RwLock<HashMap<Uuid, Vec<Subscriber>>>,
    next_id: std::sync::atomic::AtomicU64,
}

/// Handle returned by `subscribe`; carries everything `unsubscribe` needs
/// to find and remove this subscriber's entry.
pub struct Subscription {
    pub post_id: Uuid,
    id: u64,
}

impl CommentBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, post_id: Uuid) -> (Subscription, mpsc::Receiver<Comment>) {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        let id = self
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        let mut topics = self.topics.write().expect("broker lock poisoned");
        topics.entry(post_id).or_default().push(Subscriber { id, tx });

        (Subscription { post_id, id }, rx)
    }

    /// Removes the subscriber; its channel is dropped here, which closes
    /// the receiver side. Idempotent: calling it twice for the same
    /// subscription is a no-op the second time.
    pub fn unsubscribe(&self, sub: &Subscription) {
        let mut topics = self.topics.write().expect("broker lock poisoned");
        if let Some(subs) = topics.get_mut(&sub.post_id) {
            subs.retain(|s| s.id != sub.id);
            if subs.is_empty() {
                topics.remove(&sub.post_id);
            }
        }
    }

    /// Fans a comment out to every current subscriber of `post_id`. Never
    /// blocks: a subscriber whose buffer is full simply misses the message.
    pub fn publish(&self, post_id: Uuid, comment: Comment) {
        let topics = self.topics.read().expect("broker lock poisoned");
        if let Some(subs) = topics.get(&post_id) {
            for sub in subs {
                let _ = sub.tx.try_send(comment.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_comment(post_id: Uuid) -> Comment {
        Comment {
            id: Uuid::new_v4().to_string(),
            post_id: post_id.to_string(),
            author_id: Uuid::new_v4().to_string(),
            parent_id: String::new(),
            text: "hi".to_owned(),
            created_at: Some(prost_types::Timestamp {
                seconds: Utc::now().timestamp(),
                nanos: 0,
            }),
        }
    }

    #[tokio::test]
    async fn fans_out_to_all_subscribers() {
        let broker = CommentBroker::new();
        let post_id = Uuid::new_v4();
        let (_sub1, mut rx1) = broker.subscribe(post_id);
        let (_sub2, mut rx2) = broker.subscribe(post_id);

        let comment = sample_comment(post_id);
        broker.publish(post_id, comment.clone());

        assert_eq!(rx1.recv().await.unwrap().id, comment.id);
        assert_eq!(rx2.recv().await.unwrap().id, comment.id);
    }

    #[tokio::test]
    async fn unsubscribe_closes_channel_and_stops_delivery() {
        let broker = CommentBroker::new();
        let post_id = Uuid::new_v4();
        let (sub1, mut rx1) = broker.subscribe(post_id);
        let (_sub2, mut rx2) = broker.subscribe(post_id);

        broker.unsubscribe(&sub1);
        assert!(rx1.recv().await.is_none());

        let comment = sample_comment(post_id);
        broker.publish(post_id, comment.clone());
        assert_eq!(rx2.recv().await.unwrap().id, comment.id);
    }

    #[tokio::test]
    async fn repeated_unsubscribe_is_a_no_op() {
        let broker = CommentBroker::new();
        let post_id = Uuid::new_v4();
        let (sub, _rx) = broker.subscribe(post_id);

        broker.unsubscribe(&sub);
        broker.unsubscribe(&sub);
        assert!(broker.topics.read().unwrap().get(&post_id).is_none());
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_is_a_no_op() {
        let broker = CommentBroker::new();
        broker.publish(Uuid::new_v4(), sample_comment(Uuid::new_v4()));
    }

    #[tokio::test]
    async fn full_buffer_drops_message_for_slow_consumer() {
        let broker = CommentBroker::new();
        let post_id = Uuid::new_v4();
        let (_sub, mut rx) = broker.subscribe(post_id);

        for _ in 0..SUBSCRIBER_BUFFER + 5 {
            broker.publish(post_id, sample_comment(post_id));
        }

        // The channel never grows past its bounded capacity; draining it
        // must not yield more than the buffer could ever hold.
        let mut drained = 0;
        while rx.try_recv().is_ok() {
            drained += 1;
        }
        assert!(drained <= SUBSCRIBER_BUFFER);
    }
}
