use libp2p::PeerId;
use tokio::sync::mpsc;

use waku_core::envelope::Envelope;
use waku_core::pubsub_topic::PubsubTopic;

/// Capacity of the per-subscription envelope channel. A subscriber that
/// falls further behind than this has envelopes dropped, without affecting
/// other subscribers.
pub(crate) const SUBSCRIPTION_CHANNEL_CAPACITY: usize = 1024;

/// A local relay subscription.
///
/// Every subscription to a topic receives its own copy of every envelope,
/// in gossip arrival order. The channel is closed when the node stops or
/// the subscription is cancelled via
/// [`Node::relay_unsubscribe`](crate::Node::relay_unsubscribe).
#[derive(Debug)]
pub struct RelaySubscription {
    id: u64,
    pubsub_topic: PubsubTopic,
    receiver: mpsc::Receiver<Envelope>,
}

impl RelaySubscription {
    pub(crate) fn new(id: u64, pubsub_topic: PubsubTopic, receiver: mpsc::Receiver<Envelope>) -> Self {
        Self {
            id,
            pubsub_topic,
            receiver,
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub fn pubsub_topic(&self) -> &PubsubTopic {
        &self.pubsub_topic
    }

    /// Next envelope, or `None` once the subscription is closed.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.receiver.recv().await
    }
}

/// A server-mediated filter subscription.
///
/// Envelopes pushed by the server peer arrive on this channel. The channel
/// is closed when the server disconnects or the subscription is cancelled
/// via [`Node::filter_unsubscribe`](crate::Node::filter_unsubscribe); the
/// client does not reconnect on its own.
#[derive(Debug)]
pub struct FilterSubscription {
    request_id: String,
    peer_id: PeerId,
    receiver: mpsc::Receiver<Envelope>,
}

impl FilterSubscription {
    pub(crate) fn new(request_id: String, peer_id: PeerId, receiver: mpsc::Receiver<Envelope>) -> Self {
        Self {
            request_id,
            peer_id,
            receiver,
        }
    }

    pub(crate) fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The serving peer.
    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// Next pushed envelope, or `None` once the subscription is closed.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.receiver.recv().await
    }
}
