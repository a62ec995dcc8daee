use libp2p::gossipsub::MessageId;
use libp2p::{Multiaddr, PeerId};
use strum_macros::Display;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use waku_core::error::Error;
use waku_core::message::WakuMessage;
use waku_core::pubsub_topic::PubsubTopic;
use waku_filter::ContentFilter;
use waku_store::request::HistoryQuery;
use waku_store::response::HistoryResponseBody;

use crate::subscription::{FilterSubscription, RelaySubscription};

#[derive(Debug, Display)]
pub enum Command {
    SwitchListenOn {
        address: Multiaddr,
        sender: oneshot::Sender<Result<(), Error>>,
    },
    SwitchDial {
        address: Multiaddr,
        sender: oneshot::Sender<Result<(), Error>>,
    },
    ListenAddresses {
        sender: oneshot::Sender<Vec<Multiaddr>>,
    },
    ConnectedPeers {
        sender: oneshot::Sender<Vec<PeerId>>,
    },
    /// Join a topic's mesh without attaching a local subscriber. The topic
    /// stays joined until the node stops.
    RelayJoinTopic {
        pubsub_topic: PubsubTopic,
        sender: oneshot::Sender<Result<(), Error>>,
    },
    RelaySubscribe {
        pubsub_topic: PubsubTopic,
        cancel: CancellationToken,
        sender: oneshot::Sender<Result<RelaySubscription, Error>>,
    },
    RelayUnsubscribe {
        pubsub_topic: PubsubTopic,
        subscription_id: u64,
        sender: oneshot::Sender<Result<(), Error>>,
    },
    RelayPublish {
        pubsub_topic: PubsubTopic,
        message: WakuMessage,
        cancel: CancellationToken,
        sender: oneshot::Sender<Result<MessageId, Error>>,
    },
    RelayTopics {
        sender: oneshot::Sender<Vec<PubsubTopic>>,
    },
    FilterSubscribe {
        peer: Option<PeerId>,
        filter: ContentFilter,
        cancel: CancellationToken,
        sender: oneshot::Sender<Result<FilterSubscription, Error>>,
    },
    FilterUnsubscribe {
        request_id: String,
        cancel: CancellationToken,
        sender: oneshot::Sender<Result<(), Error>>,
    },
    StoreQuery {
        peer: PeerId,
        query: HistoryQuery,
        cancel: CancellationToken,
        sender: oneshot::Sender<Result<HistoryResponseBody, Error>>,
    },
    LightPush {
        peer: PeerId,
        pubsub_topic: PubsubTopic,
        message: WakuMessage,
        cancel: CancellationToken,
        sender: oneshot::Sender<Result<(), Error>>,
    },
}
