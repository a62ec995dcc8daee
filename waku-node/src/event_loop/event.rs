use libp2p::PeerId;
use strum_macros::Display;

use waku_core::message::WakuMessage;
use waku_core::pubsub_topic::PubsubTopic;

#[derive(Debug, Display)]
pub enum Event {
    WakuRelayMessage {
        pubsub_topic: PubsubTopic,
        message: WakuMessage,
    },
    PeerConnected {
        peer_id: PeerId,
    },
    PeerDisconnected {
        peer_id: PeerId,
    },
}

/// Connection status snapshot sent to the consumer-provided channel after
/// every peer connect or disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnStatus {
    pub is_online: bool,
    pub peers_connected: usize,
}
