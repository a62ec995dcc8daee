use libp2p::gossipsub::{self, IdentTopic, MessageAuthenticity, MessageId, ValidationMode};
use libp2p::swarm::NetworkBehaviour;
use libp2p::PeerId;
use prost::Message;

use waku_core::message::proto::WakuMessage as WakuMessageProto;
use waku_core::message::WakuMessage;
use waku_core::pubsub_topic::PubsubTopic;

use crate::error::{PublishError, SubscriptionError};
use crate::event::Event;
use crate::message_id::deterministic_message_id_fn;
use crate::MAX_WAKU_RELAY_MESSAGE_SIZE;

pub const PROTOCOL_ID: &str = "/vac/waku/relay/2.0.0";

#[derive(NetworkBehaviour)]
#[behaviour(to_swarm = "Event")]
pub struct Behaviour {
    pubsub: gossipsub::Behaviour,
}

impl Default for Behaviour {
    fn default() -> Self {
        let pubsub_config = gossipsub::ConfigBuilder::default()
            .protocol_id(PROTOCOL_ID, gossipsub::Version::V1_1)
            .validation_mode(ValidationMode::Anonymous) // StrictNoSign
            .message_id_fn(deterministic_message_id_fn)
            .max_transmit_size(MAX_WAKU_RELAY_MESSAGE_SIZE)
            .build()
            .expect("valid pubsub configuration");

        let pubsub = gossipsub::Behaviour::new(MessageAuthenticity::Anonymous, pubsub_config)
            .expect("valid pubsub configuration");

        Self { pubsub }
    }
}

impl Behaviour {
    /// Join the mesh of the given pubsub topic. Returns `false` if already
    /// subscribed.
    pub fn subscribe(&mut self, topic: &PubsubTopic) -> Result<bool, SubscriptionError> {
        let ident_topic = IdentTopic::new(topic.to_string());
        self.pubsub.subscribe(&ident_topic).map_err(Into::into)
    }

    /// Leave the mesh of the given pubsub topic. Returns `false` if not
    /// subscribed.
    pub fn unsubscribe(&mut self, topic: &PubsubTopic) -> Result<bool, PublishError> {
        let ident_topic = IdentTopic::new(topic.to_string());
        self.pubsub.unsubscribe(&ident_topic).map_err(Into::into)
    }

    pub fn publish(
        &mut self,
        topic: &PubsubTopic,
        msg: WakuMessage,
    ) -> Result<MessageId, PublishError> {
        let ident_topic = IdentTopic::new(topic.to_string());
        let message_proto: WakuMessageProto = msg.into();
        self.pubsub
            .publish(ident_topic, message_proto.encode_to_vec())
            .map_err(Into::into)
    }

    /// Topics this node is currently subscribed to.
    pub fn topics(&self) -> Vec<PubsubTopic> {
        self.pubsub
            .topics()
            .map(|hash| PubsubTopic::new(hash.to_string()))
            .collect()
    }

    /// Number of connected peers subscribed to the given topic.
    pub fn topic_peer_count(&self, topic: &PubsubTopic) -> usize {
        let topic_hash = IdentTopic::new(topic.to_string()).hash();
        self.pubsub
            .all_peers()
            .filter(|(_, topics)| topics.contains(&&topic_hash))
            .count()
    }

    pub fn add_peer(&mut self, peer_id: &PeerId) {
        self.pubsub.add_explicit_peer(peer_id);
    }
}
