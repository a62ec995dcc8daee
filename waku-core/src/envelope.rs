//! A Waku message tagged with the pubsub topic it was observed on.

use bytes::Bytes;
use sha2::{Digest, Sha256};

use crate::message::WakuMessage;
use crate::pubsub_topic::PubsubTopic;

/// A [`WakuMessage`] paired with the pubsub topic it arrived on and the local
/// receive timestamp.
///
/// `received_at` is assigned once at ingress and never rewritten; the inner
/// message timestamp is sender-controlled and untrusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    message: WakuMessage,
    pubsub_topic: PubsubTopic,
    received_at: i64,
    digest: Bytes,
}

impl Envelope {
    /// Wrap a received message. `received_at` is in nanoseconds since the
    /// Unix epoch.
    pub fn new(message: WakuMessage, received_at: i64, pubsub_topic: PubsubTopic) -> Self {
        let digest = {
            let mut hasher = Sha256::new();
            hasher.update(message.content_topic.as_bytes());
            hasher.update(&message.payload);
            Bytes::copy_from_slice(hasher.finalize().as_slice())
        };

        Self {
            message,
            pubsub_topic,
            received_at,
            digest,
        }
    }

    pub fn message(&self) -> &WakuMessage {
        &self.message
    }

    pub fn pubsub_topic(&self) -> &PubsubTopic {
        &self.pubsub_topic
    }

    pub fn received_at(&self) -> i64 {
        self.received_at
    }

    /// SHA-256 over the message's content topic and payload.
    pub fn digest(&self) -> &Bytes {
        &self.digest
    }

    pub fn into_message(self) -> WakuMessage {
        self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_digest_is_deterministic() {
        // Given
        let message = WakuMessage::new(vec![1u8, 2, 3], "test");

        // When
        let a = Envelope::new(message.clone(), 1, PubsubTopic::default());
        let b = Envelope::new(message, 2, PubsubTopic::new("other"));

        // Then
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn test_envelope_digest_depends_on_content() {
        // Given
        let a = WakuMessage::new(vec![1u8, 2, 3], "test");
        let b = WakuMessage::new(vec![1u8, 2, 3], "other");

        // When
        let env_a = Envelope::new(a, 0, PubsubTopic::default());
        let env_b = Envelope::new(b, 0, PubsubTopic::default());

        // Then
        assert_ne!(env_a.digest(), env_b.digest());
    }
}
