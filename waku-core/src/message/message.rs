use std::fmt::{Debug, Formatter};

use bytes::Bytes;

use crate::content_topic::ContentTopic;

/// A Waku message as carried over the relay, filter, store and lightpush
/// protocols.
///
/// The `timestamp` is sender-controlled (nanoseconds since the Unix epoch)
/// and must not be trusted for retention decisions; see
/// [`Envelope`](crate::envelope::Envelope).
#[derive(Clone, Eq, PartialEq)]
pub struct WakuMessage {
    pub payload: Bytes,
    pub content_topic: ContentTopic,
    pub version: u32,
    pub timestamp: i64,
    pub meta: Option<Bytes>,
    pub ephemeral: bool,
}

impl WakuMessage {
    pub fn new<P, T>(payload: P, content_topic: T) -> Self
    where
        P: Into<Bytes>,
        T: Into<ContentTopic>,
    {
        Self {
            payload: payload.into(),
            content_topic: content_topic.into(),
            version: 0,
            timestamp: 0,
            meta: None,
            ephemeral: false,
        }
    }
}

impl Debug for WakuMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let payload_fmt = match self.payload.get(0..32) {
            Some(slice) => format!("{}…", hex::encode(slice)),
            None => hex::encode(&self.payload[..]),
        };
        let meta_fmt = &self.meta.clone().map_or("None".to_string(), hex::encode);

        f.debug_struct("WakuMessage")
            .field("content_topic", &self.content_topic)
            .field("version", &self.version)
            .field("timestamp", &self.timestamp)
            .field("meta", &meta_fmt)
            .field("payload", &payload_fmt)
            .field("ephemeral", &self.ephemeral)
            .finish()
    }
}
