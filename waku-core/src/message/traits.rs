use crate::message::proto::WakuMessage as WakuMessageProto;
use crate::message::WakuMessage;

impl From<WakuMessageProto> for WakuMessage {
    fn from(proto: WakuMessageProto) -> Self {
        Self {
            payload: proto.payload,
            content_topic: proto.content_topic.into(),
            version: proto.version,
            timestamp: proto.timestamp,
            meta: proto.meta,
            ephemeral: proto.ephemeral.unwrap_or(false),
        }
    }
}

impl From<WakuMessage> for WakuMessageProto {
    fn from(message: WakuMessage) -> Self {
        WakuMessageProto {
            payload: message.payload,
            content_topic: message.content_topic.to_string(),
            version: message.version,
            timestamp: message.timestamp,
            meta: message.meta,
            ephemeral: message.ephemeral.then_some(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use prost::Message;

    use super::*;

    #[test]
    fn test_waku_message_proto_roundtrip() {
        // Given
        let message = WakuMessage {
            payload: Bytes::from_static(&[1, 2, 3, 4, 5]),
            content_topic: "/test/v1/roundtrip/proto".into(),
            version: 1,
            timestamp: 1_672_531_200_000_000_000,
            meta: Some(Bytes::from_static(b"meta")),
            ephemeral: true,
        };

        // When
        let encoded = WakuMessageProto::from(message.clone()).encode_to_vec();
        let decoded: WakuMessage = WakuMessageProto::decode(&encoded[..])
            .expect("valid protobuf")
            .into();

        // Then
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_waku_message_proto_defaults() {
        // Given
        let proto = WakuMessageProto {
            payload: Bytes::from_static(b"TEST"),
            content_topic: "test".to_string(),
            version: 0,
            timestamp: 0,
            meta: None,
            ephemeral: None,
        };

        // When
        let message: WakuMessage = proto.into();

        // Then
        assert_eq!(message.version, 0);
        assert_eq!(message.timestamp, 0);
        assert!(message.meta.is_none());
        assert!(!message.ephemeral);
    }
}
