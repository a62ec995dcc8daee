use std::io;

use waku_core::message::WakuMessage;
use waku_core::pubsub_topic::PubsubTopic;

pub(crate) mod proto {
    pub mod waku {
        pub mod message {
            pub mod v1 {
                pub use waku_core::message::proto::*;
            }
        }
        pub mod lightpush {
            pub mod v2beta1 {
                include!("proto/gen/waku.lightpush.v2beta1.rs");
            }
        }
    }
}

use proto::waku::lightpush::v2beta1 as pb;

/// A request to publish a message through the serving relay node.
#[derive(Debug, Clone, PartialEq)]
pub struct PushRequest {
    pub request_id: String,
    pub pubsub_topic: PubsubTopic,
    pub message: WakuMessage,
}

/// The serving node's verdict on a push request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushResponse {
    pub request_id: String,
    pub is_success: bool,
    pub info: String,
}

impl TryFrom<pb::PushRpc> for PushRequest {
    type Error = io::Error;

    fn try_from(rpc: pb::PushRpc) -> Result<Self, Self::Error> {
        let request = rpc
            .request
            .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidData))?;
        let message = request
            .message
            .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidData))?;

        Ok(Self {
            request_id: rpc.request_id,
            pubsub_topic: request.pubsub_topic.into(),
            message: message.into(),
        })
    }
}

impl From<PushRequest> for pb::PushRpc {
    fn from(request: PushRequest) -> Self {
        pb::PushRpc {
            request_id: request.request_id,
            request: Some(pb::PushRequest {
                pubsub_topic: request.pubsub_topic.to_string(),
                message: Some(request.message.into()),
            }),
            response: None,
        }
    }
}

impl TryFrom<pb::PushRpc> for PushResponse {
    type Error = io::Error;

    fn try_from(rpc: pb::PushRpc) -> Result<Self, Self::Error> {
        let response = rpc
            .response
            .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidData))?;

        Ok(Self {
            request_id: rpc.request_id,
            is_success: response.is_success,
            info: response.info,
        })
    }
}

impl From<PushResponse> for pb::PushRpc {
    fn from(response: PushResponse) -> Self {
        pb::PushRpc {
            request_id: response.request_id,
            request: None,
            response: Some(pb::PushResponse {
                is_success: response.is_success,
                info: response.info,
            }),
        }
    }
}
