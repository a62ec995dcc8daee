use std::io;

use waku_core::content_topic::ContentTopic;
use waku_core::message::WakuMessage;
use waku_core::pubsub_topic::PubsubTopic;

pub(crate) mod proto {
    pub mod waku {
        pub mod message {
            pub mod v1 {
                pub use waku_core::message::proto::*;
            }
        }
        pub mod filter {
            pub mod v2beta1 {
                include!("proto/gen/waku.filter.v2beta1.rs");
            }
        }
    }
}

use proto::waku::filter::v2beta1 as pb;

/// A filter subscription predicate: a pubsub topic plus the content topics
/// to match within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFilter {
    pub pubsub_topic: PubsubTopic,
    pub content_topics: Vec<ContentTopic>,
}

/// A subscribe (`subscribe == true`) or unsubscribe (`subscribe == false`)
/// request, scoped to a `(peer, request_id)` pair on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeRequest {
    pub request_id: String,
    pub subscribe: bool,
    pub pubsub_topic: PubsubTopic,
    pub content_topics: Vec<ContentTopic>,
}

/// Messages pushed by a filter server for the subscription identified by
/// `request_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct MessagePush {
    pub request_id: String,
    pub messages: Vec<WakuMessage>,
}

/// Acknowledgement of a filter RPC, echoing its request id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterAck {
    pub request_id: String,
}

/// A filter protocol frame: either a subscription change request or a
/// message push.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterRpc {
    Request(SubscribeRequest),
    Push(MessagePush),
}

impl FilterRpc {
    pub fn request_id(&self) -> &str {
        match self {
            Self::Request(request) => &request.request_id,
            Self::Push(push) => &push.request_id,
        }
    }
}

impl TryFrom<pb::FilterRpc> for FilterRpc {
    type Error = io::Error;

    fn try_from(rpc: pb::FilterRpc) -> Result<Self, Self::Error> {
        match (rpc.request, rpc.push) {
            (Some(request), None) => Ok(Self::Request(SubscribeRequest {
                request_id: rpc.request_id,
                subscribe: request.subscribe,
                pubsub_topic: request.topic.into(),
                content_topics: request
                    .content_filters
                    .into_iter()
                    .map(|cf| cf.content_topic.into())
                    .collect(),
            })),
            (None, Some(push)) => Ok(Self::Push(MessagePush {
                request_id: rpc.request_id,
                messages: push.messages.into_iter().map(Into::into).collect(),
            })),
            _ => Err(io::ErrorKind::InvalidData.into()),
        }
    }
}

impl From<FilterRpc> for pb::FilterRpc {
    fn from(rpc: FilterRpc) -> Self {
        match rpc {
            FilterRpc::Request(request) => pb::FilterRpc {
                request_id: request.request_id,
                request: Some(pb::FilterRequest {
                    subscribe: request.subscribe,
                    topic: request.pubsub_topic.to_string(),
                    content_filters: request
                        .content_topics
                        .iter()
                        .map(|topic| pb::filter_request::ContentFilter {
                            content_topic: topic.to_string(),
                        })
                        .collect(),
                }),
                push: None,
            },
            FilterRpc::Push(push) => pb::FilterRpc {
                request_id: push.request_id,
                request: None,
                push: Some(pb::MessagePush {
                    messages: push.messages.into_iter().map(Into::into).collect(),
                }),
            },
        }
    }
}

impl From<pb::FilterRpc> for FilterAck {
    fn from(rpc: pb::FilterRpc) -> Self {
        Self {
            request_id: rpc.request_id,
        }
    }
}

impl From<FilterAck> for pb::FilterRpc {
    fn from(ack: FilterAck) -> Self {
        pb::FilterRpc {
            request_id: ack.request_id,
            request: None,
            push: None,
        }
    }
}
