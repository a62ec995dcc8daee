pub use behaviour::{new_behaviour, Behaviour, Event};
pub use protocol::PROTOCOL_ID;
pub use rpc::{PushRequest, PushResponse};

mod behaviour;
mod codec;
mod protocol;
mod rpc;

pub(crate) const MAX_PROTOBUF_SIZE: usize = waku_core::MAX_WAKU_MESSAGE_SIZE + 64 * 1024;
