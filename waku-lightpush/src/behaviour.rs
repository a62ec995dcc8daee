use std::iter;

use libp2p::request_response::{self, ProtocolSupport};

use crate::codec::WakuLightPushCodec;
use crate::protocol::PROTOCOL_ID;
use crate::rpc::{PushRequest, PushResponse};

pub type Event = request_response::Event<PushRequest, PushResponse>;

pub type Behaviour = request_response::Behaviour<WakuLightPushCodec>;

pub fn new_behaviour() -> Behaviour {
    request_response::Behaviour::with_codec(
        WakuLightPushCodec,
        iter::once((PROTOCOL_ID, ProtocolSupport::Full)),
        Default::default(),
    )
}
