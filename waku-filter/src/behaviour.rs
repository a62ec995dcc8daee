use std::iter;

use libp2p::request_response::{self, ProtocolSupport};

use crate::codec::WakuFilterCodec;
use crate::protocol::PROTOCOL_ID;
use crate::rpc::{FilterAck, FilterRpc};

pub type Event = request_response::Event<FilterRpc, FilterAck>;

pub type Behaviour = request_response::Behaviour<WakuFilterCodec>;

/// Build the filter behaviour. Both roles register full support: servers
/// receive subscription requests and send pushes, clients the reverse.
pub fn new_behaviour() -> Behaviour {
    request_response::Behaviour::with_codec(
        WakuFilterCodec,
        iter::once((PROTOCOL_ID, ProtocolSupport::Full)),
        Default::default(),
    )
}
