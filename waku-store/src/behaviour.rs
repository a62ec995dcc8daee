use std::iter;

use libp2p::request_response::{self, ProtocolSupport};

use crate::codec::WakuStoreCodec;
use crate::protocol::PROTOCOL_ID;
use crate::request::HistoryRequest;
use crate::response::HistoryResponse;

pub type Event = request_response::Event<HistoryRequest, HistoryResponse>;

pub type Behaviour = request_response::Behaviour<WakuStoreCodec>;

/// Build the history query behaviour. Store servers register
/// [`ProtocolSupport::Full`]; client-only nodes register
/// [`ProtocolSupport::Outbound`].
pub fn new_behaviour(support: ProtocolSupport) -> Behaviour {
    request_response::Behaviour::with_codec(
        WakuStoreCodec,
        iter::once((PROTOCOL_ID, support)),
        Default::default(),
    )
}
