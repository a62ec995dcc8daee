use libp2p::StreamProtocol;

pub const PROTOCOL_ID: StreamProtocol = StreamProtocol::new("/vac/waku/lightpush/2.0.0-beta1");
