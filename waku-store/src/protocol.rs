use libp2p::StreamProtocol;

pub const PROTOCOL_ID: StreamProtocol = StreamProtocol::new("/vac/waku/store/2.0.0-beta4");
