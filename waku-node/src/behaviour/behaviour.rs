use std::time::Duration;

use libp2p::identity::PublicKey;
use libp2p::request_response::ProtocolSupport;
use libp2p::swarm::behaviour::toggle;
use libp2p::swarm::keep_alive;
use libp2p::swarm::NetworkBehaviour;
use libp2p::{identify, ping};

pub struct Config {
    pub local_public_key: PublicKey,
    pub keep_alive: bool,
    pub ping_interval: Option<Duration>,
    pub relay: bool,
    pub filter: bool,
    /// `None` disables the store protocol entirely; client-only nodes
    /// register outbound-only support.
    pub store: Option<ProtocolSupport>,
    pub lightpush: bool,
}

#[derive(NetworkBehaviour)]
#[behaviour(to_swarm = "crate::behaviour::event::Event")]
pub struct Behaviour {
    pub keep_alive: toggle::Toggle<keep_alive::Behaviour>,
    pub ping: toggle::Toggle<ping::Behaviour>,
    pub identify: identify::Behaviour,
    pub waku_relay: toggle::Toggle<waku_relay::Behaviour>,
    pub waku_filter: toggle::Toggle<waku_filter::Behaviour>,
    pub waku_store: toggle::Toggle<waku_store::Behaviour>,
    pub waku_lightpush: toggle::Toggle<waku_lightpush::Behaviour>,
}

impl Behaviour {
    pub fn new(config: Config) -> Self {
        let keep_alive = toggle::Toggle::from(config.keep_alive.then(Default::default));
        let ping = toggle::Toggle::from(
            config
                .ping_interval
                .map(|interval| ping::Behaviour::new(ping::Config::new().with_interval(interval))),
        );
        let identify = identify::Behaviour::new(
            identify::Config::new("/ipfs/id/1.0.0".to_owned(), config.local_public_key)
                .with_agent_version(format!("rust-waku/{}", env!("CARGO_PKG_VERSION"))),
        );
        let waku_relay = toggle::Toggle::from(config.relay.then(Default::default));
        let waku_filter = toggle::Toggle::from(config.filter.then(waku_filter::new_behaviour));
        let waku_store = toggle::Toggle::from(config.store.map(waku_store::new_behaviour));
        let waku_lightpush =
            toggle::Toggle::from(config.lightpush.then(waku_lightpush::new_behaviour));

        Self {
            keep_alive,
            ping,
            identify,
            waku_relay,
            waku_filter,
            waku_store,
            waku_lightpush,
        }
    }
}
