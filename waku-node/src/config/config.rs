use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use libp2p::identity::Keypair;
use libp2p::Multiaddr;
use tokio::sync::mpsc;

use waku_core::pubsub_topic::PubsubTopic;
use waku_store::provider::MessageProvider;
use waku_store::retention::RetentionPolicy;

use crate::event_loop::ConnStatus;

pub const DEFAULT_TCP_PORT: u16 = 60000;
pub const DEFAULT_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(20);
pub const DEFAULT_FILTER_SUBSCRIPTION_TIMEOUT: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakuRelayConfig {
    /// Minimum number of peers on a topic required for a publish to succeed.
    /// With 0, publishing succeeds even on an empty mesh (the message is
    /// still delivered to local subscribers and sinks).
    pub min_peers_to_publish: usize,
    /// Topics the node joins at start. Defaults to the default pubsub topic.
    pub topics: Vec<PubsubTopic>,
}

impl Default for WakuRelayConfig {
    fn default() -> Self {
        Self {
            min_peers_to_publish: 0,
            topics: vec![PubsubTopic::default()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakuFilterConfig {
    /// Idle expiry of server-side subscriptions.
    pub subscription_timeout: Duration,
}

impl Default for WakuFilterConfig {
    fn default() -> Self {
        Self {
            subscription_timeout: DEFAULT_FILTER_SUBSCRIPTION_TIMEOUT,
        }
    }
}

#[derive(Default)]
pub struct WakuStoreConfig {
    /// Query remote stores only; serve no history and keep no archive.
    pub client_only: bool,
    pub retention: RetentionPolicy,
}

/// Discovery v5 parameters, handed to the discovery collaborator when one is
/// wired to the node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discv5Config {
    pub udp_port: u16,
    pub bootnodes: Vec<String>,
    pub auto_update: bool,
}

pub struct NodeConfig {
    pub keypair: Keypair,
    pub host_addr: IpAddr,
    /// TCP listen port; 0 picks a random port.
    pub tcp_port: u16,
    pub advertise_addr: Option<Multiaddr>,
    pub keepalive: bool,
    /// Interval of keep-alive pings to every connected peer; `None` disables
    /// them.
    pub ping_interval: Option<Duration>,
    pub relay: Option<WakuRelayConfig>,
    pub filter_server: Option<WakuFilterConfig>,
    pub filter_client: bool,
    pub store: Option<WakuStoreConfig>,
    pub message_provider: Option<Box<dyn MessageProvider>>,
    pub lightpush: bool,
    pub discv5: Option<Discv5Config>,
    pub connection_status: Option<mpsc::Sender<ConnStatus>>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            keypair: Keypair::generate_secp256k1(),
            host_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            tcp_port: DEFAULT_TCP_PORT,
            advertise_addr: None,
            keepalive: false,
            ping_interval: None,
            relay: None,
            filter_server: None,
            filter_client: false,
            store: None,
            message_provider: None,
            lightpush: false,
            discv5: None,
            connection_status: None,
        }
    }
}
