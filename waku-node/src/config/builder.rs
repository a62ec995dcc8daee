use std::net::IpAddr;
use std::time::Duration;

use libp2p::identity::{secp256k1, Keypair};
use libp2p::Multiaddr;
use tokio::sync::mpsc;

use waku_core::error::Error;
use waku_store::provider::MessageProvider;

use crate::config::config::{
    Discv5Config, NodeConfig, WakuFilterConfig, WakuRelayConfig, WakuStoreConfig,
    DEFAULT_KEEP_ALIVE_INTERVAL,
};
use crate::event_loop::ConnStatus;

#[derive(Default)]
pub struct NodeConfigBuilder {
    config: NodeConfig,
}

impl NodeConfigBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn build(self) -> NodeConfig {
        self.config
    }

    pub fn keypair(mut self, keypair: Keypair) -> Self {
        self.config.keypair = keypair;
        self
    }

    pub fn keypair_from_secp256k1(mut self, bytes: &[u8]) -> Result<Self, Error> {
        let keypair = {
            let secret_key = secp256k1::SecretKey::try_from_bytes(bytes.to_vec())
                .map_err(|e| Error::InvalidArgument(format!("invalid secp256k1 key: {e}")))?;
            secp256k1::Keypair::from(secret_key).into()
        };

        self.config.keypair = keypair;
        Ok(self)
    }

    pub fn host_address(mut self, address: IpAddr, port: u16) -> Self {
        self.config.host_addr = address;
        self.config.tcp_port = port;
        self
    }

    pub fn with_advertise_address(mut self, address: Multiaddr) -> Self {
        self.config.advertise_addr = Some(address);
        self
    }

    pub fn with_keepalive(mut self, enable: bool) -> Self {
        self.config.keepalive = enable;
        self
    }

    /// Ping every connected peer at the default interval.
    pub fn with_keep_alive_pings(self) -> Self {
        self.with_keep_alive_interval(DEFAULT_KEEP_ALIVE_INTERVAL)
    }

    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.config.ping_interval = Some(interval);
        self
    }

    pub fn with_waku_relay(mut self, config: WakuRelayConfig) -> Self {
        self.config.relay = Some(config);
        self
    }

    pub fn with_waku_filter_server(mut self, config: WakuFilterConfig) -> Self {
        self.config.filter_server = Some(config);
        self
    }

    pub fn with_waku_filter_client(mut self) -> Self {
        self.config.filter_client = true;
        self
    }

    pub fn with_waku_store(mut self, config: WakuStoreConfig) -> Self {
        self.config.store = Some(config);
        self
    }

    pub fn with_message_provider(mut self, provider: Box<dyn MessageProvider>) -> Self {
        self.config.message_provider = Some(provider);
        self
    }

    pub fn with_lightpush(mut self) -> Self {
        self.config.lightpush = true;
        self
    }

    pub fn with_discovery_v5(mut self, config: Discv5Config) -> Self {
        self.config.discv5 = Some(config);
        self
    }

    pub fn with_connection_status_channel(mut self, sender: mpsc::Sender<ConnStatus>) -> Self {
        self.config.connection_status = Some(sender);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_config_builder_options() {
        // Given
        let (conn_status_tx, _conn_status_rx) = mpsc::channel(100);

        // When
        let config = NodeConfigBuilder::new()
            .host_address("127.0.0.1".parse().unwrap(), 0)
            .with_advertise_address("/ip4/1.2.3.4/tcp/4000".parse().unwrap())
            .with_keepalive(true)
            .with_keep_alive_pings()
            .with_waku_relay(Default::default())
            .with_waku_filter_server(Default::default())
            .with_waku_store(Default::default())
            .with_lightpush()
            .with_discovery_v5(Discv5Config {
                udp_port: 123,
                ..Default::default()
            })
            .with_connection_status_channel(conn_status_tx)
            .build();

        // Then
        assert_eq!(config.tcp_port, 0);
        assert!(config.advertise_addr.is_some());
        assert!(config.keepalive);
        assert_eq!(config.ping_interval, Some(DEFAULT_KEEP_ALIVE_INTERVAL));
        assert!(config.relay.is_some());
        assert!(config.filter_server.is_some());
        assert!(config.store.is_some());
        assert!(config.lightpush);
        assert_eq!(config.discv5.unwrap().udp_port, 123);
        assert!(config.connection_status.is_some());
    }

    #[test]
    fn test_node_config_builder_rejects_invalid_key() {
        // Given
        let bad_key = [0u8; 3];

        // When
        let result = NodeConfigBuilder::new().keypair_from_secp256k1(&bad_key);

        // Then
        assert!(result.is_err());
    }
}
