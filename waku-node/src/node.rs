use std::net::IpAddr;
use std::time::Duration;

use libp2p::gossipsub::MessageId;
use libp2p::request_response::ProtocolSupport;
use libp2p::swarm::SwarmBuilder;
use libp2p::{Multiaddr, PeerId};
use log::debug;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use waku_core::error::Error;
use waku_core::message::WakuMessage;
use waku_core::pubsub_topic::PubsubTopic;
use waku_filter::{ContentFilter, Subscribers};
use waku_store::archive::Archive;
use waku_store::request::HistoryQuery;
use waku_store::response::HistoryResponseBody;

use crate::behaviour::{Behaviour, Config as BehaviourConfig};
use crate::config::NodeConfig;
use crate::event_loop::{Command, Event, EventLoop, EventLoopConfig};
use crate::subscription::{FilterSubscription, RelaySubscription};
use crate::transport::default_transport;

/// Node lifecycle states.
///
/// Protocols are configured while `New` (via [`NodeConfig`]); protocol
/// operations are legal only while `Started`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    New,
    Started,
    Stopping,
    Stopped,
}

pub struct Node {
    peer_id: PeerId,
    state: NodeState,
    listen_addr: Multiaddr,
    relay_topics: Vec<PubsubTopic>,
    relay_enabled: bool,
    command_sender: mpsc::Sender<Command>,
    event_receiver: mpsc::Receiver<Event>,
    shutdown: CancellationToken,
    event_loop: Option<EventLoop>,
    task: Option<JoinHandle<()>>,
}

impl Node {
    /// Assemble a node from its configuration. The node owns the host; no
    /// task runs and no socket is bound until [`start`](Node::start).
    pub fn new(config: NodeConfig) -> Result<Self, Error> {
        let peer_id = PeerId::from(&config.keypair.public());

        let store_support = config.store.as_ref().map(|store| {
            if store.client_only {
                ProtocolSupport::Outbound
            } else {
                ProtocolSupport::Full
            }
        });

        let switch = {
            let transport = default_transport(&config.keypair)
                .map_err(|e| Error::Internal(e.to_string()))?;
            let behaviour = Behaviour::new(BehaviourConfig {
                local_public_key: config.keypair.public(),
                keep_alive: config.keepalive,
                ping_interval: config.ping_interval,
                relay: config.relay.is_some(),
                filter: config.filter_server.is_some() || config.filter_client,
                store: store_support,
                lightpush: config.lightpush,
            });
            let mut switch = SwarmBuilder::with_tokio_executor(transport, behaviour, peer_id).build();

            if let Some(address) = config.advertise_addr.clone() {
                switch.add_external_address(address);
            }
            switch
        };

        let archive = config
            .store
            .as_ref()
            .filter(|store| !store.client_only)
            .map(|store| Archive::new(store.retention, config.message_provider));
        let filter_subscribers = config
            .filter_server
            .as_ref()
            .map(|filter| Subscribers::new(filter.subscription_timeout));

        let relay_topics = config
            .relay
            .as_ref()
            .map(|relay| relay.topics.clone())
            .unwrap_or_default();
        let min_peers_to_publish = config
            .relay
            .as_ref()
            .map(|relay| relay.min_peers_to_publish)
            .unwrap_or_default();

        let listen_addr = listen_multiaddr(config.host_addr, config.tcp_port)?;

        let (command_sender, command_receiver) = mpsc::channel(32);
        let (event_sender, event_receiver) = mpsc::channel(32);
        let shutdown = CancellationToken::new();

        let event_loop = EventLoop::new(
            switch,
            command_receiver,
            event_sender,
            shutdown.child_token(),
            EventLoopConfig {
                min_peers_to_publish,
                pinned_topics: relay_topics.clone(),
                archive,
                filter_subscribers,
                connection_status: config.connection_status,
            },
        );

        Ok(Self {
            peer_id,
            state: NodeState::New,
            listen_addr,
            relay_topics,
            relay_enabled: config.relay.is_some(),
            command_sender,
            event_receiver,
            shutdown,
            event_loop: Some(event_loop),
            task: None,
        })
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Spawn the event loop, bind the configured listen address and join the
    /// configured relay topics.
    pub async fn start(&mut self) -> Result<(), Error> {
        let Some(event_loop) = self.event_loop.take() else {
            return Err(Error::InvalidArgument(
                format!("node cannot start from the {:?} state", self.state),
            ));
        };

        debug!("start node event loop");
        self.task = Some(tokio::spawn(event_loop.dispatch()));
        self.state = NodeState::Started;

        self.switch_listen_on(&self.listen_addr.clone()).await?;

        if self.relay_enabled {
            for topic in self.relay_topics.clone() {
                let (resp_tx, resp_rx) = oneshot::channel();
                self.send_command(Command::RelayJoinTopic {
                    pubsub_topic: topic,
                    sender: resp_tx,
                })
                .await?;
                recv_response(resp_rx).await??;
            }
        }

        Ok(())
    }

    /// Signal the shutdown token and wait for the event loop to drain. Every
    /// open subscription channel is closed. Stopping a stopped node is a
    /// no-op.
    pub async fn stop(&mut self) -> Result<(), Error> {
        match self.state {
            NodeState::Started => {}
            NodeState::Stopped => return Ok(()),
            state => {
                return Err(Error::InvalidArgument(format!(
                    "node cannot stop from the {state:?} state"
                )))
            }
        }

        self.state = NodeState::Stopping;
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| Error::Internal(format!("event loop panicked: {e}")))?;
        }
        self.state = NodeState::Stopped;

        Ok(())
    }

    pub async fn switch_listen_on(&self, address: &Multiaddr) -> Result<(), Error> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.send_command(Command::SwitchListenOn {
            address: address.clone(),
            sender: resp_tx,
        })
        .await?;

        recv_response(resp_rx).await?
    }

    pub async fn switch_dial(&self, address: &Multiaddr) -> Result<(), Error> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.send_command(Command::SwitchDial {
            address: address.clone(),
            sender: resp_tx,
        })
        .await?;

        recv_response(resp_rx).await?
    }

    pub async fn listen_addresses(&self) -> Result<Vec<Multiaddr>, Error> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.send_command(Command::ListenAddresses { sender: resp_tx })
            .await?;

        recv_response(resp_rx).await
    }

    pub async fn connected_peers(&self) -> Result<Vec<PeerId>, Error> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.send_command(Command::ConnectedPeers { sender: resp_tx })
            .await?;

        recv_response(resp_rx).await
    }

    /// Subscribe to a relay topic. Every subscription receives its own copy
    /// of every envelope observed on the topic. Tripping `cancel` returns
    /// [`Error::Cancelled`] without registering the subscription.
    pub async fn relay_subscribe(
        &self,
        pubsub_topic: &PubsubTopic,
        cancel: &CancellationToken,
    ) -> Result<RelaySubscription, Error> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.send_command(Command::RelaySubscribe {
            pubsub_topic: pubsub_topic.clone(),
            cancel: cancel.clone(),
            sender: resp_tx,
        })
        .await?;

        recv_cancellable(resp_rx, cancel).await
    }

    pub async fn relay_unsubscribe(&self, subscription: RelaySubscription) -> Result<(), Error> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.send_command(Command::RelayUnsubscribe {
            pubsub_topic: subscription.pubsub_topic().clone(),
            subscription_id: subscription.id(),
            sender: resp_tx,
        })
        .await?;

        recv_response(resp_rx).await?
    }

    pub async fn relay_publish(
        &self,
        pubsub_topic: &PubsubTopic,
        message: WakuMessage,
        cancel: &CancellationToken,
    ) -> Result<MessageId, Error> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.send_command(Command::RelayPublish {
            pubsub_topic: pubsub_topic.clone(),
            message,
            cancel: cancel.clone(),
            sender: resp_tx,
        })
        .await?;

        recv_cancellable(resp_rx, cancel).await
    }

    pub async fn relay_topics(&self) -> Result<Vec<PubsubTopic>, Error> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.send_command(Command::RelayTopics { sender: resp_tx })
            .await?;

        recv_response(resp_rx).await
    }

    /// Register a filter subscription with a server peer. With `peer` unset
    /// the first connected peer serves. Returns after the server
    /// acknowledges, within `timeout`; tripping `cancel` returns
    /// [`Error::Cancelled`] without activating the subscription.
    pub async fn filter_subscribe(
        &self,
        peer: Option<PeerId>,
        filter: ContentFilter,
        cancel: &CancellationToken,
        timeout: Duration,
    ) -> Result<FilterSubscription, Error> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.send_command(Command::FilterSubscribe {
            peer,
            filter,
            cancel: cancel.clone(),
            sender: resp_tx,
        })
        .await?;

        with_deadline(timeout, recv_cancellable(resp_rx, cancel)).await?
    }

    /// Cancel a filter subscription and close its channel.
    pub async fn filter_unsubscribe(
        &self,
        subscription: FilterSubscription,
        cancel: &CancellationToken,
        timeout: Duration,
    ) -> Result<(), Error> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.send_command(Command::FilterUnsubscribe {
            request_id: subscription.request_id().to_string(),
            cancel: cancel.clone(),
            sender: resp_tx,
        })
        .await?;

        with_deadline(timeout, recv_cancellable(resp_rx, cancel)).await?
    }

    /// Query a peer's message store. Drive pagination by repeating the query
    /// with the returned cursor.
    pub async fn store_query(
        &self,
        peer: PeerId,
        query: HistoryQuery,
        cancel: &CancellationToken,
        timeout: Duration,
    ) -> Result<HistoryResponseBody, Error> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.send_command(Command::StoreQuery {
            peer,
            query,
            cancel: cancel.clone(),
            sender: resp_tx,
        })
        .await?;

        with_deadline(timeout, recv_cancellable(resp_rx, cancel)).await?
    }

    /// Delegate publication of a message to a relaying peer.
    pub async fn light_push(
        &self,
        peer: PeerId,
        pubsub_topic: &PubsubTopic,
        message: WakuMessage,
        cancel: &CancellationToken,
        timeout: Duration,
    ) -> Result<(), Error> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.send_command(Command::LightPush {
            peer,
            pubsub_topic: pubsub_topic.clone(),
            message,
            cancel: cancel.clone(),
            sender: resp_tx,
        })
        .await?;

        with_deadline(timeout, recv_cancellable(resp_rx, cancel)).await?
    }

    pub async fn recv_event(&mut self) -> Option<Event> {
        self.event_receiver.recv().await
    }

    async fn send_command(&self, command: Command) -> Result<(), Error> {
        if self.state != NodeState::Started {
            return Err(Error::InvalidArgument(format!(
                "node is not started (state: {:?})",
                self.state
            )));
        }

        self.command_sender
            .send(command)
            .await
            .map_err(|_| Error::Cancelled)
    }
}

async fn recv_response<T>(receiver: oneshot::Receiver<T>) -> Result<T, Error> {
    receiver.await.map_err(|_| Error::Cancelled)
}

/// Await a command response, returning [`Error::Cancelled`] as soon as the
/// caller's token trips. The event loop drops the in-flight request's state
/// when it eventually resolves.
async fn recv_cancellable<T>(
    receiver: oneshot::Receiver<Result<T, Error>>,
    cancel: &CancellationToken,
) -> Result<T, Error> {
    tokio::select! {
        _ = cancel.cancelled() => Err(Error::Cancelled),
        response = receiver => response.unwrap_or(Err(Error::Cancelled)),
    }
}

async fn with_deadline<F, T>(timeout: Duration, future: F) -> Result<T, Error>
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| Error::Timeout)
}

fn listen_multiaddr(host_addr: IpAddr, tcp_port: u16) -> Result<Multiaddr, Error> {
    let addr = match host_addr {
        IpAddr::V4(ip) => format!("/ip4/{ip}/tcp/{tcp_port}"),
        IpAddr::V6(ip) => format!("/ip6/{ip}/tcp/{tcp_port}"),
    };
    addr.parse()
        .map_err(|_| Error::InvalidArgument(format!("invalid listen multiaddr: {addr}")))
}
