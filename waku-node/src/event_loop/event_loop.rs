use std::collections::{HashMap, HashSet};
use std::time::Duration;

use futures::StreamExt;
use libp2p::gossipsub::MessageId;
use libp2p::request_response::{self, OutboundFailure, RequestId};
use libp2p::swarm::SwarmEvent;
use libp2p::PeerId;
use log::{debug, info, trace, warn};
use prost::Message as _;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use waku_core::envelope::Envelope;
use waku_core::error::Error;
use waku_core::message::proto::WakuMessage as WakuMessageProto;
use waku_core::message::WakuMessage;
use waku_core::pubsub_topic::PubsubTopic;
use waku_core::time::unix_epoch_nanos;
use waku_filter::{FilterAck, FilterRpc, MessagePush, SubscribeRequest, Subscriber, Subscribers};
use waku_lightpush::{PushRequest, PushResponse};
use waku_store::archive::Archive;
use waku_store::request::HistoryRequest;
use waku_store::response::{HistoryErrorKind, HistoryResponse, HistoryResponseBody};

use crate::behaviour::{self, Behaviour};
use crate::event_loop::command::Command;
use crate::event_loop::event::{ConnStatus, Event};
use crate::subscription::{FilterSubscription, RelaySubscription, SUBSCRIPTION_CHANNEL_CAPACITY};

/// Period of the archive retention sweep.
const RETENTION_SWEEP_INTERVAL: Duration = Duration::from_secs(30);
/// Period of the filter subscription idle-expiry sweep.
const SUBSCRIPTION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub(crate) struct EventLoopConfig {
    pub min_peers_to_publish: usize,
    pub pinned_topics: Vec<PubsubTopic>,
    pub archive: Option<Archive>,
    pub filter_subscribers: Option<Subscribers>,
    pub connection_status: Option<mpsc::Sender<ConnStatus>>,
}

struct SubscriberSink {
    id: u64,
    sender: mpsc::Sender<Envelope>,
}

#[derive(Default)]
struct RelayDispatcher {
    subscriptions: HashMap<PubsubTopic, Vec<SubscriberSink>>,
    pinned_topics: HashSet<PubsubTopic>,
    next_subscription_id: u64,
    dropped_envelopes: u64,
}

struct FilterServer {
    subscribers: Subscribers,
    pending_pushes: HashMap<RequestId, (PeerId, String)>,
}

struct ActiveFilter {
    peer_id: PeerId,
    pubsub_topic: PubsubTopic,
    content_topics: Vec<waku_core::content_topic::ContentTopic>,
    sender: mpsc::Sender<Envelope>,
}

enum PendingFilterOp {
    Subscribe {
        request_id: String,
        peer_id: PeerId,
        filter: waku_filter::ContentFilter,
        channel_sender: mpsc::Sender<Envelope>,
        channel_receiver: mpsc::Receiver<Envelope>,
        cancel: CancellationToken,
        sender: oneshot::Sender<Result<FilterSubscription, Error>>,
    },
    Unsubscribe {
        request_id: String,
        cancel: CancellationToken,
        sender: oneshot::Sender<Result<(), Error>>,
    },
}

#[derive(Default)]
struct FilterClient {
    pending: HashMap<RequestId, PendingFilterOp>,
    active: HashMap<String, ActiveFilter>,
}

struct PendingRequest<T> {
    cancel: CancellationToken,
    sender: oneshot::Sender<Result<T, Error>>,
}

impl<T> PendingRequest<T> {
    /// Resolve the request, honouring a cancellation that happened while it
    /// was in flight.
    fn resolve(self, result: Result<T, Error>, command: &str) {
        let result = if self.cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            result
        };
        reply(self.sender, result, command);
    }
}

pub(crate) struct EventLoop {
    switch: libp2p::Swarm<Behaviour>,
    command_source: mpsc::Receiver<Command>,
    event_sink: mpsc::Sender<Event>,
    shutdown: CancellationToken,

    min_peers_to_publish: usize,
    relay: RelayDispatcher,
    archive: Option<Archive>,
    filter_server: Option<FilterServer>,
    filter_client: FilterClient,
    pending_queries: HashMap<RequestId, PendingRequest<HistoryResponseBody>>,
    pending_pushes: HashMap<RequestId, PendingRequest<()>>,
    connected_peers: HashSet<PeerId>,
    connection_status: Option<mpsc::Sender<ConnStatus>>,
}

impl EventLoop {
    pub(crate) fn new(
        switch: libp2p::Swarm<Behaviour>,
        command_source: mpsc::Receiver<Command>,
        event_sink: mpsc::Sender<Event>,
        shutdown: CancellationToken,
        config: EventLoopConfig,
    ) -> Self {
        Self {
            switch,
            command_source,
            event_sink,
            shutdown,
            min_peers_to_publish: config.min_peers_to_publish,
            relay: RelayDispatcher {
                pinned_topics: config.pinned_topics.into_iter().collect(),
                ..Default::default()
            },
            archive: config.archive,
            filter_server: config.filter_subscribers.map(|subscribers| FilterServer {
                subscribers,
                pending_pushes: HashMap::new(),
            }),
            filter_client: FilterClient::default(),
            pending_queries: HashMap::new(),
            pending_pushes: HashMap::new(),
            connected_peers: HashSet::new(),
            connection_status: config.connection_status,
        }
    }

    pub(crate) async fn dispatch(mut self) {
        let mut retention_sweep = tokio::time::interval(RETENTION_SWEEP_INTERVAL);
        let mut subscription_sweep = tokio::time::interval(SUBSCRIPTION_SWEEP_INTERVAL);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!("shutdown signalled, terminating node event loop");
                    return;
                },
                command = self.command_source.recv() => match command {
                    Some(cmd) => { self.handle_command(cmd).await; },
                    None => { debug!("got empty command. terminating node event loop"); return },
                },
                event = self.switch.select_next_some() => self.handle_swarm_event(event).await,
                _ = retention_sweep.tick() => {
                    if let Some(archive) = &self.archive {
                        archive.remove_expired();
                    }
                },
                _ = subscription_sweep.tick() => {
                    if let Some(server) = &self.filter_server {
                        let expired = server.subscribers.remove_expired();
                        if !expired.is_empty() {
                            debug!("expired {} idle filter subscriptions", expired.len());
                        }
                    }
                },
            }
        }
    }

    async fn handle_command(&mut self, cmd: Command) {
        trace!("handle command: {cmd}");

        match cmd {
            Command::SwitchListenOn { address, sender } => {
                let result = self
                    .switch
                    .listen_on(address)
                    .map(|_| ())
                    .map_err(|e| Error::Internal(e.to_string()));
                reply(sender, result, "switch_listen_on");
            }
            Command::SwitchDial { address, sender } => {
                let result = self
                    .switch
                    .dial(address)
                    .map_err(|_| Error::PeerUnreachable);
                reply(sender, result, "switch_dial");
            }
            Command::ListenAddresses { sender } => {
                reply(
                    sender,
                    self.switch.listeners().cloned().collect(),
                    "listen_addresses",
                );
            }
            Command::ConnectedPeers { sender } => {
                reply(
                    sender,
                    self.connected_peers.iter().copied().collect(),
                    "connected_peers",
                );
            }
            Command::RelayJoinTopic {
                pubsub_topic,
                sender,
            } => {
                let result = self.relay_join(&pubsub_topic);
                if result.is_ok() {
                    self.relay.pinned_topics.insert(pubsub_topic);
                }
                reply(sender, result, "relay_join_topic");
            }
            Command::RelaySubscribe {
                pubsub_topic,
                cancel,
                sender,
            } => {
                // Checked before the subscription table is touched, so a
                // cancelled call leaves no partial state behind.
                if cancel.is_cancelled() {
                    reply(sender, Err(Error::Cancelled), "relay_subscribe");
                    return;
                }

                let result = self.relay_join(&pubsub_topic).map(|()| {
                    let id = self.relay.next_subscription_id;
                    self.relay.next_subscription_id += 1;

                    let (tx, rx) = mpsc::channel(SUBSCRIPTION_CHANNEL_CAPACITY);
                    self.relay
                        .subscriptions
                        .entry(pubsub_topic.clone())
                        .or_default()
                        .push(SubscriberSink { id, sender: tx });

                    RelaySubscription::new(id, pubsub_topic, rx)
                });
                reply(sender, result, "relay_subscribe");
            }
            Command::RelayUnsubscribe {
                pubsub_topic,
                subscription_id,
                sender,
            } => {
                let result = self.relay_unsubscribe(&pubsub_topic, subscription_id);
                reply(sender, result, "relay_unsubscribe");
            }
            Command::RelayPublish {
                pubsub_topic,
                message,
                cancel,
                sender,
            } => {
                let result = if cancel.is_cancelled() {
                    Err(Error::Cancelled)
                } else {
                    self.relay_publish(&pubsub_topic, message)
                };
                reply(sender, result, "relay_publish");
            }
            Command::RelayTopics { sender } => {
                let topics = self
                    .switch
                    .behaviour()
                    .waku_relay
                    .as_ref()
                    .map(|relay| relay.topics())
                    .unwrap_or_default();
                reply(sender, topics, "relay_topics");
            }
            Command::FilterSubscribe {
                peer,
                filter,
                cancel,
                sender,
            } => self.filter_subscribe(peer, filter, cancel, sender),
            Command::FilterUnsubscribe {
                request_id,
                cancel,
                sender,
            } => self.filter_unsubscribe(request_id, cancel, sender),
            Command::StoreQuery {
                peer,
                query,
                cancel,
                sender,
            } => {
                if cancel.is_cancelled() {
                    reply(sender, Err(Error::Cancelled), "store_query");
                    return;
                }
                let Some(store) = self.switch.behaviour_mut().waku_store.as_mut() else {
                    reply(
                        sender,
                        Err(Error::InvalidArgument("store is not enabled".into())),
                        "store_query",
                    );
                    return;
                };

                let request = HistoryRequest {
                    request_id: new_request_id(),
                    query,
                };
                let request_id = store.send_request(&peer, request);
                self.pending_queries
                    .insert(request_id, PendingRequest { cancel, sender });
            }
            Command::LightPush {
                peer,
                pubsub_topic,
                message,
                cancel,
                sender,
            } => {
                if cancel.is_cancelled() {
                    reply(sender, Err(Error::Cancelled), "light_push");
                    return;
                }
                let Some(lightpush) = self.switch.behaviour_mut().waku_lightpush.as_mut() else {
                    reply(
                        sender,
                        Err(Error::InvalidArgument("lightpush is not enabled".into())),
                        "light_push",
                    );
                    return;
                };

                let request = PushRequest {
                    request_id: new_request_id(),
                    pubsub_topic,
                    message,
                };
                let request_id = lightpush.send_request(&peer, request);
                self.pending_pushes
                    .insert(request_id, PendingRequest { cancel, sender });
            }
        }
    }

    async fn handle_swarm_event(&mut self, event: SwarmEvent<behaviour::Event, impl std::fmt::Debug>) {
        match event {
            SwarmEvent::NewListenAddr { address, .. } => info!("switch listening on: {address:?}"),
            SwarmEvent::ConnectionEstablished {
                peer_id,
                num_established,
                ..
            } => {
                if num_established.get() == 1 && self.connected_peers.insert(peer_id) {
                    self.peer_connectivity_changed(Event::PeerConnected { peer_id })
                        .await;
                }
            }
            SwarmEvent::ConnectionClosed {
                peer_id,
                num_established,
                ..
            } => {
                if num_established == 0 && self.connected_peers.remove(&peer_id) {
                    self.peer_disconnected(peer_id);
                    self.peer_connectivity_changed(Event::PeerDisconnected { peer_id })
                        .await;
                }
            }
            SwarmEvent::Behaviour(event) => self.handle_behaviour_event(event).await,
            _ => {}
        }
    }

    async fn handle_behaviour_event(&mut self, event: behaviour::Event) {
        match event {
            behaviour::Event::WakuRelay(waku_relay::Event::Message {
                pubsub_topic,
                message,
            }) => {
                let envelope =
                    Envelope::new(message.clone(), unix_epoch_nanos(), pubsub_topic.clone());
                self.handle_envelope(envelope);

                let _ = self.event_sink.try_send(Event::WakuRelayMessage {
                    pubsub_topic,
                    message,
                });
            }
            behaviour::Event::WakuRelay(event) => debug!("{event:?}"),
            behaviour::Event::WakuFilter(event) => self.handle_filter_event(event),
            behaviour::Event::WakuStore(event) => self.handle_store_event(event),
            behaviour::Event::WakuLightPush(event) => self.handle_lightpush_event(event),
            behaviour::Event::Ping(event) => trace!("{event:?}"),
            behaviour::Event::Identify(event) => trace!("{event:?}"),
        }
    }

    /// Fan an ingress envelope out to the local relay subscribers, the
    /// archive and the filter server.
    fn handle_envelope(&mut self, envelope: Envelope) {
        let mut dropped = 0u64;
        if let Some(sinks) = self.relay.subscriptions.get_mut(envelope.pubsub_topic()) {
            sinks.retain(|sink| match sink.sender.try_send(envelope.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    dropped += 1;
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            });
        }
        if dropped > 0 {
            self.relay.dropped_envelopes += dropped;
            warn!(
                "dropped envelope for {dropped} lagging relay subscribers (total dropped: {})",
                self.relay.dropped_envelopes
            );
        }

        if let Some(archive) = &self.archive {
            if let Err(e) = archive.insert(envelope.clone()) {
                warn!("failed to archive envelope: {e}");
            }
        }

        self.push_to_filter_subscribers(&envelope);
    }

    fn push_to_filter_subscribers(&mut self, envelope: &Envelope) {
        let matching = match &self.filter_server {
            Some(server) => server
                .subscribers
                .matching(envelope.pubsub_topic(), &envelope.message().content_topic),
            None => return,
        };

        for (peer_id, request_id) in matching {
            let rpc = FilterRpc::Push(MessagePush {
                request_id: request_id.clone(),
                messages: vec![envelope.message().clone()],
            });

            let Some(filter) = self.switch.behaviour_mut().waku_filter.as_mut() else {
                return;
            };
            let rr_id = filter.send_request(&peer_id, rpc);

            if let Some(server) = &mut self.filter_server {
                server.pending_pushes.insert(rr_id, (peer_id, request_id));
            }
        }
    }

    fn relay_join(&mut self, pubsub_topic: &PubsubTopic) -> Result<(), Error> {
        let Some(relay) = self.switch.behaviour_mut().waku_relay.as_mut() else {
            return Err(Error::InvalidArgument("relay is not enabled".into()));
        };

        relay
            .subscribe(pubsub_topic)
            .map(|_| ())
            .map_err(|e| Error::Internal(e.to_string()))
    }

    fn relay_unsubscribe(
        &mut self,
        pubsub_topic: &PubsubTopic,
        subscription_id: u64,
    ) -> Result<(), Error> {
        let sinks = self
            .relay
            .subscriptions
            .get_mut(pubsub_topic)
            .ok_or(Error::SubscriptionNotFound)?;

        let before = sinks.len();
        sinks.retain(|sink| sink.id != subscription_id);
        if sinks.len() == before {
            return Err(Error::SubscriptionNotFound);
        }

        if sinks.is_empty() {
            self.relay.subscriptions.remove(pubsub_topic);

            if !self.relay.pinned_topics.contains(pubsub_topic) {
                if let Some(relay) = self.switch.behaviour_mut().waku_relay.as_mut() {
                    if let Err(e) = relay.unsubscribe(pubsub_topic) {
                        warn!("failed to leave topic {pubsub_topic}: {e}");
                    }
                }
            }
        }

        Ok(())
    }

    fn relay_publish(
        &mut self,
        pubsub_topic: &PubsubTopic,
        message: WakuMessage,
    ) -> Result<MessageId, Error> {
        let min_peers = self.min_peers_to_publish;
        let Some(relay) = self.switch.behaviour_mut().waku_relay.as_mut() else {
            return Err(Error::InvalidArgument("relay is not enabled".into()));
        };

        if min_peers > 0 && relay.topic_peer_count(pubsub_topic) < min_peers {
            return Err(Error::NotEnoughPeers);
        }

        let message_id = match relay.publish(pubsub_topic, message.clone()) {
            Ok(message_id) => message_id,
            // An empty mesh is not an error when no peer floor is configured;
            // the message still reaches local subscribers and sinks.
            Err(waku_relay::error::PublishError::InsufficientPeers) if min_peers == 0 => {
                let data = WakuMessageProto::from(message.clone()).encode_to_vec();
                waku_relay::message_id(pubsub_topic.as_str(), &data)
            }
            Err(waku_relay::error::PublishError::InsufficientPeers) => {
                return Err(Error::NotEnoughPeers)
            }
            Err(waku_relay::error::PublishError::Duplicate) => {
                return Err(Error::InvalidArgument("duplicate message".into()))
            }
            Err(e) => return Err(Error::Internal(e.to_string())),
        };

        let envelope = Envelope::new(message, unix_epoch_nanos(), pubsub_topic.clone());
        self.handle_envelope(envelope);

        Ok(message_id)
    }

    fn filter_subscribe(
        &mut self,
        peer: Option<PeerId>,
        filter: waku_filter::ContentFilter,
        cancel: CancellationToken,
        sender: oneshot::Sender<Result<FilterSubscription, Error>>,
    ) {
        if cancel.is_cancelled() {
            reply(sender, Err(Error::Cancelled), "filter_subscribe");
            return;
        }

        let peer_id = match peer.or_else(|| self.connected_peers.iter().next().copied()) {
            Some(peer_id) => peer_id,
            None => {
                reply(sender, Err(Error::PeerUnreachable), "filter_subscribe");
                return;
            }
        };

        let Some(filter_behaviour) = self.switch.behaviour_mut().waku_filter.as_mut() else {
            reply(
                sender,
                Err(Error::InvalidArgument("filter is not enabled".into())),
                "filter_subscribe",
            );
            return;
        };

        let request_id = new_request_id();
        let rpc = FilterRpc::Request(SubscribeRequest {
            request_id: request_id.clone(),
            subscribe: true,
            pubsub_topic: filter.pubsub_topic.clone(),
            content_topics: filter.content_topics.clone(),
        });
        let rr_id = filter_behaviour.send_request(&peer_id, rpc);

        let (channel_sender, channel_receiver) = mpsc::channel(SUBSCRIPTION_CHANNEL_CAPACITY);
        self.filter_client.pending.insert(
            rr_id,
            PendingFilterOp::Subscribe {
                request_id,
                peer_id,
                filter,
                channel_sender,
                channel_receiver,
                cancel,
                sender,
            },
        );
    }

    fn filter_unsubscribe(
        &mut self,
        request_id: String,
        cancel: CancellationToken,
        sender: oneshot::Sender<Result<(), Error>>,
    ) {
        if cancel.is_cancelled() {
            reply(sender, Err(Error::Cancelled), "filter_unsubscribe");
            return;
        }

        let Some(active) = self.filter_client.active.get(&request_id) else {
            reply(sender, Err(Error::SubscriptionNotFound), "filter_unsubscribe");
            return;
        };
        let peer_id = active.peer_id;
        let rpc = FilterRpc::Request(SubscribeRequest {
            request_id: request_id.clone(),
            subscribe: false,
            pubsub_topic: active.pubsub_topic.clone(),
            content_topics: active.content_topics.clone(),
        });

        let Some(filter_behaviour) = self.switch.behaviour_mut().waku_filter.as_mut() else {
            reply(
                sender,
                Err(Error::InvalidArgument("filter is not enabled".into())),
                "filter_unsubscribe",
            );
            return;
        };

        let rr_id = filter_behaviour.send_request(&peer_id, rpc);
        self.filter_client.pending.insert(
            rr_id,
            PendingFilterOp::Unsubscribe {
                request_id,
                cancel,
                sender,
            },
        );
    }

    fn handle_filter_event(&mut self, event: waku_filter::Event) {
        match event {
            request_response::Event::Message { peer, message } => match message {
                request_response::Message::Request {
                    request, channel, ..
                } => {
                    let request_id = request.request_id().to_string();
                    self.handle_filter_rpc(peer, request);

                    if let Some(filter) = self.switch.behaviour_mut().waku_filter.as_mut() {
                        if filter
                            .send_response(channel, FilterAck { request_id })
                            .is_err()
                        {
                            debug!("filter ack to {peer} failed: stream closed");
                        }
                    }
                }
                request_response::Message::Response {
                    request_id,
                    response,
                } => self.handle_filter_ack(request_id, response),
            },
            request_response::Event::OutboundFailure {
                peer,
                request_id,
                error,
            } => {
                if let Some(server) = &mut self.filter_server {
                    if let Some((peer_id, sub_request_id)) =
                        server.pending_pushes.remove(&request_id)
                    {
                        warn!("filter push to {peer_id} failed: {error}; dropping subscription");
                        server.subscribers.remove(&peer_id, &sub_request_id);
                        return;
                    }
                }

                match self.filter_client.pending.remove(&request_id) {
                    Some(PendingFilterOp::Subscribe { sender, .. }) => {
                        reply(sender, Err(map_outbound_failure(error)), "filter_subscribe");
                    }
                    Some(PendingFilterOp::Unsubscribe { sender, .. }) => {
                        reply(sender, Err(map_outbound_failure(error)), "filter_unsubscribe");
                    }
                    None => debug!("filter outbound failure to {peer}: {error}"),
                }
            }
            request_response::Event::InboundFailure {
                peer,
                error,
                ..
            } => debug!("filter inbound failure from {peer}: {error}"),
            request_response::Event::ResponseSent { .. } => {}
        }
    }

    fn handle_filter_rpc(&mut self, peer: PeerId, rpc: FilterRpc) {
        match rpc {
            FilterRpc::Request(request) => match &self.filter_server {
                None => debug!("filter request from {peer} on a non-server node"),
                Some(server) if request.subscribe => {
                    server.subscribers.append(Subscriber {
                        peer_id: peer,
                        request_id: request.request_id,
                        pubsub_topic: request.pubsub_topic,
                        content_topics: request.content_topics,
                    });
                }
                Some(server) => {
                    server.subscribers.remove_content_filters(
                        &peer,
                        &request.request_id,
                        &request.content_topics,
                    );
                }
            },
            FilterRpc::Push(push) => {
                let Some(active) = self.filter_client.active.get(&push.request_id) else {
                    debug!("filter push from {peer} for unknown subscription");
                    return;
                };
                if active.peer_id != peer {
                    warn!("filter push for {} from unexpected peer {peer}", push.request_id);
                    return;
                }

                let received_at = unix_epoch_nanos();
                for message in push.messages {
                    let envelope =
                        Envelope::new(message, received_at, active.pubsub_topic.clone());

                    if let Some(archive) = &self.archive {
                        if let Err(e) = archive.insert(envelope.clone()) {
                            warn!("failed to archive pushed envelope: {e}");
                        }
                    }

                    if active.sender.try_send(envelope).is_err() {
                        warn!("dropped pushed envelope for lagging filter subscription");
                    }
                }
            }
        }
    }

    fn handle_filter_ack(&mut self, request_id: RequestId, ack: FilterAck) {
        if let Some(server) = &mut self.filter_server {
            if let Some((peer_id, sub_request_id)) = server.pending_pushes.remove(&request_id) {
                server.subscribers.refresh(&peer_id, &sub_request_id);
                return;
            }
        }

        match self.filter_client.pending.remove(&request_id) {
            Some(PendingFilterOp::Subscribe {
                request_id,
                peer_id,
                filter,
                channel_sender,
                channel_receiver,
                cancel,
                sender,
            }) => {
                // A subscription cancelled while its ack was in flight is
                // never activated; the server-side entry idle-expires.
                if cancel.is_cancelled() {
                    reply(sender, Err(Error::Cancelled), "filter_subscribe");
                    return;
                }

                self.filter_client.active.insert(
                    request_id.clone(),
                    ActiveFilter {
                        peer_id,
                        pubsub_topic: filter.pubsub_topic,
                        content_topics: filter.content_topics,
                        sender: channel_sender,
                    },
                );
                reply(
                    sender,
                    Ok(FilterSubscription::new(request_id, peer_id, channel_receiver)),
                    "filter_subscribe",
                );
            }
            Some(PendingFilterOp::Unsubscribe {
                request_id,
                cancel,
                sender,
            }) => {
                // The server already processed the unsubscribe; drop the
                // local entry regardless of a late cancellation.
                self.filter_client.active.remove(&request_id);
                let result = if cancel.is_cancelled() {
                    Err(Error::Cancelled)
                } else {
                    Ok(())
                };
                reply(sender, result, "filter_unsubscribe");
            }
            None => debug!("filter ack for unknown request: {}", ack.request_id),
        }
    }

    fn handle_store_event(&mut self, event: waku_store::Event) {
        match event {
            request_response::Event::Message { peer, message } => match message {
                request_response::Message::Request {
                    request, channel, ..
                } => {
                    let result = match &self.archive {
                        Some(archive) => archive.find_messages(&request.query),
                        None => Err(HistoryErrorKind::ServiceUnavailable),
                    };
                    let response = HistoryResponse {
                        request_id: request.request_id,
                        result,
                    };

                    if let Some(store) = self.switch.behaviour_mut().waku_store.as_mut() {
                        if store.send_response(channel, response).is_err() {
                            debug!("history response to {peer} failed: stream closed");
                        }
                    }
                }
                request_response::Message::Response {
                    request_id,
                    response,
                } => {
                    let Some(pending) = self.pending_queries.remove(&request_id) else {
                        debug!("history response for unknown request from {peer}");
                        return;
                    };
                    let result = match response.result {
                        Ok(body) => Ok(body),
                        Err(HistoryErrorKind::InvalidCursor) => {
                            Err(Error::InvalidArgument("invalid pagination cursor".into()))
                        }
                        Err(HistoryErrorKind::ServiceUnavailable) => {
                            Err(Error::BackendUnavailable("remote store unavailable".into()))
                        }
                        Err(HistoryErrorKind::Unknown(code)) => {
                            Err(Error::remote_rejected(format!("history error code {code}")))
                        }
                    };
                    pending.resolve(result, "store_query");
                }
            },
            request_response::Event::OutboundFailure {
                request_id, error, ..
            } => {
                if let Some(pending) = self.pending_queries.remove(&request_id) {
                    pending.resolve(Err(map_outbound_failure(error)), "store_query");
                }
            }
            request_response::Event::InboundFailure { peer, error, .. } => {
                debug!("store inbound failure from {peer}: {error}")
            }
            request_response::Event::ResponseSent { .. } => {}
        }
    }

    fn handle_lightpush_event(&mut self, event: waku_lightpush::Event) {
        match event {
            request_response::Event::Message { peer, message } => match message {
                request_response::Message::Request {
                    request, channel, ..
                } => {
                    let verdict = self.relay_publish(&request.pubsub_topic, request.message);
                    let response = match verdict {
                        Ok(_) => PushResponse {
                            request_id: request.request_id,
                            is_success: true,
                            info: String::new(),
                        },
                        Err(e) => PushResponse {
                            request_id: request.request_id,
                            is_success: false,
                            info: e.to_string(),
                        },
                    };

                    if let Some(lightpush) = self.switch.behaviour_mut().waku_lightpush.as_mut() {
                        if lightpush.send_response(channel, response).is_err() {
                            debug!("push response to {peer} failed: stream closed");
                        }
                    }
                }
                request_response::Message::Response {
                    request_id,
                    response,
                } => {
                    let Some(pending) = self.pending_pushes.remove(&request_id) else {
                        debug!("push response for unknown request from {peer}");
                        return;
                    };
                    let result = if response.is_success {
                        Ok(())
                    } else {
                        Err(Error::remote_rejected(response.info))
                    };
                    pending.resolve(result, "light_push");
                }
            },
            request_response::Event::OutboundFailure {
                request_id, error, ..
            } => {
                if let Some(pending) = self.pending_pushes.remove(&request_id) {
                    pending.resolve(Err(map_outbound_failure(error)), "light_push");
                }
            }
            request_response::Event::InboundFailure { peer, error, .. } => {
                debug!("lightpush inbound failure from {peer}: {error}")
            }
            request_response::Event::ResponseSent { .. } => {}
        }
    }

    /// Cleanup protocol state bound to a fully disconnected peer.
    fn peer_disconnected(&mut self, peer_id: PeerId) {
        if let Some(server) = &self.filter_server {
            server.subscribers.remove_peer(&peer_id);
        }

        // Dropping the channel sender closes the subscription channel; the
        // client does not reconnect on its own.
        self.filter_client
            .active
            .retain(|_, active| active.peer_id != peer_id);
    }

    async fn peer_connectivity_changed(&mut self, event: Event) {
        let _ = self.event_sink.try_send(event);

        if let Some(status_sink) = &self.connection_status {
            let status = ConnStatus {
                is_online: !self.connected_peers.is_empty(),
                peers_connected: self.connected_peers.len(),
            };
            if status_sink.try_send(status).is_err() {
                debug!("connection status channel full or closed");
            }
        }
    }
}

fn new_request_id() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}

fn map_outbound_failure(error: OutboundFailure) -> Error {
    match error {
        OutboundFailure::Timeout => Error::Timeout,
        OutboundFailure::UnsupportedProtocols => {
            Error::remote_rejected("protocol not supported by peer")
        }
        _ => Error::PeerUnreachable,
    }
}

// A dropped receiver is expected when the caller cancelled or timed out.
fn reply<T>(sender: oneshot::Sender<T>, response: T, command: &str) {
    if sender.send(response).is_err() {
        debug!("send '{command}' command response failed: receiver dropped");
    }
}
