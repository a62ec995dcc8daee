use std::net::Ipv4Addr;
use std::time::Duration;

use bytes::Bytes;
use libp2p::Multiaddr;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use waku_core::pubsub_topic::PubsubTopic;
use waku_core::time::unix_epoch_nanos;
use waku_core::WakuMessage;
use waku_filter::ContentFilter;
use waku_node::{Node, NodeConfigBuilder};

const RPC_TIMEOUT: Duration = Duration::from_secs(5);

fn new_full_node(port: u16) -> Node {
    let config = NodeConfigBuilder::new()
        .host_address(Ipv4Addr::LOCALHOST.into(), port)
        .with_keepalive(true)
        .with_waku_relay(Default::default())
        .with_waku_filter_server(Default::default())
        .build();

    Node::new(config).expect("node creation to succeed")
}

fn new_light_node(port: u16) -> Node {
    let config = NodeConfigBuilder::new()
        .host_address(Ipv4Addr::LOCALHOST.into(), port)
        .with_keepalive(true)
        .with_waku_filter_client()
        .build();

    Node::new(config).expect("node creation to succeed")
}

fn new_message(payload: impl Into<Bytes>, content_topic: &str) -> WakuMessage {
    let mut message = WakuMessage::new(payload, content_topic);
    message.timestamp = unix_epoch_nanos();
    message
}

#[tokio::test]
async fn it_filter_pushes_only_matching_messages() {
    //// Setup: a full node with the filter server and a light client
    let server_addr: Multiaddr = "/ip4/127.0.0.1/tcp/23010".parse().unwrap();
    let mut server = new_full_node(23010);
    server.start().await.expect("node to start");

    let mut client = new_light_node(23011);
    client.start().await.expect("node to start");

    client
        .switch_dial(&server_addr)
        .await
        .expect("dial to succeed");
    sleep(Duration::from_secs(1)).await;

    //// Given: a subscription to the content topic "test"
    let cancel = CancellationToken::new();
    let pubsub_topic = PubsubTopic::default();
    let mut subscription = client
        .filter_subscribe(
            Some(server.peer_id()),
            ContentFilter {
                pubsub_topic: pubsub_topic.clone(),
                content_topics: vec!["test".into()],
            },
            &cancel,
            RPC_TIMEOUT,
        )
        .await
        .expect("filter subscription to be acknowledged");

    //// When: the server publishes one matching and one non-matching message
    server
        .relay_publish(
            &pubsub_topic,
            new_message(vec![1u8, 2, 3, 4, 5], "test"),
            &cancel,
        )
        .await
        .expect("publish to succeed");
    server
        .relay_publish(&pubsub_topic, new_message(vec![9u8], "other"), &cancel)
        .await
        .expect("publish to succeed");

    //// Then: exactly one envelope arrives, with content topic "test"
    let envelope = timeout(Duration::from_secs(2), subscription.recv())
        .await
        .expect("envelope within 2 seconds")
        .expect("subscription to be open");
    assert_eq!(envelope.message().content_topic.as_str(), "test");
    assert_eq!(envelope.message().payload.as_ref(), &[1, 2, 3, 4, 5]);

    let no_more = timeout(Duration::from_millis(500), subscription.recv()).await;
    assert!(no_more.is_err(), "only the matching message is pushed");

    client.stop().await.expect("node to stop");
    server.stop().await.expect("node to stop");
}

#[tokio::test]
async fn it_filter_unsubscribe_stops_pushes() {
    //// Setup
    let server_addr: Multiaddr = "/ip4/127.0.0.1/tcp/23012".parse().unwrap();
    let mut server = new_full_node(23012);
    server.start().await.expect("node to start");

    let mut client = new_light_node(23013);
    client.start().await.expect("node to start");

    client
        .switch_dial(&server_addr)
        .await
        .expect("dial to succeed");
    sleep(Duration::from_secs(1)).await;

    let cancel = CancellationToken::new();
    let pubsub_topic = PubsubTopic::default();
    let subscription = client
        .filter_subscribe(
            Some(server.peer_id()),
            ContentFilter {
                pubsub_topic: pubsub_topic.clone(),
                content_topics: vec!["test".into()],
            },
            &cancel,
            RPC_TIMEOUT,
        )
        .await
        .expect("filter subscription to be acknowledged");

    //// When: the client unsubscribes before anything is published
    client
        .filter_unsubscribe(subscription, &cancel, RPC_TIMEOUT)
        .await
        .expect("unsubscribe to be acknowledged");

    server
        .relay_publish(&pubsub_topic, new_message(b"TEST".to_vec(), "test"), &cancel)
        .await
        .expect("publish to succeed");

    //// Then: a fresh subscription to another topic is unaffected, and the
    //// server no longer holds the old one
    sleep(Duration::from_millis(500)).await;

    let mut other = client
        .filter_subscribe(
            Some(server.peer_id()),
            ContentFilter {
                pubsub_topic: pubsub_topic.clone(),
                content_topics: vec!["other".into()],
            },
            &cancel,
            RPC_TIMEOUT,
        )
        .await
        .expect("filter subscription to be acknowledged");

    server
        .relay_publish(&pubsub_topic, new_message(b"OTHER".to_vec(), "other"), &cancel)
        .await
        .expect("publish to succeed");

    let envelope = timeout(Duration::from_secs(2), other.recv())
        .await
        .expect("envelope within 2 seconds")
        .expect("subscription to be open");
    assert_eq!(envelope.message().content_topic.as_str(), "other");

    client.stop().await.expect("node to stop");
    server.stop().await.expect("node to stop");
}
