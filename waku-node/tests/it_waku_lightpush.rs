use std::net::Ipv4Addr;
use std::time::Duration;

use bytes::Bytes;
use libp2p::Multiaddr;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use waku_core::error::Error;
use waku_core::pubsub_topic::PubsubTopic;
use waku_core::time::unix_epoch_nanos;
use waku_core::WakuMessage;
use waku_node::{Node, NodeConfigBuilder};

const RPC_TIMEOUT: Duration = Duration::from_secs(5);

fn new_relay_node(port: u16) -> Node {
    let config = NodeConfigBuilder::new()
        .host_address(Ipv4Addr::LOCALHOST.into(), port)
        .with_keepalive(true)
        .with_waku_relay(Default::default())
        .with_lightpush()
        .build();

    Node::new(config).expect("node creation to succeed")
}

fn new_light_node(port: u16) -> Node {
    let config = NodeConfigBuilder::new()
        .host_address(Ipv4Addr::LOCALHOST.into(), port)
        .with_keepalive(true)
        .with_lightpush()
        .build();

    Node::new(config).expect("node creation to succeed")
}

fn new_message(payload: impl Into<Bytes>, content_topic: &str) -> WakuMessage {
    let mut message = WakuMessage::new(payload, content_topic);
    message.timestamp = unix_epoch_nanos();
    message
}

#[tokio::test]
async fn it_lightpush_publishes_through_relay_peer() {
    //// Setup: a relaying server and a non-relaying light client
    let server_addr: Multiaddr = "/ip4/127.0.0.1/tcp/23030".parse().unwrap();
    let mut server = new_relay_node(23030);
    server.start().await.expect("node to start");

    let cancel = CancellationToken::new();
    let pubsub_topic = PubsubTopic::default();
    let mut subscription = server
        .relay_subscribe(&pubsub_topic, &cancel)
        .await
        .expect("subscribe to topic");

    let mut client = new_light_node(23031);
    client.start().await.expect("node to start");
    client
        .switch_dial(&server_addr)
        .await
        .expect("dial to succeed");
    sleep(Duration::from_secs(1)).await;

    //// When
    client
        .light_push(
            server.peer_id(),
            &pubsub_topic,
            new_message(vec![1u8, 2, 3, 4, 5], "test"),
            &cancel,
            RPC_TIMEOUT,
        )
        .await
        .expect("push to be accepted");

    //// Then: the server's relay delivered the message locally
    let envelope = timeout(Duration::from_secs(2), subscription.recv())
        .await
        .expect("envelope within 2 seconds")
        .expect("subscription to be open");
    assert_eq!(envelope.message().payload.as_ref(), &[1, 2, 3, 4, 5]);
    assert_eq!(envelope.message().content_topic.as_str(), "test");

    client.stop().await.expect("node to stop");
    server.stop().await.expect("node to stop");
}

#[tokio::test]
async fn it_lightpush_rejected_by_non_relaying_peer() {
    //// Setup: the serving peer mounts lightpush but no relay
    let server_addr: Multiaddr = "/ip4/127.0.0.1/tcp/23032".parse().unwrap();
    let mut server = new_light_node(23032);
    server.start().await.expect("node to start");

    let mut client = new_light_node(23033);
    client.start().await.expect("node to start");
    client
        .switch_dial(&server_addr)
        .await
        .expect("dial to succeed");
    sleep(Duration::from_secs(1)).await;

    //// When
    let cancel = CancellationToken::new();
    let result = client
        .light_push(
            server.peer_id(),
            &PubsubTopic::default(),
            new_message(b"TEST".to_vec(), "test"),
            &cancel,
            RPC_TIMEOUT,
        )
        .await;

    //// Then
    assert!(matches!(result, Err(Error::RemoteRejected { .. })));

    client.stop().await.expect("node to stop");
    server.stop().await.expect("node to stop");
}
