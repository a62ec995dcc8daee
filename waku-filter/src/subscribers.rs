//! Filter server subscription table.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use libp2p::PeerId;

use waku_core::content_topic::ContentTopic;
use waku_core::pubsub_topic::PubsubTopic;

/// A subscription is uniquely identified by the requesting peer and the
/// request id it chose.
pub type SubscriptionKey = (PeerId, String);

/// One filter subscription as seen by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    pub peer_id: PeerId,
    pub request_id: String,
    pub pubsub_topic: PubsubTopic,
    pub content_topics: Vec<ContentTopic>,
}

struct Entry {
    pubsub_topic: PubsubTopic,
    content_topics: Vec<ContentTopic>,
    last_active: Instant,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<SubscriptionKey, Entry>,
    by_content_topic: HashMap<ContentTopic, HashSet<SubscriptionKey>>,
    by_peer: HashMap<PeerId, HashSet<String>>,
}

/// The filter server's subscription table.
///
/// Entries are keyed by `(peer_id, request_id)`; a content-topic index
/// serves dispatch and a peer index serves disconnect cleanup. All access
/// goes through one exclusive lock; dispatch snapshots matches under the
/// lock and performs I/O outside it.
pub struct Subscribers {
    timeout: Duration,
    inner: Mutex<Inner>,
}

impl Subscribers {
    /// `timeout` is the idle expiry: entries with no activity for longer are
    /// dropped by [`remove_expired`](Self::remove_expired).
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Add a subscription. A duplicate `(peer_id, request_id)` replaces the
    /// previous entry's filter list; a content topic appears at most once
    /// per entry.
    pub fn append(&self, mut subscriber: Subscriber) {
        let mut seen = HashSet::new();
        subscriber
            .content_topics
            .retain(|topic| seen.insert(topic.clone()));

        let mut inner = self.inner.lock().expect("subscribers lock not poisoned");
        let key = (subscriber.peer_id, subscriber.request_id.clone());

        inner.unlink(&key);

        for topic in &subscriber.content_topics {
            inner
                .by_content_topic
                .entry(topic.clone())
                .or_default()
                .insert(key.clone());
        }
        inner
            .by_peer
            .entry(subscriber.peer_id)
            .or_default()
            .insert(subscriber.request_id);

        inner.entries.insert(
            key,
            Entry {
                pubsub_topic: subscriber.pubsub_topic,
                content_topics: subscriber.content_topics,
                last_active: Instant::now(),
            },
        );
    }

    /// Remove the given content topics from a subscription. If the filter
    /// list becomes empty the subscription is removed entirely.
    pub fn remove_content_filters(
        &self,
        peer_id: &PeerId,
        request_id: &str,
        content_topics: &[ContentTopic],
    ) {
        let mut inner = self.inner.lock().expect("subscribers lock not poisoned");
        let key = (*peer_id, request_id.to_string());

        let emptied = match inner.entries.get_mut(&key) {
            None => return,
            Some(entry) => {
                entry
                    .content_topics
                    .retain(|topic| !content_topics.contains(topic));
                entry.content_topics.is_empty()
            }
        };

        for topic in content_topics {
            if let Some(keys) = inner.by_content_topic.get_mut(topic) {
                keys.remove(&key);
                if keys.is_empty() {
                    inner.by_content_topic.remove(topic);
                }
            }
        }

        if emptied {
            inner.remove(&key);
        }
    }

    /// Snapshot the subscriptions matching an envelope's pubsub and content
    /// topic. An empty subscription pubsub topic matches any.
    pub fn matching(
        &self,
        pubsub_topic: &PubsubTopic,
        content_topic: &ContentTopic,
    ) -> Vec<SubscriptionKey> {
        let inner = self.inner.lock().expect("subscribers lock not poisoned");

        let Some(keys) = inner.by_content_topic.get(content_topic) else {
            return Vec::new();
        };

        keys.iter()
            .filter(|key| {
                inner.entries.get(*key).is_some_and(|entry| {
                    entry.pubsub_topic.is_empty() || &entry.pubsub_topic == pubsub_topic
                })
            })
            .cloned()
            .collect()
    }

    /// Snapshot the subscribers holding the given content topic.
    pub fn items(&self, content_topic: &ContentTopic) -> Vec<Subscriber> {
        let inner = self.inner.lock().expect("subscribers lock not poisoned");

        let Some(keys) = inner.by_content_topic.get(content_topic) else {
            return Vec::new();
        };

        keys.iter()
            .filter_map(|key| {
                inner.entries.get(key).map(|entry| Subscriber {
                    peer_id: key.0,
                    request_id: key.1.clone(),
                    pubsub_topic: entry.pubsub_topic.clone(),
                    content_topics: entry.content_topics.clone(),
                })
            })
            .collect()
    }

    /// Record activity on a subscription, postponing its idle expiry.
    pub fn refresh(&self, peer_id: &PeerId, request_id: &str) {
        let mut inner = self.inner.lock().expect("subscribers lock not poisoned");
        let key = (*peer_id, request_id.to_string());
        if let Some(entry) = inner.entries.get_mut(&key) {
            entry.last_active = Instant::now();
        }
    }

    /// Remove one subscription, e.g. after a failed push.
    pub fn remove(&self, peer_id: &PeerId, request_id: &str) {
        let mut inner = self.inner.lock().expect("subscribers lock not poisoned");
        inner.remove(&(*peer_id, request_id.to_string()));
    }

    /// Remove every subscription held by a disconnected peer.
    pub fn remove_peer(&self, peer_id: &PeerId) {
        let mut inner = self.inner.lock().expect("subscribers lock not poisoned");

        let Some(request_ids) = inner.by_peer.remove(peer_id) else {
            return;
        };
        for request_id in request_ids {
            let key = (*peer_id, request_id);
            inner.unlink_content_topics(&key);
            inner.entries.remove(&key);
        }
    }

    /// Drop subscriptions idle for longer than the table's timeout and
    /// return their keys.
    pub fn remove_expired(&self) -> Vec<SubscriptionKey> {
        let mut inner = self.inner.lock().expect("subscribers lock not poisoned");

        let expired: Vec<SubscriptionKey> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.last_active.elapsed() > self.timeout)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            inner.remove(key);
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("subscribers lock not poisoned")
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Inner {
    /// Remove the entry and every index reference to it.
    fn remove(&mut self, key: &SubscriptionKey) {
        self.unlink(key);
        self.entries.remove(key);
    }

    fn unlink(&mut self, key: &SubscriptionKey) {
        self.unlink_content_topics(key);

        if let Some(request_ids) = self.by_peer.get_mut(&key.0) {
            request_ids.remove(&key.1);
            if request_ids.is_empty() {
                self.by_peer.remove(&key.0);
            }
        }
    }

    fn unlink_content_topics(&mut self, key: &SubscriptionKey) {
        let Some(entry) = self.entries.get(key) else {
            return;
        };
        for topic in entry.content_topics.clone() {
            if let Some(keys) = self.by_content_topic.get_mut(&topic) {
                keys.remove(key);
                if keys.is_empty() {
                    self.by_content_topic.remove(&topic);
                }
            }
        }
    }
}
