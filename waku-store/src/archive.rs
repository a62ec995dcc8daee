//! In-memory message archive with retention and paginated history queries.

use std::collections::BTreeMap;
use std::sync::{Mutex, RwLock};

use log::{debug, warn};

use waku_core::envelope::Envelope;
use waku_core::time::unix_epoch_nanos;

use crate::pagination::{Direction, Index, PagingInfo};
use crate::provider::{MessageProvider, StoreError};
use crate::request::HistoryQuery;
use crate::response::{HistoryErrorKind, HistoryResponseBody};
use crate::retention::RetentionPolicy;
use crate::MAX_PAGE_SIZE;

/// The message log served by the store protocol.
///
/// Envelopes are indexed in memory ordered by `(sender_time, digest,
/// pubsub_topic)`. An optional [`MessageProvider`] persists them; the
/// provider is written before the index so a backend failure leaves the
/// index untouched.
pub struct Archive {
    messages: RwLock<BTreeMap<Index, Envelope>>,
    provider: Option<Mutex<Box<dyn MessageProvider>>>,
    retention: RetentionPolicy,
}

impl Archive {
    pub fn new(retention: RetentionPolicy, provider: Option<Box<dyn MessageProvider>>) -> Self {
        let archive = Self {
            messages: RwLock::new(BTreeMap::new()),
            provider: provider.map(Mutex::new),
            retention,
        };

        if let Some(provider) = &archive.provider {
            let stored = provider
                .lock()
                .expect("archive provider lock not poisoned")
                .get_all();
            match stored {
                Ok(envelopes) => {
                    debug!("loaded {} envelopes from the message provider", envelopes.len());
                    let mut messages = archive
                        .messages
                        .write()
                        .expect("archive index lock not poisoned");
                    for envelope in envelopes {
                        messages.insert(Index::from(&envelope), envelope);
                    }
                }
                Err(e) => warn!("failed to load messages from the provider: {e}"),
            }
        }

        archive.remove_expired();
        archive
    }

    /// Archive one envelope. Re-inserting an envelope with an already-known
    /// index is a no-op. Runs the retention pass after every insert.
    pub fn insert(&self, envelope: Envelope) -> Result<(), StoreError> {
        let index = Index::from(&envelope);

        {
            let messages = self
                .messages
                .read()
                .expect("archive index lock not poisoned");
            if messages.contains_key(&index) {
                return Ok(());
            }
        }

        if let Some(provider) = &self.provider {
            provider
                .lock()
                .expect("archive provider lock not poisoned")
                .put(&envelope)?;
        }

        self.messages
            .write()
            .expect("archive index lock not poisoned")
            .insert(index, envelope);

        self.remove_expired();
        Ok(())
    }

    /// Evict envelopes violating the retention policy: first by age (receive
    /// timestamp older than `now - max_duration`), then the oldest in excess
    /// of `max_messages`.
    pub fn remove_expired(&self) {
        let mut messages = self
            .messages
            .write()
            .expect("archive index lock not poisoned");

        if let Some(cutoff) = self.retention.cutoff(unix_epoch_nanos()) {
            messages.retain(|_, envelope| envelope.received_at() >= cutoff);
        }

        if let Some(max_messages) = self.retention.max_messages {
            let excess = messages.len().saturating_sub(max_messages);
            if excess > 0 {
                let mut by_age: Vec<(i64, Index)> = messages
                    .iter()
                    .map(|(index, envelope)| (envelope.received_at(), index.clone()))
                    .collect();
                by_age.sort();

                for (_, index) in by_age.into_iter().take(excess) {
                    messages.remove(&index);
                }
            }
        }
    }

    /// Number of archived envelopes.
    pub fn len(&self) -> usize {
        self.messages
            .read()
            .expect("archive index lock not poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All archived envelopes, ascending by receive timestamp.
    pub fn get_all(&self) -> Vec<Envelope> {
        let messages = self
            .messages
            .read()
            .expect("archive index lock not poisoned");

        let mut envelopes: Vec<Envelope> = messages.values().cloned().collect();
        envelopes.sort_by_key(Envelope::received_at);
        envelopes
    }

    /// Serve a history query with the store protocol semantics: optional
    /// pubsub-topic and content-topic predicates, an optional inclusive
    /// sender-timestamp window, and stable cursor pagination.
    pub fn find_messages(
        &self,
        query: &HistoryQuery,
    ) -> Result<HistoryResponseBody, HistoryErrorKind> {
        if let (Some(start), Some(end)) = window(query) {
            if start >= end {
                return Ok(HistoryResponseBody::default());
            }
        }

        let matching: Vec<(Index, Envelope)> = {
            let messages = self
                .messages
                .read()
                .expect("archive index lock not poisoned");

            messages
                .iter()
                .filter(|(_, envelope)| matches(query, envelope))
                .map(|(index, envelope)| (index.clone(), envelope.clone()))
                .collect()
        };

        paginate(matching, query.paging_info.clone().unwrap_or_default())
    }
}

/// The query's time window, when one is set. Unset bounds default to 0.
fn window(query: &HistoryQuery) -> (Option<i64>, Option<i64>) {
    if query.start_time.is_none() && query.end_time.is_none() {
        return (None, None);
    }
    (
        Some(query.start_time.unwrap_or(0)),
        Some(query.end_time.unwrap_or(0)),
    )
}

fn matches(query: &HistoryQuery, envelope: &Envelope) -> bool {
    if let Some(pubsub_topic) = &query.pubsub_topic {
        if envelope.pubsub_topic() != pubsub_topic {
            return false;
        }
    }

    if !query.content_filters.is_empty()
        && !query
            .content_filters
            .contains(&envelope.message().content_topic)
    {
        return false;
    }

    if let (Some(start), Some(end)) = window(query) {
        let timestamp = envelope.message().timestamp;
        if timestamp < start || timestamp > end {
            return false;
        }
    }

    true
}

/// Slice one page out of the ascending-ordered matching set.
fn paginate(
    matching: Vec<(Index, Envelope)>,
    paging: PagingInfo,
) -> Result<HistoryResponseBody, HistoryErrorKind> {
    let page_size = paging
        .page_size
        .unwrap_or(MAX_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);

    let cursor_position = match &paging.cursor {
        None => None,
        Some(cursor) => Some(
            matching
                .iter()
                .position(|(index, _)| index == cursor)
                .ok_or(HistoryErrorKind::InvalidCursor)?,
        ),
    };

    let page: Vec<&(Index, Envelope)> = match paging.direction {
        Direction::Forward => {
            let start = cursor_position.map(|pos| pos + 1).unwrap_or(0);
            matching.iter().skip(start).take(page_size).collect()
        }
        Direction::Backward => {
            let end = cursor_position.unwrap_or(matching.len());
            let start = end.saturating_sub(page_size);
            matching[start..end].iter().rev().collect()
        }
    };

    let next_page = page.last().map(|(index, _)| index.clone());
    let messages = page
        .into_iter()
        .map(|(_, envelope)| envelope.message().clone())
        .collect();

    Ok(HistoryResponseBody {
        messages,
        next_page,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;

    use waku_core::message::WakuMessage;
    use waku_core::pubsub_topic::PubsubTopic;

    use super::*;

    fn new_message(content_topic: &str, timestamp: i64) -> WakuMessage {
        let mut message = WakuMessage::new(timestamp.to_be_bytes().to_vec(), content_topic);
        message.timestamp = timestamp;
        message
    }

    fn new_archive() -> Archive {
        Archive::new(RetentionPolicy::default(), None)
    }

    fn store(archive: &Archive, message: WakuMessage, pubsub_topic: &str) {
        let received_at = unix_epoch_nanos();
        archive
            .insert(Envelope::new(message, received_at, pubsub_topic.into()))
            .expect("insert to succeed");
    }

    #[test]
    fn test_store_query_content_filter() {
        // Given
        let archive = new_archive();
        let msg1 = new_message("1", unix_epoch_nanos());
        let msg2 = new_message("2", unix_epoch_nanos());
        store(&archive, msg1.clone(), "test");
        store(&archive, msg2, "test");

        // When
        let response = archive
            .find_messages(&HistoryQuery {
                content_filters: vec!["1".into()],
                ..Default::default()
            })
            .unwrap();

        // Then
        assert_eq!(response.messages.len(), 1);
        assert_eq!(response.messages[0], msg1);
    }

    #[test]
    fn test_store_query_multiple_content_filters() {
        // Given
        let archive = new_archive();
        let msg1 = new_message("1", 1);
        let msg2 = new_message("2", 2);
        let msg3 = new_message("3", 3);
        store(&archive, msg1.clone(), "test");
        store(&archive, msg2.clone(), "test");
        store(&archive, msg3.clone(), "test");

        // When
        let response = archive
            .find_messages(&HistoryQuery {
                content_filters: vec!["1".into(), "3".into()],
                ..Default::default()
            })
            .unwrap();

        // Then
        assert_eq!(response.messages.len(), 2);
        assert!(response.messages.contains(&msg1));
        assert!(response.messages.contains(&msg3));
        assert!(!response.messages.contains(&msg2));
    }

    #[test]
    fn test_store_query_pubsub_topic_filter() {
        // Given
        let archive = new_archive();
        let msg1 = new_message("1", unix_epoch_nanos());
        let msg2 = new_message("2", unix_epoch_nanos());
        let msg3 = new_message("3", unix_epoch_nanos());
        store(&archive, msg1.clone(), "topic1");
        store(&archive, msg2, "topic2");
        store(&archive, msg3, "topic2");

        // When
        let response = archive
            .find_messages(&HistoryQuery {
                pubsub_topic: Some(PubsubTopic::new("topic1")),
                content_filters: vec!["1".into(), "3".into()],
                ..Default::default()
            })
            .unwrap();

        // Then
        assert_eq!(response.messages.len(), 1);
        assert_eq!(response.messages[0], msg1);
    }

    #[test]
    fn test_store_query_pubsub_topic_no_match() {
        // Given
        let archive = new_archive();
        store(&archive, new_message("1", unix_epoch_nanos()), "topic2");
        store(&archive, new_message("2", unix_epoch_nanos()), "topic2");

        // When
        let response = archive
            .find_messages(&HistoryQuery {
                pubsub_topic: Some(PubsubTopic::new("topic1")),
                ..Default::default()
            })
            .unwrap();

        // Then
        assert!(response.messages.is_empty());
        assert!(response.next_page.is_none());
    }

    #[test]
    fn test_store_query_pubsub_topic_all_messages() {
        // Given
        let archive = new_archive();
        store(&archive, new_message("1", 1), "topic1");
        store(&archive, new_message("2", 2), "topic1");
        store(&archive, new_message("3", 3), "topic1");

        // When
        let response = archive
            .find_messages(&HistoryQuery {
                pubsub_topic: Some(PubsubTopic::new("topic1")),
                ..Default::default()
            })
            .unwrap();

        // Then
        assert_eq!(response.messages.len(), 3);
    }

    #[test]
    fn test_store_query_forward_pagination() {
        // Given
        let archive = new_archive();
        for i in 0..10i64 {
            store(&archive, new_message("1", i), "topic1");
        }

        // When
        let query = HistoryQuery {
            pubsub_topic: Some(PubsubTopic::new("topic1")),
            paging_info: Some(PagingInfo {
                page_size: Some(4),
                cursor: None,
                direction: Direction::Forward,
            }),
            ..Default::default()
        };
        let mut pages = Vec::new();
        let mut cursor = None;
        loop {
            let mut query = query.clone();
            query.paging_info.as_mut().unwrap().cursor = cursor;
            let response = archive.find_messages(&query).unwrap();
            if response.messages.is_empty() {
                break;
            }
            cursor = response.next_page.clone();
            pages.push(response.messages);
        }

        // Then
        let timestamps: Vec<i64> = pages
            .into_iter()
            .flatten()
            .map(|message| message.timestamp)
            .collect();
        assert_eq!(timestamps, (0..10).collect::<Vec<i64>>());
    }

    #[test]
    fn test_store_query_backward_pagination_reverses_forward() {
        // Given
        let archive = new_archive();
        for i in 0..10i64 {
            store(&archive, new_message("1", i), "topic1");
        }

        // When
        let forward = archive
            .find_messages(&HistoryQuery {
                paging_info: Some(PagingInfo {
                    direction: Direction::Forward,
                    ..Default::default()
                }),
                ..Default::default()
            })
            .unwrap();
        let backward = archive
            .find_messages(&HistoryQuery {
                paging_info: Some(PagingInfo {
                    direction: Direction::Backward,
                    ..Default::default()
                }),
                ..Default::default()
            })
            .unwrap();

        // Then
        let mut reversed: Vec<WakuMessage> = backward.messages;
        reversed.reverse();
        assert_eq!(forward.messages, reversed);
    }

    #[test]
    fn test_store_query_invalid_cursor() {
        // Given
        let archive = new_archive();
        store(&archive, new_message("1", 1), "topic1");

        // When
        let result = archive.find_messages(&HistoryQuery {
            paging_info: Some(PagingInfo {
                cursor: Some(Index {
                    sender_time: 42,
                    digest: vec![0u8; 32].into(),
                    pubsub_topic: "topic1".to_string(),
                }),
                ..Default::default()
            }),
            ..Default::default()
        });

        // Then
        assert_matches!(result, Err(HistoryErrorKind::InvalidCursor));
    }

    #[test]
    fn test_temporal_history_queries() {
        // Given: content topics alternating "2"/"1" at timestamps 0..9
        let archive = new_archive();
        for i in 0..10i64 {
            let content_topic = if i % 2 == 0 { "2" } else { "1" };
            store(&archive, new_message(content_topic, i), "test");
        }

        // When: a valid time window
        let response = archive
            .find_messages(&HistoryQuery {
                content_filters: vec!["1".into()],
                start_time: Some(2),
                end_time: Some(5),
                ..Default::default()
            })
            .unwrap();

        // Then: messages at timestamps 3 and 5, in that order
        assert_eq!(response.messages.len(), 2);
        assert_eq!(response.messages[0].timestamp, 3);
        assert_eq!(response.messages[1].timestamp, 5);

        // When: a zero-size time window
        let response = archive
            .find_messages(&HistoryQuery {
                content_filters: vec!["1".into()],
                start_time: Some(2),
                end_time: Some(2),
                ..Default::default()
            })
            .unwrap();

        // Then
        assert!(response.messages.is_empty());

        // When: an inverted time window (start > end)
        let response = archive
            .find_messages(&HistoryQuery {
                content_filters: vec!["1".into()],
                start_time: Some(5),
                end_time: Some(2),
                ..Default::default()
            })
            .unwrap();

        // Then
        assert!(response.messages.is_empty());
    }

    #[test]
    fn test_archive_insert_is_idempotent() {
        // Given
        let archive = new_archive();
        let message = new_message("1", 7);

        // When
        store(&archive, message.clone(), "test");
        store(&archive, message, "test");

        // Then
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_archive_count_retention() {
        // Given
        let archive = Archive::new(
            RetentionPolicy {
                max_messages: Some(3),
                max_duration: None,
            },
            None,
        );

        // When
        for i in 0..5i64 {
            let envelope = Envelope::new(new_message("1", i), unix_epoch_nanos() + i, "test".into());
            archive.insert(envelope).unwrap();
        }

        // Then: only the 3 most recently received remain
        assert_eq!(archive.len(), 3);
        let remaining: Vec<i64> = archive
            .get_all()
            .into_iter()
            .map(|envelope| envelope.message().timestamp)
            .collect();
        assert_eq!(remaining, vec![2, 3, 4]);
    }

    #[test]
    fn test_archive_age_retention() {
        // Given
        let archive = Archive::new(
            RetentionPolicy {
                max_messages: None,
                max_duration: Some(Duration::from_secs(40)),
            },
            None,
        );
        let now = unix_epoch_nanos();
        let second = Duration::from_secs(1).as_nanos() as i64;

        // When: three envelopes received 70s, 50s and 10s ago
        for age_secs in [70i64, 50, 10] {
            let received_at = now - age_secs * second;
            let envelope = Envelope::new(new_message("1", received_at), received_at, "test".into());
            archive.insert(envelope).unwrap();
        }

        // Then: only the one within the 40s window remains
        assert_eq!(archive.len(), 1);
    }
}
