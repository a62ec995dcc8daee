//! SQLite-backed message provider.

use std::path::Path;
use std::sync::Mutex;

use bytes::Bytes;
use log::warn;
use rusqlite::{params, Connection};

use waku_core::envelope::Envelope;
use waku_core::message::WakuMessage;
use waku_core::time::unix_epoch_nanos;

use crate::provider::{MessageProvider, StoreError};
use crate::retention::RetentionPolicy;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS message (
    id INTEGER,
    pubsubTopic TEXT NOT NULL,
    contentTopic TEXT NOT NULL,
    payload BLOB,
    version INTEGER NOT NULL DEFAULT 0,
    timestamp INTEGER NOT NULL,
    receiverTimestamp INTEGER NOT NULL,
    digest BLOB,
    PRIMARY KEY (digest, pubsubTopic, timestamp)
);
CREATE INDEX IF NOT EXISTS message_timestamp_idx ON message (timestamp);
CREATE INDEX IF NOT EXISTS message_receiver_timestamp_idx ON message (receiverTimestamp);
CREATE INDEX IF NOT EXISTS message_content_topic_idx ON message (contentTopic, timestamp);
";

/// A [`MessageProvider`] persisting envelopes in a single SQLite table.
///
/// The retention policy is enforced at open, after every put and on demand
/// via [`remove_expired`](DbStore::remove_expired).
pub struct DbStore {
    conn: Mutex<Connection>,
    retention: RetentionPolicy,
}

impl DbStore {
    pub fn new(conn: Connection, retention: RetentionPolicy) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(backend_error)?;

        let store = Self {
            conn: Mutex::new(conn),
            retention,
        };
        store.remove_expired()?;
        Ok(store)
    }

    pub fn open<P: AsRef<Path>>(path: P, retention: RetentionPolicy) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(backend_error)?;
        Self::new(conn, retention)
    }

    pub fn open_in_memory(retention: RetentionPolicy) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(backend_error)?;
        Self::new(conn, retention)
    }

    /// Apply the retention policy: delete rows older than the age cutoff,
    /// then the oldest rows in excess of the count limit.
    pub fn remove_expired(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("db connection lock not poisoned");

        if let Some(cutoff) = self.retention.cutoff(unix_epoch_nanos()) {
            conn.execute("DELETE FROM message WHERE receiverTimestamp < ?1", [cutoff])
                .map_err(backend_error)?;
        }

        if let Some(max_messages) = self.retention.max_messages {
            let count: usize = conn
                .query_row("SELECT COUNT(*) FROM message", [], |row| row.get(0))
                .map_err(backend_error)?;

            let excess = count.saturating_sub(max_messages);
            if excess > 0 {
                conn.execute(
                    "DELETE FROM message WHERE rowid IN \
                     (SELECT rowid FROM message ORDER BY receiverTimestamp ASC LIMIT ?1)",
                    [excess],
                )
                .map_err(backend_error)?;
            }
        }

        Ok(())
    }
}

impl MessageProvider for DbStore {
    fn put(&self, envelope: &Envelope) -> Result<(), StoreError> {
        {
            let conn = self.conn.lock().expect("db connection lock not poisoned");
            let message = envelope.message();

            conn.execute(
                "INSERT OR IGNORE INTO message \
                 (pubsubTopic, contentTopic, payload, version, timestamp, receiverTimestamp, digest) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    envelope.pubsub_topic().as_str(),
                    message.content_topic.as_str(),
                    message.payload.as_ref(),
                    message.version,
                    message.timestamp,
                    envelope.received_at(),
                    envelope.digest().as_ref(),
                ],
            )
            .map_err(backend_error)?;
        }

        // Retention failures never block the put itself.
        if let Err(e) = self.remove_expired() {
            warn!("retention pass failed: {e}");
        }
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<Envelope>, StoreError> {
        let conn = self.conn.lock().expect("db connection lock not poisoned");

        let mut stmt = conn
            .prepare(
                "SELECT pubsubTopic, contentTopic, payload, version, timestamp, receiverTimestamp \
                 FROM message ORDER BY receiverTimestamp ASC",
            )
            .map_err(backend_error)?;

        let rows = stmt
            .query_map([], |row| {
                let pubsub_topic: String = row.get(0)?;
                let content_topic: String = row.get(1)?;
                let payload: Vec<u8> = row.get(2)?;
                let version: u32 = row.get(3)?;
                let timestamp: i64 = row.get(4)?;
                let received_at: i64 = row.get(5)?;

                let message = WakuMessage {
                    payload: Bytes::from(payload),
                    content_topic: content_topic.into(),
                    version,
                    timestamp,
                    meta: None,
                    ephemeral: false,
                };

                Ok(Envelope::new(message, received_at, pubsub_topic.into()))
            })
            .map_err(backend_error)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(backend_error)
    }
}

fn backend_error(e: rusqlite::Error) -> StoreError {
    StoreError::BackendUnavailable(e.to_string())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn new_message(content_topic: &str, timestamp: i64) -> WakuMessage {
        let mut message = WakuMessage::new(timestamp.to_be_bytes().to_vec(), content_topic);
        message.timestamp = timestamp;
        message
    }

    #[test]
    fn test_db_store_put_and_get_all() {
        // Given
        let store = DbStore::open_in_memory(RetentionPolicy::default()).unwrap();
        assert!(store.get_all().unwrap().is_empty());

        // When
        let envelope = Envelope::new(new_message("test", 1), unix_epoch_nanos(), "test".into());
        store.put(&envelope).unwrap();

        // Then
        let stored = store.get_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0], envelope);
    }

    #[test]
    fn test_db_store_put_is_idempotent() {
        // Given
        let store = DbStore::open_in_memory(RetentionPolicy::default()).unwrap();
        let envelope = Envelope::new(new_message("test", 1), unix_epoch_nanos(), "test".into());

        // When
        store.put(&envelope).unwrap();
        store.put(&envelope).unwrap();

        // Then
        assert_eq!(store.get_all().unwrap().len(), 1);
    }

    #[test]
    fn test_db_store_retention_across_restart() {
        // Given: an open store holding 7 envelopes received 70s..10s ago
        let conn = Connection::open_in_memory().unwrap();
        let retention = RetentionPolicy::new(7, Duration::from_secs(120));
        let store = DbStore::new(conn, retention).unwrap();

        let insert_time = unix_epoch_nanos();
        let second = Duration::from_secs(1).as_nanos() as i64;
        for (i, content_topic) in ["test1", "test2", "test3", "test4", "test5", "test6", "test7"]
            .iter()
            .enumerate()
        {
            let received_at = insert_time - (70 - 10 * i as i64) * second;
            let envelope = Envelope::new(
                new_message(content_topic, received_at),
                received_at,
                "test".into(),
            );
            store.put(&envelope).unwrap();
        }
        assert_eq!(store.get_all().unwrap().len(), 7);

        // When: the node restarts with retention (5 messages, 40 seconds)
        let conn = reopen(store);
        let store = DbStore::new(conn, RetentionPolicy::new(5, Duration::from_secs(40))).unwrap();

        // Then: only the 3 envelopes younger than 40s remain, ascending by
        // receive time
        let stored = store.get_all().unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0].message().content_topic.as_str(), "test5");
        assert_eq!(stored[1].message().content_topic.as_str(), "test6");
        assert_eq!(stored[2].message().content_topic.as_str(), "test7");
    }

    fn reopen(store: DbStore) -> Connection {
        store
            .conn
            .into_inner()
            .expect("db connection lock not poisoned")
    }
}
