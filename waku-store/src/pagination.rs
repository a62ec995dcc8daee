//! History pagination primitives.

use bytes::Bytes;

use waku_core::envelope::Envelope;

/// Sort and pagination key of a stored envelope.
///
/// The store's total order is `(sender_time, digest, pubsub_topic)`; a
/// cursor carries the index of the last record returned in a page.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Index {
    pub sender_time: i64,
    pub digest: Bytes,
    pub pubsub_topic: String,
}

impl From<&Envelope> for Index {
    fn from(envelope: &Envelope) -> Self {
        Self {
            sender_time: envelope.message().timestamp,
            digest: envelope.digest().clone(),
            pubsub_topic: envelope.pubsub_topic().to_string(),
        }
    }
}

/// Page traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending `(sender_time, digest)` order.
    #[default]
    Forward,
    /// Descending `(sender_time, digest)` order.
    Backward,
}

/// Paging parameters of a history query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PagingInfo {
    /// Maximum number of messages to return; capped at
    /// [`MAX_PAGE_SIZE`](crate::MAX_PAGE_SIZE).
    pub page_size: Option<usize>,
    /// Index of the last record of the previous page.
    pub cursor: Option<Index>,
    pub direction: Direction,
}
