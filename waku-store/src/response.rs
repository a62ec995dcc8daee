use waku_core::message::WakuMessage;

use crate::pagination::Index;

/// A page of history results.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryResponseBody {
    pub messages: Vec<WakuMessage>,
    /// Cursor identifying the last returned record; repeat the query with it
    /// to fetch the next page. `None` when the page is empty.
    pub next_page: Option<Index>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryErrorKind {
    #[error("invalid pagination cursor")]
    InvalidCursor,

    #[error("storage backend unavailable")]
    ServiceUnavailable,

    #[error("unknown error: {0}")]
    Unknown(i32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryResponse {
    pub request_id: String,
    pub result: Result<HistoryResponseBody, HistoryErrorKind>,
}
