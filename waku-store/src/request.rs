use waku_core::content_topic::ContentTopic;
use waku_core::pubsub_topic::PubsubTopic;

use crate::pagination::PagingInfo;

/// A query over the archived message log.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryQuery {
    /// Restrict results to this pubsub topic; `None` matches any.
    pub pubsub_topic: Option<PubsubTopic>,
    /// Restrict results to these content topics; empty matches any.
    pub content_filters: Vec<ContentTopic>,
    /// Sender-timestamp window, nanoseconds. The window applies when either
    /// bound is set; `start >= end` yields an empty result.
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub paging_info: Option<PagingInfo>,
}

/// A history query tagged with its RPC request id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub request_id: String,
    pub query: HistoryQuery,
}
