use std::io;

use crate::request::{HistoryQuery, HistoryRequest};
use crate::rpc::proto::waku::store::v2beta4 as proto;

impl TryFrom<proto::HistoryRpc> for HistoryRequest {
    type Error = io::Error;

    fn try_from(rpc: proto::HistoryRpc) -> Result<Self, Self::Error> {
        let request_id = rpc.request_id;
        let query = rpc
            .query
            .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidData))?;

        let pubsub_topic = query
            .pubsub_topic
            .filter(|topic| !topic.is_empty())
            .map(Into::into);
        let content_filters = query
            .content_filters
            .into_iter()
            .map(|cf| cf.content_topic.into())
            .collect();
        let paging_info = query.paging_info.as_ref().map(Into::into);
        let start_time = (query.start_time != 0).then_some(query.start_time);
        let end_time = (query.end_time != 0).then_some(query.end_time);

        Ok(HistoryRequest {
            request_id,
            query: HistoryQuery {
                pubsub_topic,
                content_filters,
                start_time,
                end_time,
                paging_info,
            },
        })
    }
}

impl From<HistoryRequest> for proto::HistoryRpc {
    fn from(request: HistoryRequest) -> Self {
        let query = request.query;

        let content_filters = query
            .content_filters
            .iter()
            .map(|topic| proto::ContentFilter {
                content_topic: topic.to_string(),
            })
            .collect();

        proto::HistoryRpc {
            request_id: request.request_id,
            query: Some(proto::HistoryQuery {
                pubsub_topic: query.pubsub_topic.map(|topic| topic.to_string()),
                content_filters,
                paging_info: query.paging_info.as_ref().map(Into::into),
                start_time: query.start_time.unwrap_or(0),
                end_time: query.end_time.unwrap_or(0),
            }),
            response: None,
        }
    }
}
