use std::io;

use crate::response::{HistoryErrorKind, HistoryResponse, HistoryResponseBody};
use crate::rpc::proto::waku::store::v2beta4 as proto;

impl From<i32> for HistoryErrorKind {
    fn from(error: i32) -> Self {
        match proto::history_response::Error::from_i32(error) {
            Some(proto::history_response::Error::InvalidCursor) => Self::InvalidCursor,
            Some(proto::history_response::Error::ServiceUnavailable) => Self::ServiceUnavailable,
            _ => Self::Unknown(error),
        }
    }
}

impl From<&HistoryErrorKind> for i32 {
    fn from(err: &HistoryErrorKind) -> Self {
        match err {
            HistoryErrorKind::InvalidCursor => proto::history_response::Error::InvalidCursor as i32,
            HistoryErrorKind::ServiceUnavailable => {
                proto::history_response::Error::ServiceUnavailable as i32
            }
            HistoryErrorKind::Unknown(error) => *error,
        }
    }
}

impl TryFrom<proto::HistoryRpc> for HistoryResponse {
    type Error = io::Error;

    fn try_from(rpc: proto::HistoryRpc) -> Result<Self, Self::Error> {
        let request_id = rpc.request_id;
        let body = rpc
            .response
            .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidData))?;

        if body.error != proto::history_response::Error::None as i32 {
            return Ok(HistoryResponse {
                request_id,
                result: Err(body.error.into()),
            });
        }

        let messages = body.messages.into_iter().map(Into::into).collect();
        let next_page = body
            .paging_info
            .as_ref()
            .and_then(|info| info.cursor.as_ref())
            .map(Into::into);

        Ok(HistoryResponse {
            request_id,
            result: Ok(HistoryResponseBody {
                messages,
                next_page,
            }),
        })
    }
}

impl From<HistoryResponse> for proto::HistoryRpc {
    fn from(response: HistoryResponse) -> Self {
        let request_id = response.request_id;

        let body = match response.result {
            Err(err) => proto::HistoryResponse {
                messages: vec![],
                paging_info: None,
                error: (&err).into(),
            },
            Ok(body) => {
                let messages: Vec<_> = body.messages.into_iter().map(Into::into).collect();
                let paging_info = body.next_page.map(|cursor| proto::PagingInfo {
                    page_size: messages.len() as u64,
                    cursor: Some(cursor.to_proto(0)),
                    direction: proto::paging_info::Direction::Forward as i32,
                });

                proto::HistoryResponse {
                    messages,
                    paging_info,
                    error: proto::history_response::Error::None as i32,
                }
            }
        };

        proto::HistoryRpc {
            request_id,
            query: None,
            response: Some(body),
        }
    }
}
