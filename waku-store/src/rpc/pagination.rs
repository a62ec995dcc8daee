use crate::pagination::{Direction, Index, PagingInfo};
use crate::rpc::proto::waku::store::v2beta4 as proto;
use crate::MAX_PAGE_SIZE;

impl From<&proto::Index> for Index {
    fn from(cursor: &proto::Index) -> Self {
        Self {
            sender_time: cursor.sender_time,
            digest: cursor.digest.clone(),
            pubsub_topic: cursor.pubsub_topic.clone(),
        }
    }
}

impl Index {
    /// Wire form of this index. `receiver_time` is informational on the wire
    /// and does not participate in the sort order.
    pub(crate) fn to_proto(&self, receiver_time: i64) -> proto::Index {
        proto::Index {
            digest: self.digest.clone(),
            receiver_time,
            sender_time: self.sender_time,
            pubsub_topic: self.pubsub_topic.clone(),
        }
    }
}

impl From<proto::paging_info::Direction> for Direction {
    fn from(direction: proto::paging_info::Direction) -> Self {
        match direction {
            proto::paging_info::Direction::Forward => Self::Forward,
            proto::paging_info::Direction::Backward => Self::Backward,
        }
    }
}

impl From<Direction> for proto::paging_info::Direction {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Forward => Self::Forward,
            Direction::Backward => Self::Backward,
        }
    }
}

impl From<&proto::PagingInfo> for PagingInfo {
    fn from(info: &proto::PagingInfo) -> Self {
        let direction = proto::paging_info::Direction::from_i32(info.direction)
            .unwrap_or(proto::paging_info::Direction::Forward);

        Self {
            page_size: (info.page_size > 0).then_some(info.page_size as usize),
            cursor: info.cursor.as_ref().map(Into::into),
            direction: direction.into(),
        }
    }
}

impl From<&PagingInfo> for proto::PagingInfo {
    fn from(info: &PagingInfo) -> Self {
        Self {
            page_size: info.page_size.unwrap_or(MAX_PAGE_SIZE) as u64,
            cursor: info.cursor.as_ref().map(|cursor| cursor.to_proto(0)),
            direction: proto::paging_info::Direction::from(info.direction) as i32,
        }
    }
}
