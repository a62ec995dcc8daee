pub use message::*;

mod message;
mod traits;

pub mod proto {
    pub use crate::proto::waku::message::v1::*;
}
