mod pagination;
mod request;
mod response;

pub(crate) mod proto {
    pub mod waku {
        pub mod message {
            pub mod v1 {
                pub use waku_core::message::proto::*;
            }
        }
        pub mod store {
            pub mod v2beta4 {
                include!("proto/gen/waku.store.v2beta4.rs");
            }
        }
    }
}

pub(crate) use proto::waku::store::v2beta4::*;
