pub mod waku {
    pub mod message {
        pub mod v1 {
            include!("proto/gen/waku.message.v1.rs");
        }
    }
}
