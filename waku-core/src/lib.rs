pub mod common;
pub mod content_topic;
pub mod envelope;
pub mod error;
pub mod message;
pub mod payload;
pub mod proto;
pub mod pubsub_topic;
pub mod time;

pub use content_topic::ContentTopic;
pub use envelope::Envelope;
pub use error::Error;
pub use message::WakuMessage;
pub use pubsub_topic::PubsubTopic;

/// Maximum size of a Waku message, in bytes. Corresponds to the PubSub default.
pub const MAX_WAKU_MESSAGE_SIZE: usize = 1024 * 1024;
