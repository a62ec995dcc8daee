pub use behaviour::*;
pub use event::*;
pub use message_id::message_id;

mod behaviour;
pub mod error;
mod event;
mod message_id;

/// Maximum size of a gossiped frame. A Waku message plus a safety margin for
/// the gossip envelope overhead.
pub const MAX_WAKU_RELAY_MESSAGE_SIZE: usize = waku_core::MAX_WAKU_MESSAGE_SIZE + 64 * 1024;
