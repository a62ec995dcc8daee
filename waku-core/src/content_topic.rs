pub use namespaced::{InvalidTopic, NsContentTopic};
pub use topic::ContentTopic;

mod namespaced;
mod topic;
