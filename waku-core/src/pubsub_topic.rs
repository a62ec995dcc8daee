///! Waku pubsub topic.
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The default Waku pubsub topic.
pub const DEFAULT_PUBSUB_TOPIC: &str = "/waku/2/default-waku/proto";

/// A gossip-layer topic. A mesh is maintained per pubsub topic.
///
/// The topic string is treated as opaque by every protocol.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub struct PubsubTopic(String);

impl PubsubTopic {
    /// Creates a new `PubsubTopic` from a string.
    pub fn new<S>(topic: S) -> PubsubTopic
    where
        S: Into<String>,
    {
        PubsubTopic(topic.into())
    }

    /// The default Waku pubsub topic, `/waku/2/default-waku/proto`.
    pub fn default_topic() -> PubsubTopic {
        PubsubTopic(DEFAULT_PUBSUB_TOPIC.to_string())
    }

    /// Return the length in bytes of this topic.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if this topic is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return a reference to this topic's byte representation.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Extracts a string slice containing the entire topic.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PubsubTopic {
    fn default() -> Self {
        Self::default_topic()
    }
}

impl fmt::Debug for PubsubTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for PubsubTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PubsubTopic {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(String::from(s)))
    }
}

impl From<&str> for PubsubTopic {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for PubsubTopic {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for PubsubTopic {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pubsub_topic_new_from_str() {
        // Given
        let topic_str = "test";

        // When
        let topic = PubsubTopic::new(topic_str);

        // Then
        assert_eq!(topic.to_string(), "test");
        assert_eq!(topic.len(), 4);
        assert!(!topic.is_empty());
    }

    #[test]
    fn test_pubsub_topic_default() {
        // Given/When
        let topic = PubsubTopic::default();

        // Then
        assert_eq!(topic.as_str(), "/waku/2/default-waku/proto");
    }

    #[test]
    fn test_pubsub_topic_from_string() {
        // Given
        let topic_str = "/waku/2/it-waku/test".to_string();

        // When
        let topic = PubsubTopic::from(topic_str.clone());

        // Then
        assert_eq!(topic.to_string(), topic_str);
    }
}
