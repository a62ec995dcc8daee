///! RFC 23 namespaced content topic.
use std::fmt;
use std::str::FromStr;

use crate::content_topic::ContentTopic;

/// Error returned when a topic string does not match the RFC 23 shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid topic: {0}")]
pub struct InvalidTopic(String);

/// A content topic in the RFC 23 canonical form
/// `/<application>/<version>/<topic-name>/<encoding>`.
///
/// Parsing is lossless: `topic.to_string().parse()` yields an equal value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NsContentTopic {
    pub application: String,
    pub version: String,
    pub name: String,
    pub encoding: String,
}

impl NsContentTopic {
    pub fn new<A, V, N, E>(application: A, version: V, name: N, encoding: E) -> Self
    where
        A: Into<String>,
        V: Into<String>,
        N: Into<String>,
        E: Into<String>,
    {
        Self {
            application: application.into(),
            version: version.into(),
            name: name.into(),
            encoding: encoding.into(),
        }
    }
}

impl FromStr for NsContentTopic {
    type Err = InvalidTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix('/')
            .ok_or_else(|| InvalidTopic(s.to_string()))?;

        let mut parts = rest.split('/');
        let application = parts.next().filter(|p| !p.is_empty());
        let version = parts.next().filter(|p| !p.is_empty());
        let name = parts.next().filter(|p| !p.is_empty());
        let encoding = parts.next().filter(|p| !p.is_empty());

        if parts.next().is_some() {
            return Err(InvalidTopic(s.to_string()));
        }

        match (application, version, name, encoding) {
            (Some(app), Some(ver), Some(name), Some(enc)) => Ok(Self {
                application: app.to_string(),
                version: ver.to_string(),
                name: name.to_string(),
                encoding: enc.to_string(),
            }),
            _ => Err(InvalidTopic(s.to_string())),
        }
    }
}

impl fmt::Display for NsContentTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/{}/{}/{}/{}",
            self.application, self.version, self.name, self.encoding
        )
    }
}

impl From<NsContentTopic> for ContentTopic {
    fn from(topic: NsContentTopic) -> Self {
        ContentTopic::new(topic.to_string())
    }
}

impl TryFrom<ContentTopic> for NsContentTopic {
    type Error = InvalidTopic;

    fn try_from(topic: ContentTopic) -> Result<Self, Self::Error> {
        topic.as_str().parse()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_ns_content_topic_from_str() {
        // Given
        let topic = "/toychat/2/huilong/proto";

        // When
        let ns_topic = topic.parse::<NsContentTopic>().unwrap();

        // Then
        assert_eq!(ns_topic.application, "toychat");
        assert_eq!(ns_topic.version, "2");
        assert_eq!(ns_topic.name, "huilong");
        assert_eq!(ns_topic.encoding, "proto");
    }

    #[test]
    fn test_ns_content_topic_roundtrip() {
        // Given
        let ns_topic = NsContentTopic::new("waku", "2", "default-content", "proto");

        // When
        let parsed = ns_topic.to_string().parse::<NsContentTopic>().unwrap();

        // Then
        assert_eq!(parsed, ns_topic);
    }

    #[test]
    fn test_ns_content_topic_missing_prefix() {
        // Given
        let topic = "toychat/2/huilong/proto";

        // When
        let result = topic.parse::<NsContentTopic>();

        // Then
        assert_matches!(result, Err(InvalidTopic(_)));
    }

    #[test]
    fn test_ns_content_topic_missing_parts() {
        // Given
        let topic = "/toychat/2/huilong";

        // When
        let result = topic.parse::<NsContentTopic>();

        // Then
        assert_matches!(result, Err(InvalidTopic(_)));
    }

    #[test]
    fn test_ns_content_topic_empty_part() {
        // Given
        let topic = "/toychat//huilong/proto";

        // When
        let result = topic.parse::<NsContentTopic>();

        // Then
        assert_matches!(result, Err(InvalidTopic(_)));
    }

    #[test]
    fn test_ns_content_topic_too_many_parts() {
        // Given
        let topic = "/toychat/2/huilong/proto/extra";

        // When
        let result = topic.parse::<NsContentTopic>();

        // Then
        assert_matches!(result, Err(InvalidTopic(_)));
    }

    #[test]
    fn test_ns_content_topic_from_content_topic() {
        // Given
        let topic = ContentTopic::new("/waku/2/default-content/proto");

        // When
        let ns_topic = NsContentTopic::try_from(topic).unwrap();

        // Then
        assert_eq!(ns_topic.application, "waku");
        assert_eq!(ns_topic.encoding, "proto");
    }
}
