use std::time::Duration;

/// Message retention policy: a maximum record count and a maximum record age.
///
/// Either axis may be disabled with `None`. Age is measured against the
/// envelope's receive timestamp, never the sender-controlled message
/// timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub max_messages: Option<usize>,
    pub max_duration: Option<Duration>,
}

impl RetentionPolicy {
    pub fn new(max_messages: usize, max_duration: Duration) -> Self {
        Self {
            max_messages: Some(max_messages),
            max_duration: Some(max_duration),
        }
    }

    /// The receive-timestamp cutoff below which records are expired, in
    /// nanoseconds, relative to `now`.
    pub fn cutoff(&self, now: i64) -> Option<i64> {
        self.max_duration
            .map(|max_age| now.saturating_sub(max_age.as_nanos() as i64))
    }
}
