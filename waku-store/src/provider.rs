use waku_core::envelope::Envelope;

/// Errors surfaced by the message archive and its providers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The persistent backend rejected the operation or cannot be reached.
    #[error("storage backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A pagination cursor does not identify a stored record.
    #[error("invalid pagination cursor")]
    InvalidCursor,
}

/// A persistent message log backing the in-memory archive.
///
/// Providers persist envelopes and replay them at startup; query serving and
/// pagination happen on the archive's in-memory index.
pub trait MessageProvider: Send {
    /// Persist one envelope. Implementations must be idempotent on the
    /// `(digest, pubsub_topic, timestamp)` triple.
    fn put(&self, envelope: &Envelope) -> Result<(), StoreError>;

    /// All persisted envelopes, ascending by receive timestamp.
    fn get_all(&self) -> Result<Vec<Envelope>, StoreError>;
}
