//! Error taxonomy shared by all Waku protocols.

/// Errors returned by node-level Waku operations.
///
/// Protocol crates define their own finer-grained error types and map them
/// into this taxonomy at the node boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The operation was cancelled via its cancellation signal.
    #[error("operation cancelled")]
    Cancelled,

    /// The caller-supplied deadline elapsed.
    #[error("operation timed out")]
    Timeout,

    /// A malformed topic, request or out-of-lifecycle call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The gossip mesh has fewer peers than `min_peers_to_publish`.
    #[error("not enough peers to publish")]
    NotEnoughPeers,

    /// The remote peer could not be reached or the stream failed.
    #[error("peer unreachable")]
    PeerUnreachable,

    /// The remote peer served the request but rejected it.
    #[error("remote rejected request: {reason}")]
    RemoteRejected { reason: String },

    /// No subscription exists for the given handle.
    #[error("subscription not found")]
    SubscriptionNotFound,

    /// The persistent storage backend cannot be reached.
    #[error("storage backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Invariant violation; a bug in the node itself.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn remote_rejected<S: Into<String>>(reason: S) -> Self {
        Self::RemoteRejected {
            reason: reason.into(),
        }
    }
}
