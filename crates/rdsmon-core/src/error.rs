//! Error types for snapshot decoding.

use thiserror::Error;

/// Errors that can occur while decoding a log message into a [`Snapshot`].
///
/// [`Snapshot`]: crate::Snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The message body was not valid JSON.
    #[error("message is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// The message decoded, but its root is not a JSON object.
    #[error("snapshot root is not an object")]
    NotObject,
}
