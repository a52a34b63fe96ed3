//! One decoded Enhanced Monitoring log message.

use serde_json::{Map, Value};

use crate::error::SnapshotError;

/// Key under which every Enhanced Monitoring document names its instance.
const INSTANCE_ID_KEY: &str = "instanceID";

/// A point-in-time OS-metrics document for one monitored instance.
///
/// The root is always a JSON object; beyond the `instanceID` field the set
/// of keys is open and version-dependent, which is why traversal
/// ([`numeric_leaves`]) is structural rather than schema-driven.
///
/// [`numeric_leaves`]: crate::walk::numeric_leaves
#[derive(Debug, Clone)]
pub struct Snapshot {
    root: Map<String, Value>,
}

impl Snapshot {
    /// Decode a raw log message body.
    pub fn parse(message: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(message)?;
        match value {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(SnapshotError::NotObject),
        }
    }

    /// The instance this snapshot describes, if the document carries one.
    ///
    /// Enhanced Monitoring always includes `instanceID`, but the field is
    /// still part of the open schema; a document without it can be walked
    /// for discovery but cannot contribute labeled samples.
    pub fn instance_id(&self) -> Option<&str> {
        self.root.get(INSTANCE_ID_KEY).and_then(Value::as_str)
    }

    /// The top-level fields of the document.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.root
    }
}
