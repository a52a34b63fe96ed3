//! Structural traversal of a snapshot into numeric leaves.
//!
//! Enhanced Monitoring documents mix scalars (`"uptime": 3.0`), metric
//! groups (`"cpu": {"user": 5.1}`), and per-device arrays
//! (`"disks": [{"readIOPS": 3.0}]`). The traversal here is deliberately
//! shallow and schema-agnostic: it recognizes exactly those three shapes,
//! and everything else — strings, booleans, nulls, deeper nesting, arrays
//! of non-objects — is invisible. That trades completeness for zero
//! configuration when an engine version adds fields we have never seen.

use serde_json::Value;

use crate::snapshot::Snapshot;

/// One numeric value found at a supported depth within a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    /// Metric group the value sits under; empty for top-level scalars.
    pub subsystem: String,
    /// Leaf name; array elements are named `"<index>_<innerKey>"`.
    pub name: String,
    pub value: f64,
}

impl Leaf {
    fn new(subsystem: &str, name: impl Into<String>, value: f64) -> Self {
        Self {
            subsystem: subsystem.to_string(),
            name: name.into(),
            value,
        }
    }
}

/// Walk a snapshot and return every numeric leaf reachable at depth 1–3.
///
/// The policy, tier by tier:
/// - top-level numeric field → `("", key, value)`
/// - numeric field of a top-level object → `(key, innerKey, value)`
/// - numeric field of an object element of a top-level array →
///   `(key, "<elementIndex>_<innerKey>", value)`, index zero-based
///
/// Two walks of the same snapshot yield the same sequence; object fields
/// come out in serde_json's sorted key order.
pub fn numeric_leaves(snapshot: &Snapshot) -> Vec<Leaf> {
    let mut leaves = Vec::new();

    for (key, value) in snapshot.fields() {
        match value {
            Value::Number(n) => {
                if let Some(v) = n.as_f64() {
                    leaves.push(Leaf::new("", key.as_str(), v));
                }
            }
            Value::Object(inner) => {
                for (inner_key, inner_value) in inner {
                    if let Some(v) = inner_value.as_f64() {
                        leaves.push(Leaf::new(key, inner_key.as_str(), v));
                    }
                }
            }
            Value::Array(elements) => {
                for (index, element) in elements.iter().enumerate() {
                    let Value::Object(inner) = element else {
                        continue;
                    };
                    for (inner_key, inner_value) in inner {
                        if let Some(v) = inner_value.as_f64() {
                            leaves.push(Leaf::new(key, format!("{index}_{inner_key}"), v));
                        }
                    }
                }
            }
            // Strings, booleans, and nulls carry no metric identity.
            _ => {}
        }
    }

    leaves
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(json: &str) -> Snapshot {
        Snapshot::parse(json).unwrap()
    }

    #[test]
    fn reference_snapshot_yields_exact_triples() {
        let snapshot = snap(
            r#"{"instanceID":"db-1","freeStorage":42.0,
                "cpu":{"user":5.1,"system":1.2},
                "disks":[{"readIOPS":3.0}]}"#,
        );
        let leaves = numeric_leaves(&snapshot);

        assert_eq!(leaves.len(), 4);
        assert!(leaves.contains(&Leaf::new("", "freeStorage", 42.0)));
        assert!(leaves.contains(&Leaf::new("cpu", "user", 5.1)));
        assert!(leaves.contains(&Leaf::new("cpu", "system", 1.2)));
        assert!(leaves.contains(&Leaf::new("disks", "0_readIOPS", 3.0)));
    }

    #[test]
    fn walk_is_deterministic() {
        let snapshot = snap(
            r#"{"a":1.0,"b":{"x":2.0,"y":3.0},"c":[{"z":4.0},{"z":5.0}]}"#,
        );
        assert_eq!(numeric_leaves(&snapshot), numeric_leaves(&snapshot));
    }

    #[test]
    fn array_elements_are_index_prefixed() {
        let snapshot = snap(r#"{"disks":[{"util":1.0},{"util":2.0},{"util":17.5}]}"#);
        let leaves = numeric_leaves(&snapshot);
        assert!(leaves.contains(&Leaf::new("disks", "2_util", 17.5)));
    }

    #[test]
    fn depth_four_is_invisible() {
        // An object inside an array inside an object is one level too deep.
        let snapshot = snap(r#"{"outer":{"arr":[{"leaf":1.0}]},"ok":2.0}"#);
        let leaves = numeric_leaves(&snapshot);
        assert_eq!(leaves, vec![Leaf::new("", "ok", 2.0)]);
    }

    #[test]
    fn nested_object_inside_group_is_skipped() {
        let snapshot = snap(r#"{"cpu":{"user":5.1,"breakdown":{"nice":0.1}}}"#);
        let leaves = numeric_leaves(&snapshot);
        assert_eq!(leaves, vec![Leaf::new("cpu", "user", 5.1)]);
    }

    #[test]
    fn non_numeric_shapes_are_skipped() {
        let snapshot = snap(
            r#"{"engine":"MYSQL","up":true,"gap":null,
                "tags":["a","b"],"nums":[1.0,2.0],
                "cpu":{"state":"idle"}}"#,
        );
        assert!(numeric_leaves(&snapshot).is_empty());
    }

    #[test]
    fn arrays_of_non_objects_are_skipped_elementwise() {
        // Mixed array: only the object element contributes, keeping its
        // positional index.
        let snapshot = snap(r#"{"disks":[3.0,{"util":1.5},"x"]}"#);
        let leaves = numeric_leaves(&snapshot);
        assert_eq!(leaves, vec![Leaf::new("disks", "1_util", 1.5)]);
    }

    #[test]
    fn integer_values_are_numeric_leaves() {
        let snapshot = snap(r#"{"processCount":42}"#);
        let leaves = numeric_leaves(&snapshot);
        assert_eq!(leaves, vec![Leaf::new("", "processCount", 42.0)]);
    }
}
