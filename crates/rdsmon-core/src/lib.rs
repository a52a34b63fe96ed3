//! rdsmon-core — schema discovery primitives for RDS Enhanced Monitoring.
//!
//! RDS Enhanced Monitoring publishes one JSON document per instance per
//! minute into CloudWatch Logs. No schema for those documents is fixed ahead
//! of time; engine versions differ in which fields, nested objects, and
//! arrays they emit. This crate holds the parts that make sense of that:
//!
//! ```text
//! Snapshot::parse()       ← one decoded log message
//!   └── numeric_leaves()  → (subsystem, name, value) triples, depth ≤ 3
//!         └── fq_name()   → canonical lower-cased metric identity
//!               └── MetricRegistry::ensure() → process-lifetime descriptor
//! ```
//!
//! Everything here is synchronous and I/O-free; fetching log events and
//! serving the scrape endpoint live in `rdsmon-source` and
//! `rdsmon-exporter`.

pub mod error;
pub mod identity;
pub mod registry;
pub mod snapshot;
pub mod walk;

pub use error::SnapshotError;
pub use identity::fq_name;
pub use registry::{MetricDescriptor, MetricRegistry, Sample, LABEL_NAMES};
pub use snapshot::Snapshot;
pub use walk::{Leaf, numeric_leaves};
