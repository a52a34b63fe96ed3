//! rdsmon-exporter — the scrape-facing half of rdsmon.
//!
//! Two passes share one traversal over region → stream → snapshot → leaf:
//!
//! ```text
//! Exporter
//!   ├── discover() ← once, at startup: grows the descriptor registry
//!   └── collect()  ← per scrape: re-fetches live data, emits samples
//!
//! exposition::render() → Prometheus text format for GET /metrics
//! server::build_router() → axum routes (/, /metrics)
//! ```
//!
//! Keeping discovery and collection as two policies over the same fan-out
//! is what guarantees they cannot drift: any leaf collection can see,
//! discovery would have seen too, and vice versa.

pub mod exposition;
pub mod passes;
pub mod server;

pub use exposition::render;
pub use passes::{Exporter, PassReport, ScrapeConfig};
pub use server::build_router;
