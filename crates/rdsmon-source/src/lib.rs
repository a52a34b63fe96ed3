//! rdsmon-source — the exporter's external collaborators.
//!
//! Two seams separate the discovery/collection pipeline from the cloud:
//!
//! - [`RegionLister`] answers "where is the monitored service deployed?"
//! - [`LogSource`] answers "which streams exist there, and what is the most
//!   recent message on each?"
//!
//! Production wires in [`StaticRegions`] + [`CloudWatchLogsSource`]; tests
//! wire in [`StaticRegions`] + [`MemorySource`].

pub mod aws;
pub mod error;
pub mod memory;
pub mod regions;

pub use aws::CloudWatchLogsSource;
pub use error::SourceError;
pub use memory::MemorySource;
pub use regions::StaticRegions;

use std::future::Future;

/// Enumerates the regions to fan out over, in a fixed order.
pub trait RegionLister: Send + Sync {
    fn regions(&self) -> Vec<String>;
}

/// Read access to the most recent record of named log streams.
///
/// Methods return `impl Future + Send` rather than bare `async fn` so that
/// generic callers (the scrape handler runs on a multi-threaded runtime)
/// can hold the futures across spawns.
pub trait LogSource: Send + Sync {
    /// Stream names available for `log_group` in `region`.
    ///
    /// [`SourceError::Unsupported`] means the monitored service has no
    /// presence in that region; callers skip the region and continue.
    fn list_streams(
        &self,
        region: &str,
        log_group: &str,
    ) -> impl Future<Output = Result<Vec<String>, SourceError>> + Send;

    /// The most recent message body on one stream, or `None` if the stream
    /// holds no events.
    fn latest_message(
        &self,
        region: &str,
        log_group: &str,
        stream: &str,
    ) -> impl Future<Output = Result<Option<String>, SourceError>> + Send;
}
