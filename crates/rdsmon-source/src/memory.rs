//! In-memory log source for tests.

use std::collections::{HashMap, HashSet};

use crate::error::SourceError;
use crate::LogSource;

/// A canned region → stream → latest-message store.
///
/// Regions and streams can additionally be marked as unsupported or
/// failing to exercise the skip paths of the passes.
#[derive(Debug, Default)]
pub struct MemorySource {
    streams: HashMap<String, Vec<String>>,
    messages: HashMap<(String, String), String>,
    unsupported: HashSet<String>,
    failing_regions: HashSet<String>,
    failing_streams: HashSet<(String, String)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stream with its most recent message body.
    pub fn with_stream(mut self, region: &str, stream: &str, message: &str) -> Self {
        self.streams
            .entry(region.to_string())
            .or_default()
            .push(stream.to_string());
        self.messages
            .insert((region.to_string(), stream.to_string()), message.to_string());
        self
    }

    /// Add a stream that holds no events.
    pub fn with_empty_stream(mut self, region: &str, stream: &str) -> Self {
        self.streams
            .entry(region.to_string())
            .or_default()
            .push(stream.to_string());
        self
    }

    /// Mark a region as not hosting the monitored service.
    pub fn with_unsupported_region(mut self, region: &str) -> Self {
        self.unsupported.insert(region.to_string());
        self
    }

    /// Make stream listing fail with a transport error in a region.
    pub fn with_failing_region(mut self, region: &str) -> Self {
        self.failing_regions.insert(region.to_string());
        self
    }

    /// Make one stream's fetch fail with a transport error.
    pub fn with_failing_stream(mut self, region: &str, stream: &str) -> Self {
        self.streams
            .entry(region.to_string())
            .or_default()
            .push(stream.to_string());
        self.failing_streams
            .insert((region.to_string(), stream.to_string()));
        self
    }
}

impl LogSource for MemorySource {
    async fn list_streams(
        &self,
        region: &str,
        _log_group: &str,
    ) -> Result<Vec<String>, SourceError> {
        if self.unsupported.contains(region) {
            return Err(SourceError::unsupported(region));
        }
        if self.failing_regions.contains(region) {
            return Err(SourceError::transport(region, "injected listing failure"));
        }
        Ok(self.streams.get(region).cloned().unwrap_or_default())
    }

    async fn latest_message(
        &self,
        region: &str,
        _log_group: &str,
        stream: &str,
    ) -> Result<Option<String>, SourceError> {
        let key = (region.to_string(), stream.to_string());
        if self.failing_streams.contains(&key) {
            return Err(SourceError::transport(region, "injected fetch failure"));
        }
        Ok(self.messages.get(&key).cloned())
    }
}
