//! Error taxonomy for log-source access.

use thiserror::Error;

/// Failures reaching the log-storage service.
///
/// The two variants drive different skip behavior in the passes:
/// `Unsupported` is the expected "service not deployed here" outcome and is
/// logged quietly; `Transport` is a real fault, logged at warn and counted
/// in the pass report. Neither is fatal to the exporter.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The monitored service (or its log group) has no presence in the
    /// region.
    #[error("log group not present in region {region}")]
    Unsupported { region: String },

    /// Throttling, network fault, or any other service failure.
    #[error("log source failure in region {region}: {message}")]
    Transport { region: String, message: String },
}

impl SourceError {
    pub fn unsupported(region: &str) -> Self {
        Self::Unsupported {
            region: region.to_string(),
        }
    }

    pub fn transport(region: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            region: region.to_string(),
            message: message.into(),
        }
    }
}
