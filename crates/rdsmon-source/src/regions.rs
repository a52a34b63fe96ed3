//! Region enumeration.
//!
//! The region set is configuration rather than a service call: the AWS SDK
//! for Rust does not expose the compiled-in endpoints partition table, and
//! operators usually want to scope the exporter to the regions they run
//! databases in anyway.

use crate::RegionLister;

/// Commercial regions where RDS is generally available; the fallback when
/// no region set is configured.
const DEFAULT_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "af-south-1",
    "ap-east-1",
    "ap-south-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-southeast-1",
    "ap-southeast-2",
    "ca-central-1",
    "eu-central-1",
    "eu-north-1",
    "eu-south-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "me-south-1",
    "sa-east-1",
];

/// A fixed, ordered region set.
#[derive(Debug, Clone)]
pub struct StaticRegions {
    regions: Vec<String>,
}

impl StaticRegions {
    pub fn new(regions: Vec<String>) -> Self {
        Self { regions }
    }

    /// The built-in commercial region list.
    pub fn default_set() -> Self {
        Self::new(DEFAULT_REGIONS.iter().map(|r| r.to_string()).collect())
    }
}

impl RegionLister for StaticRegions {
    fn regions(&self) -> Vec<String> {
        self.regions.clone()
    }
}
