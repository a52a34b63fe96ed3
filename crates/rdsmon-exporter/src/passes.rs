//! Discovery and collection over the region/stream/snapshot fan-out.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::{debug, info, warn};

use rdsmon_core::{numeric_leaves, MetricRegistry, Sample, Snapshot};
use rdsmon_source::{LogSource, RegionLister, SourceError};

/// Per-pass tunables.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Log group holding the per-instance metric streams.
    pub log_group: String,
    /// Deadline for one region's listing + fetches; an unresponsive region
    /// is skipped rather than stalling the whole pass.
    pub region_timeout: Duration,
}

impl ScrapeConfig {
    pub fn new(log_group: &str) -> Self {
        Self {
            log_group: log_group.to_string(),
            region_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_region_timeout(mut self, region_timeout: Duration) -> Self {
        self.region_timeout = region_timeout;
        self
    }
}

/// What one pass saw and produced.
#[derive(Debug, Default)]
pub struct PassReport {
    /// Labeled observations; empty for discovery.
    pub samples: Vec<Sample>,
    /// Regions whose streams were walked.
    pub regions_scanned: usize,
    /// Regions skipped (unsupported, failed, or timed out).
    pub regions_skipped: usize,
    /// Streams whose snapshot was walked.
    pub streams_scanned: usize,
    /// Streams skipped (no events, bad payload, fetch failure).
    pub streams_skipped: usize,
    /// Transport faults and timeouts encountered.
    pub errors: usize,
    /// Identities first seen during a collection pass.
    pub late_registrations: usize,
    /// Wall-clock time of the pass.
    pub duration: Duration,
}

/// Which per-leaf policy a pass applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassKind {
    /// Grow the registry; emit nothing.
    Discovery,
    /// Emit one sample per leaf against its registered descriptor.
    Collection,
}

/// The exporter: a registry plus the collaborators both passes fan out over.
pub struct Exporter<R, S> {
    regions: R,
    source: S,
    registry: Arc<MetricRegistry>,
    config: ScrapeConfig,
}

impl<R: RegionLister, S: LogSource> Exporter<R, S> {
    pub fn new(regions: R, source: S, registry: Arc<MetricRegistry>, config: ScrapeConfig) -> Self {
        Self {
            regions,
            source,
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// The one-time pass establishing the initial descriptor set.
    ///
    /// Runs at exporter registration (daemon startup), never emits samples,
    /// and only grows the registry.
    pub async fn discover(&self) -> PassReport {
        let report = self.run(PassKind::Discovery).await;
        info!(
            descriptors = self.registry.len(),
            regions = report.regions_scanned,
            streams = report.streams_scanned,
            errors = report.errors,
            "discovery pass complete"
        );
        report
    }

    /// One scrape's worth of live samples.
    ///
    /// Repeats the same fan-out as discovery against fresh data. A leaf
    /// whose identity was never registered is self-registered rather than
    /// dropped or panicked on: the snapshot schema is open-world, and a
    /// field appearing after startup is data, not an error.
    pub async fn collect(&self) -> PassReport {
        let report = self.run(PassKind::Collection).await;
        debug!(
            samples = report.samples.len(),
            regions = report.regions_scanned,
            streams_skipped = report.streams_skipped,
            errors = report.errors,
            late_registrations = report.late_registrations,
            "collection pass complete"
        );
        report
    }

    async fn run(&self, kind: PassKind) -> PassReport {
        let started = Instant::now();
        let mut report = PassReport::default();

        for region in self.regions.regions() {
            let scan = self.scan_region(kind, &region, &mut report);
            if timeout(self.config.region_timeout, scan).await.is_err() {
                warn!(%region, timeout = ?self.config.region_timeout, "region scan timed out, skipping");
                report.regions_skipped += 1;
                report.errors += 1;
            }
        }

        report.duration = started.elapsed();
        report
    }

    async fn scan_region(&self, kind: PassKind, region: &str, report: &mut PassReport) {
        let streams = match self.source.list_streams(region, &self.config.log_group).await {
            Ok(streams) => streams,
            Err(SourceError::Unsupported { .. }) => {
                debug!(%region, "log group not present, skipping region");
                report.regions_skipped += 1;
                return;
            }
            Err(err @ SourceError::Transport { .. }) => {
                warn!(%region, error = %err, "stream listing failed, skipping region");
                report.regions_skipped += 1;
                report.errors += 1;
                return;
            }
        };

        report.regions_scanned += 1;

        for stream in streams {
            let message = match self
                .source
                .latest_message(region, &self.config.log_group, &stream)
                .await
            {
                Ok(Some(message)) => message,
                Ok(None) => {
                    debug!(%region, %stream, "stream has no events, skipping");
                    report.streams_skipped += 1;
                    continue;
                }
                Err(err) => {
                    warn!(%region, %stream, error = %err, "event fetch failed, skipping stream");
                    report.streams_skipped += 1;
                    report.errors += 1;
                    continue;
                }
            };

            let snapshot = match Snapshot::parse(&message) {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    debug!(%region, %stream, error = %err, "message is not a snapshot, skipping");
                    report.streams_skipped += 1;
                    continue;
                }
            };

            self.scan_snapshot(kind, region, &stream, &snapshot, report);
        }
    }

    fn scan_snapshot(
        &self,
        kind: PassKind,
        region: &str,
        stream: &str,
        snapshot: &Snapshot,
        report: &mut PassReport,
    ) {
        match kind {
            PassKind::Discovery => {
                for leaf in numeric_leaves(snapshot) {
                    self.registry.ensure(&leaf.subsystem, &leaf.name);
                }
                report.streams_scanned += 1;
            }
            PassKind::Collection => {
                let Some(instance_id) = snapshot.instance_id() else {
                    warn!(%region, %stream, "snapshot carries no instanceID, skipping stream");
                    report.streams_skipped += 1;
                    return;
                };

                for leaf in numeric_leaves(snapshot) {
                    let identity = self.registry.identity(&leaf.subsystem, &leaf.name);
                    let descriptor = match self.registry.lookup(&identity) {
                        Some(descriptor) => descriptor,
                        None => {
                            debug!(metric = %identity, %region, "metric first seen during collection, registering");
                            report.late_registrations += 1;
                            self.registry.ensure(&leaf.subsystem, &leaf.name)
                        }
                    };
                    report.samples.push(Sample {
                        descriptor,
                        region: region.to_string(),
                        instance_id: instance_id.to_string(),
                        value: leaf.value,
                    });
                }
                report.streams_scanned += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdsmon_source::{MemorySource, StaticRegions};

    const SNAPSHOT: &str = r#"{"instanceID":"db-1","freeStorage":42.0,
        "cpu":{"user":5.1,"system":1.2},"disks":[{"readIOPS":3.0}]}"#;

    fn exporter(regions: Vec<&str>, source: MemorySource) -> Exporter<StaticRegions, MemorySource> {
        Exporter::new(
            StaticRegions::new(regions.into_iter().map(String::from).collect()),
            source,
            Arc::new(MetricRegistry::new("rdsosmetrics", "RDSOSMetrics")),
            ScrapeConfig::new("RDSOSMetrics"),
        )
    }

    #[tokio::test]
    async fn discovery_grows_registry_without_samples() {
        let source = MemorySource::new().with_stream("eu-west-1", "db-1", SNAPSHOT);
        let exporter = exporter(vec!["eu-west-1"], source);

        let report = exporter.discover().await;

        assert!(report.samples.is_empty());
        assert_eq!(exporter.registry().len(), 4);
        assert!(exporter.registry().lookup("rdsosmetrics_cpu_user").is_some());
        assert!(exporter.registry().lookup("rdsosmetrics_disks_0_readiops").is_some());
    }

    #[tokio::test]
    async fn same_field_in_two_regions_registers_once_samples_twice() {
        let snap_a = r#"{"instanceID":"db-a","freeStorage":42.0}"#;
        let snap_b = r#"{"instanceID":"db-b","freeStorage":17.0}"#;
        let source = MemorySource::new()
            .with_stream("eu-west-1", "db-a", snap_a)
            .with_stream("us-east-1", "db-b", snap_b);
        let exporter = exporter(vec!["eu-west-1", "us-east-1"], source);

        exporter.discover().await;
        assert_eq!(exporter.registry().len(), 1);

        let report = exporter.collect().await;
        assert_eq!(report.samples.len(), 2);
        let descriptor = exporter.registry().lookup("rdsosmetrics_freestorage").unwrap();
        for sample in &report.samples {
            assert!(Arc::ptr_eq(&sample.descriptor, &descriptor));
        }
        let regions: Vec<_> = report.samples.iter().map(|s| s.region.as_str()).collect();
        assert_eq!(regions, vec!["eu-west-1", "us-east-1"]);
    }

    #[tokio::test]
    async fn collection_labels_samples_with_instance_and_region() {
        let source = MemorySource::new().with_stream("eu-west-1", "db-1", SNAPSHOT);
        let exporter = exporter(vec!["eu-west-1"], source);

        exporter.discover().await;
        let report = exporter.collect().await;

        assert_eq!(report.samples.len(), 4);
        for sample in &report.samples {
            assert_eq!(sample.region, "eu-west-1");
            assert_eq!(sample.instance_id, "db-1");
        }
        let storage = report
            .samples
            .iter()
            .find(|s| s.descriptor.fq_name() == "rdsosmetrics_freestorage")
            .unwrap();
        assert_eq!(storage.value, 42.0);
    }

    #[tokio::test]
    async fn non_json_stream_is_skipped_without_affecting_others() {
        let source = MemorySource::new()
            .with_stream("eu-west-1", "broken", "not-json")
            .with_stream("eu-west-1", "db-1", SNAPSHOT);
        let exporter = exporter(vec!["eu-west-1"], source);

        exporter.discover().await;
        let report = exporter.collect().await;

        assert_eq!(report.samples.len(), 4);
        assert_eq!(report.streams_skipped, 1);
        assert_eq!(report.errors, 0);
    }

    #[tokio::test]
    async fn unsupported_region_contributes_nothing_and_continues() {
        let source = MemorySource::new()
            .with_unsupported_region("ap-east-1")
            .with_stream("eu-west-1", "db-1", SNAPSHOT);
        let exporter = exporter(vec!["ap-east-1", "eu-west-1"], source);

        let discovery = exporter.discover().await;
        assert_eq!(discovery.regions_skipped, 1);
        assert_eq!(discovery.errors, 0);
        assert_eq!(exporter.registry().len(), 4);

        let report = exporter.collect().await;
        assert_eq!(report.samples.len(), 4);
        assert!(report.samples.iter().all(|s| s.region == "eu-west-1"));
    }

    #[tokio::test]
    async fn transport_failures_are_counted_not_fatal() {
        let source = MemorySource::new()
            .with_failing_region("sa-east-1")
            .with_failing_stream("eu-west-1", "flaky")
            .with_stream("eu-west-1", "db-1", SNAPSHOT);
        let exporter = exporter(vec!["sa-east-1", "eu-west-1"], source);

        exporter.discover().await;
        let report = exporter.collect().await;

        assert_eq!(report.samples.len(), 4);
        assert_eq!(report.errors, 2);
        assert_eq!(report.regions_skipped, 1);
        assert_eq!(report.streams_skipped, 1);
    }

    #[tokio::test]
    async fn field_appearing_after_discovery_is_self_registered() {
        // Discovery sees a snapshot without "swap"; collection sees one
        // with it. Open-world policy registers and samples the newcomer.
        let early = r#"{"instanceID":"db-1","uptime":1.0}"#;
        let source = MemorySource::new().with_stream("eu-west-1", "db-1", early);
        let exporter = exporter(vec!["eu-west-1"], source);
        exporter.discover().await;
        assert_eq!(exporter.registry().len(), 1);

        let late = r#"{"instanceID":"db-1","uptime":2.0,"swap":{"free":9.0}}"#;
        let richer = MemorySource::new().with_stream("eu-west-1", "db-1", late);
        let exporter = Exporter::new(
            StaticRegions::new(vec!["eu-west-1".into()]),
            richer,
            Arc::clone(&exporter.registry),
            ScrapeConfig::new("RDSOSMetrics"),
        );

        let report = exporter.collect().await;
        assert_eq!(report.samples.len(), 2);
        assert_eq!(report.late_registrations, 1);
        assert!(exporter.registry().lookup("rdsosmetrics_swap_free").is_some());
    }

    #[tokio::test]
    async fn snapshot_without_instance_id_is_skipped_in_collection() {
        let anonymous = r#"{"uptime":1.0}"#;
        let source = MemorySource::new().with_stream("eu-west-1", "db-1", anonymous);
        let exporter = exporter(vec!["eu-west-1"], source);

        // Discovery still learns the shape.
        exporter.discover().await;
        assert_eq!(exporter.registry().len(), 1);

        let report = exporter.collect().await;
        assert!(report.samples.is_empty());
        assert_eq!(report.streams_skipped, 1);
    }

    #[tokio::test]
    async fn empty_stream_is_skipped() {
        let source = MemorySource::new()
            .with_empty_stream("eu-west-1", "quiet")
            .with_stream("eu-west-1", "db-1", SNAPSHOT);
        let exporter = exporter(vec!["eu-west-1"], source);

        let report = exporter.discover().await;
        assert_eq!(report.streams_scanned, 1);
        assert_eq!(report.streams_skipped, 1);
        assert_eq!(exporter.registry().len(), 4);
    }
}
