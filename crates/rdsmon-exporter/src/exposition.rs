//! Prometheus text exposition format.
//!
//! Renders the descriptor registry and one collection pass's samples into
//! the text format scraped by a Prometheus server or compatible agent.
//! Every registered descriptor surfaces exactly once per render, even when
//! the current pass produced no samples for it.

use std::collections::HashMap;
use std::sync::Arc;

use rdsmon_core::{LABEL_NAMES, MetricDescriptor};

use crate::passes::PassReport;

/// Content type of the text exposition format.
pub const TEXT_FORMAT_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Render descriptors + samples, followed by the exporter's self-metrics.
///
/// All published metrics are untyped: the source schema carries no type
/// information, so none is invented.
pub fn render(namespace: &str, descriptors: &[Arc<MetricDescriptor>], report: &PassReport) -> String {
    let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, sample) in report.samples.iter().enumerate() {
        by_name
            .entry(sample.descriptor.fq_name())
            .or_default()
            .push(i);
    }

    let mut out = String::new();
    let [region_label, instance_label] = LABEL_NAMES;

    for descriptor in descriptors {
        let name = descriptor.fq_name();
        out.push_str(&format!("# HELP {name} {}\n", descriptor.help()));
        out.push_str(&format!("# TYPE {name} untyped\n"));
        if let Some(indices) = by_name.get(name) {
            for &i in indices {
                let sample = &report.samples[i];
                out.push_str(&format!(
                    "{name}{{{region_label}=\"{}\",{instance_label}=\"{}\"}} {}\n",
                    escape_label_value(&sample.region),
                    escape_label_value(&sample.instance_id),
                    sample.value
                ));
            }
        }
    }

    // Self-metrics: the observable surface for the skip-and-continue error
    // policy of the passes.
    out.push_str(&format!(
        "# HELP {namespace}_exporter_scrape_errors Transport faults and timeouts during the last collection pass.\n\
         # TYPE {namespace}_exporter_scrape_errors gauge\n\
         {namespace}_exporter_scrape_errors {}\n",
        report.errors
    ));
    out.push_str(&format!(
        "# HELP {namespace}_exporter_scrape_duration_seconds Wall-clock duration of the last collection pass.\n\
         # TYPE {namespace}_exporter_scrape_duration_seconds gauge\n\
         {namespace}_exporter_scrape_duration_seconds {:.6}\n",
        report.duration.as_secs_f64()
    ));
    out.push_str(&format!(
        "# HELP {namespace}_exporter_descriptors Metric identities registered since process start.\n\
         # TYPE {namespace}_exporter_descriptors gauge\n\
         {namespace}_exporter_descriptors {}\n",
        descriptors.len()
    ));

    out
}

/// Escape a label value per the exposition format: backslash, double
/// quote, and line feed.
fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}
