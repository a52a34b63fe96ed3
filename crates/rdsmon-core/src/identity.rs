//! Canonical metric identity.

/// Build the canonical, lower-cased, fully-qualified metric name for a leaf.
///
/// Non-empty segments of `(namespace, subsystem, name)` are joined with `_`,
/// so a top-level scalar (`subsystem == ""`) renders with a single separator
/// rather than a doubled one. Pure and stable: the same pair always maps to
/// the same identity, across snapshots, instances, and regions.
pub fn fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    let mut fq = String::with_capacity(namespace.len() + subsystem.len() + name.len() + 2);
    for segment in [namespace, subsystem, name] {
        if segment.is_empty() {
            continue;
        }
        if !fq.is_empty() {
            fq.push('_');
        }
        fq.push_str(segment);
    }
    fq.to_lowercase()
}
