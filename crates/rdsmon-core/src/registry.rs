//! Process-lifetime descriptor registry.
//!
//! The registry is the shared state between the one-time discovery pass and
//! every scrape's collection pass. It only ever grows: a descriptor, once
//! created for an identity, is never mutated or removed for the lifetime of
//! the process. `ensure`/`lookup` are guarded by a single `RwLock` so growth
//! stays linearizable with lookups when the scrape endpoint serves
//! concurrent requests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::identity::fq_name;

/// Label schema shared by every published metric.
pub const LABEL_NAMES: [&str; 2] = ["region", "instanceID"];

/// Registered metadata for one metric identity.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricDescriptor {
    fq_name: String,
    help: String,
}

impl MetricDescriptor {
    /// The canonical metric name this descriptor was registered under.
    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    pub fn help(&self) -> &str {
        &self.help
    }
}

/// One labeled observation, produced fresh on every collection pass.
#[derive(Debug, Clone)]
pub struct Sample {
    pub descriptor: Arc<MetricDescriptor>,
    pub region: String,
    pub instance_id: String,
    pub value: f64,
}

/// Identity → descriptor cache for the lifetime of the process.
pub struct MetricRegistry {
    namespace: String,
    help: String,
    inner: RwLock<HashMap<String, Arc<MetricDescriptor>>>,
}

impl MetricRegistry {
    /// Create an empty registry publishing under `namespace`.
    ///
    /// `log_group` only feeds the static help text attached to every
    /// descriptor.
    pub fn new(namespace: &str, log_group: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            help: format!("Automatically discovered metric from the {log_group} log group"),
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// The canonical identity a `(subsystem, name)` leaf resolves to here.
    pub fn identity(&self, subsystem: &str, name: &str) -> String {
        fq_name(&self.namespace, subsystem, name)
    }

    /// Namespace this registry publishes under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Get-or-insert the descriptor for a leaf. Idempotent: repeated calls
    /// with the same identity return the same descriptor.
    pub fn ensure(&self, subsystem: &str, name: &str) -> Arc<MetricDescriptor> {
        let identity = self.identity(subsystem, name);

        // Fast path: already registered.
        if let Some(existing) = self.lookup(&identity) {
            return existing;
        }

        let mut map = self.write_lock();
        // Re-check under the write lock; another scrape may have won.
        if let Some(existing) = map.get(&identity) {
            return Arc::clone(existing);
        }

        debug!(metric = %identity, "registered metric descriptor");
        let descriptor = Arc::new(MetricDescriptor {
            fq_name: identity.clone(),
            help: self.help.clone(),
        });
        map.insert(identity, Arc::clone(&descriptor));
        descriptor
    }

    /// Read-only probe; never creates.
    pub fn lookup(&self, identity: &str) -> Option<Arc<MetricDescriptor>> {
        self.read_lock().get(identity).map(Arc::clone)
    }

    /// Every registered descriptor, each exactly once, sorted by name.
    pub fn descriptors(&self) -> Vec<Arc<MetricDescriptor>> {
        let mut all: Vec<_> = self.read_lock().values().map(Arc::clone).collect();
        all.sort_by(|a, b| a.fq_name.cmp(&b.fq_name));
        all
    }

    pub fn len(&self) -> usize {
        self.read_lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_lock().is_empty()
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<MetricDescriptor>>> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<MetricDescriptor>>> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricRegistry")
            .field("namespace", &self.namespace)
            .field("descriptors", &self.len())
            .finish()
    }
}
