//! vpcnet in-memory stores: network-config index and inventory mirrors.
//!
//! Both stores guard their maps with a single reader/writer lock: lookups
//! run concurrently with each other and are mutually exclusive with
//! mutations, so a reader never observes a partially constructed entry.

#![forbid(unsafe_code)]

use std::sync::{PoisonError, RwLock};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Derived network configuration for a namespace, keyed by config name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VpcNetworkConfigInfo {
    pub name: String,
    pub namespace: String,
    pub gateway_path: String,
    pub edge_cluster_path: String,
    pub project: String,
    pub public_blocks: Vec<String>,
    pub private_cidrs: Vec<String>,
    pub default_subnet_size: i64,
    pub default_access_mode: String,
}

#[derive(Debug, Default)]
struct Inner {
    by_name: FxHashMap<String, VpcNetworkConfigInfo>,
    by_namespace: FxHashMap<String, Vec<String>>,
}

impl Inner {
    // Rebuilt wholesale on every mutation so the secondary index can never
    // diverge from the primary map.
    fn rebuild_namespace_index(&mut self) {
        self.by_namespace.clear();
        for (name, entry) in &self.by_name {
            self.by_namespace
                .entry(entry.namespace.clone())
                .or_default()
                .push(name.clone());
        }
        for names in self.by_namespace.values_mut() {
            names.sort();
        }
    }
}

/// Concurrency-safe mapping from config name to [`VpcNetworkConfigInfo`]
/// with a secondary index by namespace.
///
/// Entries are immutable snapshots; an update is modeled as delete plus add.
#[derive(Debug, Default)]
pub struct NetworkConfigIndex {
    inner: RwLock<Inner>,
}

impl NetworkConfigIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, entry: VpcNetworkConfigInfo) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        debug!(name = %entry.name, ns = %entry.namespace, "adding network config");
        inner.by_name.insert(entry.name.clone(), entry);
        inner.rebuild_namespace_index();
    }

    pub fn delete(&self, name: &str) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.by_name.remove(name).is_some() {
            debug!(name = %name, "deleted network config");
            inner.rebuild_namespace_index();
        }
    }

    pub fn get_by_key(&self, name: &str) -> Option<VpcNetworkConfigInfo> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.by_name.get(name).cloned()
    }

    /// First config whose namespace matches. With several matches the pick
    /// is arbitrary; enforcing a unique per-namespace default is the
    /// caller's responsibility.
    pub fn get_by_namespace(&self, namespace: &str) -> Option<VpcNetworkConfigInfo> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let names = inner.by_namespace.get(namespace)?;
        names.first().and_then(|name| inner.by_name.get(name)).cloned()
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Local mirror entry of a remote inventory resource.
pub trait InventoryEntry: Clone + Send + Sync + 'static {
    /// Correlating identifier assigned by the remote platform.
    fn external_id(&self) -> &str;
}

/// Lock-guarded mirror of one remote resource collection, keyed by
/// external id.
#[derive(Debug)]
pub struct InventoryStore<T> {
    entries: RwLock<FxHashMap<String, T>>,
}

impl<T: InventoryEntry> InventoryStore<T> {
    pub fn new() -> Self {
        Self { entries: RwLock::new(FxHashMap::default()) }
    }

    /// Insert or refresh an entry under its external id.
    pub fn add(&self, entry: T) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(entry.external_id().to_string(), entry);
    }

    /// Remove an entry; returns whether it was present.
    pub fn delete(&self, external_id: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(external_id).is_some()
    }

    pub fn get(&self, external_id: &str) -> Option<T> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(external_id).cloned()
    }

    pub fn list(&self) -> Vec<T> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: InventoryEntry> Default for InventoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
