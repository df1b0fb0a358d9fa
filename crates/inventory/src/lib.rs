//! vpcnet inventory sync: cursor-paged pulls and stale-entry cleanup.
//!
//! The engine mirrors remote inventory collections (clusters, cluster
//! nodes) into local stores. Pulls are cursor-paginated and block per page;
//! cleanup is at-least-once, never transactional.

#![forbid(unsafe_code)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use vpcnet_store::{InventoryEntry, InventoryStore};

pub const RESOURCE_TYPE_CLUSTER: &str = "ContainerCluster";
pub const RESOURCE_TYPE_CLUSTER_NODE: &str = "ContainerClusterNode";

/// Mirrored cluster entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerCluster {
    pub external_id: String,
    pub display_name: String,
    pub resource_type: String,
}

/// Mirrored cluster-node entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterNode {
    pub external_id: String,
    pub display_name: String,
    pub resource_type: String,
    pub container_cluster_id: String,
}

impl InventoryEntry for ContainerCluster {
    fn external_id(&self) -> &str {
        &self.external_id
    }
}

impl InventoryEntry for ClusterNode {
    fn external_id(&self) -> &str {
        &self.external_id
    }
}

/// One page of a paged node listing. An empty cursor is the end sentinel.
#[derive(Debug, Clone, Default)]
pub struct NodePage {
    pub results: Vec<ClusterNode>,
    pub cursor: String,
}

/// Remote inventory operations the sync engine depends on.
#[async_trait]
pub trait NodeInventoryClient: Send + Sync {
    /// List one page of nodes for a cluster, continuing from `cursor`.
    async fn list_cluster_nodes(
        &self,
        cluster_id: &str,
        cursor: Option<&str>,
    ) -> anyhow::Result<NodePage>;

    /// Whether the node (or its parent cluster) is gone on the remote side.
    async fn is_cluster_node_deleted(&self, cluster_id: &str, node_id: &str) -> bool;

    /// Delete the mirrored resource on the remote inventory service.
    async fn delete_resource(&self, external_id: &str) -> anyhow::Result<()>;
}

/// Keeps the local cluster/node mirrors consistent with the remote platform.
pub struct InventorySyncEngine<C> {
    client: C,
    pub cluster_store: InventoryStore<ContainerCluster>,
    pub node_store: InventoryStore<ClusterNode>,
}

impl<C: NodeInventoryClient> InventorySyncEngine<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            cluster_store: InventoryStore::new(),
            node_store: InventoryStore::new(),
        }
    }

    /// Access to the underlying remote client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Pull all node instances for `cluster_id`, page by page.
    ///
    /// A mid-pagination error aborts the pull with that error; pages already
    /// written stay in the store. The next successful pull supersedes them
    /// and stale cleanup removes anything no longer reported.
    pub async fn init_cluster_node(&self, cluster_id: &str) -> anyhow::Result<()> {
        let mut cursor: Option<String> = None;
        let mut pulled = 0usize;
        loop {
            let page = self
                .client
                .list_cluster_nodes(cluster_id, cursor.as_deref())
                .await?;
            let NodePage { results, cursor: next } = page;
            for node in results {
                if node.external_id.is_empty() {
                    warn!(
                        cluster = %cluster_id,
                        name = %node.display_name,
                        "skipping cluster node with empty external id"
                    );
                    continue;
                }
                self.node_store.add(node);
                pulled += 1;
            }
            if next.is_empty() {
                break;
            }
            debug!(cluster = %cluster_id, cursor = %next, "continuing node pull");
            cursor = Some(next);
        }
        info!(
            cluster = %cluster_id,
            pulled,
            total = self.node_store.len(),
            "cluster node pull done"
        );
        Ok(())
    }

    /// Remove local node entries whose remote counterpart has disappeared.
    ///
    /// The first remote deletion failure aborts the pass with that error;
    /// remaining stale entries are retried on the next scheduled run.
    pub async fn clean_stale_inventory_cluster_node(&self) -> anyhow::Result<()> {
        for node in self.node_store.list() {
            if !self.node_is_stale(&node).await {
                continue;
            }
            info!(
                node = %node.external_id,
                name = %node.display_name,
                "removing stale inventory cluster node"
            );
            self.client.delete_resource(&node.external_id).await?;
            self.node_store.delete(&node.external_id);
        }
        Ok(())
    }

    async fn node_is_stale(&self, node: &ClusterNode) -> bool {
        match self.cluster_store.get(&node.container_cluster_id) {
            // Parent cluster no longer mirrored; the node cannot be valid.
            None => true,
            Some(cluster) => {
                self.client
                    .is_cluster_node_deleted(&cluster.external_id, &node.external_id)
                    .await
            }
        }
    }
}
