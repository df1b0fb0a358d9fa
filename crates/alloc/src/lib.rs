//! vpcnet subnet allocation: provider seams and first-fit placement.
//!
//! The allocator is stateless; everything it reads (VPC, subnet and port
//! listings) comes fresh from provider calls per invocation. Retry policy
//! for provider failures belongs to the caller's reconcile loop.

#![forbid(unsafe_code)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use vpcnet_core::{total_addresses_from_cidrs, Tag};

/// Logical request for one or more backing subnets, sized and tagged per
/// policy without pinning to a specific remote subnet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubnetSet {
    pub namespace: String,
    pub name: String,
    pub uid: String,
    /// Requested address count per backing subnet; provider default if unset.
    pub ipv4_subnet_size: Option<i64>,
    pub access_mode: Option<String>,
    /// Resource type this set is the namespace default for, if any.
    pub default_for: Option<String>,
}

/// Remote subnet resource considered during placement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubnetCandidate {
    pub id: String,
    pub path: String,
    pub ipv4_subnet_size: Option<i64>,
    pub ip_addresses: Vec<String>,
}

/// VPC resolved for a namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VpcResourceInfo {
    pub org_id: String,
    pub project_id: String,
    pub vpc_id: String,
}

/// Port attached to a subnet; only its existence is counted here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubnetPort {
    pub id: String,
}

#[async_trait]
pub trait VpcServiceProvider: Send + Sync {
    async fn list_vpc_info(&self, namespace: &str) -> anyhow::Result<Vec<VpcResourceInfo>>;
}

#[async_trait]
pub trait SubnetServiceProvider: Send + Sync {
    /// Subnets already tagged as belonging to `subnet_set_name` in `namespace`.
    async fn get_subnets_by_index(
        &self,
        namespace: &str,
        subnet_set_name: &str,
    ) -> anyhow::Result<Vec<SubnetCandidate>>;

    async fn create_or_update_subnet(
        &self,
        subnet_set: &SubnetSet,
        vpc_info: &VpcResourceInfo,
        tags: &[Tag],
    ) -> anyhow::Result<SubnetCandidate>;

    fn generate_subnet_ns_tags(&self, subnet_set: &SubnetSet) -> Vec<Tag>;
}

#[async_trait]
pub trait SubnetPortServiceProvider: Send + Sync {
    async fn get_ports_of_subnet(&self, subnet_path: &str) -> anyhow::Result<Vec<SubnetPort>>;
}

/// Desired-state record listing seam, backed by the operator's typed client.
#[async_trait]
pub trait SubnetSetLister: Send + Sync {
    async fn list_subnet_sets(&self, namespace: &str) -> anyhow::Result<Vec<SubnetSet>>;
}

#[derive(Debug, thiserror::Error)]
pub enum AllocError {
    /// Precondition: the namespace resolves to no VPC; never retried here.
    #[error("no VPC found for namespace {namespace}")]
    NoVpcFound { namespace: String },
    #[error("default SubnetSet not found for type {resource_type} in namespace {namespace}")]
    DefaultSubnetSetNotFound { namespace: String, resource_type: String },
    #[error("multiple default SubnetSets found for type {resource_type} in namespace {namespace}")]
    MultipleDefaultSubnetSets { namespace: String, resource_type: String },
    /// Malformed data carried by a provider response.
    #[error(transparent)]
    Invalid(#[from] vpcnet_core::Error),
    /// Provider/transport failure, propagated verbatim.
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

/// Pick an existing subnet with free capacity for `subnet_set`, or create a
/// new one in the namespace's VPC.
///
/// First-fit among existing candidates, no rebalancing. Two concurrent
/// calls for the same subnet-set can both observe "no capacity" and both
/// create; callers must serialize allocations per subnet-set.
pub async fn allocate_subnet(
    subnet_set: &SubnetSet,
    vpc: &dyn VpcServiceProvider,
    subnets: &dyn SubnetServiceProvider,
    ports: &dyn SubnetPortServiceProvider,
) -> Result<String, AllocError> {
    let candidates = subnets
        .get_subnets_by_index(&subnet_set.namespace, &subnet_set.name)
        .await?;
    for candidate in &candidates {
        let used = ports.get_ports_of_subnet(&candidate.path).await?.len() as u64;
        let capacity = candidate_capacity(candidate)?;
        if used < capacity {
            debug!(path = %candidate.path, used, capacity, "reusing subnet with free capacity");
            return Ok(candidate.path.clone());
        }
    }
    let vpcs = vpc.list_vpc_info(&subnet_set.namespace).await?;
    let Some(vpc_info) = vpcs.first() else {
        return Err(AllocError::NoVpcFound { namespace: subnet_set.namespace.clone() });
    };
    let tags = subnets.generate_subnet_ns_tags(subnet_set);
    let created = subnets
        .create_or_update_subnet(subnet_set, vpc_info, &tags)
        .await?;
    info!(
        ns = %subnet_set.namespace,
        set = %subnet_set.name,
        path = %created.path,
        "created subnet for subnet-set"
    );
    Ok(created.path)
}

// Total addresses a candidate can hold: the CIDR list wins when present,
// falling back to the declared subnet size. Network and broadcast addresses
// count toward capacity.
fn candidate_capacity(candidate: &SubnetCandidate) -> Result<u64, AllocError> {
    if !candidate.ip_addresses.is_empty() {
        return Ok(total_addresses_from_cidrs(&candidate.ip_addresses)?);
    }
    Ok(candidate.ipv4_subnet_size.unwrap_or(0).max(0) as u64)
}

/// Resolve the single subnet-set marked as the namespace default for
/// `resource_type`. Zero and several matches are distinct named errors so
/// callers can remediate differently.
pub async fn default_subnet_set_for_namespace(
    lister: &dyn SubnetSetLister,
    namespace: &str,
    resource_type: &str,
) -> Result<SubnetSet, AllocError> {
    let sets = lister.list_subnet_sets(namespace).await?;
    let mut matches = sets
        .into_iter()
        .filter(|s| s.default_for.as_deref() == Some(resource_type));
    let Some(first) = matches.next() else {
        return Err(AllocError::DefaultSubnetSetNotFound {
            namespace: namespace.to_string(),
            resource_type: resource_type.to_string(),
        });
    };
    if matches.next().is_some() {
        return Err(AllocError::MultipleDefaultSubnetSets {
            namespace: namespace.to_string(),
            resource_type: resource_type.to_string(),
        });
    }
    Ok(first)
}
