//! Canonical descriptive tags for remote resources.
//!
//! Every resource provisioned on the remote platform carries a fixed set of
//! identifying tags (cluster, namespace, record kind name/uid) so it can be
//! found again by index lookups. Reserved scopes are owned by this module
//! and may never be shadowed by caller-supplied extras.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const TAG_SCOPE_CLUSTER: &str = "vpcnet/cluster";
pub const TAG_SCOPE_NAMESPACE: &str = "vpcnet/namespace";
pub const TAG_SCOPE_NAMESPACE_UID: &str = "vpcnet/namespace_uid";
pub const TAG_SCOPE_STATIC_ROUTE_NAME: &str = "vpcnet/static_route_name";
pub const TAG_SCOPE_STATIC_ROUTE_UID: &str = "vpcnet/static_route_uid";
pub const TAG_SCOPE_SECURITY_POLICY_NAME: &str = "vpcnet/security_policy_name";
pub const TAG_SCOPE_SECURITY_POLICY_UID: &str = "vpcnet/security_policy_uid";
pub const TAG_SCOPE_SUBNET_NAME: &str = "vpcnet/subnet_name";
pub const TAG_SCOPE_SUBNET_UID: &str = "vpcnet/subnet_uid";
pub const TAG_SCOPE_SUBNET_PORT_NAME: &str = "vpcnet/subnet_port_name";
pub const TAG_SCOPE_SUBNET_PORT_UID: &str = "vpcnet/subnet_port_uid";
pub const TAG_SCOPE_VPC_NAME: &str = "vpcnet/vpc_name";
pub const TAG_SCOPE_VPC_UID: &str = "vpcnet/vpc_uid";
pub const TAG_SCOPE_IP_POOL_NAME: &str = "vpcnet/ip_pool_name";
pub const TAG_SCOPE_IP_POOL_UID: &str = "vpcnet/ip_pool_uid";
pub const TAG_SCOPE_SUBNET_SET_NAME: &str = "vpcnet/subnet_set_name";
pub const TAG_SCOPE_SUBNET_SET_UID: &str = "vpcnet/subnet_set_uid";

/// Fixed list of reserved scopes; extend together with [`RecordObject`].
pub const RESERVED_TAG_SCOPES: &[&str] = &[
    TAG_SCOPE_CLUSTER,
    TAG_SCOPE_NAMESPACE,
    TAG_SCOPE_NAMESPACE_UID,
    TAG_SCOPE_STATIC_ROUTE_NAME,
    TAG_SCOPE_STATIC_ROUTE_UID,
    TAG_SCOPE_SECURITY_POLICY_NAME,
    TAG_SCOPE_SECURITY_POLICY_UID,
    TAG_SCOPE_SUBNET_NAME,
    TAG_SCOPE_SUBNET_UID,
    TAG_SCOPE_SUBNET_PORT_NAME,
    TAG_SCOPE_SUBNET_PORT_UID,
    TAG_SCOPE_VPC_NAME,
    TAG_SCOPE_VPC_UID,
    TAG_SCOPE_IP_POOL_NAME,
    TAG_SCOPE_IP_POOL_UID,
    TAG_SCOPE_SUBNET_SET_NAME,
    TAG_SCOPE_SUBNET_SET_UID,
];

static RESERVED_SCOPES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| RESERVED_TAG_SCOPES.iter().copied().collect());

pub fn is_reserved_scope(scope: &str) -> bool {
    RESERVED_SCOPES.contains(scope)
}

/// A typed key/value annotation attached to a remote resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub scope: String,
    pub value: String,
}

impl Tag {
    pub fn new(scope: impl Into<String>, value: impl Into<String>) -> Self {
        Self { scope: scope.into(), value: value.into() }
    }
}

/// Identity triple shared by all record kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub namespace: String,
    pub name: String,
    pub uid: String,
}

/// The closed set of record kinds receiving kind-specific tags. New kinds
/// extend this enum plus the scope pair in [`RecordObject::kind_scopes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordObject {
    StaticRoute(RecordMeta),
    SecurityPolicy(RecordMeta),
    Subnet(RecordMeta),
    SubnetPort(RecordMeta),
    Vpc(RecordMeta),
    IpPool(RecordMeta),
    SubnetSet(RecordMeta),
    /// Record kind outside the supported set; tagged with cluster info only.
    Other { kind: String, meta: RecordMeta },
}

impl RecordObject {
    pub fn meta(&self) -> &RecordMeta {
        match self {
            RecordObject::StaticRoute(m)
            | RecordObject::SecurityPolicy(m)
            | RecordObject::Subnet(m)
            | RecordObject::SubnetPort(m)
            | RecordObject::Vpc(m)
            | RecordObject::IpPool(m)
            | RecordObject::SubnetSet(m) => m,
            RecordObject::Other { meta, .. } => meta,
        }
    }

    fn kind_scopes(&self) -> Option<(&'static str, &'static str)> {
        match self {
            RecordObject::StaticRoute(_) => {
                Some((TAG_SCOPE_STATIC_ROUTE_NAME, TAG_SCOPE_STATIC_ROUTE_UID))
            }
            RecordObject::SecurityPolicy(_) => {
                Some((TAG_SCOPE_SECURITY_POLICY_NAME, TAG_SCOPE_SECURITY_POLICY_UID))
            }
            RecordObject::Subnet(_) => Some((TAG_SCOPE_SUBNET_NAME, TAG_SCOPE_SUBNET_UID)),
            RecordObject::SubnetPort(_) => {
                Some((TAG_SCOPE_SUBNET_PORT_NAME, TAG_SCOPE_SUBNET_PORT_UID))
            }
            RecordObject::Vpc(_) => Some((TAG_SCOPE_VPC_NAME, TAG_SCOPE_VPC_UID)),
            RecordObject::IpPool(_) => Some((TAG_SCOPE_IP_POOL_NAME, TAG_SCOPE_IP_POOL_UID)),
            RecordObject::SubnetSet(_) => {
                Some((TAG_SCOPE_SUBNET_SET_NAME, TAG_SCOPE_SUBNET_SET_UID))
            }
            RecordObject::Other { .. } => None,
        }
    }
}

/// Canonical tag set for a record instance.
///
/// The cluster tag always comes first; supported kinds add namespace plus
/// kind name/uid tags; a non-empty `namespace_uid` is appended last.
pub fn build_basic_tags(cluster: &str, obj: &RecordObject, namespace_uid: &str) -> Vec<Tag> {
    let mut tags = vec![Tag::new(TAG_SCOPE_CLUSTER, cluster)];
    match obj.kind_scopes() {
        Some((name_scope, uid_scope)) => {
            let meta = obj.meta();
            tags.push(Tag::new(TAG_SCOPE_NAMESPACE, meta.namespace.as_str()));
            tags.push(Tag::new(name_scope, meta.name.as_str()));
            tags.push(Tag::new(uid_scope, meta.uid.as_str()));
        }
        None => {
            if let RecordObject::Other { kind, meta } = obj {
                warn!(kind = %kind, name = %meta.name, "unknown record kind, emitting no kind tags");
            }
        }
    }
    if !namespace_uid.is_empty() {
        tags.push(Tag::new(TAG_SCOPE_NAMESPACE_UID, namespace_uid));
    }
    tags
}

/// Append caller-supplied tags to a basic set, dropping any extra whose
/// scope is reserved. A `None` base means "no base tags" and is propagated
/// rather than fabricating tags. Order is deterministic: `basic` first, then
/// the surviving extras in original order.
pub fn append_tags(basic: Option<Vec<Tag>>, extra: &[Tag]) -> Option<Vec<Tag>> {
    let Some(mut tags) = basic else {
        debug!(extra = extra.len(), "append_tags called without basic tags");
        return None;
    };
    for tag in extra {
        if !is_reserved_scope(&tag.scope) {
            tags.push(tag.clone());
        }
    }
    Some(tags)
}
