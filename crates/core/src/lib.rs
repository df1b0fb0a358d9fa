//! vpcnet core types: tags, identifier normalization, subnet paths.

#![forbid(unsafe_code)]

mod cidr;
mod normalize;
mod path;
mod tags;

pub use cidr::{
    ip_prefix_len, strip_ip_prefix, subnet_mask_from_len, subnet_size_from_mask,
    total_addresses_from_cidrs,
};
pub use normalize::{
    generate_display_name, generate_id, generate_truncated_name, normalize_id,
    normalize_label_key, normalize_labels, normalize_name, normalize_name_by_limit, sha1_hex,
    HASH_LENGTH, MAX_ID_LENGTH, MAX_NAME_LENGTH, MAX_TAG_LENGTH,
};
pub use path::{
    associated_resource_from_subnet_path, extract_subnet_path,
    subnet_path_from_associated_resource,
};
pub use tags::{
    append_tags, build_basic_tags, is_reserved_scope, RecordMeta, RecordObject, Tag,
    RESERVED_TAG_SCOPES, TAG_SCOPE_CLUSTER, TAG_SCOPE_IP_POOL_NAME, TAG_SCOPE_IP_POOL_UID,
    TAG_SCOPE_NAMESPACE, TAG_SCOPE_NAMESPACE_UID, TAG_SCOPE_SECURITY_POLICY_NAME,
    TAG_SCOPE_SECURITY_POLICY_UID, TAG_SCOPE_STATIC_ROUTE_NAME, TAG_SCOPE_STATIC_ROUTE_UID,
    TAG_SCOPE_SUBNET_NAME, TAG_SCOPE_SUBNET_PORT_NAME, TAG_SCOPE_SUBNET_PORT_UID,
    TAG_SCOPE_SUBNET_SET_NAME, TAG_SCOPE_SUBNET_SET_UID, TAG_SCOPE_SUBNET_UID,
    TAG_SCOPE_VPC_NAME, TAG_SCOPE_VPC_UID,
};

/// Precondition errors: malformed input that is never retried at this layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("failed to parse associated resource annotation: {0}")]
    InvalidAssociatedResource(String),
    #[error("invalid subnet path format: {0}")]
    InvalidSubnetPath(String),
    #[error("invalid subnet mask length: {0}")]
    InvalidMaskLength(u8),
    #[error("invalid IP address: {0}")]
    InvalidIp(String),
    #[error("invalid CIDR: {0}")]
    InvalidCidr(String),
}

pub type Result<T> = std::result::Result<T, Error>;
