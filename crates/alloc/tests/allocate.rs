#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use vpcnet_alloc::{
    allocate_subnet, default_subnet_set_for_namespace, AllocError, SubnetCandidate, SubnetPort,
    SubnetPortServiceProvider, SubnetServiceProvider, SubnetSet, SubnetSetLister,
    VpcResourceInfo, VpcServiceProvider,
};
use vpcnet_core::{Tag, TAG_SCOPE_NAMESPACE};

fn subnet_set(ns: &str, name: &str) -> SubnetSet {
    SubnetSet {
        namespace: ns.to_string(),
        name: name.to_string(),
        uid: "uid-1".to_string(),
        ..SubnetSet::default()
    }
}

struct StaticVpcs {
    vpcs: Vec<VpcResourceInfo>,
}

#[async_trait]
impl VpcServiceProvider for StaticVpcs {
    async fn list_vpc_info(&self, _namespace: &str) -> anyhow::Result<Vec<VpcResourceInfo>> {
        Ok(self.vpcs.clone())
    }
}

struct StaticSubnets {
    existing: anyhow::Result<Vec<SubnetCandidate>>,
    create_result: anyhow::Result<SubnetCandidate>,
    create_called: AtomicBool,
}

impl StaticSubnets {
    fn new(existing: Vec<SubnetCandidate>, create_result: anyhow::Result<SubnetCandidate>) -> Self {
        Self { existing: Ok(existing), create_result, create_called: AtomicBool::new(false) }
    }
}

#[async_trait]
impl SubnetServiceProvider for StaticSubnets {
    async fn get_subnets_by_index(
        &self,
        _namespace: &str,
        _subnet_set_name: &str,
    ) -> anyhow::Result<Vec<SubnetCandidate>> {
        match &self.existing {
            Ok(v) => Ok(v.clone()),
            Err(e) => Err(anyhow!("{e}")),
        }
    }

    async fn create_or_update_subnet(
        &self,
        _subnet_set: &SubnetSet,
        _vpc_info: &VpcResourceInfo,
        _tags: &[Tag],
    ) -> anyhow::Result<SubnetCandidate> {
        self.create_called.store(true, Ordering::SeqCst);
        match &self.create_result {
            Ok(v) => Ok(v.clone()),
            Err(e) => Err(anyhow!("{e}")),
        }
    }

    fn generate_subnet_ns_tags(&self, subnet_set: &SubnetSet) -> Vec<Tag> {
        vec![Tag::new(TAG_SCOPE_NAMESPACE, subnet_set.namespace.as_str())]
    }
}

struct StaticPorts {
    ports_per_subnet: usize,
}

#[async_trait]
impl SubnetPortServiceProvider for StaticPorts {
    async fn get_ports_of_subnet(&self, _subnet_path: &str) -> anyhow::Result<Vec<SubnetPort>> {
        Ok((0..self.ports_per_subnet)
            .map(|i| SubnetPort { id: format!("port-{i}") })
            .collect())
    }
}

fn candidate(path: &str, cidrs: &[&str]) -> SubnetCandidate {
    SubnetCandidate {
        id: format!("id-{path}"),
        path: path.to_string(),
        ipv4_subnet_size: Some(32),
        ip_addresses: cidrs.iter().map(|c| (*c).to_string()).collect(),
    }
}

#[tokio::test]
async fn existing_subnet_with_capacity_is_reused() {
    let vpc = StaticVpcs { vpcs: vec![] };
    let subnets = StaticSubnets::new(
        vec![candidate("subnet-path-1", &["10.0.0.1/28"])],
        Err(anyhow!("create must not be called")),
    );
    let ports = StaticPorts { ports_per_subnet: 0 };

    let path = allocate_subnet(&subnet_set("ns-1", "subnetset-1"), &vpc, &subnets, &ports)
        .await
        .unwrap();
    assert_eq!(path, "subnet-path-1");
    assert!(!subnets.create_called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn full_subnets_are_skipped_in_favor_of_create() {
    // A /32 holds one address; one attached port exhausts it.
    let vpc = StaticVpcs { vpcs: vec![VpcResourceInfo::default()] };
    let subnets = StaticSubnets::new(
        vec![candidate("subnet-path-full", &["10.0.0.1/32"])],
        Ok(candidate("subnet-path-new", &[])),
    );
    let ports = StaticPorts { ports_per_subnet: 1 };

    let path = allocate_subnet(&subnet_set("ns-1", "subnetset-1"), &vpc, &subnets, &ports)
        .await
        .unwrap();
    assert_eq!(path, "subnet-path-new");
    assert!(subnets.create_called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn empty_vpc_list_is_a_precondition_failure() {
    let vpc = StaticVpcs { vpcs: vec![] };
    let subnets = StaticSubnets::new(vec![], Err(anyhow!("create must not be called")));
    let ports = StaticPorts { ports_per_subnet: 0 };

    let err = allocate_subnet(&subnet_set("ns-1", "subnetset-1"), &vpc, &subnets, &ports)
        .await
        .unwrap_err();
    assert!(matches!(err, AllocError::NoVpcFound { .. }));
    assert!(err.to_string().contains("no VPC found"));
    assert!(!subnets.create_called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn create_path_is_returned_when_no_candidate_exists() {
    let vpc = StaticVpcs { vpcs: vec![VpcResourceInfo::default()] };
    let subnets = StaticSubnets::new(vec![], Ok(candidate("subnet-path-created", &[])));
    let ports = StaticPorts { ports_per_subnet: 0 };

    let path = allocate_subnet(&subnet_set("ns-1", "subnetset-1"), &vpc, &subnets, &ports)
        .await
        .unwrap();
    assert_eq!(path, "subnet-path-created");
}

#[tokio::test]
async fn provider_errors_surface_verbatim() {
    let vpc = StaticVpcs { vpcs: vec![VpcResourceInfo::default()] };
    let subnets = StaticSubnets {
        existing: Err(anyhow!("index lookup exploded")),
        create_result: Err(anyhow!("unused")),
        create_called: AtomicBool::new(false),
    };
    let ports = StaticPorts { ports_per_subnet: 0 };

    let err = allocate_subnet(&subnet_set("ns-1", "subnetset-1"), &vpc, &subnets, &ports)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("index lookup exploded"));

    // Creation failures propagate the same way.
    let subnets = StaticSubnets::new(vec![], Err(anyhow!("quota exceeded")));
    let err = allocate_subnet(&subnet_set("ns-1", "subnetset-1"), &vpc, &subnets, &ports)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("quota exceeded"));
}

struct StaticLister {
    sets: anyhow::Result<Vec<SubnetSet>>,
}

#[async_trait]
impl SubnetSetLister for StaticLister {
    async fn list_subnet_sets(&self, _namespace: &str) -> anyhow::Result<Vec<SubnetSet>> {
        match &self.sets {
            Ok(v) => Ok(v.clone()),
            Err(e) => Err(anyhow!("{e}")),
        }
    }
}

fn default_set(name: &str, resource_type: &str) -> SubnetSet {
    SubnetSet {
        default_for: Some(resource_type.to_string()),
        ..subnet_set("ns-1", name)
    }
}

#[tokio::test]
async fn default_subnet_set_resolution() {
    // Exactly one default: resolved.
    let lister = StaticLister {
        sets: Ok(vec![default_set("pods-default", "pod"), default_set("vm-default", "vm")]),
    };
    let set = default_subnet_set_for_namespace(&lister, "ns-1", "pod").await.unwrap();
    assert_eq!(set.name, "pods-default");

    // Zero defaults: named error.
    let err = default_subnet_set_for_namespace(&lister, "ns-1", "gateway")
        .await
        .unwrap_err();
    assert!(matches!(err, AllocError::DefaultSubnetSetNotFound { .. }));
    assert!(err.to_string().contains("default SubnetSet not found"));

    // Several defaults: the other named error.
    let lister = StaticLister {
        sets: Ok(vec![default_set("a", "pod"), default_set("b", "pod")]),
    };
    let err = default_subnet_set_for_namespace(&lister, "ns-1", "pod")
        .await
        .unwrap_err();
    assert!(matches!(err, AllocError::MultipleDefaultSubnetSets { .. }));
    assert!(err.to_string().contains("multiple default SubnetSets found"));

    // List failures propagate.
    let lister = StaticLister { sets: Err(anyhow!("failed to list SubnetSet")) };
    let err = default_subnet_set_for_namespace(&lister, "ns-1", "pod")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("failed to list SubnetSet"));
}
