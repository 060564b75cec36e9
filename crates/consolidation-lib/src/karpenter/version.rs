//! Karpenter API version detection
//!
//! Karpenter renamed its CRDs between v1alpha5 (Provisioner/Machine) and
//! v1beta1 (NodePool/NodeClaim). Clusters mid-migration can run both, so
//! versions are resolved per node from labels and per cluster from discovery.

use super::labels::{
    LABEL_CAPACITY_TYPE, LABEL_NODE_POOL, LABEL_PROVISIONER_NAME, RESOURCE_MACHINES,
    RESOURCE_NODE_CLAIMS, RESOURCE_NODE_POOLS, RESOURCE_PROVISIONERS,
};
use k8s_openapi::api::core::v1::Node;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Karpenter API version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    V1Alpha5,
    V1Beta1,
    V1,
    #[default]
    Unknown,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1Alpha5 => "v1alpha5",
            ApiVersion::V1Beta1 => "v1beta1",
            ApiVersion::V1 => "v1",
            ApiVersion::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which Karpenter CRDs are served by the cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterCapabilities {
    /// v1beta1/v1
    pub has_node_claims: bool,
    /// v1alpha5
    pub has_machines: bool,
    /// v1beta1/v1
    pub has_node_pools: bool,
    /// v1alpha5
    pub has_provisioners: bool,
}

impl ClusterCapabilities {
    /// Build capabilities from `(groupVersion, resource plural)` pairs as
    /// returned by API discovery. Pairs outside the Karpenter group are ignored.
    pub fn from_resources<'a, I>(resources: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut caps = Self::default();

        for (group_version, resource) in resources {
            let legacy = group_version == "karpenter.sh/v1alpha5";
            let current =
                group_version == "karpenter.sh/v1beta1" || group_version == "karpenter.sh/v1";

            match resource {
                RESOURCE_PROVISIONERS if legacy => caps.has_provisioners = true,
                RESOURCE_MACHINES if legacy => caps.has_machines = true,
                RESOURCE_NODE_POOLS if current => caps.has_node_pools = true,
                RESOURCE_NODE_CLAIMS if current => caps.has_node_claims = true,
                _ => {}
            }
        }

        caps
    }

    fn has_current(&self) -> bool {
        self.has_node_pools || self.has_node_claims
    }

    fn has_legacy(&self) -> bool {
        self.has_provisioners || self.has_machines
    }

    /// Most likely Karpenter version, preferring the newer API
    pub fn primary_version(&self) -> ApiVersion {
        if self.has_current() {
            ApiVersion::V1Beta1
        } else if self.has_legacy() {
            ApiVersion::V1Alpha5
        } else {
            ApiVersion::Unknown
        }
    }

    /// Returns true if any Karpenter CRD was found
    pub fn has_karpenter(&self) -> bool {
        self.has_current() || self.has_legacy()
    }

    /// Header for the pool column. Defaults to NODEPOOL for clusters
    /// without Karpenter or with both generations installed.
    pub fn pool_column_header(&self) -> &'static str {
        if !self.has_current() && self.has_legacy() {
            "PROVISIONER"
        } else {
            "NODEPOOL"
        }
    }
}

fn node_label<'a>(node: &'a Node, key: &str) -> Option<&'a str> {
    node.metadata
        .labels
        .as_ref()
        .and_then(|labels| labels.get(key))
        .map(String::as_str)
}

/// Determine which API version provisioned a node from its labels
pub fn detect_node_version(node: &Node) -> ApiVersion {
    pool_name(node).1
}

/// Pool (NodePool or Provisioner) name and the API version it came from.
/// The v1beta1 label wins when both are present.
pub fn pool_name(node: &Node) -> (String, ApiVersion) {
    if let Some(name) = node_label(node, LABEL_NODE_POOL) {
        return (name.to_string(), ApiVersion::V1Beta1);
    }

    if let Some(name) = node_label(node, LABEL_PROVISIONER_NAME) {
        return (name.to_string(), ApiVersion::V1Alpha5);
    }

    (String::new(), ApiVersion::Unknown)
}

/// Capacity type label value (`spot`, `on-demand`), empty if unset
pub fn capacity_type(node: &Node) -> String {
    node_label(node, LABEL_CAPACITY_TYPE)
        .unwrap_or_default()
        .to_string()
}
