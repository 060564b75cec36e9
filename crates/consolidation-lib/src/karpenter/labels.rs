//! Well-known Karpenter label, annotation and CRD names

/// Karpenter API group
pub const GROUP: &str = "karpenter.sh";

// v1alpha5 labels
pub const LABEL_PROVISIONER_NAME: &str = "karpenter.sh/provisioner-name";

// v1beta1/v1 labels
pub const LABEL_NODE_POOL: &str = "karpenter.sh/nodepool";

// Common labels (all versions)
pub const LABEL_CAPACITY_TYPE: &str = "karpenter.sh/capacity-type";

// Pod annotations (all versions)
pub const ANNOTATION_DO_NOT_EVICT: &str = "karpenter.sh/do-not-evict";
pub const ANNOTATION_DO_NOT_DISRUPT: &str = "karpenter.sh/do-not-disrupt";
pub const ANNOTATION_DO_NOT_CONSOLIDATE: &str = "karpenter.sh/do-not-consolidate";

// Resource plurals as served by API discovery
pub const RESOURCE_NODE_CLAIMS: &str = "nodeclaims";
pub const RESOURCE_MACHINES: &str = "machines";
pub const RESOURCE_NODE_POOLS: &str = "nodepools";
pub const RESOURCE_PROVISIONERS: &str = "provisioners";

/// Prefix for node role labels (`node-role.kubernetes.io/<role>`)
pub const NODE_ROLE_PREFIX: &str = "node-role.kubernetes.io/";
