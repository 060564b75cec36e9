//! Karpenter-specific labels, API versions and CRD discovery

mod crds;
pub mod labels;
mod version;

pub use crds::detect_capabilities;
pub use version::{capacity_type, detect_node_version, pool_name, ApiVersion, ClusterCapabilities};
