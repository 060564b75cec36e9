//! Consolidation data collection
//!
//! This module reads nodes, pods and node events from a [`ResourceSource`],
//! computes request-based utilization per node, and classifies the reasons
//! Karpenter would refuse to consolidate each node.

mod blockers;
mod collect;
mod events;
mod format;
mod nodes;
mod pods;
mod quantity;
mod source;
mod utilization;


pub use blockers::{
    detect_blockers, detect_pod_blocker, format_blockers, normalize_event_message,
    HIGH_UTILIZATION_THRESHOLD,
};
pub use collect::{Collector, CollectorBuilder, CollectorConfig, DEFAULT_MAX_WORKERS};
pub use format::{format_age, format_utilization};
pub use nodes::{kubelet_version, node_roles, node_status, select_nodes};
pub use pods::{build_pod_name_set, find_blocking_pods, pod_key};
pub use quantity::parse_milli;
pub use source::KubeResourceSource;
pub use utilization::compute_utilization;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Event, Node, Pod};

/// Read-only access to the cluster objects a collection pass needs
#[async_trait]
pub trait ResourceSource: Send + Sync {
    /// List nodes, filtered server-side by a label selector when given
    async fn list_nodes(&self, selector: Option<&str>) -> Result<Vec<Node>, kube::Error>;

    /// List every pod in the cluster
    async fn list_all_pods(&self) -> Result<Vec<Pod>, kube::Error>;

    /// List every event whose involved object is a Node
    async fn list_node_events(&self) -> Result<Vec<Event>, kube::Error>;
}
