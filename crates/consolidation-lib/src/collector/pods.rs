//! Pod grouping and pod-level blocker records

use super::blockers::detect_pod_blocker;
use super::format::format_age;
use crate::models::PodBlocker;
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Pod;
use std::collections::{HashMap, HashSet};

/// Group pods by the node they are scheduled to. Unscheduled pods are dropped.
pub fn group_by_node(pods: Vec<Pod>) -> HashMap<String, Vec<Pod>> {
    let mut by_node: HashMap<String, Vec<Pod>> = HashMap::new();

    for pod in pods {
        let node_name = pod
            .spec
            .as_ref()
            .and_then(|s| s.node_name.clone())
            .unwrap_or_default();

        if !node_name.is_empty() {
            by_node.entry(node_name).or_default().push(pod);
        }
    }

    by_node
}

/// `namespace/name` key for a pod, matching how Karpenter events name pods
pub fn pod_key(pod: &Pod) -> String {
    format!(
        "{}/{}",
        pod.metadata.namespace.as_deref().unwrap_or_default(),
        pod.metadata.name.as_deref().unwrap_or_default()
    )
}

/// Set of `namespace/name` keys for quick existence checks
pub fn build_pod_name_set(pods: &[Pod]) -> HashSet<String> {
    pods.iter().map(pod_key).collect()
}

/// Pods on `node_name` whose annotations block consolidation
pub fn find_blocking_pods(pods: &[Pod], node_name: &str, now: DateTime<Utc>) -> Vec<PodBlocker> {
    pods.iter()
        .filter_map(|pod| {
            let reason = detect_pod_blocker(pod)?;
            Some(PodBlocker {
                node_name: node_name.to_string(),
                namespace: pod.metadata.namespace.clone().unwrap_or_default(),
                pod_name: pod.metadata.name.clone().unwrap_or_default(),
                age: format_age(pod.metadata.creation_timestamp.as_ref(), now),
                reason,
            })
        })
        .collect()
}
