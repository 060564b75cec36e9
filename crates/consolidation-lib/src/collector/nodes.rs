//! Node selection and node-level display fields

use crate::karpenter::labels::NODE_ROLE_PREFIX;
use k8s_openapi::api::core::v1::Node;
use std::collections::HashSet;

/// Keep only the named nodes (when names are given) and order the result
/// oldest first. The sort is stable, so equal timestamps keep list order.
pub fn select_nodes(mut nodes: Vec<Node>, names: &[String]) -> Vec<Node> {
    if !names.is_empty() {
        let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
        nodes.retain(|n| {
            n.metadata
                .name
                .as_deref()
                .is_some_and(|name| wanted.contains(name))
        });
    }

    nodes.sort_by(|a, b| {
        let a = a.metadata.creation_timestamp.as_ref().map(|t| t.0);
        let b = b.metadata.creation_timestamp.as_ref().map(|t| t.0);
        a.cmp(&b)
    });

    nodes
}

/// Simplified readiness from the `Ready` condition
pub fn node_status(node: &Node) -> &'static str {
    let ready = node
        .status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .and_then(|conds| conds.iter().find(|c| c.type_ == "Ready"));

    match ready {
        Some(c) if c.status == "True" => "Ready",
        Some(_) => "NotReady",
        None => "Unknown",
    }
}

/// Sorted, comma-separated node roles or `<none>`
pub fn node_roles(node: &Node) -> String {
    let mut roles: Vec<&str> = node
        .metadata
        .labels
        .iter()
        .flatten()
        .filter_map(|(key, _)| key.strip_prefix(NODE_ROLE_PREFIX))
        .filter(|role| !role.is_empty())
        .collect();

    if roles.is_empty() {
        return "<none>".to_string();
    }

    roles.sort_unstable();
    roles.join(",")
}

/// Kubelet version reported by the node
pub fn kubelet_version(node: &Node) -> &str {
    node.status
        .as_ref()
        .and_then(|s| s.node_info.as_ref())
        .map(|info| info.kubelet_version.as_str())
        .unwrap_or_default()
}
