//! Node utilization from declared pod requests

use super::quantity::milli_value;
use k8s_openapi::api::core::v1::{Container, Node, Pod};

/// Phases whose pods no longer hold resources on the node
const TERMINAL_PHASES: [&str; 2] = ["Succeeded", "Failed"];

/// Returns true if the pod has finished running
pub fn is_terminal(pod: &Pod) -> bool {
    pod.status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .is_some_and(|phase| TERMINAL_PHASES.contains(&phase))
}

/// Sum of (cpu, memory) requests in milli-units
fn container_requests<'a>(containers: impl IntoIterator<Item = &'a Container>) -> (u128, u128) {
    containers
        .into_iter()
        .filter_map(|c| c.resources.as_ref()?.requests.as_ref())
        .fold((0, 0), |(cpu, mem), requests| {
            (
                cpu + milli_value(requests.get("cpu")),
                mem + milli_value(requests.get("memory")),
            )
        })
}

fn percentage(used: u128, total: u128) -> u64 {
    if total == 0 {
        return 0;
    }
    u64::try_from(used.saturating_mul(100) / total).unwrap_or(u64::MAX)
}

/// Compute CPU and memory utilization of a node from the requests of the
/// given pods, as integer percentages of allocatable.
///
/// Init containers are counted alongside regular containers, which over-counts
/// pods with large init requests. Results are not clamped at 100.
pub fn compute_utilization(node: &Node, pods: &[Pod]) -> (u64, u64) {
    let Some(allocatable) = node.status.as_ref().and_then(|s| s.allocatable.as_ref()) else {
        return (0, 0);
    };

    let allocatable_cpu = milli_value(allocatable.get("cpu"));
    let allocatable_mem = milli_value(allocatable.get("memory"));

    if allocatable_cpu == 0 || allocatable_mem == 0 {
        return (0, 0);
    }

    let (mut used_cpu, mut used_mem) = (0u128, 0u128);

    for pod in pods.iter().filter(|p| !is_terminal(p)) {
        let Some(spec) = pod.spec.as_ref() else {
            continue;
        };

        let init = spec.init_containers.iter().flatten();
        let (cpu, mem) = container_requests(spec.containers.iter().chain(init));
        used_cpu += cpu;
        used_mem += mem;
    }

    (
        percentage(used_cpu, allocatable_cpu),
        percentage(used_mem, allocatable_mem),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(cpu: &str, memory: &str) -> Node {
        serde_json::from_value(json!({
            "metadata": { "name": "test-node" },
            "status": { "allocatable": { "cpu": cpu, "memory": memory } }
        }))
        .unwrap()
    }

    fn pod(cpu: &str, memory: &str, phase: &str) -> Pod {
        serde_json::from_value(json!({
            "metadata": { "name": "test-pod", "namespace": "default" },
            "spec": {
                "containers": [{
                    "name": "app",
                    "resources": { "requests": { "cpu": cpu, "memory": memory } }
                }]
            },
            "status": { "phase": phase }
        }))
        .unwrap()
    }

    #[test]
    fn test_single_pod() {
        let pods = vec![pod("2", "4Gi", "Running")];
        assert_eq!(compute_utilization(&node("4", "8Gi"), &pods), (50, 50));
    }

    #[test]
    fn test_sums_across_pods() {
        let pods = vec![pod("1", "2Gi", "Running"), pod("2", "4Gi", "Running")];
        assert_eq!(compute_utilization(&node("4", "8Gi"), &pods), (75, 75));
    }

    #[test]
    fn test_millicores_truncate() {
        let pods = vec![pod("333m", "1Gi", "Running")];
        assert_eq!(compute_utilization(&node("1", "3Gi"), &pods), (33, 33));
    }

    #[test]
    fn test_terminal_pods_ignored() {
        let pods = vec![
            pod("2", "4Gi", "Running"),
            pod("2", "4Gi", "Succeeded"),
            pod("2", "4Gi", "Failed"),
        ];
        assert_eq!(compute_utilization(&node("4", "8Gi"), &pods), (50, 50));
    }

    #[test]
    fn test_zero_allocatable() {
        let pods = vec![pod("2", "4Gi", "Running")];
        assert_eq!(compute_utilization(&node("0", "8Gi"), &pods), (0, 0));
        assert_eq!(compute_utilization(&node("4", "0"), &pods), (0, 0));
    }

    #[test]
    fn test_missing_allocatable() {
        let bare: Node = serde_json::from_value(json!({
            "metadata": { "name": "test-node" }
        }))
        .unwrap();
        let pods = vec![pod("2", "4Gi", "Running")];
        assert_eq!(compute_utilization(&bare, &pods), (0, 0));
    }

    #[test]
    fn test_overcommit_not_clamped() {
        let pods = vec![pod("6", "12Gi", "Running")];
        assert_eq!(compute_utilization(&node("4", "8Gi"), &pods), (150, 150));
    }

    #[test]
    fn test_init_containers_counted() {
        let with_init: Pod = serde_json::from_value(json!({
            "metadata": { "name": "init-pod", "namespace": "default" },
            "spec": {
                "initContainers": [{
                    "name": "setup",
                    "resources": { "requests": { "cpu": "1", "memory": "2Gi" } }
                }],
                "containers": [{
                    "name": "app",
                    "resources": { "requests": { "cpu": "1", "memory": "2Gi" } }
                }, {
                    "name": "sidecar"
                }]
            },
            "status": { "phase": "Running" }
        }))
        .unwrap();

        assert_eq!(
            compute_utilization(&node("4", "8Gi"), &[with_init]),
            (50, 50)
        );
    }
}
