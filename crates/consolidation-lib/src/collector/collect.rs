//! Collection pass
//!
//! Fetches nodes, then pods and node events concurrently, and fans the
//! per-node classification out over a bounded set of workers. Results keep
//! the oldest-first order of the node list regardless of completion order.

use super::blockers::detect_blockers;
use super::nodes::select_nodes;
use super::pods::{build_pod_name_set, find_blocking_pods};
use super::utilization::compute_utilization;
use super::{events, pods, ResourceSource};
use crate::error::{Error, Result};
use crate::karpenter;
use crate::models::{NodeInfo, PodBlocker};
use chrono::Utc;
use k8s_openapi::api::core::v1::{Event, Node, Pod};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Default number of nodes processed concurrently
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// Configuration for a collection pass
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Upper bound on concurrently processed nodes (default: 10)
    pub max_workers: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

/// Gathers consolidation data from the cluster
pub struct Collector {
    source: Arc<dyn ResourceSource>,
    config: CollectorConfig,
}

impl Collector {
    /// Create a new collector
    pub fn new(source: Arc<dyn ResourceSource>, config: CollectorConfig) -> Self {
        Self { source, config }
    }

    pub fn builder() -> CollectorBuilder {
        CollectorBuilder::new()
    }

    /// Collect consolidation data for nodes matching the criteria.
    ///
    /// `node_names` restricts the result to those nodes when non-empty;
    /// `selector` is passed to the API server as a label selector.
    /// Node and pod fetch failures abort the pass. Event fetch failures only
    /// lose event-derived blockers.
    pub async fn collect(
        &self,
        node_names: &[String],
        selector: Option<&str>,
    ) -> Result<Vec<NodeInfo>> {
        let start = Instant::now();

        let nodes = self
            .source
            .list_nodes(selector)
            .await
            .map_err(|e| Error::fetch("nodes", e))?;
        let nodes = select_nodes(nodes, node_names);

        if nodes.is_empty() {
            debug!("No nodes matched");
            return Ok(Vec::new());
        }

        let (pod_list, event_list) =
            tokio::join!(self.source.list_all_pods(), self.source.list_node_events());

        let pods_by_node = pods::group_by_node(pod_list.map_err(|e| Error::fetch("pods", e))?);
        let events_by_node = match event_list {
            Ok(list) => events::group_by_node(list),
            Err(e) => {
                warn!(error = %e, "Failed to list node events, continuing without event blockers");
                HashMap::new()
            }
        };

        let infos = self
            .collect_parallel(nodes, Arc::new(pods_by_node), Arc::new(events_by_node))
            .await?;

        debug!(
            nodes = infos.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Collection pass complete"
        );

        Ok(infos)
    }

    async fn collect_parallel(
        &self,
        nodes: Vec<Node>,
        pods_by_node: Arc<HashMap<String, Vec<Pod>>>,
        events_by_node: Arc<HashMap<String, Vec<Event>>>,
    ) -> Result<Vec<NodeInfo>> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_workers.max(1)));
        let mut slots: Vec<Option<NodeInfo>> = (0..nodes.len()).map(|_| None).collect();
        let mut workers = JoinSet::new();

        for (idx, node) in nodes.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let pods_by_node = pods_by_node.clone();
            let events_by_node = events_by_node.clone();

            workers.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (idx, collect_node_info(node, &pods_by_node, &events_by_node))
            });
        }

        while let Some(joined) = workers.join_next().await {
            let (idx, info) = joined?;
            slots[idx] = Some(info);
        }

        Ok(slots.into_iter().flatten().collect())
    }

    /// Collect the annotated pods blocking consolidation on the named nodes.
    ///
    /// Duplicate names are collapsed. Pods are fetched once for all nodes.
    pub async fn collect_pod_blockers(&self, node_names: &[String]) -> Result<Vec<PodBlocker>> {
        if node_names.is_empty() {
            return Err(Error::invalid_input(
                "pod blockers require at least one node name",
            ));
        }

        let wanted: BTreeSet<&str> = node_names.iter().map(String::as_str).collect();

        let pod_list = self
            .source
            .list_all_pods()
            .await
            .map_err(|e| Error::fetch("pods", e))?;
        let pods_by_node = pods::group_by_node(pod_list);

        let now = Utc::now();
        let blockers: Vec<PodBlocker> = wanted
            .iter()
            .filter_map(|name| {
                pods_by_node
                    .get(*name)
                    .map(|node_pods| find_blocking_pods(node_pods, name, now))
            })
            .flatten()
            .collect();

        debug!(
            nodes = wanted.len(),
            blockers = blockers.len(),
            "Collected pod blockers"
        );

        Ok(blockers)
    }
}

/// Classify one node against the pods and events recorded for it
fn collect_node_info(
    node: Node,
    pods_by_node: &HashMap<String, Vec<Pod>>,
    events_by_node: &HashMap<String, Vec<Event>>,
) -> NodeInfo {
    let name = node.metadata.name.clone().unwrap_or_default();
    let pods = pods_by_node.get(&name).map(Vec::as_slice).unwrap_or_default();
    let events = events_by_node
        .get(&name)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let (pool_name, pool_version) = karpenter::pool_name(&node);
    let capacity_type = karpenter::capacity_type(&node);

    let (cpu_utilization, memory_utilization) = compute_utilization(&node, pods);
    let existing = build_pod_name_set(pods);
    let blockers = detect_blockers(
        pods,
        events,
        cpu_utilization,
        memory_utilization,
        &existing,
    );

    NodeInfo {
        node,
        pool_name,
        pool_version,
        capacity_type,
        cpu_utilization,
        memory_utilization,
        blockers,
    }
}

/// Builder for creating a collector
pub struct CollectorBuilder {
    source: Option<Arc<dyn ResourceSource>>,
    config: CollectorConfig,
}

impl CollectorBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            source: None,
            config: CollectorConfig::default(),
        }
    }

    /// Set the resource source
    pub fn source(mut self, source: Arc<dyn ResourceSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the worker limit
    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.config.max_workers = max_workers;
        self
    }

    /// Build the collector
    pub fn build(self) -> Result<Collector> {
        let source = self.source.ok_or(Error::MissingSource)?;
        Ok(Collector::new(source, self.config))
    }
}

impl Default for CollectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
