//! Core data models for consolidation reports

use crate::karpenter::ApiVersion;
use k8s_openapi::api::core::v1::Node;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Reason a node cannot currently be consolidated
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockerType {
    HighUtilization,
    DoNotEvict,
    DoNotDisrupt,
    DoNotConsolidate,
    PdbViolation,
    NonReplicated,
    WouldIncreaseCost,
    InUseSecurityGroup,
    OnDemandProtection,
    LocalStorage,
}

impl BlockerType {
    pub const ALL: [BlockerType; 10] = [
        BlockerType::HighUtilization,
        BlockerType::DoNotEvict,
        BlockerType::DoNotDisrupt,
        BlockerType::DoNotConsolidate,
        BlockerType::PdbViolation,
        BlockerType::NonReplicated,
        BlockerType::WouldIncreaseCost,
        BlockerType::InUseSecurityGroup,
        BlockerType::OnDemandProtection,
        BlockerType::LocalStorage,
    ];

    /// Stable identifier used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockerType::HighUtilization => "high-utilization",
            BlockerType::DoNotEvict => "do-not-evict",
            BlockerType::DoNotDisrupt => "do-not-disrupt",
            BlockerType::DoNotConsolidate => "do-not-consolidate",
            BlockerType::PdbViolation => "pdb-violation",
            BlockerType::NonReplicated => "non-replicated",
            BlockerType::WouldIncreaseCost => "would-increase-cost",
            BlockerType::InUseSecurityGroup => "in-use-security-group",
            BlockerType::OnDemandProtection => "on-demand-protection",
            BlockerType::LocalStorage => "local-storage",
        }
    }
}

impl fmt::Display for BlockerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consolidation-relevant facts about one node
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub node: Node,
    pub pool_name: String,
    pub pool_version: ApiVersion,
    pub capacity_type: String,
    pub cpu_utilization: u64,
    pub memory_utilization: u64,
    pub blockers: BTreeSet<BlockerType>,
}

impl NodeInfo {
    pub fn name(&self) -> &str {
        self.node.metadata.name.as_deref().unwrap_or_default()
    }
}

/// A pod whose annotations block consolidation of its node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodBlocker {
    pub node_name: String,
    pub namespace: String,
    pub pod_name: String,
    pub age: String,
    pub reason: BlockerType,
}
