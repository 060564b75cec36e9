//! Karpenter consolidation inspection library
//!
//! This crate provides the core functionality for:
//! - Reading nodes, pods and node events from the Kubernetes API
//! - Request-based CPU/memory utilization per node
//! - Classifying why Karpenter will not consolidate a node
//! - Detecting which Karpenter API generation a cluster runs

pub mod collector;
pub mod error;
pub mod karpenter;
pub mod models;

pub use collector::{
    Collector, CollectorBuilder, CollectorConfig, KubeResourceSource, ResourceSource,
};
pub use error::{Error, Result};
pub use karpenter::{ApiVersion, ClusterCapabilities};
pub use models::*;
