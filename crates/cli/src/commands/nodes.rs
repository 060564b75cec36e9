//! Node consolidation report

use anyhow::{Context, Result};
use chrono::Utc;
use consolidation_lib::{ClusterCapabilities, Collector};
use tracing::debug;

use crate::output::Printer;

/// Show every matching node with its utilization and consolidation blockers
pub async fn show_nodes(
    collector: &Collector,
    node_names: &[String],
    selector: Option<&str>,
    capabilities: &ClusterCapabilities,
    printer: &Printer,
) -> Result<()> {
    debug!(
        names = node_names.len(),
        selector = selector.unwrap_or_default(),
        pool_header = capabilities.pool_column_header(),
        "Collecting node report"
    );

    let nodes = collector
        .collect(node_names, selector)
        .await
        .context("Failed to collect node information")?;

    let stdout = std::io::stdout();
    printer.print_nodes(&mut stdout.lock(), &nodes, capabilities, Utc::now())
}
