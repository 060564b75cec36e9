//! Pod-level consolidation report

use anyhow::{Context, Result};
use consolidation_lib::Collector;

use crate::output::Printer;

/// Show the annotated pods pinning the named nodes
pub async fn show_pod_blockers(
    collector: &Collector,
    node_names: &[String],
    printer: &Printer,
) -> Result<()> {
    let blockers = collector
        .collect_pod_blockers(node_names)
        .await
        .context("Failed to collect pod blockers")?;

    let stdout = std::io::stdout();
    printer.print_pod_blockers(&mut stdout.lock(), &blockers)
}
