//! kubectl-consolidation
//!
//! A kubectl plugin that lists nodes alongside the reasons Karpenter will
//! not consolidate them, or the individual pods pinning a node in place.

mod client;
mod commands;
mod config;
mod output;

use anyhow::{bail, Context, Result};
use clap::Parser;
use consolidation_lib::{karpenter, ClusterCapabilities, Collector, KubeResourceSource};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LONG_ABOUT: &str = "\
Show why Karpenter is not consolidating nodes.

Lists nodes with their pool, capacity type, request-based CPU and memory
utilization and every consolidation blocker found on them. With --pods,
lists the pods on the named nodes that carry a do-not-evict, do-not-disrupt
or do-not-consolidate annotation.";

/// Karpenter consolidation blocker report
#[derive(Parser)]
#[command(name = "kubectl-consolidation")]
#[command(author, version, long_about = LONG_ABOUT)]
#[command(about = "Show Karpenter consolidation blockers for nodes")]
pub struct Cli {
    /// Node names to inspect (all nodes when omitted)
    #[arg(value_name = "NODE")]
    pub nodes: Vec<String>,

    /// Label selector used to filter nodes
    #[arg(long, short = 'l')]
    pub selector: Option<String>,

    /// Show the pods blocking consolidation on the named nodes
    #[arg(long)]
    pub pods: bool,

    /// Output format
    #[arg(long, short)]
    pub output: Option<output::OutputFormat>,

    /// Don't print table headers
    #[arg(long)]
    pub no_headers: bool,

    /// Path to kubeconfig file (uses KUBECONFIG or ~/.kube/config if not specified)
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long)]
    pub context: Option<String>,

    /// Seconds to wait for the report before giving up (default 60)
    #[arg(long, value_name = "SECS")]
    pub request_timeout: Option<u64>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.pods && cli.nodes.is_empty() {
        bail!("--pods flag requires at least one node name");
    }

    let file_config = config::Config::load()?;
    let settings = config::Settings::resolve(&cli, &file_config);
    debug!(?settings, "Resolved settings");

    let timeout = Duration::from_secs(settings.request_timeout_secs);
    tokio::time::timeout(timeout, run(&cli, &settings))
        .await
        .with_context(|| {
            format!(
                "Timed out after {}s waiting for the cluster",
                settings.request_timeout_secs
            )
        })?
}

async fn run(cli: &Cli, settings: &config::Settings) -> Result<()> {
    let client = client::create_client(cli.kubeconfig.as_deref(), cli.context.as_deref()).await?;

    let collector = Collector::builder()
        .source(Arc::new(KubeResourceSource::new(client.clone())))
        .max_workers(settings.max_workers)
        .build()?;

    let printer = output::Printer::new(settings.output, settings.no_headers);

    if cli.pods {
        return commands::pods::show_pod_blockers(&collector, &cli.nodes, &printer).await;
    }

    // Detection only picks the pool column header
    let capabilities = match karpenter::detect_capabilities(&client).await {
        Ok(capabilities) => capabilities,
        Err(e) => {
            debug!(error = %e, "Karpenter detection failed, assuming NodePool");
            ClusterCapabilities::default()
        }
    };

    commands::nodes::show_nodes(
        &collector,
        &cli.nodes,
        cli.selector.as_deref(),
        &capabilities,
        &printer,
    )
    .await
}

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
