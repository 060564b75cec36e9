//! Output formatting utilities

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::Colorize;
use consolidation_lib::collector::{
    format_age, format_blockers, format_utilization, kubelet_version, node_roles, node_status,
};
use consolidation_lib::{ClusterCapabilities, NodeInfo, PodBlocker};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tabled::builder::Builder;
use tabled::settings::{Padding, Style};

const NONE: &str = "<none>";

const POD_HEADERS: [&str; 5] = ["NODE", "NAMESPACE", "POD", "AGE", "REASON"];

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// One node as emitted in JSON/YAML
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRow {
    pub name: String,
    pub status: String,
    pub roles: String,
    pub age: String,
    pub version: String,
    pub pool_name: String,
    pub capacity_type: String,
    pub cpu_utilization: u64,
    pub memory_utilization: u64,
    pub blockers: Vec<String>,
}

impl NodeRow {
    pub fn from_info(info: &NodeInfo, now: DateTime<Utc>) -> Self {
        Self {
            name: info.name().to_string(),
            status: node_status(&info.node).to_string(),
            roles: node_roles(&info.node),
            age: format_age(info.node.metadata.creation_timestamp.as_ref(), now),
            version: kubelet_version(&info.node).to_string(),
            pool_name: info.pool_name.clone(),
            capacity_type: info.capacity_type.clone(),
            cpu_utilization: info.cpu_utilization,
            memory_utilization: info.memory_utilization,
            blockers: info.blockers.iter().map(|b| b.as_str().to_string()).collect(),
        }
    }

    fn table_record(&self, info: &NodeInfo) -> Vec<String> {
        vec![
            self.name.clone(),
            self.status.clone(),
            self.roles.clone(),
            self.age.clone(),
            self.version.clone(),
            or_none(&self.pool_name),
            or_none(&self.capacity_type),
            format_utilization(self.cpu_utilization),
            format_utilization(self.memory_utilization),
            format_blockers(&info.blockers),
        ]
    }
}

/// One blocking pod as emitted in JSON/YAML
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodRow {
    pub node_name: String,
    pub namespace: String,
    pub pod_name: String,
    pub age: String,
    pub reason: String,
}

impl From<&PodBlocker> for PodRow {
    fn from(blocker: &PodBlocker) -> Self {
        Self {
            node_name: blocker.node_name.clone(),
            namespace: blocker.namespace.clone(),
            pod_name: blocker.pod_name.clone(),
            age: blocker.age.clone(),
            reason: blocker.reason.to_string(),
        }
    }
}

impl PodRow {
    fn table_record(&self) -> Vec<String> {
        vec![
            self.node_name.clone(),
            self.namespace.clone(),
            self.pod_name.clone(),
            self.age.clone(),
            self.reason.clone(),
        ]
    }
}

/// Renders reports in the selected format
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    format: OutputFormat,
    no_headers: bool,
}

impl Printer {
    pub fn new(format: OutputFormat, no_headers: bool) -> Self {
        Self { format, no_headers }
    }

    /// Write the node report. The pool column header follows the Karpenter
    /// generation installed in the cluster.
    pub fn print_nodes<W: Write>(
        &self,
        out: &mut W,
        nodes: &[NodeInfo],
        capabilities: &ClusterCapabilities,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let rows: Vec<NodeRow> = nodes.iter().map(|n| NodeRow::from_info(n, now)).collect();

        match self.format {
            OutputFormat::Table => {
                let headers = [
                    "NAME",
                    "STATUS",
                    "ROLES",
                    "AGE",
                    "VERSION",
                    capabilities.pool_column_header(),
                    "CAPACITY-TYPE",
                    "CPU-UTIL",
                    "MEM-UTIL",
                    "CONSOLIDATION-BLOCKER",
                ];
                let records = rows
                    .iter()
                    .zip(nodes)
                    .map(|(row, info)| row.table_record(info));
                self.write_table(out, &headers, records)
            }
            OutputFormat::Json => write_json(out, &rows),
            OutputFormat::Yaml => write_yaml(out, &rows),
        }
    }

    /// Write the pod blocker report
    pub fn print_pod_blockers<W: Write>(&self, out: &mut W, blockers: &[PodBlocker]) -> Result<()> {
        let rows: Vec<PodRow> = blockers.iter().map(PodRow::from).collect();

        match self.format {
            OutputFormat::Table => {
                self.write_table(out, &POD_HEADERS, rows.iter().map(PodRow::table_record))
            }
            OutputFormat::Json => write_json(out, &rows),
            OutputFormat::Yaml => write_yaml(out, &rows),
        }
    }

    fn write_table<W, I>(&self, out: &mut W, headers: &[&str], records: I) -> Result<()>
    where
        W: Write,
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut builder = Builder::default();
        if !self.no_headers {
            builder.push_record(headers.iter().map(|h| h.to_string()));
        }

        let mut empty = true;
        for record in records {
            builder.push_record(record);
            empty = false;
        }

        if empty {
            print_warning("No resources found");
            return Ok(());
        }

        let mut table = builder.build();
        table.with(Style::blank()).with(Padding::new(0, 3, 0, 0));

        writeln!(out, "{}", table).context("Failed to write output")
    }
}

fn or_none(value: &str) -> String {
    if value.is_empty() {
        NONE.to_string()
    } else {
        value.to_string()
    }
}

fn write_json<W: Write, T: Serialize>(out: &mut W, rows: &[T]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, rows).context("Failed to serialize JSON")?;
    writeln!(out).context("Failed to write output")
}

fn write_yaml<W: Write, T: Serialize>(out: &mut W, rows: &[T]) -> Result<()> {
    serde_yaml::to_writer(out, rows).context("Failed to serialize YAML")
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}
