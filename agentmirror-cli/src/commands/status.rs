//! `agentmirror status`: per-target sync visibility.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use agentmirror_sync::{preview, Preview};

use super::GlobalOpts;

/// Arguments for `agentmirror status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, global: &GlobalOpts) -> Result<()> {
        let config = global.load_config()?;
        let preview = preview(&config).context("status check failed")?;
        let report = build_report(&preview);
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize status JSON")?
            );
            return Ok(());
        }
        print_table(report);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    source_items: usize,
    targets: Vec<TargetStatus>,
}

#[derive(Debug, Serialize)]
struct TargetStatus {
    name: String,
    path: String,
    import_source: bool,
    /// Pending imports; always zero for targets that are not import sources.
    import: usize,
    new: usize,
    changed: usize,
    synced: usize,
    delete: usize,
}

impl TargetStatus {
    fn in_sync(&self) -> bool {
        self.import + self.new + self.changed + self.delete == 0
    }
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "target")]
    name: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "import")]
    import: usize,
    #[tabled(rename = "new")]
    new: usize,
    #[tabled(rename = "changed")]
    changed: usize,
    #[tabled(rename = "synced")]
    synced: usize,
    #[tabled(rename = "delete")]
    delete: usize,
}

fn build_report(preview: &Preview) -> StatusReport {
    let targets = preview
        .plans
        .iter()
        .map(|plan| {
            let counts = plan.counts();
            let import = preview
                .imports
                .iter()
                .filter(|p| p.target.name == plan.target.name)
                .map(|p| p.importable().count())
                .sum();
            TargetStatus {
                name: plan.target.name.0.clone(),
                path: plan.target.root.display().to_string(),
                import_source: plan.target.import_source,
                import,
                new: counts.new,
                changed: counts.changed,
                synced: counts.synced,
                delete: counts.delete,
            }
        })
        .collect();
    StatusReport {
        source_items: preview.sources.len(),
        targets,
    }
}

fn print_table(report: StatusReport) {
    let pending = report.targets.iter().filter(|t| !t.in_sync()).count();
    println!(
        "agentmirror v{} | {} source items | {} targets | {} need sync",
        env!("CARGO_PKG_VERSION"),
        report.source_items,
        report.targets.len(),
        pending,
    );
    if report.targets.is_empty() {
        println!("No targets configured.");
        return;
    }

    let rows: Vec<StatusTableRow> = report
        .targets
        .iter()
        .map(|t| StatusTableRow {
            name: t.name.clone(),
            status: if t.in_sync() {
                "IN SYNC".green().to_string()
            } else {
                "PENDING".yellow().to_string()
            },
            import: t.import,
            new: t.new,
            changed: t.changed,
            synced: t.synced,
            delete: t.delete,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if pending > 0 {
        println!("Run 'agentmirror sync' to update pending targets.");
    }
}
