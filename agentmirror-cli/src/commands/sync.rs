//! `agentmirror sync`: import, then bring every target up to date.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use agentmirror_sync::{AutoConfirm, Confirm, Session, TargetPlan};

use super::{prompt::TerminalConfirm, render, GlobalOpts};

/// Arguments for `agentmirror sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Overwrite and delete without asking.
    #[arg(short, long)]
    pub yes: bool,
}

impl SyncArgs {
    pub fn run(self, global: &GlobalOpts) -> Result<()> {
        let config = global.load_config()?;
        let mut confirm: Box<dyn Confirm> = if self.yes {
            Box::new(AutoConfirm)
        } else {
            Box::new(TerminalConfirm::install())
        };

        let mut session = Session::open(&config).context("sync failed")?;
        for report in session.import().context("import failed")? {
            render::print_import_report(&report);
        }

        let plans = session.plan().context("planning failed")?;
        if plans.iter().any(TargetPlan::has_changes) {
            for plan in &plans {
                render::print_target_plan(plan);
            }
            println!();
            for plan in &plans {
                println!(
                    "{} {} ({})",
                    "Processing".bold(),
                    plan.target.name,
                    plan.target.root.display()
                );
                let report = session.apply(plan, confirm.as_mut());
                render::print_target_report(&report);
            }
        } else {
            println!("✓ All targets in sync.");
        }

        session.finish().context("failed to save manifest")?;
        println!("{}", "✓ Sync completed".green());
        Ok(())
    }
}
