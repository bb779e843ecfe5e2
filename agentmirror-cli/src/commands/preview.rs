//! `agentmirror preview`: dry run of a full sync.

use anyhow::{Context, Result};
use clap::Args;

use agentmirror_sync::preview;

use super::{render, GlobalOpts};

/// Arguments for `agentmirror preview`.
#[derive(Args, Debug)]
pub struct PreviewArgs {}

impl PreviewArgs {
    pub fn run(self, global: &GlobalOpts) -> Result<()> {
        let config = global.load_config()?;
        let preview = preview(&config).context("preview failed")?;

        for plan in &preview.imports {
            render::print_import_plan(plan);
        }
        render::print_sources(&preview.sources);
        for plan in &preview.plans {
            render::print_target_plan(plan);
        }

        if preview.has_changes() {
            println!("Run `agentmirror sync` to apply.");
        } else {
            println!("✓ All targets in sync.");
        }
        Ok(())
    }
}
