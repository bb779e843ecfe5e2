//! `agentmirror diff`: unified diffs of what sync would write.

use anyhow::{bail, Context, Result};
use clap::Args;

use agentmirror_sync::diff_targets;

use super::GlobalOpts;

/// Arguments for `agentmirror diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Only diff the target with this name.
    #[arg(long)]
    pub target: Option<String>,
}

impl DiffArgs {
    pub fn run(self, global: &GlobalOpts) -> Result<()> {
        let config = global.load_config()?;
        if let Some(name) = &self.target {
            if !config.targets.iter().any(|t| t.name.0 == *name) {
                bail!("no target named '{name}'");
            }
        }

        let results = diff_targets(&config, self.target.as_deref()).context("diff failed")?;
        for result in results {
            if result.diffs.is_empty() {
                println!("No differences for '{}'.", result.target);
                continue;
            }
            for diff in result.diffs {
                print!("{}", diff.unified_diff);
                if !diff.unified_diff.ends_with('\n') {
                    println!();
                }
            }
        }
        Ok(())
    }
}
