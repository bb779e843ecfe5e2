//! `agentmirror forget <category>/<name>`: drop a deletion record.

use anyhow::{bail, Context, Result};
use clap::Args;

use agentmirror_core::Category;
use agentmirror_sync::pipeline;

use super::GlobalOpts;

/// Arguments for `agentmirror forget`.
#[derive(Args, Debug)]
pub struct ForgetArgs {
    /// Item to forget, as `<category>/<name>` (e.g. `skills/old-skill`).
    pub item: String,
}

impl ForgetArgs {
    pub fn run(self, global: &GlobalOpts) -> Result<()> {
        let config = global.load_config()?;
        let Some((category, name)) = self.item.split_once('/') else {
            bail!("expected <category>/<name>, got '{}'", self.item);
        };
        if name.is_empty() || name.contains('/') {
            bail!("'{name}' is not a top-level item name");
        }
        let category = Category::from(category);
        if !config.categories.contains(&category) {
            bail!("'{category}' is not a configured category");
        }

        let known = pipeline::forget(&config, &category, name)
            .with_context(|| format!("failed to update manifest for '{}'", self.item))?;
        if known {
            println!("✓ Forgot {}; it can be imported again.", self.item);
        } else {
            println!("'{}' is not in the manifest; nothing to do.", self.item);
        }
        Ok(())
    }
}
