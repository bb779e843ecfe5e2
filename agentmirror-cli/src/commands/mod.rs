pub mod diff;
pub mod forget;
pub mod preview;
pub mod prompt;
pub mod render;
pub mod status;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use agentmirror_core::{config, SyncConfig};

/// Options shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Config file to use instead of `~/.agentmirror/config.yaml`.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Source root to use instead of the configured one.
    #[arg(long, global = true, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Log every per-item decision to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalOpts {
    pub fn load_config(&self) -> Result<SyncConfig> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let mut cfg = match &self.config {
            Some(path) => config::load_from(path, &home)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => config::load_at(&home).context("failed to load config")?,
        };
        if let Some(source) = &self.source {
            cfg = cfg.with_source_root(source);
        }
        tracing::debug!(
            "source {} with {} targets",
            cfg.source_root.display(),
            cfg.targets.len()
        );
        Ok(cfg)
    }
}
