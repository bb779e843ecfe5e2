//! agentmirror: keep agent instruction trees in step across tools.
//!
//! # Usage
//!
//! ```text
//! agentmirror preview
//! agentmirror sync [--yes]
//! agentmirror diff [--target <name>]
//! agentmirror status [--json]
//! agentmirror forget <category>/<name>
//!
//! global: [--config <file>] [--source <dir>] [--verbose]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    diff::DiffArgs, forget::ForgetArgs, preview::PreviewArgs, status::StatusArgs, sync::SyncArgs,
    GlobalOpts,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "agentmirror",
    version,
    about = "Mirror one agent instruction tree into every tool that reads one",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show what a sync would import, copy and delete. Writes nothing.
    Preview(PreviewArgs),

    /// Import from import sources, then bring every target up to date.
    Sync(SyncArgs),

    /// Show unified diffs of what sync would change at each target.
    Diff(DiffArgs),

    /// Per-target counts of new, changed, synced and deleted items.
    Status(StatusArgs),

    /// Drop a deletion record so the item may be imported again.
    Forget(ForgetArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    match cli.command {
        Commands::Preview(args) => args.run(&cli.global),
        Commands::Sync(args) => args.run(&cli.global),
        Commands::Diff(args) => args.run(&cli.global),
        Commands::Status(args) => args.run(&cli.global),
        Commands::Forget(args) => args.run(&cli.global),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
