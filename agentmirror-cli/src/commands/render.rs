//! Terminal rendering shared by `preview` and `sync`.

use colored::Colorize;

use agentmirror_sync::{
    ImportAction, ImportOutcome, ImportPlan, ImportReport, ImportStatus, ItemOutcome, ItemReport,
    SyncItem, SyncStatus, TargetPlan, TargetReport,
};

fn display_path(relative_path: &str, is_directory: bool) -> String {
    if is_directory {
        format!("{relative_path}/")
    } else {
        relative_path.to_string()
    }
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

pub fn print_import_plan(plan: &ImportPlan) {
    println!(
        "{} {} ({})",
        "Import from".bold(),
        plan.target.name,
        plan.target.root.display()
    );
    if plan.actions.is_empty() {
        println!("  nothing to import");
        return;
    }
    for action in &plan.actions {
        println!("  {}", import_line(action));
    }
}

fn import_line(action: &ImportAction) -> String {
    use ImportStatus::*;

    let path = display_path(&action.relative_path, action.is_directory);
    match action.status {
        Import => {
            let kind = if action.is_symlink { "symlink" } else { "regular" };
            format!(
                "{} {path} ({kind}, from {})",
                "↓ IMPORT  ".green(),
                action.resolved.display()
            )
        }
        Conflict => format!("{} {path} (source is as new or newer, kept)", "! CONFLICT".yellow()),
        Exists => format!("{} {path}", "= EXISTS  ".bright_black()),
        Deleted => format!("{} {path} (deleted from source)", "✗ SKIP    ".bright_black()),
    }
}

pub fn print_sources(items: &[SyncItem]) {
    println!("{} ({} items)", "Source".bold(), items.len());
    for item in items {
        println!("  {}", display_path(&item.relative_path, item.is_directory));
    }
}

pub fn print_target_plan(plan: &TargetPlan) {
    println!(
        "{} → {}",
        plan.target.name.0.bold(),
        plan.target.root.display()
    );
    for action in &plan.items {
        println!(
            "  {} {}",
            status_label(action.status),
            display_path(&action.relative_path, action.is_directory)
        );
    }
    for deletion in &plan.deletions {
        println!(
            "  {} {}",
            "[DELETE] ".red(),
            display_path(&deletion.relative_path, deletion.is_directory)
        );
    }
}

pub fn status_label(status: SyncStatus) -> colored::ColoredString {
    match status {
        SyncStatus::New => "[NEW]    ".green(),
        SyncStatus::Changed => "[CHANGED]".yellow(),
        SyncStatus::Synced => "[SYNCED] ".bright_black(),
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Applied imports plus the candidates that were held back, so a kept source
/// version or a deletion record is never silent.
pub fn print_import_report(report: &ImportReport) {
    let held_back: Vec<&ImportAction> = report
        .plan
        .actions
        .iter()
        .filter(|a| matches!(a.status, ImportStatus::Conflict | ImportStatus::Deleted))
        .collect();
    if report.applied.is_empty() && held_back.is_empty() {
        return;
    }
    println!("{} {}", "Importing from".bold(), report.plan.target.name);
    for item in &report.applied {
        let path = display_path(&item.relative_path, item.is_directory);
        match &item.outcome {
            ImportOutcome::Imported => println!("  {} {path}", "✓ Imported".green()),
            ImportOutcome::Updated => println!("  {} {path}", "✓ Updated (newer)".green()),
            ImportOutcome::Failed { error } => {
                println!("  {} {path}: {error}", "✗ Failed".red())
            }
        }
    }
    for action in held_back {
        println!("  {}", import_line(action));
    }
}

pub fn print_target_report(report: &TargetReport) {
    for item in report.all() {
        if let Some(line) = report_line(item) {
            println!("  {line}");
        }
    }
}

fn report_line(item: &ItemReport) -> Option<String> {
    let path = display_path(&item.relative_path, item.is_directory);
    let line = match &item.outcome {
        ItemOutcome::Unchanged => return None,
        ItemOutcome::Created => format!("{} {path}", "+ Created".green()),
        ItemOutcome::Updated => format!("{} {path}", "~ Updated".yellow()),
        ItemOutcome::Deleted => format!("{} {path}", "- Deleted".red()),
        ItemOutcome::Skipped => format!("{} {path}", "· Skipped".bright_black()),
        ItemOutcome::Failed { error } => format!("{} {path}: {error}", "✗ Failed".red()),
    };
    Some(line)
}
