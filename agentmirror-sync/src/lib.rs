//! # agentmirror-sync
//!
//! Manifest-tracked, conflict-aware merge sync of one source tree into many
//! targets.
//!
//! A run has three phases: import new content from import-source targets,
//! plan every target against the source, then apply. Use [`pipeline::run`]
//! for a full run, [`pipeline::preview`] for a dry run, or drive a
//! [`pipeline::Session`] stage by stage.

pub mod apply;
pub mod compare;
pub mod diff;
pub mod error;
pub mod fsops;
pub mod import;
pub mod manifest;
pub mod naming;
pub mod pipeline;
pub mod plan;
pub mod source;

pub use apply::{AutoConfirm, Confirm, ItemOutcome, ItemReport, TargetReport};
pub use diff::{diff_targets, FileDiff, TargetDiff};
pub use error::SyncError;
pub use import::{ImportAction, ImportOutcome, ImportPlan, ImportReport, ImportStatus};
pub use manifest::Manifest;
pub use pipeline::{preview, run, Preview, RunReport, Session};
pub use plan::{DeleteAction, PlanCounts, SyncAction, SyncStatus, TargetPlan};
pub use source::SyncItem;
