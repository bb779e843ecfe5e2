//! Shared sync pipeline entrypoint used by every CLI command.
//!
//! ```text
//! open (base file check, manifest load)
//!   -> import (per import source: plan, apply, record in manifest)
//!   -> plan   (forward plan + deletions per target)
//!   -> apply  (per target)
//!   -> finish (manifest := manifest ∪ source, save)
//! ```
//!
//! [`Session`] exposes the stages so a caller can render each one before the
//! next starts; [`run`] and [`preview`] drive them end to end.

use agentmirror_core::{Category, SyncConfig};

use crate::apply::{apply_target, Confirm, TargetReport};
use crate::error::SyncError;
use crate::import::{apply_import, build_import_plan, ImportPlan, ImportReport};
use crate::manifest::{self, Manifest};
use crate::plan::{plan_target, TargetPlan};
use crate::source::{current_names, gather, SyncItem};

/// One run against one source root.
#[derive(Debug)]
pub struct Session<'a> {
    config: &'a SyncConfig,
    manifest: Manifest,
}

impl<'a> Session<'a> {
    /// Check the base file and load (or synthesize) the manifest.
    pub fn open(config: &'a SyncConfig) -> Result<Self, SyncError> {
        let base = config.base_file_path();
        if !base.is_file() {
            return Err(SyncError::BaseFileMissing { path: base });
        }
        let manifest = manifest::load_at(config)?;
        Ok(Self { config, manifest })
    }

    pub fn config(&self) -> &SyncConfig {
        self.config
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Import plans for every import source against the current state.
    /// Nothing is written.
    pub fn preview_imports(&self) -> Result<Vec<ImportPlan>, SyncError> {
        self.config
            .import_sources()
            .map(|target| build_import_plan(self.config, target, &self.manifest))
            .collect()
    }

    /// Import from each import source in order. Each plan is built after the
    /// previous source's imports landed.
    pub fn import(&mut self) -> Result<Vec<ImportReport>, SyncError> {
        let mut reports = Vec::new();
        for target in self.config.import_sources() {
            let plan = build_import_plan(self.config, target, &self.manifest)?;
            let applied = apply_import(&plan, &mut self.manifest);
            reports.push(ImportReport { plan, applied });
        }
        Ok(reports)
    }

    pub fn sources(&self) -> Result<Vec<SyncItem>, SyncError> {
        gather(self.config)
    }

    /// Forward plans for every target, in configuration order.
    pub fn plan(&self) -> Result<Vec<TargetPlan>, SyncError> {
        let items = self.sources()?;
        self.config
            .targets
            .iter()
            .map(|target| plan_target(self.config, target, &items, &self.manifest))
            .collect()
    }

    pub fn apply(&self, plan: &TargetPlan, confirm: &mut dyn Confirm) -> TargetReport {
        apply_target(plan, confirm)
    }

    /// Fold the current source names into the manifest and persist it.
    ///
    /// Names are only ever added here, so anything imported earlier in the run
    /// is kept even if applying to some target failed.
    pub fn finish(mut self) -> Result<Manifest, SyncError> {
        absorb_source(self.config, &mut self.manifest)?;
        manifest::save_at(&self.config.source_root, &self.manifest)?;
        Ok(self.manifest)
    }
}

fn absorb_source(config: &SyncConfig, manifest: &mut Manifest) -> Result<(), SyncError> {
    for category in &config.categories {
        let names = current_names(config, category)?;
        manifest.absorb(category, names);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// End-to-end drivers
// ---------------------------------------------------------------------------

/// Read-only view of what a run would do.
#[derive(Debug, Clone)]
pub struct Preview {
    pub sources: Vec<SyncItem>,
    pub imports: Vec<ImportPlan>,
    pub plans: Vec<TargetPlan>,
}

impl Preview {
    pub fn has_changes(&self) -> bool {
        self.imports.iter().any(ImportPlan::has_imports)
            || self.plans.iter().any(TargetPlan::has_changes)
    }
}

/// Build every plan without mutating anything. Forward plans reflect the
/// source as it is now, before any import.
pub fn preview(config: &SyncConfig) -> Result<Preview, SyncError> {
    let session = Session::open(config)?;
    Ok(Preview {
        sources: session.sources()?,
        imports: session.preview_imports()?,
        plans: session.plan()?,
    })
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub imports: Vec<ImportReport>,
    pub plans: Vec<TargetPlan>,
    pub targets: Vec<TargetReport>,
    pub manifest: Manifest,
}

/// Import, plan, apply and persist in one go.
pub fn run(config: &SyncConfig, confirm: &mut dyn Confirm) -> Result<RunReport, SyncError> {
    let mut session = Session::open(config)?;
    let imports = session.import()?;
    let plans = session.plan()?;

    let mut targets = Vec::new();
    if plans.iter().any(TargetPlan::has_changes) {
        for plan in &plans {
            targets.push(session.apply(plan, confirm));
        }
    } else {
        tracing::info!("all targets already in sync");
    }

    let manifest = session.finish()?;
    Ok(RunReport {
        imports,
        plans,
        targets,
        manifest,
    })
}

/// Remove a tombstone from the persisted manifest so the item can be imported
/// again. Returns whether the name was known.
pub fn forget(config: &SyncConfig, category: &Category, name: &str) -> Result<bool, SyncError> {
    let mut manifest = manifest::load_at(config)?;
    let known = manifest.forget(category, name);
    if known {
        manifest::save_at(&config.source_root, &manifest)?;
        tracing::info!("forgot {category}/{name}");
    }
    Ok(known)
}
