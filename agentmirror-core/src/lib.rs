//! agentmirror core library: domain types, configuration, errors.
//!
//! - [`types`]: newtypes and the [`Target`] description
//! - [`error`]: [`ConfigError`]
//! - [`config`]: load / default / override of the [`SyncConfig`]

pub mod config;
pub mod error;
pub mod types;

pub use config::SyncConfig;
pub use error::ConfigError;
pub use types::{Category, Target, TargetName};
