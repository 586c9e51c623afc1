pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use adapters::{DryRunStorage, LocalStorage};
pub use config::{PatcherConfig, PatcherVariant};
pub use crate::core::{discovery::load_project_tree, patcher::BuildPatcher};
pub use utils::error::{PatchError, Result};
