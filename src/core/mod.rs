pub mod clean;
pub mod discovery;
pub mod evaluation;
pub mod layout;
pub mod patcher;
pub mod text_patch;

pub use crate::domain::model::{PatchReport, ProjectTree, Subproject};
pub use crate::domain::ports::{ProjectStep, Storage};
pub use crate::utils::error::Result;
