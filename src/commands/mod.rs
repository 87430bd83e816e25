//! CLI commands for monotag
//!
//! - **modules**: list discovered modules and their sub-modules
//! - **calculate**: compute the release manifest
//! - **tag**: apply a manifest (commit and tag)
//! - **annotate**: record a change annotation
//!
//! All commands accept `&RepoContext` to avoid redundant repository loads.

pub mod annotate;
pub mod calculate;
pub mod modules;
pub mod tag;

pub use annotate::run_annotate;
pub use calculate::run_calculate;
pub use modules::run_modules;
pub use tag::run_tag;
