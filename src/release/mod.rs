//! Release calculation engine
//!
//! ```text
//! discovery ─┐
//! tags ──────┼─> calculate ─> propagate ─> version ─> manifest
//! annotations┘
//! ```
//!
//! - **tags**: git tags parsed into per-module version lists
//! - **calculate**: which modules changed since their latest tag, or are new
//! - **propagate**: dependents of released modules are released too
//! - **version**: the next semantic version of each released module
//! - **manifest**: the release description and the tags to create
//! - **apply**: working-tree updates committed before tagging

pub mod apply;
pub mod calculate;
pub mod manifest;
pub mod module;
pub mod propagate;
pub mod tags;
pub mod version;

pub use calculate::{Calculator, DefaultChangePolicy};
pub use manifest::{Clock, Manifest, SystemClock, build_release_manifest, next_release_id};
pub use tags::ModuleTags;
