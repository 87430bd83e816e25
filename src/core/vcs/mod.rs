//! Version control access
//!
//! The release engine only needs a narrow slice of git: list tags, diff two
//! refs, list a tree, and (in the later tagging phase) commit and tag. That
//! slice is the `VersionControl` trait so the engine can be driven by an
//! in-memory repository in tests.

pub mod system_git;
mod system_git_ops;

pub use system_git::SystemGit;

use crate::core::error::RailResult;

/// Source control operations consumed by release calculation and tagging
pub trait VersionControl: Sync {
  /// All tag names in the repository
  fn list_tags(&self) -> RailResult<Vec<String>>;

  /// Files changed between two refs, relative to the repository root,
  /// limited to `scope` (`"."` for the whole repository)
  fn changed_files(&self, from: &str, to: &str, scope: &str) -> RailResult<Vec<String>>;

  /// Files present under `path` at `rev`, relative to the repository root
  fn list_tree(&self, rev: &str, path: &str) -> RailResult<Vec<String>>;

  /// Whether `path` is tracked and identical to its committed content
  fn is_committed(&self, path: &str) -> RailResult<bool>;

  /// Stage `paths` (modifications and deletions) and commit, returning the SHA
  fn commit(&self, message: &str, paths: &[String]) -> RailResult<String>;

  /// Create an annotated tag at HEAD
  fn create_annotated_tag(&self, tag: &str, message: &str) -> RailResult<()>;
}
