//! Repository context - build once, pass everywhere
//!
//! ```text
//! main.rs:
//!   RepoContext::build(dir) -> &RepoContext
//!   |
//!   v
//! commands/calculate.rs, tag.rs, ...:
//!   fn run(ctx: &RepoContext, ...)
//! ```

use crate::core::config::RepoConfig;
use crate::core::error::RailResult;
use crate::core::vcs::SystemGit;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Repository-level state shared by every command
pub struct RepoContext {
  /// Repository root (git work tree, absolute)
  pub root: PathBuf,

  /// modman.toml, or defaults when absent
  pub config: RepoConfig,

  pub git: SystemGit,
}

impl RepoContext {
  /// Open the repository containing `dir` and load its configuration
  pub fn build(dir: &Path) -> RailResult<Self> {
    let git = SystemGit::open(dir)?;
    let root = git.work_tree().to_path_buf();
    let config = RepoConfig::load(&root)?;
    debug!(root = %root.display(), configured_modules = config.modules.len(), "loaded repository context");

    Ok(Self { root, config, git })
  }
}
