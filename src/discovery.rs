//! Module discovery
//!
//! Walks a repository and records every directory that holds a module
//! manifest, together with the module roots nested directly beneath it.
//! Descent into a nested module continues from that module, so each
//! directory is attributed to its nearest enclosing module only.

use crate::core::error::{RailResult, ResultExt};
use crate::modfile;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source of the repository's module layout
pub trait ModuleFinder: Sync {
  /// Repository root directory
  fn root(&self) -> &Path;

  /// Module directories relative to the root ("." for the root module),
  /// each mapped to its sorted direct sub-module directories
  fn modules_rel(&self) -> RailResult<BTreeMap<String, Vec<String>>>;
}

/// Filesystem module discoverer
pub struct Discoverer {
  root: PathBuf,
  fixture_dir: String,
  modules: BTreeMap<PathBuf, Vec<PathBuf>>,
}

impl Discoverer {
  /// Create a discoverer rooted at `root` that skips `fixture_dir` directories
  pub fn new(root: impl Into<PathBuf>, fixture_dir: impl Into<String>) -> Self {
    Self {
      root: root.into(),
      fixture_dir: fixture_dir.into(),
      modules: BTreeMap::new(),
    }
  }

  /// Walk the tree and record module roots
  ///
  /// Any I/O error aborts discovery; previously found modules are discarded.
  pub fn discover(&mut self) -> RailResult<()> {
    let mut modules = BTreeMap::new();
    let root = self.root.clone();
    let root_is_module = modfile::is_module_dir(&root)?;
    if root_is_module {
      modules.insert(root.clone(), Vec::new());
    }

    self.walk(&root, root_is_module.then_some(root.as_path()), &mut modules)?;

    for children in modules.values_mut() {
      children.sort();
    }

    debug!(count = modules.len(), root = %self.root.display(), "discovered modules");
    self.modules = modules;
    Ok(())
  }

  fn walk(&self, dir: &Path, parent: Option<&Path>, modules: &mut BTreeMap<PathBuf, Vec<PathBuf>>) -> RailResult<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;

    for entry in entries {
      let entry = entry?;
      if !entry.file_type()?.is_dir() {
        continue;
      }

      let name = entry.file_name();
      if name == self.fixture_dir.as_str() || name == ".git" {
        continue;
      }

      let path = entry.path();
      if modfile::is_module_dir(&path)? {
        if let Some(parent) = parent {
          modules.entry(parent.to_path_buf()).or_default().push(path.clone());
        }
        modules.entry(path.clone()).or_default();
        self.walk(&path, Some(&path), modules)?;
      } else {
        self.walk(&path, parent, modules)?;
      }
    }

    Ok(())
  }
}

impl ModuleFinder for Discoverer {
  fn root(&self) -> &Path {
    &self.root
  }

  fn modules_rel(&self) -> RailResult<BTreeMap<String, Vec<String>>> {
    let mut rel = BTreeMap::new();
    for (module, children) in &self.modules {
      let children = children
        .iter()
        .map(|c| relative_path(&self.root, c))
        .collect::<RailResult<Vec<_>>>()?;
      rel.insert(relative_path(&self.root, module)?, children);
    }
    Ok(rel)
  }
}

/// Path of `path` relative to `root` with forward slashes; the root itself is "."
pub fn relative_path(root: &Path, path: &Path) -> RailResult<String> {
  let rel = path.strip_prefix(root)?;
  if rel.as_os_str().is_empty() {
    return Ok(".".to_string());
  }
  let parts: Vec<_> = rel.components().map(|c| c.as_os_str().to_string_lossy()).collect();
  Ok(parts.join("/"))
}

/// Whether `path` is inside (or equal to) any of the `submodules`
pub fn is_submodule_path(path: &str, submodules: &[String]) -> bool {
  submodules.iter().any(|s| is_within(path, s))
}

/// Whether `path` equals `dir` or lies beneath it (path-segment aware)
pub fn is_within(path: &str, dir: &str) -> bool {
  if dir == "." {
    return true;
  }
  path == dir || (path.starts_with(dir) && path.as_bytes().get(dir.len()) == Some(&b'/'))
}
