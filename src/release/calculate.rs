//! Release calculation
//!
//! Decides which modules have unreleased changes. A tagged module is changed
//! when a tracked file beneath its directory (but outside its sub-modules)
//! differs between its latest tag and HEAD. A module that was never tagged is
//! new. Dependency updates are propagated afterwards, and modules without
//! reasons to release, or configured never to be tagged, are dropped.

use super::module::{Module, ModuleChange};
use super::propagate::calculate_dependency_updates;
use super::tags::{ModuleTags, format_version, to_module_tag};
use crate::changelog::Annotation;
use crate::core::config::{ReleasePolicyConfig, RepoConfig};
use crate::core::error::{ManifestError, RailResult, ResultExt};
use crate::core::vcs::VersionControl;
use crate::discovery::{ModuleFinder, is_submodule_path, is_within};
use crate::modfile::{self, MODULE_FILE};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Decides which changed files count as module changes
pub trait ChangePolicy: Sync {
  /// Whether a change to a file with this name can trigger a release
  fn is_tracked(&self, file_name: &str) -> bool;
}

/// Tracks the module manifest and files with configured source extensions
#[derive(Debug, Clone)]
pub struct DefaultChangePolicy {
  extensions: Vec<String>,
}

impl DefaultChangePolicy {
  pub fn new(extensions: Vec<String>) -> Self {
    Self { extensions }
  }

  pub fn from_config(config: &ReleasePolicyConfig) -> Self {
    Self::new(config.source_extensions.clone())
  }
}

impl ChangePolicy for DefaultChangePolicy {
  fn is_tracked(&self, file_name: &str) -> bool {
    if modfile::is_module_file(file_name) {
      return true;
    }
    Path::new(file_name)
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
  }
}

/// Whether any changed file belongs to the module at `module_dir`
///
/// Files beneath any of the `ignored` directories belong to other modules.
pub fn is_module_changed(
  module_dir: &str,
  ignored: &[String],
  changed_files: &[String],
  policy: &dyn ChangePolicy,
) -> bool {
  changed_files.iter().any(|file| {
    let (dir, name) = split_file(file);
    is_within(dir, module_dir) && !is_submodule_path(dir, ignored) && policy.is_tracked(name)
  })
}

/// Whether a new sub-module was carved out of its parent: at the parent's
/// last tag its directory held tracked source but no module manifest
///
/// `files` lists the sub-module directory at that tag; files under
/// `nested` modules are not considered.
pub fn is_carved_out(files: &[String], nested: &[String], policy: &dyn ChangePolicy) -> bool {
  let mut has_source = false;
  let mut has_manifest = false;

  for file in files {
    let (dir, name) = split_file(file);
    let is_manifest = modfile::is_module_file(name);
    if !is_manifest && !policy.is_tracked(name) {
      continue;
    }
    if is_submodule_path(dir, nested) {
      continue;
    }

    if is_manifest {
      has_manifest = true;
    } else {
      has_source = true;
    }
    if has_manifest && has_source {
      break;
    }
  }

  has_source && !has_manifest
}

fn split_file(file: &str) -> (&str, &str) {
  file.rsplit_once('/').unwrap_or((".", file))
}

/// Inputs of one release calculation
pub struct Calculator<'a> {
  pub finder: &'a dyn ModuleFinder,
  pub tags: &'a ModuleTags,
  pub config: &'a RepoConfig,
  pub annotations: &'a [Annotation],
  pub vcs: &'a dyn VersionControl,
  pub policy: &'a dyn ChangePolicy,
}

/// Shared per-run lookups
struct Scan<'s> {
  repository: &'s BTreeMap<String, Vec<String>>,
  tombstones: Vec<&'s str>,
  annotations: BTreeMap<&'s str, Vec<Annotation>>,
}

impl Calculator<'_> {
  /// Modules to release, keyed by declared module path
  ///
  /// All-or-nothing: the first filesystem, git, or manifest error aborts.
  pub fn calculate(&self) -> RailResult<BTreeMap<String, Module>> {
    let repository = self.finder.modules_rel()?;

    let tombstones: Vec<&str> = self
      .tags
      .module_dirs()
      .filter(|dir| !repository.contains_key(*dir))
      .collect();
    if !tombstones.is_empty() {
      debug!(?tombstones, "tagged modules no longer in the repository");
    }

    let mut annotations: BTreeMap<&str, Vec<Annotation>> = BTreeMap::new();
    for annotation in self.annotations {
      for dir in &annotation.modules {
        annotations.entry(dir.as_str()).or_default().push(annotation.clone());
      }
    }

    let scan = Scan {
      repository: &repository,
      tombstones,
      annotations,
    };

    let inspected = repository
      .par_iter()
      .map(|(dir, submodules)| self.inspect(&scan, dir, submodules))
      .collect::<RailResult<Vec<Module>>>()?;

    let mut modules: BTreeMap<String, Module> = BTreeMap::new();
    for module in inspected {
      if let Some(existing) = modules.get(&module.module_path) {
        return Err(
          ManifestError::DuplicateModule {
            module: module.module_path.clone(),
            first: existing.rel_path.clone(),
            second: module.rel_path.clone(),
          }
          .into(),
        );
      }
      modules.insert(module.module_path.clone(), module);
    }

    calculate_dependency_updates(&mut modules)?;

    let discovered = modules.len();
    modules.retain(|_, m| !m.changes.is_empty() && !m.config.no_tag);
    info!(discovered, releasing = modules.len(), "calculated release");

    Ok(modules)
  }

  fn inspect(&self, scan: &Scan<'_>, dir: &str, submodules: &[String]) -> RailResult<Module> {
    let root = self.finder.root();
    let module_dir = if dir == "." { root.to_path_buf() } else { root.join(dir) };
    let file = modfile::load_module_file(&module_dir)?;
    let module_path = file.module_path(&module_dir.join(MODULE_FILE))?.to_string();

    let latest = self.tags.latest(dir).map(format_version);
    let changes = match &latest {
      None => ModuleChange::NEW_MODULE,
      Some(latest) if self.has_changes(scan, dir, latest, submodules)? => ModuleChange::SOURCE_CHANGE,
      Some(_) => ModuleChange::empty(),
    };
    debug!(module = %module_path, dir, latest = ?latest, ?changes, "inspected module");

    Ok(Module {
      requires: file.required_paths().map(String::from).collect(),
      module_path,
      rel_path: dir.to_string(),
      latest,
      changes,
      annotations: scan.annotations.get(dir).cloned().unwrap_or_default(),
      config: self.config.module(dir),
    })
  }

  fn has_changes(&self, scan: &Scan<'_>, dir: &str, latest: &str, submodules: &[String]) -> RailResult<bool> {
    let start = to_module_tag(dir, latest)?;
    let changed = self
      .vcs
      .changed_files(&start, "HEAD", dir)
      .with_context(|| format!("Failed to diff module {} since {}", dir, start))?;

    let mut ignored = submodules.to_vec();
    ignored.extend(
      scan
        .tombstones
        .iter()
        .filter(|t| **t != dir && is_within(t, dir))
        .map(|t| t.to_string()),
    );

    if is_module_changed(dir, &ignored, &changed, self.policy) {
      return Ok(true);
    }

    for submodule in submodules {
      if self.tags.latest(submodule).is_some() {
        continue;
      }
      let files = self.vcs.list_tree(&start, submodule)?;
      let nested = scan.repository.get(submodule).map(Vec::as_slice).unwrap_or(&[]);
      if is_carved_out(&files, nested, self.policy) {
        debug!(module = dir, submodule = %submodule, "sub-module carved out since last release");
        return Ok(true);
      }
    }

    Ok(false)
  }
}
