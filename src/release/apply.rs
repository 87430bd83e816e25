//! Applying a release manifest to the working tree
//!
//! Before tagging, every released module's requirements on other released
//! modules are raised to the versions being tagged, and the annotations the
//! release consumed are deleted. The caller commits the returned paths.

use super::manifest::Manifest;
use crate::changelog::{Annotation, AnnotationStore};
use crate::core::error::RailResult;
use crate::discovery::relative_path;
use crate::modfile;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

/// Rewrite module manifests so released modules require each other at their
/// new versions
///
/// Returns the rewritten manifest paths relative to `root`, sorted.
pub fn update_requirements(root: &Path, manifest: &Manifest) -> RailResult<Vec<String>> {
  let released: BTreeMap<&str, &str> = manifest
    .modules
    .values()
    .map(|m| (m.module_path.as_str(), m.to.as_str()))
    .collect();

  let mut written = Vec::new();
  for dir in manifest.modules.keys() {
    let module_dir = if dir == "." { root.to_path_buf() } else { root.join(dir) };
    let mut file = modfile::load_module_file(&module_dir)?;

    let raised: Vec<(String, &str)> = file
      .requires
      .iter()
      .filter_map(|r| released.get(r.path.as_str()).map(|&to| (r.path.clone(), to)))
      .collect();

    let mut changed = false;
    for (required, to) in raised {
      if file.set_require_version(&required, to) {
        debug!(module = %dir, require = %required, to, "raising requirement");
        changed = true;
      }
    }

    if changed {
      let path = modfile::write_module_file(&module_dir, &file)?;
      written.push(relative_path(root, &path)?);
    }
  }

  written.sort();
  Ok(written)
}

/// Annotations on disk that the manifest consumes
fn consumed_annotations(store: &AnnotationStore, manifest: &Manifest) -> RailResult<Vec<Annotation>> {
  let ids: BTreeSet<&str> = manifest
    .modules
    .values()
    .flat_map(|m| m.annotations.iter().map(String::as_str))
    .collect();
  if ids.is_empty() {
    return Ok(Vec::new());
  }

  Ok(
    store
      .load_all()?
      .into_iter()
      .filter(|a| ids.contains(a.id.as_str()))
      .collect(),
  )
}

/// Files the release rewrites or deletes: the released modules' manifests
/// and the consumed annotations
///
/// Paths are relative to `root`, sorted.
pub fn release_inputs(root: &Path, manifest: &Manifest) -> RailResult<Vec<String>> {
  let mut paths = manifest
    .modules
    .keys()
    .map(|dir| {
      if dir == "." {
        modfile::MODULE_FILE.to_string()
      } else {
        format!("{}/{}", dir, modfile::MODULE_FILE)
      }
    })
    .collect::<Vec<_>>();

  let store = AnnotationStore::new(root);
  for annotation in consumed_annotations(&store, manifest)? {
    paths.push(relative_path(root, &store.path(&annotation))?);
  }

  paths.sort();
  Ok(paths)
}

/// Delete the annotation files referenced by the manifest
///
/// Returns the files actually deleted, relative to `root`, sorted.
pub fn remove_consumed_annotations(root: &Path, manifest: &Manifest) -> RailResult<Vec<String>> {
  let store = AnnotationStore::new(root);

  let mut removed = Vec::new();
  for annotation in consumed_annotations(&store, manifest)? {
    if let Some(path) = store.remove(&annotation)? {
      removed.push(relative_path(root, &path)?);
    }
  }

  removed.sort();
  Ok(removed)
}
