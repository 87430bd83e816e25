//! Change annotations stored under `.changelog/`

use super::change_type::{ChangeType, SemVerIncrement};
use crate::core::error::{ManifestError, RailResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Directory (relative to the repository root) holding annotation files
pub const CHANGELOG_DIR: &str = ".changelog";

/// A human-authored description of one change and the modules it affects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
  /// Unique identifier (UUIDv4)
  pub id: String,

  /// Category of the change
  #[serde(rename = "type")]
  pub change_type: ChangeType,

  /// Collapse into a single summary item when listing changes across modules
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub collapse: bool,

  /// Changelog text (single line or markdown list)
  pub description: String,

  /// Relative repository paths of affected modules
  pub modules: Vec<String>,
}

impl Annotation {
  /// New annotation with a fresh identifier
  pub fn new(change_type: ChangeType, description: impl Into<String>, modules: Vec<String>) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      change_type,
      collapse: false,
      description: description.into(),
      modules,
    }
  }

  /// Problems that make this annotation unusable; empty when valid
  pub fn issues(&self) -> Vec<String> {
    let mut issues = Vec::new();
    if self.id.is_empty() {
      issues.push("annotation id is required".to_string());
    }
    if self.change_type == ChangeType::Unknown {
      issues.push("invalid change type".to_string());
    }
    if self.description.is_empty() {
      issues.push("description is required".to_string());
    }
    if self.modules.is_empty() {
      issues.push("at least one module is required".to_string());
    }
    issues
  }

  /// Fail with `ManifestError::InvalidAnnotation` if the annotation is unusable
  pub fn validate(&self, path: &Path) -> RailResult<()> {
    let issues = self.issues();
    if issues.is_empty() {
      return Ok(());
    }
    Err(
      ManifestError::InvalidAnnotation {
        path: path.to_path_buf(),
        issues,
      }
      .into(),
    )
  }

  fn file_name(&self) -> String {
    format!("{}.json", self.id.replace('-', ""))
  }
}

/// Highest version increment requested by a set of annotations
pub fn version_increment(annotations: &[Annotation]) -> SemVerIncrement {
  annotations
    .iter()
    .map(|a| a.change_type.version_increment())
    .max()
    .unwrap_or_default()
}

/// Identifiers of a set of annotations, in order
pub fn annotation_ids(annotations: &[Annotation]) -> Vec<String> {
  annotations.iter().map(|a| a.id.clone()).collect()
}

/// Read/write access to the annotation files of a repository
pub struct AnnotationStore {
  dir: PathBuf,
}

impl AnnotationStore {
  /// Store for the repository rooted at `root`
  pub fn new(root: &Path) -> Self {
    Self {
      dir: root.join(CHANGELOG_DIR),
    }
  }

  /// Load every `*.json` annotation directly inside the changelog directory
  ///
  /// A missing directory means no annotations. Any unreadable or invalid
  /// annotation is fatal. Results are ordered by file name.
  pub fn load_all(&self) -> RailResult<Vec<Annotation>> {
    if !self.dir.exists() {
      return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(&self.dir).with_context(|| format!("Failed to read {}", self.dir.display()))? {
      let entry = entry?;
      let path = entry.path();
      if entry.file_type()?.is_file() && path.extension().is_some_and(|ext| ext == "json") {
        paths.push(path);
      }
    }
    paths.sort();

    paths.iter().map(|p| Self::load_file(p)).collect()
  }

  /// Load and validate a single annotation file
  pub fn load_file(path: &Path) -> RailResult<Annotation> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let annotation: Annotation =
      serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    annotation.validate(path)?;
    Ok(annotation)
  }

  /// File an annotation is stored in
  pub fn path(&self, annotation: &Annotation) -> PathBuf {
    self.dir.join(annotation.file_name())
  }

  /// Write an annotation, returning the file path
  pub fn write(&self, annotation: &Annotation) -> RailResult<PathBuf> {
    let path = self.path(annotation);
    annotation.validate(&path)?;
    fs::create_dir_all(&self.dir)?;
    let json = serde_json::to_string_pretty(annotation)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
  }

  /// Remove an annotation file, returning its path if a file was deleted
  ///
  /// Removing a missing annotation is not an error.
  pub fn remove(&self, annotation: &Annotation) -> RailResult<Option<PathBuf>> {
    let path = self.path(annotation);
    match fs::remove_file(&path) {
      Ok(()) => Ok(Some(path)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }
}
