//! Release manifests and release identifiers
//!
//! A manifest is the persisted result of a calculation: the modules being
//! released, their version transitions, and the tags to create. It is
//! written by `calculate` and read back by `tag`.

use super::module::{Module, ModuleChange};
use super::tags::to_module_tag;
use super::version::calculate_next_version;
use crate::changelog::annotation_ids;
use crate::core::error::{ManifestError, RailResult, ResultExt};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Prefix of the tag marking a whole release
pub const RELEASE_TAG_PREFIX: &str = "release-";

const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of the current time for release identifiers
pub trait Clock {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// Release description of changed modules and the tags to create
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
  pub id: String,
  /// Keyed by directory relative to the repository root
  pub modules: BTreeMap<String, ModuleManifest>,
  /// Sorted ascending
  pub tags: Vec<String>,
}

/// A single module's release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleManifest {
  pub module_path: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub from: Option<String>,

  pub to: String,

  pub changes: ModuleChange,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub annotations: Vec<String>,
}

impl Manifest {
  /// Tag marking the release as a whole
  pub fn release_tag(&self) -> String {
    format!("{}{}", RELEASE_TAG_PREFIX, self.id)
  }

  pub fn is_empty(&self) -> bool {
    self.modules.is_empty()
  }

  /// Serialize to JSON, indented when `pretty`
  pub fn to_json(&self, pretty: bool) -> RailResult<String> {
    let json = if pretty {
      serde_json::to_string_pretty(self)?
    } else {
      serde_json::to_string(self)?
    };
    Ok(json)
  }

  /// Load a manifest written by `calculate`
  pub fn load(path: &Path) -> RailResult<Self> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read manifest {}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| {
      ManifestError::Parse {
        path: path.to_path_buf(),
        line: e.line(),
        reason: e.to_string(),
      }
      .into()
    })
  }

  /// Write the manifest as indented JSON
  pub fn save(&self, path: &Path) -> RailResult<()> {
    let mut json = self.to_json(true)?;
    json.push('\n');
    fs::write(path, json).with_context(|| format!("Failed to write manifest {}", path.display()))
  }
}

/// Build the manifest for the modules selected for release
///
/// Any version or tag error aborts the whole manifest.
pub fn build_release_manifest(id: &str, modules: &BTreeMap<String, Module>) -> RailResult<Manifest> {
  let mut manifest = Manifest {
    id: id.to_string(),
    ..Default::default()
  };

  for (module_path, module) in modules {
    let next = calculate_next_version(module_path, module.latest.as_deref(), &module.config, &module.annotations)?;
    let tag = to_module_tag(&module.rel_path, &next)?;

    info!(
      module = %module_path,
      from = module.latest.as_deref().unwrap_or("-"),
      to = %next,
      "module release"
    );

    manifest.modules.insert(
      module.rel_path.clone(),
      ModuleManifest {
        module_path: module_path.clone(),
        from: module.latest.clone(),
        to: next,
        changes: module.changes,
        annotations: annotation_ids(&module.annotations),
      },
    );
    manifest.tags.push(tag);
  }

  manifest.tags.sort();
  Ok(manifest)
}

/// Next release identifier: today's UTC date, suffixed `.N` for the N-th
/// release of the day
///
/// ```text
/// first release   => 2021-05-06
/// second same-day => 2021-05-06.2
/// ```
pub fn next_release_id<S: AsRef<str>>(tags: &[S], clock: &dyn Clock) -> String {
  let today = clock.now().date_naive().format(RELEASE_DATE_FORMAT).to_string();

  let mut latest = 0u64;
  for tag in tags {
    let Some(rest) = tag.as_ref().strip_prefix(RELEASE_TAG_PREFIX) else {
      continue;
    };

    let (date, suffix) = match rest.split_once('.') {
      Some((date, suffix)) => (date, Some(suffix)),
      None => (rest, None),
    };
    if date != today {
      continue;
    }

    match suffix {
      None => latest = latest.max(1),
      Some(suffix) => {
        if let Ok(n) = suffix.parse::<u64>() {
          latest = latest.max(n);
        }
      }
    }
  }

  if latest == 0 {
    today
  } else {
    format!("{}.{}", today, latest + 1)
  }
}
