use crate::core::error::{ConfigError, RailResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Name of the configuration overlay at the repository root
pub const CONFIG_FILE: &str = "modman.toml";

/// Repository release configuration (modman.toml)
///
/// Every section is optional; a repository without the file behaves as if it
/// contained an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
  /// Per-module overrides keyed by relative repository path
  #[serde(default)]
  pub modules: BTreeMap<String, ModuleConfig>,

  /// Repository-wide release policy
  #[serde(default)]
  pub release: ReleasePolicyConfig,
}

/// Release configuration for a single module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
  /// Never tag this module
  #[serde(default)]
  pub no_tag: bool,

  /// Pre-release label used for the module's next versions (e.g. "preview")
  #[serde(default)]
  pub pre_release: String,
}

/// Which files count as module changes, and where discovery stops
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePolicyConfig {
  /// File extensions (without the dot) treated as source
  #[serde(default = "default_source_extensions")]
  pub source_extensions: Vec<String>,

  /// Directory name that module discovery never descends into
  #[serde(default = "default_fixture_dir")]
  pub fixture_dir: String,
}

fn default_source_extensions() -> Vec<String> {
  vec!["go".to_string()]
}

fn default_fixture_dir() -> String {
  "testdata".to_string()
}

impl Default for ReleasePolicyConfig {
  fn default() -> Self {
    Self {
      source_extensions: default_source_extensions(),
      fixture_dir: default_fixture_dir(),
    }
  }
}

impl RepoConfig {
  /// Load modman.toml from the repository root
  ///
  /// A missing file yields the default configuration; a present but
  /// unparseable one is a fatal input error.
  pub fn load(root: &Path) -> RailResult<Self> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
      return Ok(Self::default());
    }

    let content = fs::read_to_string(&path)?;
    let config = Self::parse(&path, &content)?;
    config.validate()?;
    Ok(config)
  }

  fn parse(path: &Path, content: &str) -> RailResult<Self> {
    toml_edit::de::from_str(content).map_err(|e| {
      ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
      }
      .into()
    })
  }

  /// Validate pre-release labels as semantic version pre-release identifiers
  pub fn validate(&self) -> RailResult<()> {
    for (module, cfg) in &self.modules {
      if cfg.pre_release.is_empty() {
        continue;
      }
      if semver::Prerelease::new(&cfg.pre_release).is_err() {
        return Err(
          ConfigError::InvalidPreRelease {
            module: module.clone(),
            label: cfg.pre_release.clone(),
          }
          .into(),
        );
      }
    }
    Ok(())
  }

  /// Module configuration for a relative repository path
  pub fn module(&self, rel_path: &str) -> ModuleConfig {
    self.modules.get(rel_path).cloned().unwrap_or_default()
  }
}
