//! Release candidates and the reasons they are released

use crate::changelog::Annotation;
use crate::core::config::ModuleConfig;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::ops::{BitOr, BitOrAssign};

/// Set of reasons a module needs a release
///
/// Reasons accumulate during a calculation and are never removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModuleChange(u64);

impl ModuleChange {
  /// Files under the module changed since its latest tag
  pub const SOURCE_CHANGE: Self = Self(1 << 63);
  /// The module has never been tagged
  pub const NEW_MODULE: Self = Self(1 << 62);
  /// A module it requires is being released
  pub const DEPENDENCY_UPDATE: Self = Self(1 << 61);

  /// No reasons
  pub const fn empty() -> Self {
    Self(0)
  }

  pub const fn is_empty(self) -> bool {
    self.0 == 0
  }

  pub const fn contains(self, other: Self) -> bool {
    self.0 & other.0 == other.0
  }

  pub fn insert(&mut self, other: Self) {
    self.0 |= other.0;
  }

  pub const fn has_source_change(self) -> bool {
    self.contains(Self::SOURCE_CHANGE)
  }

  pub const fn is_new(self) -> bool {
    self.contains(Self::NEW_MODULE)
  }

  pub const fn has_dependency_update(self) -> bool {
    self.contains(Self::DEPENDENCY_UPDATE)
  }
}

impl BitOr for ModuleChange {
  type Output = Self;

  fn bitor(self, rhs: Self) -> Self {
    Self(self.0 | rhs.0)
  }
}

impl BitOrAssign for ModuleChange {
  fn bitor_assign(&mut self, rhs: Self) {
    self.insert(rhs);
  }
}

/// JSON form of `ModuleChange`; absent reasons are omitted
#[derive(Serialize, Deserialize)]
struct ChangeReasons {
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  source_change: bool,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  new_module: bool,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  dependency_update: bool,
}

impl Serialize for ModuleChange {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    ChangeReasons {
      source_change: self.has_source_change(),
      new_module: self.is_new(),
      dependency_update: self.has_dependency_update(),
    }
    .serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for ModuleChange {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let reasons = ChangeReasons::deserialize(deserializer)?;
    let mut change = ModuleChange::empty();
    if reasons.source_change {
      change |= ModuleChange::SOURCE_CHANGE;
    }
    if reasons.new_module {
      change |= ModuleChange::NEW_MODULE;
    }
    if reasons.dependency_update {
      change |= ModuleChange::DEPENDENCY_UPDATE;
    }
    Ok(change)
  }
}

/// A discovered module and everything the release calculation knows about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
  /// Declared module path (unique in the repository)
  pub module_path: String,
  /// Directory relative to the repository root ("." for the root module)
  pub rel_path: String,
  /// Declared module paths this module requires
  pub requires: BTreeSet<String>,
  /// Highest tagged version, if the module was ever released
  pub latest: Option<String>,
  pub changes: ModuleChange,
  /// Annotations listing this module's directory
  pub annotations: Vec<Annotation>,
  pub config: ModuleConfig,
}
