//! Change types and the version increments they request

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// How an annotation should affect a module's version
///
/// Ordered by strength: the highest increment across a module's annotations wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum SemVerIncrement {
  /// Use the version calculator's default behaviour (a patch bump)
  #[default]
  Default,
  /// Bump the patch version
  Patch,
  /// Bump the minor version
  Minor,
  /// Promote a pre-release to its final version
  Release,
}

/// Category of a change, ordered from least to most precedence when
/// summarizing changes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeType {
  #[default]
  Unknown,
  Dependency,
  Documentation,
  BugFix,
  Feature,
  Release,
  Announcement,
}

impl ChangeType {
  /// All known change types
  pub const KNOWN: [ChangeType; 6] = [
    ChangeType::Announcement,
    ChangeType::Release,
    ChangeType::Feature,
    ChangeType::BugFix,
    ChangeType::Documentation,
    ChangeType::Dependency,
  ];

  /// Parse a change type name case-insensitively; unrecognized names are `Unknown`
  pub fn parse(value: &str) -> Self {
    Self::KNOWN
      .into_iter()
      .find(|t| t.as_str().eq_ignore_ascii_case(value))
      .unwrap_or(ChangeType::Unknown)
  }

  /// Name used in annotation files
  pub fn as_str(&self) -> &'static str {
    match self {
      ChangeType::Announcement => "announcement",
      ChangeType::Release => "release",
      ChangeType::Feature => "feature",
      ChangeType::BugFix => "bugfix",
      ChangeType::Documentation => "documentation",
      ChangeType::Dependency => "dependency",
      ChangeType::Unknown => "",
    }
  }

  /// Changelog heading the change is grouped under
  pub fn changelog_prefix(&self) -> &'static str {
    match self {
      ChangeType::Feature => "Feature",
      ChangeType::BugFix => "Bug Fix",
      ChangeType::Release => "Release",
      ChangeType::Dependency => "Dependency Update",
      ChangeType::Documentation => "Documentation",
      ChangeType::Announcement => "Announcement",
      ChangeType::Unknown => "",
    }
  }

  /// Version increment requested by this change type
  pub fn version_increment(&self) -> SemVerIncrement {
    match self {
      ChangeType::Release => SemVerIncrement::Release,
      ChangeType::Feature => SemVerIncrement::Minor,
      ChangeType::BugFix | ChangeType::Dependency | ChangeType::Documentation => SemVerIncrement::Patch,
      ChangeType::Announcement | ChangeType::Unknown => SemVerIncrement::Default,
    }
  }
}

impl fmt::Display for ChangeType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl Serialize for ChangeType {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.as_str())
  }
}

impl<'de> Deserialize<'de> for ChangeType {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let value = String::deserialize(deserializer)?;
    Ok(ChangeType::parse(&value))
  }
}
