//! Module tag model
//!
//! Git tags name module releases as `[<module dir>/]vX.Y.Z[-pre]`. Modules at
//! major version 2 and above live under a `/vN` directory suffix, so a tag
//! `service/s3/v2.1.0` belongs to the module directory `service/s3/v2`.

use crate::core::error::{RailResult, VersionError};
use semver::Version;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Parse a `v`-prefixed semantic version (`v1.2.3`, `v2.0.0-rc.1`, `v1.0.0+build`)
pub fn parse_version(s: &str) -> Option<Version> {
  let rest = s.strip_prefix('v')?;
  Version::parse(rest).ok()
}

/// Parse a `v`-prefixed semantic version or fail with `VersionError::Invalid`
pub fn require_version(s: &str) -> RailResult<Version> {
  parse_version(s).ok_or_else(|| {
    VersionError::Invalid {
      version: s.to_string(),
    }
    .into()
  })
}

/// Render a version with its `v` prefix
pub fn format_version(version: &Version) -> String {
  format!("v{}", version)
}

/// Semantic version precedence (build metadata ignored)
pub fn precedence(a: &Version, b: &Version) -> Ordering {
  (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

/// Split a module path into its prefix and `/vN` major suffix
///
/// `example.com/mod/v2` → (`example.com/mod`, Some(2)), `v3` → (`.`, Some(3)),
/// `service/s3` → (`service/s3`, None). A `/v0`, `/v1` or zero-padded suffix
/// is not a valid major suffix and yields `None` overall.
pub fn split_path_major(path: &str) -> Option<(&str, Option<u64>)> {
  let (prefix, last) = match path.rsplit_once('/') {
    Some((prefix, last)) => (prefix, last),
    None => (".", path),
  };

  let Some(digits) = last.strip_prefix('v') else {
    return Some((path, None));
  };
  if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
    return Some((path, None));
  }
  if digits.starts_with('0') {
    return None;
  }

  match digits.parse::<u64>() {
    Ok(major) if major >= 2 => Some((prefix, Some(major))),
    _ => None,
  }
}

/// Convert a module directory and version to the tag naming that release
///
/// ```text
/// .             v1.2.3 => v1.2.3
/// service/s3    v0.2.3 => service/s3/v0.2.3
/// service/s3/v2 v2.2.3 => service/s3/v2.2.3
/// service/s3/v3 v2.2.3 => error
/// ```
pub fn to_module_tag(module_dir: &str, version: &str) -> RailResult<String> {
  let parsed = require_version(version)?;
  let (prefix, path_major) = split_path_major(module_dir).ok_or_else(|| VersionError::InvalidModulePath {
    path: module_dir.to_string(),
  })?;

  let compatible = match path_major {
    Some(major) => parsed.major == major,
    None => parsed.major <= 1,
  };
  if !compatible {
    return Err(
      VersionError::PathMajorMismatch {
        path: module_dir.to_string(),
        version: version.to_string(),
      }
      .into(),
    );
  }

  if prefix == "." {
    Ok(version.to_string())
  } else {
    Ok(format!("{}/{}", prefix, version))
  }
}

/// Split a tag into module directory and version
fn parse_tag(tag: &str) -> Option<(String, Version)> {
  let (module, candidate) = match tag.rsplit_once('/') {
    Some((module, candidate)) => (module, candidate),
    None => (".", tag),
  };

  let version = parse_version(candidate)?;

  let module = if version.major > 1 {
    if module == "." {
      format!("v{}", version.major)
    } else {
      format!("{}/v{}", module, version.major)
    }
  } else {
    module.to_string()
  };

  Some((module, version))
}

/// Module directories mapped to their tagged versions, highest first
///
/// ```text
/// .             => [v1.2.3, v1.0.0]
/// v2            => [v2.0.0]
/// sub/module    => [v1.2.3]
/// sub/module/v2 => [v2.2.3]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleTags {
  modules: BTreeMap<String, Vec<Version>>,
}

impl ModuleTags {
  /// Parse git tags; tags that are not semantic versions are ignored
  pub fn parse<S: AsRef<str>>(tags: &[S]) -> Self {
    let mut modules: BTreeMap<String, Vec<Version>> = BTreeMap::new();

    for tag in tags {
      if let Some((module, version)) = parse_tag(tag.as_ref()) {
        modules.entry(module).or_default().push(version);
      }
    }

    for versions in modules.values_mut() {
      versions.sort_by(|a, b| precedence(b, a));
      versions.dedup_by(|a, b| precedence(a, b) == Ordering::Equal);
    }

    Self { modules }
  }

  /// Highest tagged version for a module directory
  pub fn latest(&self, module_dir: &str) -> Option<&Version> {
    self.versions(module_dir).first()
  }

  /// Insert a tag, keeping descending order; re-adding a version is a no-op
  ///
  /// Returns false when the tag is not a module version tag.
  pub fn add(&mut self, tag: &str) -> bool {
    let Some((module, version)) = parse_tag(tag) else {
      return false;
    };

    let versions = self.modules.entry(module).or_default();
    let idx = versions.partition_point(|existing| precedence(&version, existing) == Ordering::Less);
    if versions.get(idx).is_some_and(|v| precedence(v, &version) == Ordering::Equal) {
      return true;
    }
    versions.insert(idx, version);
    true
  }

  /// Versions of one module directory, highest first
  pub fn versions(&self, module_dir: &str) -> &[Version] {
    self.modules.get(module_dir).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Module directories that have at least one tag
  pub fn module_dirs(&self) -> impl Iterator<Item = &str> {
    self.modules.keys().map(String::as_str)
  }
}
