//! Next-version calculation
//!
//! The next version of a module depends on its latest tag, the pre-release
//! label configured for it, and the strongest increment requested by its
//! change annotations. Whatever the inputs, the result must sort strictly
//! above the latest tag.

use super::tags::{format_version, precedence, require_version, split_path_major};
use crate::changelog::{self, Annotation, SemVerIncrement};
use crate::core::config::ModuleConfig;
use crate::core::error::{RailResult, VersionError};
use semver::{Prerelease, Version};
use std::cmp::Ordering;
use tracing::debug;

/// Label used for a new module's first version when none is configured
pub const DEFAULT_PRE_RELEASE: &str = "preview";

/// Compute the next version for a module
///
/// `module_path` is the declared module path (its `/vN` suffix sets the major
/// version of a new module), `latest` the highest tagged version if any.
pub fn calculate_next_version(
  module_path: &str,
  latest: Option<&str>,
  config: &ModuleConfig,
  annotations: &[Annotation],
) -> RailResult<String> {
  let increment = changelog::version_increment(annotations);
  let label = config.pre_release.as_str();

  let Some(latest) = latest.filter(|l| !l.is_empty()) else {
    return first_version(module_path, label, increment);
  };

  let current = require_version(latest)?;
  let mut next = Version::new(current.major, current.minor, current.patch);
  next.pre = current.pre.clone();

  if increment == SemVerIncrement::Release {
    if next.pre.is_empty() {
      return Err(
        VersionError::NotPreRelease {
          module: module_path.to_string(),
          latest: latest.to_string(),
        }
        .into(),
      );
    }
    next.pre = Prerelease::EMPTY;
  } else if !next.pre.is_empty() {
    if !label.is_empty() && !has_label(&next.pre, label) {
      next.pre = Prerelease::new(label)?;
    } else {
      next.pre = bump_counter(module_path, &next.pre)?;
    }
  } else if !label.is_empty() {
    next.minor = bump(module_path, latest, next.minor)?;
    next.patch = 0;
    next.pre = Prerelease::new(label)?;
  } else if increment == SemVerIncrement::Minor {
    next.minor = bump(module_path, latest, next.minor)?;
    next.patch = 0;
  } else {
    next.patch = bump(module_path, latest, next.patch)?;
  }

  if precedence(&next, &current) != Ordering::Greater {
    return Err(
      VersionError::NotHigher {
        module: module_path.to_string(),
        next: format_version(&next),
        latest: latest.to_string(),
      }
      .into(),
    );
  }

  let next = format_version(&next);
  debug!(module = module_path, latest, next = %next, ?increment, "calculated next version");
  Ok(next)
}

fn first_version(module_path: &str, label: &str, increment: SemVerIncrement) -> RailResult<String> {
  let (_, path_major) = split_path_major(module_path).ok_or_else(|| VersionError::InvalidModulePath {
    path: module_path.to_string(),
  })?;

  let mut next = Version::new(path_major.unwrap_or(1), 0, 0);
  if increment != SemVerIncrement::Release {
    next.pre = Prerelease::new(if label.is_empty() { DEFAULT_PRE_RELEASE } else { label })?;
  }

  Ok(format_version(&next))
}

/// Whether a pre-release belongs to `label`: the label's identifiers must
/// match the leading identifiers exactly, so `rc` does not claim `rc2.1`
fn has_label(pre: &Prerelease, label: &str) -> bool {
  let pre = pre.as_str();
  pre == label || pre.strip_prefix(label).is_some_and(|rest| rest.starts_with('.'))
}

/// Increment the trailing numeric identifier, or append `.1` when there is none
fn bump_counter(module_path: &str, pre: &Prerelease) -> RailResult<Prerelease> {
  let malformed = || VersionError::MalformedCounter {
    module: module_path.to_string(),
    prerelease: pre.to_string(),
  };

  let next = match pre.as_str().rsplit_once('.') {
    None => format!("{}.1", pre),
    Some((head, counter)) => {
      let counter: u64 = counter.parse().map_err(|_| malformed())?;
      let counter = counter.checked_add(1).ok_or_else(malformed)?;
      format!("{}.{}", head, counter)
    }
  };

  Ok(Prerelease::new(&next)?)
}

fn bump(module_path: &str, latest: &str, component: u64) -> RailResult<u64> {
  component.checked_add(1).ok_or_else(|| {
    VersionError::Overflow {
      module: module_path.to_string(),
      latest: latest.to_string(),
    }
    .into()
  })
}
