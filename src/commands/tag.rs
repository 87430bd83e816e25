//! Apply a release manifest: commit the release and create its tags

use crate::core::context::RepoContext;
use crate::core::error::{GitError, ManifestError, RailError, RailResult};
use crate::core::vcs::VersionControl;
use crate::release::apply::{release_inputs, remove_consumed_annotations, update_requirements};
use crate::release::manifest::Manifest;
use crate::release::tags::{ModuleTags, format_version, to_module_tag};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::info;

/// Run the tag command
pub fn run_tag(ctx: &RepoContext, manifest_path: &Path, dry_run: bool) -> RailResult<()> {
  let manifest = Manifest::load(manifest_path)?;

  if manifest.is_empty() {
    println!("Nothing to release in {}", manifest_path.display());
    return Ok(());
  }

  verify_tags(&manifest, manifest_path)?;

  let release_tag = manifest.release_tag();
  let tag_list = ctx.git.list_tags()?;
  let existing: HashSet<&str> = tag_list.iter().map(String::as_str).collect();
  if let Some(tag) = manifest
    .tags
    .iter()
    .chain([&release_tag])
    .find(|t| existing.contains(t.as_str()))
  {
    return Err(GitError::TagExists { tag: tag.clone() }.into());
  }
  verify_advances(&manifest, ModuleTags::parse(&tag_list))?;
  verify_committed(&ctx.git, &release_inputs(&ctx.root, &manifest)?)?;

  println!("Release {}", manifest.id);
  for (dir, module) in &manifest.modules {
    println!(
      "  {}: {} -> {}",
      dir,
      module.from.as_deref().unwrap_or("(new)"),
      module.to
    );
  }

  if dry_run {
    println!();
    println!("Tags (dry-run, nothing created):");
    for tag in manifest.tags.iter().chain([&release_tag]) {
      println!("  {}", tag);
    }
    return Ok(());
  }

  let mut paths = update_requirements(&ctx.root, &manifest)?;
  paths.extend(remove_consumed_annotations(&ctx.root, &manifest)?);
  let commit = ctx.git.commit(&format!("Release {}", manifest.id), &paths)?;
  info!(commit = %commit, files = paths.len(), "committed release");

  for tag in &manifest.tags {
    ctx.git.create_annotated_tag(tag, &format!("Release {} ({})", tag, manifest.id))?;
  }
  ctx.git.create_annotated_tag(&release_tag, &release_message(&manifest))?;

  println!();
  println!("Created {} tag(s) on {}", manifest.tags.len() + 1, short_sha(&commit));
  Ok(())
}

/// The manifest's tag list must be exactly the tags of its module entries
fn verify_tags(manifest: &Manifest, path: &Path) -> RailResult<()> {
  let expected = manifest
    .modules
    .iter()
    .map(|(dir, m)| to_module_tag(dir, &m.to))
    .collect::<RailResult<BTreeSet<String>>>()?;
  let listed: BTreeSet<String> = manifest.tags.iter().cloned().collect();

  if expected != listed {
    return Err(
      ManifestError::TagMismatch {
        path: path.to_path_buf(),
        missing: expected.difference(&listed).cloned().collect(),
        unexpected: listed.difference(&expected).cloned().collect(),
      }
      .into(),
    );
  }
  Ok(())
}

/// Files the release rewrites or deletes must match HEAD, so the release
/// commit holds exactly the release changes and no annotation is lost
fn verify_committed(vcs: &dyn VersionControl, paths: &[String]) -> RailResult<()> {
  let mut uncommitted = Vec::new();
  for path in paths {
    if !vcs.is_committed(path)? {
      uncommitted.push(path.as_str());
    }
  }

  if uncommitted.is_empty() {
    return Ok(());
  }
  Err(RailError::with_help(
    format!("release files are not committed: {}", uncommitted.join(", ")),
    "Commit the module manifests and change annotations, then recalculate the release.",
  ))
}

/// Every new tag must become its module's latest version
fn verify_advances(manifest: &Manifest, mut tags: ModuleTags) -> RailResult<()> {
  for (dir, module) in &manifest.modules {
    let tag = to_module_tag(dir, &module.to)?;
    tags.add(&tag);
    let latest = tags.latest(dir).map(format_version);
    if latest.as_deref() != Some(module.to.as_str()) {
      return Err(RailError::with_help(
        format!(
          "module {}: {} is not above the latest tag {}",
          dir,
          module.to,
          latest.as_deref().unwrap_or("-")
        ),
        "The manifest is stale. Regenerate it with `monotag calculate`.",
      ));
    }
  }
  Ok(())
}

fn release_message(manifest: &Manifest) -> String {
  let mut message = format!("Release {}\n", manifest.id);
  for (dir, module) in &manifest.modules {
    message.push_str(&format!("\n{} {}", dir, module.to));
  }
  message
}

fn short_sha(sha: &str) -> &str {
  sha.get(..12).unwrap_or(sha)
}
