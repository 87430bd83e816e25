//! Integration tests for `monotag tag`

use crate::helpers::{TestRepo, calculate, manifest_tags, monotag, run_monotag};
use anyhow::Result;
use std::path::PathBuf;
use tempfile::TempDir;

const ROOT: &str = "example.com/sdk";
const S3: &str = "example.com/sdk/service/s3";

/// Tagged repository with an annotated change to the s3 module, plus a
/// manifest for it written outside the repository
fn pending_release() -> Result<(TestRepo, TempDir, PathBuf)> {
  let repo = TestRepo::new()?;
  repo.add_module(".", ROOT, &[(S3, "v1.0.0")])?;
  repo.add_module("service/s3", S3, &[])?;
  repo.commit("Initial modules")?;
  repo.tag(&["v1.0.0", "service/s3/v1.0.0"])?;

  repo.write_file("service/s3/api.go", "package s3\n\nfunc Put() {}\n")?;
  run_monotag(&repo.path, &["annotate", "-t", "bugfix", "-d", "Fix Put", "-m", "service/s3"])?;
  repo.commit("Fix s3")?;

  let out = TempDir::new()?;
  let manifest = out.path().join("release.json");
  let manifest_arg = manifest.to_string_lossy().to_string();
  run_monotag(&repo.path, &["calculate", "--output", &manifest_arg])?;
  Ok((repo, out, manifest))
}

#[test]
fn test_dry_run_changes_nothing() -> Result<()> {
  let (repo, _out, manifest) = pending_release()?;
  let manifest_arg = manifest.to_string_lossy().to_string();
  let before = repo.tags()?;

  let output = run_monotag(&repo.path, &["tag", "--manifest", &manifest_arg, "--dry-run"])?;

  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("service/s3: v1.0.0 -> v1.0.1"), "stdout: {}", stdout);
  assert!(stdout.contains("v1.0.1"), "stdout: {}", stdout);
  assert!(stdout.contains("release-"), "stdout: {}", stdout);
  assert_eq!(repo.tags()?, before);
  assert_eq!(repo.head_subject()?, "Fix s3");
  assert_eq!(repo.annotation_files()?.len(), 1);
  Ok(())
}

#[test]
fn test_tag_commits_release_and_creates_tags() -> Result<()> {
  let (repo, _out, manifest) = pending_release()?;
  let manifest_arg = manifest.to_string_lossy().to_string();
  let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&manifest)?)?;
  let id = saved["id"].as_str().unwrap_or_default().to_string();

  run_monotag(&repo.path, &["tag", "--manifest", &manifest_arg])?;

  let tags = repo.tags()?;
  for tag in manifest_tags(&saved) {
    assert!(tags.contains(&tag), "missing {} in {:?}", tag, tags);
  }
  assert!(tags.contains(&format!("release-{}", id)));
  assert_eq!(repo.head_subject()?, format!("Release {}", id));

  // The root module now requires the released s3 version
  let go_mod = repo.read_file("go.mod")?;
  assert!(go_mod.contains(&format!("{} v1.0.1", S3)), "go.mod: {}", go_mod);

  // Consumed annotations are deleted and the tree is clean
  assert!(repo.annotation_files()?.is_empty());
  assert!(repo.file_exists("service/s3/api.go"));

  let next = calculate(&repo.path)?;
  assert_eq!(next["modules"], serde_json::json!({}));
  Ok(())
}

#[test]
fn test_second_release_same_day_gets_suffix() -> Result<()> {
  let (repo, _out, manifest) = pending_release()?;
  let manifest_arg = manifest.to_string_lossy().to_string();
  run_monotag(&repo.path, &["tag", "--manifest", &manifest_arg])?;
  let first = repo
    .tags()?
    .into_iter()
    .find(|t| t.starts_with("release-"))
    .unwrap_or_default();

  repo.write_file("lib.go", "package sdk\n\nfunc New() {}\n")?;
  repo.commit("Root change")?;
  let next = calculate(&repo.path)?;

  let id = next["id"].as_str().unwrap_or_default();
  // A release made around midnight starts a new day instead
  if first == format!("release-{}", &id[..10]) {
    assert_eq!(id, format!("{}.2", &id[..10]));
  }
  assert_eq!(manifest_tags(&next), vec!["v1.0.2"]);
  Ok(())
}

#[test]
fn test_existing_tag_is_refused() -> Result<()> {
  let (repo, _out, manifest) = pending_release()?;
  let manifest_arg = manifest.to_string_lossy().to_string();
  run_monotag(&repo.path, &["tag", "--manifest", &manifest_arg])?;

  let output = monotag(&repo.path, &["tag", "--manifest", &manifest_arg])?;

  assert_eq!(output.status.code(), Some(2));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("already exists"), "stderr: {}", stderr);
  Ok(())
}

#[test]
fn test_tampered_manifest_is_refused() -> Result<()> {
  let (repo, _out, manifest) = pending_release()?;
  let content = std::fs::read_to_string(&manifest)?.replace("\"service/s3/v1.0.1\"", "\"service/s3/v9.0.0\"");
  std::fs::write(&manifest, content)?;
  let manifest_arg = manifest.to_string_lossy().to_string();

  let output = monotag(&repo.path, &["tag", "--manifest", &manifest_arg])?;

  assert_eq!(output.status.code(), Some(1));
  assert_eq!(repo.tags()?, vec!["service/s3/v1.0.0", "v1.0.0"]);
  Ok(())
}

#[test]
fn test_missing_manifest_fails() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_module(".", ROOT, &[])?;
  repo.commit("Initial")?;

  let output = monotag(&repo.path, &["tag", "--manifest", "does-not-exist.json"])?;
  assert!(!output.status.success());
  Ok(())
}

#[test]
fn test_uncommitted_annotation_is_refused_without_changes() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_module(".", ROOT, &[(S3, "v1.0.0")])?;
  repo.add_module("service/s3", S3, &[])?;
  repo.commit("Initial modules")?;
  repo.tag(&["v1.0.0", "service/s3/v1.0.0"])?;
  repo.write_file("service/s3/api.go", "package s3\n\nfunc Put() {}\n")?;
  repo.commit("Fix s3")?;

  // Annotation written but never committed
  run_monotag(&repo.path, &["annotate", "-t", "bugfix", "-d", "Fix Put", "-m", "service/s3"])?;
  let out = TempDir::new()?;
  let manifest = out.path().join("release.json");
  let manifest_arg = manifest.to_string_lossy().to_string();
  run_monotag(&repo.path, &["calculate", "--output", &manifest_arg])?;
  let go_mod = repo.read_file("go.mod")?;

  for args in [
    vec!["tag", "--manifest", manifest_arg.as_str(), "--dry-run"],
    vec!["tag", "--manifest", manifest_arg.as_str()],
  ] {
    let output = monotag(&repo.path, &args)?;
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not committed"), "stderr: {}", stderr);
    assert!(stderr.contains(".changelog/"), "stderr: {}", stderr);
  }

  assert_eq!(repo.annotation_files()?.len(), 1);
  assert_eq!(repo.read_file("go.mod")?, go_mod);
  assert_eq!(repo.tags()?, vec!["service/s3/v1.0.0", "v1.0.0"]);
  assert_eq!(repo.head_subject()?, "Fix s3");

  // Once committed the same manifest releases cleanly
  repo.commit("Add annotation")?;
  run_monotag(&repo.path, &["tag", "--manifest", &manifest_arg])?;
  assert!(repo.annotation_files()?.is_empty());
  assert!(repo.tags()?.contains(&"service/s3/v1.0.1".to_string()));
  let status = crate::helpers::git(&repo.path, &["status", "--porcelain"])?;
  assert!(status.stdout.is_empty(), "{}", String::from_utf8_lossy(&status.stdout));
  Ok(())
}
