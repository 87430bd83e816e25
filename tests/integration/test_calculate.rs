//! Integration tests for `monotag calculate`

use crate::helpers::{TestRepo, calculate, manifest_tags, monotag, run_monotag};
use anyhow::Result;
use serde_json::json;

const ROOT: &str = "example.com/sdk";
const S3: &str = "example.com/sdk/service/s3";

/// Root module requiring a nested service module, both tagged v1.0.0
fn tagged_repo() -> Result<TestRepo> {
  let repo = TestRepo::new()?;
  repo.add_module(".", ROOT, &[(S3, "v1.0.0")])?;
  repo.add_module("service/s3", S3, &[])?;
  repo.commit("Initial modules")?;
  repo.tag(&["v1.0.0", "service/s3/v1.0.0"])?;
  Ok(repo)
}

#[test]
fn test_new_modules_get_preview_versions() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_module(".", ROOT, &[])?;
  repo.add_module("service/s3", S3, &[])?;
  repo.add_module("service/s3/v2", "example.com/sdk/service/s3/v2", &[])?;
  repo.commit("Initial modules")?;

  let manifest = calculate(&repo.path)?;

  assert_eq!(
    manifest_tags(&manifest),
    vec!["service/s3/v1.0.0-preview", "service/s3/v2.0.0-preview", "v1.0.0-preview"]
  );
  let root = &manifest["modules"]["."];
  assert_eq!(root["module_path"], ROOT);
  assert_eq!(root["to"], "v1.0.0-preview");
  assert!(root.get("from").is_none());
  assert_eq!(root["changes"], json!({"new_module": true}));

  let id = manifest["id"].as_str().unwrap_or_default();
  assert_eq!(id.len(), 10, "first release of the day has a bare date id: {}", id);
  Ok(())
}

#[test]
fn test_unchanged_repo_releases_nothing() -> Result<()> {
  let repo = tagged_repo()?;

  let manifest = calculate(&repo.path)?;

  assert_eq!(manifest["modules"], json!({}));
  assert!(manifest_tags(&manifest).is_empty());
  Ok(())
}

#[test]
fn test_source_change_propagates_to_dependents() -> Result<()> {
  let repo = tagged_repo()?;
  repo.write_file("service/s3/api.go", "package s3\n\nfunc Put() {}\n")?;
  repo.commit("Add s3 api")?;

  let manifest = calculate(&repo.path)?;

  let s3 = &manifest["modules"]["service/s3"];
  assert_eq!(s3["from"], "v1.0.0");
  assert_eq!(s3["to"], "v1.0.1");
  assert_eq!(s3["changes"], json!({"source_change": true}));

  let root = &manifest["modules"]["."];
  assert_eq!(root["to"], "v1.0.1");
  assert_eq!(root["changes"], json!({"dependency_update": true}));

  assert_eq!(manifest_tags(&manifest), vec!["service/s3/v1.0.1", "v1.0.1"]);
  Ok(())
}

#[test]
fn test_untracked_file_types_are_ignored() -> Result<()> {
  let repo = tagged_repo()?;
  repo.write_file("service/s3/README.md", "# s3\n")?;
  repo.commit("Docs")?;

  let manifest = calculate(&repo.path)?;
  assert_eq!(manifest["modules"], json!({}));
  Ok(())
}

#[test]
fn test_feature_annotation_bumps_minor() -> Result<()> {
  let repo = tagged_repo()?;
  repo.write_file("service/s3/api.go", "package s3\n\nfunc Get() {}\n")?;
  run_monotag(
    &repo.path,
    &["annotate", "-t", "feature", "-d", "Add Get", "-m", "service/s3"],
  )?;
  repo.commit("Add Get")?;

  let manifest = calculate(&repo.path)?;

  let s3 = &manifest["modules"]["service/s3"];
  assert_eq!(s3["to"], "v1.1.0");
  assert_eq!(s3["annotations"].as_array().map(Vec::len), Some(1));
  // Dependents get a patch release; the annotation only names s3
  assert_eq!(manifest["modules"]["."]["to"], "v1.0.1");
  assert!(manifest["modules"]["."].get("annotations").is_none());
  Ok(())
}

#[test]
fn test_configured_pre_release_label() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_module("service/s3", S3, &[])?;
  repo.write_file("modman.toml", "[modules.\"service/s3\"]\npre_release = \"rc\"\n")?;
  repo.commit("Initial")?;

  let manifest = calculate(&repo.path)?;
  assert_eq!(manifest_tags(&manifest), vec!["service/s3/v1.0.0-rc"]);

  repo.tag(&["service/s3/v1.0.0-rc"])?;
  repo.write_file("service/s3/api.go", "package s3\n")?;
  repo.commit("Change")?;

  let manifest = calculate(&repo.path)?;
  assert_eq!(manifest["modules"]["service/s3"]["to"], "v1.0.0-rc.1");
  Ok(())
}

#[test]
fn test_no_tag_module_is_excluded() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_module(".", ROOT, &[])?;
  repo.add_module("internal/tools", "example.com/sdk/internal/tools", &[])?;
  repo.write_file("modman.toml", "[modules.\"internal/tools\"]\nno_tag = true\n")?;
  repo.commit("Initial")?;

  let manifest = calculate(&repo.path)?;
  assert_eq!(manifest_tags(&manifest), vec!["v1.0.0-preview"]);
  assert!(manifest["modules"].get("internal/tools").is_none());
  Ok(())
}

#[test]
fn test_no_tag_module_with_dependents_fails() -> Result<()> {
  let repo = tagged_repo()?;
  repo.write_file("modman.toml", "[modules.\"service/s3\"]\nno_tag = true\n")?;
  repo.commit("Disable s3 releases")?;

  let output = monotag(&repo.path, &["calculate"])?;

  assert_eq!(output.status.code(), Some(3));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("service/s3"), "stderr: {}", stderr);
  assert!(stderr.contains("dependents"), "stderr: {}", stderr);
  Ok(())
}

#[test]
fn test_invalid_config_is_a_user_error() -> Result<()> {
  let repo = tagged_repo()?;
  repo.write_file("modman.toml", "[modules\n")?;

  let output = monotag(&repo.path, &["calculate"])?;
  assert_eq!(output.status.code(), Some(1));
  Ok(())
}

#[test]
fn test_output_file_and_directory_flag() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_module(".", ROOT, &[])?;
  repo.commit("Initial")?;
  let out = tempfile::TempDir::new()?;
  let manifest_path = out.path().join("release.json");
  let manifest_arg = manifest_path.to_string_lossy().to_string();
  let repo_arg = repo.path.to_string_lossy().to_string();

  let output = run_monotag(out.path(), &["-C", &repo_arg, "calculate", "--output", &manifest_arg])?;

  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("1 module(s)"), "stdout: {}", stdout);
  let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&manifest_path)?)?;
  assert_eq!(manifest_tags(&saved), vec!["v1.0.0-preview"]);
  Ok(())
}

#[test]
fn test_outside_git_repository_fails() -> Result<()> {
  let dir = tempfile::TempDir::new()?;

  let output = monotag(dir.path(), &["calculate"])?;
  assert_eq!(output.status.code(), Some(2));
  Ok(())
}
