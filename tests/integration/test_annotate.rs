//! Integration tests for `monotag annotate`

use crate::helpers::{TestRepo, monotag, run_monotag};
use anyhow::Result;
use serde_json::Value;

fn repo() -> Result<TestRepo> {
  let repo = TestRepo::new()?;
  repo.add_module(".", "example.com/sdk", &[])?;
  repo.add_module("service/s3", "example.com/sdk/service/s3", &[])?;
  Ok(repo)
}

#[test]
fn test_annotate_writes_changelog_entry() -> Result<()> {
  let repo = repo()?;

  let output = run_monotag(
    &repo.path,
    &["annotate", "--type", "Feature", "-d", "Add paginators", "-m", "service/s3", "-m", ".", "--collapse"],
  )?;

  let files = repo.annotation_files()?;
  assert_eq!(files.len(), 1);
  let annotation: Value = serde_json::from_str(&std::fs::read_to_string(&files[0])?)?;
  assert_eq!(annotation["type"], "feature");
  assert_eq!(annotation["description"], "Add paginators");
  assert_eq!(annotation["modules"], serde_json::json!(["service/s3", "."]));
  assert_eq!(annotation["collapse"], true);

  let id = annotation["id"].as_str().unwrap_or_default();
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.starts_with(id), "stdout: {}", stdout);
  assert_eq!(
    files[0].file_name().map(|n| n.to_string_lossy().to_string()),
    Some(format!("{}.json", id.replace('-', "")))
  );
  Ok(())
}

#[test]
fn test_annotate_rejects_unknown_type() -> Result<()> {
  let repo = repo()?;

  let output = monotag(&repo.path, &["annotate", "-t", "refactor", "-d", "x", "-m", "."])?;

  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("bugfix"), "stderr should list known types: {}", stderr);
  assert!(repo.annotation_files()?.is_empty());
  Ok(())
}

#[test]
fn test_annotate_rejects_unknown_module() -> Result<()> {
  let repo = repo()?;

  let output = monotag(&repo.path, &["annotate", "-t", "bugfix", "-d", "x", "-m", "service/ec2"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(repo.annotation_files()?.is_empty());
  Ok(())
}
