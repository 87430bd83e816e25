//! Integration tests for `monotag modules`

use crate::helpers::{TestRepo, run_monotag};
use anyhow::Result;
use serde_json::{Value, json};

#[test]
fn test_modules_json_lists_nesting() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_module(".", "example.com/sdk", &[])?;
  repo.add_module("service/s3", "example.com/sdk/service/s3", &[])?;
  repo.add_module("service/s3/internal/gen", "example.com/sdk/service/s3/internal/gen", &[])?;
  repo.add_module("service/testdata/fake", "example.com/fake", &[])?;

  let output = run_monotag(&repo.path, &["modules", "--json"])?;
  let listing: Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(
    listing,
    json!([
      {"dir": ".", "module_path": "example.com/sdk", "submodules": ["service/s3"]},
      {"dir": "service/s3", "module_path": "example.com/sdk/service/s3", "submodules": ["service/s3/internal/gen"]},
      {"dir": "service/s3/internal/gen", "module_path": "example.com/sdk/service/s3/internal/gen", "submodules": []},
    ])
  );
  Ok(())
}

#[test]
fn test_modules_text_shows_config_flags() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_module(".", "example.com/sdk", &[])?;
  repo.add_module("internal/tools", "example.com/sdk/internal/tools", &[])?;
  repo.write_file(
    "modman.toml",
    "[modules.\"internal/tools\"]\nno_tag = true\npre_release = \"rc\"\n",
  )?;

  let output = run_monotag(&repo.path, &["modules"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains(".  example.com/sdk"), "stdout: {}", stdout);
  assert!(stdout.contains("[no-tag, pre-release: rc]"), "stdout: {}", stdout);
  assert!(stdout.contains("└─ internal/tools"), "stdout: {}", stdout);
  Ok(())
}
