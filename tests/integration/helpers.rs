//! Test helpers for integration tests

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A throwaway git repository holding go.mod modules
pub struct TestRepo {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestRepo {
  /// Create an empty repository with a committer identity
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    Ok(Self { _root: root, path })
  }

  /// Add a module at `dir` ("." for the root) with one source file
  pub fn add_module(&self, dir: &str, module_path: &str, requires: &[(&str, &str)]) -> Result<()> {
    let mut go_mod = format!("module {}\n\ngo 1.21\n", module_path);
    if !requires.is_empty() {
      go_mod.push_str("\nrequire (\n");
      for (path, version) in requires {
        go_mod.push_str(&format!("\t{} {}\n", path, version));
      }
      go_mod.push_str(")\n");
    }
    self.write_file(&join(dir, "go.mod"), &go_mod)?;

    let package = module_path.rsplit('/').next().unwrap_or("main");
    self.write_file(&join(dir, "lib.go"), &format!("package {}\n", package))
  }

  /// Write a file, creating parent directories
  pub fn write_file(&self, rel: &str, content: &str) -> Result<()> {
    let path = self.path.join(rel);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
  }

  /// Commit every change in the working tree
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;

    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Create lightweight tags on HEAD
  pub fn tag(&self, names: &[&str]) -> Result<()> {
    for name in names {
      git(&self.path, &["tag", name])?;
    }
    Ok(())
  }

  /// All tags, sorted
  pub fn tags(&self) -> Result<Vec<String>> {
    let output = git(&self.path, &["tag", "-l"])?;
    let mut tags: Vec<String> = String::from_utf8_lossy(&output.stdout)
      .lines()
      .map(String::from)
      .collect();
    tags.sort();
    Ok(tags)
  }

  /// Subject line of the HEAD commit
  pub fn head_subject(&self) -> Result<String> {
    let output = git(&self.path, &["log", "-1", "--format=%s"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Files of the changelog directory
  pub fn annotation_files(&self) -> Result<Vec<PathBuf>> {
    let dir = self.path.join(".changelog");
    if !dir.exists() {
      return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
      files.push(entry?.path());
    }
    files.sort();
    Ok(files)
  }

  pub fn file_exists(&self, rel: &str) -> bool {
    self.path.join(rel).exists()
  }

  pub fn read_file(&self, rel: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(rel))?)
  }
}

fn join(dir: &str, file: &str) -> String {
  if dir == "." {
    file.to_string()
  } else {
    format!("{}/{}", dir, file)
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the monotag binary without checking its exit status
pub fn monotag(cwd: &Path, args: &[&str]) -> Result<Output> {
  Command::new(env!("CARGO_BIN_EXE_monotag"))
    .current_dir(cwd)
    .env("GIT_AUTHOR_NAME", "Test User")
    .env("GIT_AUTHOR_EMAIL", "test@example.com")
    .env("GIT_COMMITTER_NAME", "Test User")
    .env("GIT_COMMITTER_EMAIL", "test@example.com")
    .args(args)
    .output()
    .context("Failed to run monotag")
}

/// Run the monotag binary, failing on a non-zero exit status
pub fn run_monotag(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = monotag(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "monotag command failed: monotag {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Run `monotag calculate` and parse the manifest it prints
pub fn calculate(cwd: &Path) -> Result<Value> {
  let output = run_monotag(cwd, &["calculate"])?;
  serde_json::from_slice(&output.stdout).context("calculate did not print JSON")
}

/// Tags listed in a manifest
pub fn manifest_tags(manifest: &Value) -> Vec<String> {
  manifest["tags"]
    .as_array()
    .map(|tags| tags.iter().filter_map(|t| t.as_str().map(String::from)).collect())
    .unwrap_or_default()
}
