//! Release operations for SystemGit (tags, diffs, trees, commits)

use super::VersionControl;
use super::system_git::{SystemGit, split_lines};
use crate::core::error::{GitError, RailError, RailResult};
use tracing::debug;

impl VersionControl for SystemGit {
  /// List tags with `git tag -l`
  fn list_tags(&self) -> RailResult<Vec<String>> {
    let output = self.run(&["tag", "-l"])?;
    let tags = split_lines(&output);
    debug!(count = tags.len(), "listed git tags");
    Ok(tags)
  }

  /// Uses `git diff --name-only from to -- scope`; paths are repository-root relative
  fn changed_files(&self, from: &str, to: &str, scope: &str) -> RailResult<Vec<String>> {
    let output = self.run(&["diff", "--name-only", from, to, "--", scope])?;
    let files = split_lines(&output);
    debug!(from, to, scope, count = files.len(), "diffed module");
    Ok(files)
  }

  /// Uses `git ls-tree -r --name-only --full-tree rev -- path`
  fn list_tree(&self, rev: &str, path: &str) -> RailResult<Vec<String>> {
    let output = self.run(&["ls-tree", "-r", "--name-only", "--full-tree", rev, "--", path])?;
    Ok(split_lines(&output))
  }

  /// Uses `git ls-files --error-unmatch` then `git diff --quiet HEAD`
  fn is_committed(&self, path: &str) -> RailResult<bool> {
    let tracked = self
      .git_cmd()
      .args(["ls-files", "--error-unmatch", "--", path])
      .output()
      .map_err(RailError::from)?;
    if !tracked.status.success() {
      return Ok(false);
    }

    let diff = self
      .git_cmd()
      .args(["diff", "--quiet", "HEAD", "--", path])
      .output()
      .map_err(RailError::from)?;
    match diff.status.code() {
      Some(0) => Ok(true),
      Some(1) => Ok(false),
      _ => Err(RailError::Git(GitError::CommandFailed {
        command: format!("git diff --quiet HEAD -- {}", path),
        stderr: String::from_utf8_lossy(&diff.stderr).to_string(),
      })),
    }
  }

  /// `git add -A` stages deleted paths as removals
  fn commit(&self, message: &str, paths: &[String]) -> RailResult<String> {
    if !paths.is_empty() {
      let mut args = vec!["add", "-A", "--"];
      args.extend(paths.iter().map(String::as_str));
      self.run(&args)?;
    }

    self.run(&["commit", "--allow-empty", "-m", message])?;
    let sha = self.run(&["rev-parse", "HEAD"])?;
    Ok(sha.trim().to_string())
  }

  fn create_annotated_tag(&self, tag: &str, message: &str) -> RailResult<()> {
    let output = self
      .git_cmd()
      .args(["tag", "-a", tag, "-m", message])
      .output()
      .map_err(RailError::from)?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("already exists") {
        return Err(RailError::Git(GitError::TagExists { tag: tag.to_string() }));
      }
      return Err(RailError::Git(GitError::CommandFailed {
        command: format!("git tag -a {}", tag),
        stderr: stderr.to_string(),
      }));
    }

    debug!(tag, "created annotated tag");
    Ok(())
  }
}
