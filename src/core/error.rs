//! Error types for monotag with contextual messages and exit codes
//!
//! Every release calculation is all-or-nothing: any of these errors aborts the
//! run and no manifest is produced. Errors carry enough context to name the
//! offending module and the rule that was violated.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for monotag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, manifests, annotations, invalid args)
  User = 1,
  /// System error (git, I/O)
  System = 2,
  /// Validation failure (version rules, dependency consistency)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for monotag
#[derive(Debug)]
pub enum RailError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Semantic version errors
  Version(VersionError),

  /// Module manifest and annotation input errors
  Manifest(ManifestError),

  /// I/O errors
  Io(io::Error),

  /// A categorized error with context about the operation that failed
  Context { context: String, source: Box<RailError> },

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl RailError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    RailError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    RailError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  ///
  /// Categorized errors keep their exit code and help text.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      RailError::Message { message, context, help } => RailError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      other => RailError::Context {
        context: ctx_str,
        source: Box::new(other),
      },
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      RailError::Config(ConfigError::NoTagHasDependents { .. }) => ExitCode::Validation,
      RailError::Config(_) => ExitCode::User,
      RailError::Git(_) => ExitCode::System,
      RailError::Version(_) => ExitCode::Validation,
      RailError::Manifest(_) => ExitCode::User,
      RailError::Io(_) => ExitCode::System,
      RailError::Context { source, .. } => source.exit_code(),
      RailError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      RailError::Config(e) => e.help_message(),
      RailError::Git(e) => e.help_message(),
      RailError::Version(e) => e.help_message(),
      RailError::Manifest(e) => e.help_message(),
      RailError::Context { source, .. } => source.help_message(),
      RailError::Message { help, .. } => help.clone(),
      RailError::Io(_) => None,
    }
  }
}

impl fmt::Display for RailError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RailError::Config(e) => write!(f, "{}", e),
      RailError::Git(e) => write!(f, "{}", e),
      RailError::Version(e) => write!(f, "{}", e),
      RailError::Manifest(e) => write!(f, "{}", e),
      RailError::Io(e) => write!(f, "I/O error: {}", e),
      RailError::Context { context, source } => write!(f, "{}: {}", context, source),
      RailError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for RailError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      RailError::Io(e) => Some(e),
      RailError::Context { source, .. } => Some(source.as_ref()),
      _ => None,
    }
  }
}

impl From<io::Error> for RailError {
  fn from(err: io::Error) -> Self {
    RailError::Io(err)
  }
}

impl From<String> for RailError {
  fn from(msg: String) -> Self {
    RailError::message(msg)
  }
}

impl From<&str> for RailError {
  fn from(msg: &str) -> Self {
    RailError::message(msg)
  }
}

impl From<ConfigError> for RailError {
  fn from(err: ConfigError) -> Self {
    RailError::Config(err)
  }
}

impl From<GitError> for RailError {
  fn from(err: GitError) -> Self {
    RailError::Git(err)
  }
}

impl From<VersionError> for RailError {
  fn from(err: VersionError) -> Self {
    RailError::Version(err)
  }
}

impl From<ManifestError> for RailError {
  fn from(err: ManifestError) -> Self {
    RailError::Manifest(err)
  }
}

impl From<toml_edit::de::Error> for RailError {
  fn from(err: toml_edit::de::Error) -> Self {
    RailError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for RailError {
  fn from(err: serde_json::Error) -> Self {
    RailError::message(format!("JSON error: {}", err))
  }
}

impl From<semver::Error> for RailError {
  fn from(err: semver::Error) -> Self {
    RailError::message(format!("Semantic version error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for RailError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    RailError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<std::path::StripPrefixError> for RailError {
  fn from(err: std::path::StripPrefixError) -> Self {
    RailError::message(format!("Path strip prefix error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// modman.toml could not be parsed
  Parse { path: PathBuf, reason: String },

  /// A module is configured with an unusable pre-release label
  InvalidPreRelease { module: String, label: String },

  /// A module marked `no_tag` is required by other discovered modules
  NoTagHasDependents { module: String, dependents: Vec<String> },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::Parse { .. } => Some("Fix the TOML syntax in modman.toml and re-run.".to_string()),
      ConfigError::InvalidPreRelease { .. } => Some(
        "Pre-release labels must be dot-separated alphanumeric identifiers, e.g. `preview` or `rc`.".to_string(),
      ),
      ConfigError::NoTagHasDependents { module, .. } => Some(format!(
        "Remove `no_tag` for '{}' in modman.toml, or drop it from the dependents' requirements.",
        module
      )),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Parse { path, reason } => {
        write!(f, "Failed to parse configuration {}: {}", path.display(), reason)
      }
      ConfigError::InvalidPreRelease { module, label } => {
        write!(f, "Module '{}' has invalid pre-release label '{}'", module, label)
      }
      ConfigError::NoTagHasDependents { module, dependents } => {
        write!(
          f,
          "module {} is configured for no releases, but has {} dependents: {}",
          module,
          dependents.len(),
          dependents.join(", ")
        )
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Tag already exists
  TagExists { tag: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first or check the path: {}",
        path.display()
      )),
      GitError::TagExists { tag } => Some(format!(
        "Tag '{}' was already created. Re-run `monotag calculate` to get a fresh manifest.",
        tag
      )),
      GitError::CommandFailed { stderr, .. } if stderr.contains("unknown revision") => {
        Some("Fetch all tags (`git fetch --tags`) so release tags resolve locally.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::TagExists { tag } => write!(f, "Tag already exists: {}", tag),
    }
  }
}

/// Semantic version errors
#[derive(Debug)]
pub enum VersionError {
  /// A string did not parse as a `v`-prefixed semantic version
  Invalid { version: String },

  /// Module path is not a valid (optionally major-suffixed) path
  InvalidModulePath { path: String },

  /// Version major does not match the module path's major suffix
  PathMajorMismatch { path: String, version: String },

  /// A release bump was requested but the latest version is already final
  NotPreRelease { module: String, latest: String },

  /// Pre-release counter was not numeric
  MalformedCounter { module: String, prerelease: String },

  /// Numeric component overflowed
  Overflow { module: String, latest: String },

  /// The computed version does not advance past the latest one
  NotHigher { module: String, next: String, latest: String },
}

impl VersionError {
  fn help_message(&self) -> Option<String> {
    match self {
      VersionError::NotPreRelease { .. } => {
        Some("Only pre-release versions can be promoted with a `release` annotation.".to_string())
      }
      VersionError::NotHigher { .. } => Some(
        "Check the module's pre-release label in modman.toml against its latest tag.".to_string(),
      ),
      VersionError::PathMajorMismatch { .. } => {
        Some("Modules at major version 2 or higher must live under a `/vN` path suffix.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for VersionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VersionError::Invalid { version } => write!(f, "invalid semantic version: {:?}", version),
      VersionError::InvalidModulePath { path } => write!(f, "invalid module path: {}", path),
      VersionError::PathMajorMismatch { path, version } => {
        write!(f, "version {} does not match major version of module path {}", version, path)
      }
      VersionError::NotPreRelease { module, latest } => write!(
        f,
        "module {}: changelog annotation requests release bump, but latest tag {} is not a pre-release",
        module, latest
      ),
      VersionError::MalformedCounter { module, prerelease } => write!(
        f,
        "module {}: failed to parse pre-release version number in {:?}",
        module, prerelease
      ),
      VersionError::Overflow { module, latest } => {
        write!(f, "module {}: version component overflow incrementing {}", module, latest)
      }
      VersionError::NotHigher { module, next, latest } => write!(
        f,
        "module {}: computed next version {} is not higher than {}",
        module, next, latest
      ),
    }
  }
}

/// Module manifest and annotation input errors
#[derive(Debug)]
pub enum ManifestError {
  /// Module manifest file is syntactically invalid
  Parse { path: PathBuf, line: usize, reason: String },

  /// Module manifest has no module directive
  MissingModule { path: PathBuf },

  /// Two directories declare the same module path
  DuplicateModule { module: String, first: String, second: String },

  /// A change annotation failed validation
  InvalidAnnotation { path: PathBuf, issues: Vec<String> },

  /// A release manifest's tag list disagrees with its module versions
  TagMismatch {
    path: PathBuf,
    missing: Vec<String>,
    unexpected: Vec<String>,
  },
}

impl ManifestError {
  fn help_message(&self) -> Option<String> {
    match self {
      ManifestError::TagMismatch { .. } => Some("Regenerate the manifest with `monotag calculate`.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for ManifestError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ManifestError::Parse { path, line, reason } => {
        write!(f, "{}:{}: {}", path.display(), line, reason)
      }
      ManifestError::MissingModule { path } => {
        write!(f, "{}: module directive not present", path.display())
      }
      ManifestError::DuplicateModule { module, first, second } => write!(
        f,
        "module path {} is declared by both '{}' and '{}'",
        module, first, second
      ),
      ManifestError::TagMismatch {
        path,
        missing,
        unexpected,
      } => {
        write!(f, "{}: tags do not match the module versions", path.display())?;
        if !missing.is_empty() {
          write!(f, "\n\tmissing: {}", missing.join(", "))?;
        }
        if !unexpected.is_empty() {
          write!(f, "\n\tunexpected: {}", unexpected.join(", "))?;
        }
        Ok(())
      }
      ManifestError::InvalidAnnotation { path, issues } => {
        writeln!(f, "invalid change annotation {}:", path.display())?;
        for issue in issues {
          writeln!(f, "\t{}", issue)?;
        }
        Ok(())
      }
    }
  }
}

/// Result type alias for monotag
pub type RailResult<T> = Result<T, RailError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> RailResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> RailResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<RailError>,
{
  fn context(self, ctx: impl Into<String>) -> RailResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> RailResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &RailError) {
  eprintln!("\nerror: {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("help: {}\n", help);
  }
}

impl From<anyhow::Error> for RailError {
  fn from(err: anyhow::Error) -> Self {
    RailError::message(err.to_string())
  }
}
