//! Module manifest files (`go.mod` format)
//!
//! Only the parts release calculation needs are modelled: the `module`
//! directive and `require` entries. The file keeps its original lines, and
//! changing a requirement rewrites only the version token of that line, so
//! comments, blank lines and uninterpreted directives survive a write.

use crate::core::error::{ManifestError, RailResult, ResultExt};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of a module manifest
pub const MODULE_FILE: &str = "go.mod";

/// A required module and its version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Require {
  pub path: String,
  pub version: String,
  pub indirect: bool,
  /// Index of the declaring line
  line: usize,
}

/// A parsed module manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleFile {
  /// Declared module path, if present
  pub module: Option<String>,
  /// Required modules in declaration order
  pub requires: Vec<Require>,
  /// Source lines, without line terminators
  lines: Vec<String>,
}

impl ModuleFile {
  /// Parse manifest content; `path` is only used in error messages
  pub fn parse(path: &Path, content: &str) -> RailResult<Self> {
    let mut file = ModuleFile {
      lines: content.lines().map(String::from).collect(),
      ..ModuleFile::default()
    };
    let mut in_require_block = false;
    let mut in_other_block = false;

    for (idx, raw) in content.lines().enumerate() {
      let line_no = idx + 1;
      let (code, comment) = split_comment(raw);
      let line = code.trim();

      if in_other_block {
        in_other_block = line != ")";
        continue;
      }

      if in_require_block {
        if line == ")" {
          in_require_block = false;
        } else if !line.is_empty() {
          file.requires.push(parse_require(path, line_no, line, comment)?);
        }
        continue;
      }

      if line.is_empty() {
        continue;
      }

      let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
      let rest = rest.trim();
      match verb {
        "module" => {
          if rest.is_empty() {
            return Err(parse_error(path, line_no, "module directive requires a path"));
          }
          file.module = Some(unquote(rest).to_string());
        }
        "require" if rest == "(" => in_require_block = true,
        "require" => file.requires.push(parse_require(path, line_no, rest, comment)?),
        _ if rest.ends_with('(') => in_other_block = true,
        _ => {}
      }
    }

    if in_require_block || in_other_block {
      return Err(parse_error(path, content.lines().count(), "unterminated block"));
    }

    Ok(file)
  }

  /// Declared module path; a manifest without one is invalid
  pub fn module_path(&self, path: &Path) -> RailResult<&str> {
    self.module.as_deref().ok_or_else(|| {
      ManifestError::MissingModule {
        path: path.to_path_buf(),
      }
      .into()
    })
  }

  /// Paths of all required modules
  pub fn required_paths(&self) -> impl Iterator<Item = &str> {
    self.requires.iter().map(|r| r.path.as_str())
  }

  /// Change the version of every requirement on `module_path`
  ///
  /// Returns whether anything changed.
  pub fn set_require_version(&mut self, module_path: &str, version: &str) -> bool {
    let mut changed = false;
    for require in self.requires.iter_mut().filter(|r| r.path == module_path) {
      if require.version == version {
        continue;
      }
      if let Some(line) = self.lines.get_mut(require.line) {
        *line = replace_version(line, &require.version, version);
      }
      require.version = version.to_string();
      changed = true;
    }
    changed
  }

  /// Render the manifest; unchanged lines are reproduced exactly
  pub fn format(&self) -> String {
    let mut out = self.lines.join("\n");
    out.push('\n');
    out
  }
}

/// Load the module manifest located in directory `dir`
pub fn load_module_file(dir: &Path) -> RailResult<ModuleFile> {
  let path = dir.join(MODULE_FILE);
  let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
  ModuleFile::parse(&path, &content)
}

/// Write the module manifest into directory `dir`
pub fn write_module_file(dir: &Path, file: &ModuleFile) -> RailResult<PathBuf> {
  let path = dir.join(MODULE_FILE);
  fs::write(&path, file.format()).with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(path)
}

/// Whether `dir` contains a module manifest
pub fn is_module_dir(dir: &Path) -> RailResult<bool> {
  match fs::metadata(dir.join(MODULE_FILE)) {
    Ok(meta) => Ok(meta.is_file()),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
    Err(e) => Err(e.into()),
  }
}

/// Whether a file name is a module manifest
pub fn is_module_file(file_name: &str) -> bool {
  file_name == MODULE_FILE
}

fn split_comment(line: &str) -> (&str, &str) {
  match line.find("//") {
    Some(idx) => (&line[..idx], line[idx + 2..].trim()),
    None => (line, ""),
  }
}

fn unquote(s: &str) -> &str {
  s.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(s)
}

fn parse_require(path: &Path, line_no: usize, entry: &str, comment: &str) -> RailResult<Require> {
  let mut fields = entry.split_whitespace();
  let (Some(module), Some(version), None) = (fields.next(), fields.next(), fields.next()) else {
    return Err(parse_error(path, line_no, "usage: require module/path v1.2.3"));
  };

  Ok(Require {
    path: unquote(module).to_string(),
    version: version.to_string(),
    indirect: comment == "indirect" || comment.starts_with("indirect;"),
    line: line_no - 1,
  })
}

/// Swap the version token of a require line, keeping indentation and comment
fn replace_version(line: &str, old: &str, new: &str) -> String {
  let code_end = line.find("//").unwrap_or(line.len());
  let code = line[..code_end].trim_end();
  match code.strip_suffix(old) {
    Some(head) => format!("{}{}{}", head, new, &line[code.len()..]),
    None => line.to_string(),
  }
}

fn parse_error(path: &Path, line: usize, reason: &str) -> crate::core::error::RailError {
  ManifestError::Parse {
    path: path.to_path_buf(),
    line,
    reason: reason.to_string(),
  }
  .into()
}
