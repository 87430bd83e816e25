//! Record a change annotation

use crate::changelog::{Annotation, AnnotationStore, ChangeType};
use crate::core::context::RepoContext;
use crate::core::error::{RailError, RailResult};
use crate::discovery::{Discoverer, ModuleFinder};

/// Run the annotate command
pub fn run_annotate(
  ctx: &RepoContext,
  change_type: &str,
  description: String,
  modules: Vec<String>,
  collapse: bool,
) -> RailResult<()> {
  let parsed = ChangeType::parse(change_type);
  if parsed == ChangeType::Unknown {
    let known: Vec<_> = ChangeType::KNOWN.iter().map(|t| t.as_str()).collect();
    return Err(RailError::with_help(
      format!("Unknown change type '{}'", change_type),
      format!("Use one of: {}", known.join(", ")),
    ));
  }

  let mut discoverer = Discoverer::new(&ctx.root, ctx.config.release.fixture_dir.clone());
  discoverer.discover()?;
  let discovered = discoverer.modules_rel()?;
  if let Some(unknown) = modules.iter().find(|m| !discovered.contains_key(m.as_str())) {
    return Err(RailError::with_help(
      format!("'{}' is not a module directory", unknown),
      "Run `monotag modules` to list module directories.",
    ));
  }

  let mut annotation = Annotation::new(parsed, description, modules);
  annotation.collapse = collapse;

  let path = AnnotationStore::new(&ctx.root).write(&annotation)?;
  println!("{} ({}) {}", annotation.id, parsed.changelog_prefix(), path.display());
  Ok(())
}
