//! Compute the release manifest

use crate::changelog::AnnotationStore;
use crate::core::context::RepoContext;
use crate::core::error::RailResult;
use crate::core::vcs::VersionControl;
use crate::discovery::Discoverer;
use crate::release::{
  Calculator, Clock, DefaultChangePolicy, Manifest, ModuleTags, SystemClock, build_release_manifest, next_release_id,
};
use std::path::Path;
use tracing::info;

/// Run the calculate command
pub fn run_calculate(ctx: &RepoContext, output: Option<&Path>, pretty: bool) -> RailResult<()> {
  let manifest = calculate_manifest(ctx, &SystemClock)?;

  match output {
    Some(path) => {
      manifest.save(path)?;
      if manifest.is_empty() {
        println!("No modules to release; wrote empty manifest to {}", path.display());
      } else {
        println!(
          "Release {}: {} module(s), wrote manifest to {}",
          manifest.id,
          manifest.modules.len(),
          path.display()
        );
      }
    }
    None => println!("{}", manifest.to_json(pretty)?),
  }

  Ok(())
}

/// Discover modules, read tags and annotations, and build the manifest
pub fn calculate_manifest(ctx: &RepoContext, clock: &dyn Clock) -> RailResult<Manifest> {
  let tag_list = ctx.git.list_tags()?;
  let tags = ModuleTags::parse(&tag_list);

  let mut discoverer = Discoverer::new(&ctx.root, ctx.config.release.fixture_dir.clone());
  discoverer.discover()?;

  let annotations = AnnotationStore::new(&ctx.root).load_all()?;
  let policy = DefaultChangePolicy::from_config(&ctx.config.release);

  let modules = Calculator {
    finder: &discoverer,
    tags: &tags,
    config: &ctx.config,
    annotations: &annotations,
    vcs: &ctx.git,
    policy: &policy,
  }
  .calculate()?;

  let id = next_release_id(&tag_list, clock);
  info!(id = %id, annotations = annotations.len(), "building release manifest");
  build_release_manifest(&id, &modules)
}
