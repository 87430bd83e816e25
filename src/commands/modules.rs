//! List the modules of the repository

use crate::core::context::RepoContext;
use crate::core::error::RailResult;
use crate::discovery::{Discoverer, ModuleFinder};
use crate::modfile::{self, MODULE_FILE};
use serde::Serialize;

#[derive(Serialize)]
struct ModuleListing {
  dir: String,
  module_path: String,
  submodules: Vec<String>,
}

/// Run the modules command
pub fn run_modules(ctx: &RepoContext, json: bool) -> RailResult<()> {
  let mut discoverer = Discoverer::new(&ctx.root, ctx.config.release.fixture_dir.clone());
  discoverer.discover()?;

  let mut listings = Vec::new();
  for (dir, submodules) in discoverer.modules_rel()? {
    let module_dir = if dir == "." { ctx.root.clone() } else { ctx.root.join(&dir) };
    let file = modfile::load_module_file(&module_dir)?;
    listings.push(ModuleListing {
      module_path: file.module_path(&module_dir.join(MODULE_FILE))?.to_string(),
      dir,
      submodules,
    });
  }

  if json {
    println!("{}", serde_json::to_string_pretty(&listings)?);
    return Ok(());
  }

  if listings.is_empty() {
    println!("No modules found under {}", ctx.root.display());
    return Ok(());
  }

  for listing in &listings {
    let config = ctx.config.module(&listing.dir);
    let mut flags = Vec::new();
    if config.no_tag {
      flags.push("no-tag".to_string());
    }
    if !config.pre_release.is_empty() {
      flags.push(format!("pre-release: {}", config.pre_release));
    }

    if flags.is_empty() {
      println!("{}  {}", listing.dir, listing.module_path);
    } else {
      println!("{}  {}  [{}]", listing.dir, listing.module_path, flags.join(", "));
    }
    for sub in &listing.submodules {
      println!("  └─ {}", sub);
    }
  }

  Ok(())
}
