mod changelog;
mod commands;
mod core;
mod discovery;
mod logging;
mod modfile;
mod release;

use clap::{Parser, Subcommand};
use core::error::{RailError, print_error};
use logging::{LogFormat, LogLevel};
use std::path::PathBuf;

/// Calculate and tag releases of independently versioned modules in a monorepo
#[derive(Parser)]
#[command(name = "monotag")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Run as if started in this directory
  #[arg(short = 'C', global = true, value_name = "DIR")]
  directory: Option<PathBuf>,

  /// Minimum log level (overridden by RUST_LOG)
  #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
  log_level: LogLevel,

  /// Log output format
  #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
  log_format: LogFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// List discovered modules and their sub-modules
  Modules {
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Calculate the release manifest
  Calculate {
    /// Write the manifest to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Indent the JSON printed to stdout
    #[arg(long)]
    pretty: bool,
  },

  /// Commit a calculated release and create its tags
  Tag {
    /// Manifest written by `monotag calculate`
    #[arg(long, value_name = "FILE")]
    manifest: PathBuf,
    /// Show the tags without changing anything
    #[arg(long)]
    dry_run: bool,
  },

  /// Record a change annotation under .changelog/
  Annotate {
    /// Change type: feature, bugfix, release, dependency, documentation, announcement
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    change_type: String,
    /// Changelog description
    #[arg(short, long)]
    description: String,
    /// Module directory the change applies to (repeatable)
    #[arg(short, long = "module", value_name = "DIR", required = true)]
    modules: Vec<String>,
    /// Collapse into a single entry when listed across modules
    #[arg(long)]
    collapse: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  if let Err(e) = logging::init(cli.log_level, cli.log_format) {
    handle_error(e);
  }

  let dir = match cli.directory {
    Some(dir) => dir,
    None => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => handle_error(RailError::from(e).context("Failed to get current directory")),
    },
  };

  // Build repository context once (git, config)
  let ctx = match core::context::RepoContext::build(&dir) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Modules { json } => commands::run_modules(&ctx, json),
    Commands::Calculate { output, pretty } => commands::run_calculate(&ctx, output.as_deref(), pretty),
    Commands::Tag { manifest, dry_run } => commands::run_tag(&ctx, &manifest, dry_run),
    Commands::Annotate {
      change_type,
      description,
      modules,
      collapse,
    } => commands::run_annotate(&ctx, &change_type, description, modules, collapse),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: RailError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
