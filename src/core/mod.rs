//! Core building blocks shared by every command
//!
//! - **config**: modman.toml parsing and validation
//! - **context**: repository context built once in main
//! - **error**: error types with exit codes and help messages
//! - **vcs**: git access (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
