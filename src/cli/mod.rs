//! # CLI Module
//!
//! Command-line front end of the generator, shipped as the `apigen` binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Render the handler file for an annotated module:
//!
//! ```bash
//! apigen generate --input src/api.rs --output src/api_handlers.rs
//! ```
//!
//! Options:
//! - `--input <FILE>` - Annotated Rust source (required)
//! - `--output <FILE>` - Destination, written atomically (required unless `--dry-run`)
//! - `--config <FILE>` - `apigen.toml` (default: next to the input, if present)
//! - `--format` - Run rustfmt over the output
//! - `--dry-run` - Print the generated code instead of writing it
//!
//! ### `lint`
//!
//! Report annotations that generate but probably misbehave:
//!
//! ```bash
//! apigen lint --input src/api.rs --fail-on-error
//! ```
//!
//! ### `inspect`
//!
//! Print the route table and the compiled validation steps:
//!
//! ```bash
//! apigen inspect --input src/api.rs
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use apigen::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! run_cli(cli)?;
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{describe_model, run_cli, Cli, Commands};
