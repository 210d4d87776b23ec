//! # Code Emitter
//!
//! Renders the handler file from a [`GenerationModel`](crate::spec::GenerationModel)
//! and its compiled [`ValidationPlan`](crate::validation::ValidationPlan).
//!
//! ## Generated File
//!
//! The output is a child module of the annotated module. It starts with
//! `use super::*;` and spells every other path out in full, so it can be
//! included from a build script without further imports:
//!
//! ```rust,ignore
//! pub mod handlers {
//!     include!(concat!(env!("OUT_DIR"), "/api_handlers.rs"));
//! }
//! ```
//!
//! It contains, in order:
//!
//! 1. `ApiResponse`, the `{ "response": ..., "error": "..." }` envelope
//! 2. `ApiFailure`, the trait business errors implement to pick a status code
//! 3. private helpers for encoding, reading form values and checking the token
//! 4. one `impl Owner` block per owning type with the dispatch method
//!    (`serve_http` by default) and one `handle_<name>` method per route
//!
//! Each `handle_<name>` method runs, in order: method check (406 `bad method`),
//! auth check (403 `unauthorized`), field validation (400 with the violation
//! message), then the business call. `Ok` becomes a 200 envelope; `Err` uses
//! `ApiFailure::status`. Unmatched paths get 404 `unknown method`.
//!
//! ## Templates
//!
//! Askama templates under `templates/` are compiled into the binary. Field
//! checks are rendered one step at a time (`templates/validation/`) and
//! spliced into the handler template.

mod emit;
mod format;
mod generate;
mod output;
mod templates;

pub use emit::render;
pub use format::format_source;
pub use generate::{GenerationReport, Generator};
pub use output::write_atomic;
