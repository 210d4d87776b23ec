//! # apigen
//!
//! **apigen** turns an annotated Rust module into HTTP handler code. Handler
//! methods carry a route marker in their doc comment, and parameter structs
//! carry per-field validation directives:
//!
//! ```rust,ignore
//! impl MyApi {
//!     /// apigen:api {"url": "/user/profile", "auth": true}
//!     pub fn profile(&self, ctx: &Context, params: ProfileParams) -> Result<User, ApiError> {
//!         // ...
//!     }
//! }
//!
//! #[derive(Default, ApiParams)]
//! pub struct ProfileParams {
//!     #[apivalidator("required,min=10")]
//!     pub login: String,
//! }
//! ```
//!
//! From that, the generator emits a child module with one dispatch method per
//! owning type, plus one handler per route that checks the method and the auth
//! token, validates and fills the parameter struct, calls the business method,
//! and wraps the outcome in a `{ "response": ..., "error": "..." }` envelope.
//!
//! ## Architecture
//!
//! ```text
//! source.rs ─► extract ─► spec ─► validation ─► generator ─► api_handlers.rs
//!              (syn)      model   pipelines     (askama)
//! ```
//!
//! - **[`extract`]** - parses the source with `syn` and collects route markers
//!   and field directives
//! - **[`spec`]** - builds the immutable [`GenerationModel`], grouping routes
//!   by owning type and detecting route conflicts
//! - **[`validation`]** - compiles each field into its ordered check pipeline
//! - **[`generator`]** - renders the file and writes it atomically
//! - **[`linter`]** - non-fatal diagnostics over a model
//! - **[`config`]** - `apigen.toml` settings
//! - **[`cli`]** - the `apigen` binary
//!
//! Every fatal problem is a [`GenerationError`]; nothing is written when one
//! occurs.
//!
//! ## Build Script Usage
//!
//! ```rust,ignore
//! // build.rs
//! fn main() -> anyhow::Result<()> {
//!     println!("cargo:rerun-if-changed=src/api.rs");
//!     let out = std::path::PathBuf::from(std::env::var("OUT_DIR")?).join("api_handlers.rs");
//!     apigen::Generator::default().generate_file("src/api.rs".as_ref(), &out)?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod generator;
pub mod linter;
pub mod logging;
pub mod spec;
pub mod validation;

pub use config::GeneratorConfig;
pub use error::{GenResult, GenerationError, SourceLocation};
pub use generator::{GenerationReport, Generator};
pub use spec::{load_model, parse_model, GenerationModel};
