//! Generator configuration loaded from `apigen.toml`.
//!
//! The file is optional. When `--config` is not given, an `apigen.toml` next to
//! the annotated source is used if present; otherwise every key takes its
//! default:
//!
//! ```toml
//! auth_header = "X-Auth"
//! token_predicate = "super::check_token"
//! dispatch_fn = "serve_http"
//! format = false
//! rustfmt = "rustfmt"
//! ```
//!
//! `APIGEN_RUSTFMT_BIN` overrides `rustfmt` without touching the file.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the config file looked up next to the input source.
pub const CONFIG_FILE_NAME: &str = "apigen.toml";

/// Settings that shape the emitted code and the output step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Request header carrying the auth token
    pub auth_header: String,
    /// Path of a `fn(&str) -> bool` resolved from the generated module
    pub token_predicate: String,
    /// Name of the generated per-owner dispatch method
    pub dispatch_fn: String,
    /// Pipe the rendered file through rustfmt before writing
    pub format: bool,
    /// rustfmt binary
    pub rustfmt: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            auth_header: "X-Auth".to_string(),
            token_predicate: "super::check_token".to_string(),
            dispatch_fn: "serve_http".to_string(),
            format: false,
            rustfmt: "rustfmt".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Reject values that would render invalid Rust or an unusable header.
    pub fn validate(&self) -> anyhow::Result<()> {
        if http::HeaderName::from_bytes(self.auth_header.as_bytes()).is_err() {
            bail!("auth_header '{}' is not a valid HTTP header name", self.auth_header);
        }
        if syn::parse_str::<syn::Path>(&self.token_predicate).is_err() {
            bail!("token_predicate '{}' is not a Rust path", self.token_predicate);
        }
        if syn::parse_str::<syn::Ident>(&self.dispatch_fn).is_err() {
            bail!("dispatch_fn '{}' is not a Rust identifier", self.dispatch_fn);
        }
        if self.rustfmt.trim().is_empty() {
            bail!("rustfmt must name a binary");
        }
        Ok(())
    }

    /// Apply environment overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(bin) = std::env::var("APIGEN_RUSTFMT_BIN") {
            if !bin.trim().is_empty() {
                self.rustfmt = bin;
            }
        }
        self
    }
}

/// Parse and validate a config file.
pub fn load_config(path: &Path) -> anyhow::Result<GeneratorConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: GeneratorConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    Ok(config)
}

/// `apigen.toml` next to the input, if it exists.
pub fn auto_detect_config_path(input: &Path) -> Option<PathBuf> {
    let path = input.parent()?.join(CONFIG_FILE_NAME);
    path.exists().then_some(path)
}

/// Resolve the effective config.
///
/// An explicit path must exist. Without one, the auto-detected file is used,
/// then defaults. Environment overrides apply last.
pub fn resolve_config(explicit: Option<&Path>, input: &Path) -> anyhow::Result<GeneratorConfig> {
    let config = match explicit {
        Some(path) => load_config(path)?,
        None => match auto_detect_config_path(input) {
            Some(path) => load_config(&path)?,
            None => GeneratorConfig::default(),
        },
    };
    Ok(config.with_env())
}
