use super::build::build_model;
use super::types::GenerationModel;
use crate::error::GenResult;
use crate::extract::{extract, parse_source};
use anyhow::Context;
use std::path::Path;

/// Module name of a source file: its stem, or the directory name for `mod.rs`.
pub fn module_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem == "mod" {
        if let Some(dir) = path.parent().and_then(Path::file_name) {
            return dir.to_string_lossy().into_owned();
        }
    }
    stem
}

/// Parse, extract and build in one step.
pub fn parse_model(source: &str, module: &str) -> GenResult<GenerationModel> {
    let file = parse_source(source)?;
    let extracted = extract(&file)?;
    build_model(module, extracted)
}

/// Read an annotated source file and build its model.
pub fn load_model(path: &Path) -> anyhow::Result<GenerationModel> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read source file: {}", path.display()))?;
    let model = parse_model(&source, &module_name(path))?;
    Ok(model)
}
