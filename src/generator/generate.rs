use super::emit::render;
use super::format::format_source;
use super::output::write_atomic;
use crate::config::GeneratorConfig;
use crate::spec::{module_name, parse_model, GenerationModel};
use crate::validation::compile_model;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::info;

/// Summary of one successful `generate_file` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub output: PathBuf,
    pub owners: usize,
    pub handlers: usize,
    pub validated_fields: usize,
    pub bytes: usize,
}

/// Runs the whole pipeline with one configuration.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Generator { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Compile and render a built model, formatting it when configured.
    pub fn render_model(&self, model: &GenerationModel) -> anyhow::Result<String> {
        let plan = compile_model(model);
        let code = render(model, &plan, &self.config)?;
        if self.config.format {
            return format_source(&code, &self.config.rustfmt);
        }
        Ok(code)
    }

    /// Render the handler file for annotated source text.
    pub fn render_source(&self, source: &str, module: &str) -> anyhow::Result<String> {
        let model = parse_model(source, module)?;
        self.render_model(&model)
    }

    /// Read `input`, render, and atomically write `output`.
    ///
    /// Every failure happens before the write, so a failed run leaves no
    /// output file behind (and an existing one untouched).
    pub fn generate_file(&self, input: &Path, output: &Path) -> anyhow::Result<GenerationReport> {
        let source = std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read source file: {}", input.display()))?;
        let model = parse_model(&source, &module_name(input))
            .with_context(|| format!("Failed to generate handlers for {}", input.display()))?;
        let code = self.render_model(&model)?;
        write_atomic(output, &code)?;

        let report = GenerationReport {
            output: output.to_path_buf(),
            owners: model.owners.len(),
            handlers: model.handlers().count(),
            validated_fields: model.shapes.values().map(|s| s.fields.len()).sum(),
            bytes: code.len(),
        };
        info!(
            input = %input.display(),
            output = %output.display(),
            handlers = report.handlers,
            fields = report.validated_fields,
            "generated handlers"
        );
        Ok(report)
    }
}
