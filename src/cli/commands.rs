use crate::config::resolve_config;
use crate::generator::Generator;
use crate::linter::{has_errors, lint_source, print_lint_issues, LintSeverity};
use crate::logging::{LogConfig, LogFormat};
use crate::spec::{load_model, GenerationModel};
use crate::validation::{compile_model, ValidationPlan};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface for apigen
#[derive(Parser, Debug)]
#[command(name = "apigen")]
#[command(about = "Generate HTTP handlers from annotated Rust modules", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true, env = "APIGEN_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format: pretty or json
    #[arg(long, global = true, env = "APIGEN_LOG_FORMAT")]
    pub log_format: Option<String>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Logging settings: environment first, flags on top.
    pub fn log_config(&self) -> LogConfig {
        let mut config = LogConfig::from_env();
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = LogFormat::parse(format);
        }
        config
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the handler file for an annotated module
    Generate {
        /// Annotated Rust source file
        #[arg(short, long)]
        input: PathBuf,

        /// Generated file to write
        #[arg(short, long, required_unless_present = "dry_run")]
        output: Option<PathBuf>,

        /// Path to apigen.toml (default: next to the input, if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Run rustfmt over the generated code
        #[arg(long, default_value_t = false)]
        format: bool,

        /// Print the generated code instead of writing it
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Lint the annotations of a module
    Lint {
        /// Annotated Rust source file
        #[arg(short, long)]
        input: PathBuf,

        /// Exit with an error if any errors are found
        #[arg(long, default_value_t = false)]
        fail_on_error: bool,

        /// Exit with an error if any errors or warnings are found
        #[arg(long, default_value_t = false)]
        fail_on_warning: bool,

        /// Show only errors
        #[arg(long, default_value_t = false)]
        errors_only: bool,
    },
    /// Print routes and compiled validation steps
    Inspect {
        /// Annotated Rust source file
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Run a parsed command line. Logging is installed by the caller.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            input,
            output,
            config,
            format,
            dry_run,
        } => {
            let mut config = resolve_config(config.as_deref(), &input)?;
            config.format |= format;
            let generator = Generator::new(config);

            if dry_run {
                let model = load_model(&input)?;
                print!("{}", generator.render_model(&model)?);
                return Ok(());
            }

            let output = output.context("--output is required unless --dry-run is set")?;
            let report = generator.generate_file(&input, &output)?;
            println!(
                "✅ Generated {} handler(s) across {} type(s), {} validated field(s) → {}",
                report.handlers,
                report.owners,
                report.validated_fields,
                report.output.display()
            );
            Ok(())
        }
        Commands::Lint {
            input,
            fail_on_error,
            fail_on_warning,
            errors_only,
        } => {
            let mut issues = lint_source(&input)?;
            if errors_only {
                issues.retain(|i| i.severity == LintSeverity::Error);
            }
            print_lint_issues(&issues);

            let warnings = issues
                .iter()
                .filter(|i| i.severity == LintSeverity::Warning)
                .count();
            if (fail_on_error || fail_on_warning) && has_errors(&issues) {
                bail!("lint found errors in {}", input.display());
            }
            if fail_on_warning && warnings > 0 {
                bail!("lint found {warnings} warning(s) in {}", input.display());
            }
            Ok(())
        }
        Commands::Inspect { input } => {
            let model = load_model(&input)?;
            let plan = compile_model(&model);
            print!("{}", describe_model(&model, &plan));
            Ok(())
        }
    }
}

/// Human-readable route table and validation steps.
pub fn describe_model(model: &GenerationModel, plan: &ValidationPlan) -> String {
    let mut lines = vec![format!("module {}", model.module)];

    for owner in &model.owners {
        lines.push(String::new());
        lines.push(format!("{} (context: {})", owner.owner, owner.context_type));
        for handler in &owner.handlers {
            lines.push(format!(
                "  {:<6} {} -> {}({}){}",
                handler.method_label(),
                handler.path,
                handler.name,
                handler.params_type,
                if handler.auth { " [auth]" } else { "" }
            ));
            let pipelines = model
                .shape_for(handler)
                .map_or(&[][..], |shape| plan.for_shape(&shape.name));
            for pipeline in pipelines {
                let steps: Vec<String> = pipeline.steps.iter().map(ToString::to_string).collect();
                let steps = if steps.is_empty() {
                    "(no checks)".to_string()
                } else {
                    steps.join(" -> ")
                };
                lines.push(format!("      {} <- {:?}: {steps}", pipeline.field, pipeline.param));
            }
        }
    }

    lines.push(String::new());
    lines.join("\n")
}
