//! Unit tests for CLI commands

use crate::cli::{describe_model, Cli, Commands};
use crate::logging::LogFormat;
use crate::spec::parse_model;
use crate::validation::compile_model;
use clap::Parser;

#[test]
fn test_generate_command_parses() {
    let cli = Cli::try_parse_from([
        "apigen", "generate", "--input", "src/api.rs", "--output", "out.rs", "--format",
    ])
    .unwrap();

    match cli.command {
        Commands::Generate {
            input,
            output,
            config,
            format,
            dry_run,
        } => {
            assert_eq!(input.to_string_lossy(), "src/api.rs");
            assert_eq!(output.unwrap().to_string_lossy(), "out.rs");
            assert!(config.is_none());
            assert!(format);
            assert!(!dry_run);
        }
        other => panic!("Expected Generate command, got {other:?}"),
    }
}

#[test]
fn test_generate_requires_output_unless_dry_run() {
    assert!(Cli::try_parse_from(["apigen", "generate", "--input", "a.rs"]).is_err());
    let cli = Cli::try_parse_from(["apigen", "generate", "--input", "a.rs", "--dry-run"]).unwrap();
    assert!(matches!(cli.command, Commands::Generate { dry_run: true, output: None, .. }));
}

#[test]
fn test_lint_command_with_flags() {
    let cli = Cli::try_parse_from([
        "apigen",
        "lint",
        "--input",
        "api.rs",
        "--fail-on-warning",
        "--errors-only",
    ])
    .unwrap();

    match cli.command {
        Commands::Lint {
            input,
            fail_on_error,
            fail_on_warning,
            errors_only,
        } => {
            assert_eq!(input.to_string_lossy(), "api.rs");
            assert!(!fail_on_error);
            assert!(fail_on_warning);
            assert!(errors_only);
        }
        other => panic!("Expected Lint command, got {other:?}"),
    }
}

#[test]
fn test_global_log_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "apigen", "inspect", "--input", "api.rs", "--log-level", "debug", "--log-format", "json",
    ])
    .unwrap();
    let config = cli.log_config();
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.format, LogFormat::Json);
}

#[test]
fn test_describe_model_lists_routes_and_steps() {
    let model = parse_model(
        r#"
impl MyApi {
    /// apigen:api {"url": "/user/create", "auth": true, "method": "POST"}
    pub fn create(&self, ctx: &Context, params: CreateParams) -> Result<User, ApiError> {
        unimplemented!()
    }
}
pub struct CreateParams {
    #[apivalidator("required,min=10")]
    pub login: String,
    #[apivalidator("paramname=years,default=18,max=128")]
    pub age: i32,
}
"#,
        "api",
    )
    .unwrap();
    let text = describe_model(&model, &compile_model(&model));

    assert!(text.starts_with("module api\n"));
    assert!(text.contains("MyApi (context: Context)"));
    assert!(text.contains("  POST   /user/create -> create(CreateParams) [auth]"));
    assert!(text.contains("      login <- \"login\": required -> min(10)"));
    assert!(text.contains("      age <- \"years\": coerce(i32) -> default(18) -> max(128)"));
}
