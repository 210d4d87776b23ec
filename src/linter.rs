//! # Annotation Linter
//!
//! Non-fatal diagnostics over a built [`GenerationModel`]. Generation succeeds
//! with any of these present; the linter points out annotations that compile
//! into code which cannot behave the way the author probably meant.
//!
//! ## Checks Performed
//!
//! 1. **default_masks_required** - `default` is substituted before `required`,
//!    so the required check never fires for empty input
//! 2. **default_is_zero** - a default equal to the zero value changes nothing
//! 3. **default_violates_rules** - the default itself fails the field's enum or bounds
//! 4. **unknown_directive** - directives the generator ignored
//! 5. **path_without_slash** - the route can never match a request path
//! 6. **path_with_query** - `?` or `#` in a route path never matches
//! 7. **unvalidated_params** - a handler whose parameter struct has no annotated fields
//!
//! ## Usage
//!
//! ```rust,ignore
//! use apigen::linter::{lint_source, print_lint_issues};
//!
//! let issues = lint_source(Path::new("src/api.rs"))?;
//! print_lint_issues(&issues);
//! ```

use crate::spec::{load_model, FieldSpec, GenerationModel};
use crate::validation::compile_field;
use std::fmt;
use std::path::Path;
use tracing::warn;

#[cfg(test)]
mod tests;

/// Severity level for lint issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Generated code cannot work as annotated
    Error,
    /// Generated code works but likely not as intended
    Warning,
    /// Worth knowing
    Info,
}

impl fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LintSeverity::Error => "error",
            LintSeverity::Warning => "warning",
            LintSeverity::Info => "info",
        })
    }
}

/// A lint issue found in an annotated module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintIssue {
    /// Where the issue occurred (e.g. `MyApi::profile`, `ProfileParams.login`)
    pub location: String,
    pub severity: LintSeverity,
    /// Check that produced the issue (e.g. `default_masks_required`)
    pub kind: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl LintIssue {
    pub fn new(
        location: impl Into<String>,
        severity: LintSeverity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        LintIssue {
            location: location.into(),
            severity,
            kind: kind.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Load an annotated source file and lint it.
///
/// Fatal extraction errors are returned as errors, not as issues.
pub fn lint_source(path: &Path) -> anyhow::Result<Vec<LintIssue>> {
    let model = load_model(path)?;
    Ok(lint_model(&model))
}

/// Run every check over a built model.
pub fn lint_model(model: &GenerationModel) -> Vec<LintIssue> {
    let mut issues = Vec::new();

    for handler in model.handlers() {
        let location = format!("{}::{}", handler.owner, handler.name);
        if !handler.path.starts_with('/') {
            issues.push(
                LintIssue::new(
                    &location,
                    LintSeverity::Error,
                    "path_without_slash",
                    format!("route path '{}' does not start with '/'", handler.path),
                )
                .with_suggestion(format!("use \"/{}\"", handler.path)),
            );
        }
        if handler.path.contains(|c| c == '?' || c == '#') {
            issues.push(LintIssue::new(
                &location,
                LintSeverity::Error,
                "path_with_query",
                format!(
                    "route path '{}' contains a query or fragment; only the path is matched",
                    handler.path
                ),
            ));
        }
        if model.shape_for(handler).is_none() {
            issues.push(LintIssue::new(
                &location,
                LintSeverity::Info,
                "unvalidated_params",
                format!(
                    "`{}` has no #[apivalidator] fields; the handler receives `Default::default()`",
                    handler.params_type
                ),
            ));
        }
    }

    for shape in model.shapes.values() {
        for field in &shape.fields {
            lint_field(&mut issues, &format!("{}.{}", shape.name, field.name), field);
        }
    }

    for issue in issues.iter().filter(|i| i.severity != LintSeverity::Info) {
        warn!(kind = %issue.kind, location = %issue.location, "{}", issue.message);
    }
    issues
}

fn lint_field(issues: &mut Vec<LintIssue>, location: &str, field: &FieldSpec) {
    if let Some(default) = &field.default {
        if field.required {
            issues.push(
                LintIssue::new(
                    location,
                    LintSeverity::Warning,
                    "default_masks_required",
                    "`default` is applied before `required`, so empty input never fails",
                )
                .with_suggestion("drop one of `default` or `required`"),
            );
        }
        if default.is_zero() {
            issues.push(LintIssue::new(
                location,
                LintSeverity::Warning,
                "default_is_zero",
                format!("default `{default}` equals the zero value and has no effect"),
            ));
        }
        if let Err(violation) = compile_field(field).evaluate("") {
            issues.push(LintIssue::new(
                location,
                LintSeverity::Error,
                "default_violates_rules",
                format!("empty input is rejected even with the default applied: {violation}"),
            ));
        }
    }

    for directive in &field.ignored {
        issues.push(
            LintIssue::new(
                location,
                LintSeverity::Warning,
                "unknown_directive",
                format!("directive `{directive}` is not recognised and was ignored"),
            )
            .with_suggestion("known directives: required, paramname, enum, default, min, max"),
        );
    }
}

/// True when any issue is an error.
pub fn has_errors(issues: &[LintIssue]) -> bool {
    issues.iter().any(|i| i.severity == LintSeverity::Error)
}

/// Print lint issues grouped by severity
pub fn print_lint_issues(issues: &[LintIssue]) {
    if issues.is_empty() {
        println!("✅ No lint issues found!");
        return;
    }

    let count = |severity| issues.iter().filter(|i| i.severity == severity).count();
    println!("\n📋 Lint Results:");
    println!(
        "   {} error(s), {} warning(s), {} info(s)\n",
        count(LintSeverity::Error),
        count(LintSeverity::Warning),
        count(LintSeverity::Info)
    );

    for (severity, heading) in [
        (LintSeverity::Error, "❌ Errors (must fix):"),
        (LintSeverity::Warning, "⚠️  Warnings (should fix):"),
        (LintSeverity::Info, "ℹ️  Info:"),
    ] {
        if count(severity) == 0 {
            continue;
        }
        println!("{heading}");
        for issue in issues.iter().filter(|i| i.severity == severity) {
            println!("   [{}] {}", issue.kind, issue.location);
            println!("      {}", issue.message);
            if let Some(suggestion) = &issue.suggestion {
                println!("      💡 Suggestion: {suggestion}");
            }
        }
        println!();
    }
}
