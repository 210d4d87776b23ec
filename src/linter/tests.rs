#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::linter::{has_errors, lint_model, lint_source, LintIssue, LintSeverity};
use crate::spec::parse_model;
use std::io::Write;
use tempfile::NamedTempFile;

fn lint(source: &str) -> Vec<LintIssue> {
    lint_model(&parse_model(source, "api").unwrap())
}

fn kinds(issues: &[LintIssue]) -> Vec<&str> {
    issues.iter().map(|i| i.kind.as_str()).collect()
}

const HANDLER: &str = r#"
impl MyApi {
    /// apigen:api {"url": "/user/profile"}
    pub fn profile(&self, ctx: &Context, params: ProfileParams) -> Result<User, ApiError> {
        unimplemented!()
    }
}
"#;

#[test]
fn test_lint_clean_module() {
    let source = format!(
        "{HANDLER}\npub struct ProfileParams {{ #[apivalidator(\"required,min=3\")] pub login: String }}"
    );
    assert!(lint(&source).is_empty());
}

#[test]
fn test_lint_default_masks_required() {
    let source = format!(
        "{HANDLER}\npub struct ProfileParams {{ #[apivalidator(\"required,default=guest\")] pub login: String }}"
    );
    let issues = lint(&source);
    assert_eq!(kinds(&issues), ["default_masks_required"]);
    assert_eq!(issues[0].severity, LintSeverity::Warning);
    assert_eq!(issues[0].location, "ProfileParams.login");
    assert!(issues[0].suggestion.is_some());
    assert!(!has_errors(&issues));
}

#[test]
fn test_lint_default_is_zero() {
    let source = format!(
        "{HANDLER}\npub struct ProfileParams {{ #[apivalidator(\"default=0\")] pub page: i32 }}"
    );
    assert_eq!(kinds(&lint(&source)), ["default_is_zero"]);
}

#[test]
fn test_lint_default_violates_rules() {
    let source = format!(
        "{HANDLER}\npub struct ProfileParams {{\n\
         #[apivalidator(\"enum=user|admin,default=guest\")] pub status: String,\n\
         #[apivalidator(\"default=5,min=10\")] pub limit: i64,\n}}"
    );
    let issues = lint(&source);
    assert_eq!(kinds(&issues), ["default_violates_rules", "default_violates_rules"]);
    assert!(issues[0].message.contains("status must be one of [user, admin]"));
    assert!(issues[1].message.contains("limit must be >= 10"));
    assert!(has_errors(&issues));
}

#[test]
fn test_lint_unknown_directive() {
    let source = format!(
        "{HANDLER}\npub struct ProfileParams {{ #[apivalidator(\"required,trim\")] pub login: String }}"
    );
    let issues = lint(&source);
    assert_eq!(kinds(&issues), ["unknown_directive"]);
    assert!(issues[0].message.contains("`trim`"));
}

#[test]
fn test_lint_paths() {
    let source = r#"
impl MyApi {
    /// apigen:api {"url": "user/profile"}
    pub fn profile(&self, ctx: &Context, params: P) -> Result<User, ApiError> { unimplemented!() }

    /// apigen:api {"url": "/user/find?id=1"}
    pub fn find(&self, ctx: &Context, params: P) -> Result<User, ApiError> { unimplemented!() }
}
pub struct P { #[apivalidator("required")] pub id: String }
"#;
    let issues = lint(source);
    assert_eq!(kinds(&issues), ["path_without_slash", "path_with_query"]);
    assert_eq!(issues[0].location, "MyApi::profile");
    assert_eq!(issues[0].suggestion.as_deref(), Some("use \"/user/profile\""));
}

#[test]
fn test_lint_unvalidated_params_is_info() {
    let issues = lint(HANDLER);
    assert_eq!(kinds(&issues), ["unvalidated_params"]);
    assert_eq!(issues[0].severity, LintSeverity::Info);
    assert!(!has_errors(&issues));
}

#[test]
fn test_lint_source_reports_fatal_errors() {
    let mut temp = NamedTempFile::with_suffix(".rs").expect("create temp file");
    temp.write_all(b"impl A { /// apigen:api {\"url\": 1}\nfn a(&self, c: &C, p: P) -> R { x } }")
        .expect("write source");
    temp.flush().expect("flush");
    let err = lint_source(temp.path()).unwrap_err();
    assert!(err.to_string().contains("MalformedAnnotation"));
}
