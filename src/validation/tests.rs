#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::spec::parse_model;
use std::collections::HashMap;

fn string_field(name: &str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Str)
}

fn int_field(name: &str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Int(IntType::I32))
}

#[test]
fn test_steps_follow_fixed_order() {
    let mut spec = int_field("age");
    spec.max = Some(128);
    spec.min = Some(0);
    spec.enum_values = Some(vec!["1".into(), "2".into()]);
    spec.required = true;
    spec.default = Some(FieldValue::Int(1));

    let names: Vec<_> = compile_field(&spec).steps.iter().map(Step::name).collect();
    assert_eq!(names, ["coerce", "default", "required", "enum", "min", "max"]);
}

#[test]
fn test_string_fields_have_no_coercion() {
    let mut spec = string_field("login");
    spec.required = true;
    assert_eq!(compile_field(&spec).steps, vec![Step::Required]);
    assert!(compile_field(&string_field("note")).steps.is_empty());
}

#[test]
fn test_compilation_is_idempotent() {
    let model = parse_model(
        r#"
pub struct P {
    #[apivalidator("required,enum=a|b,min=1,max=2")]
    pub kind: String,
    #[apivalidator("default=3,max=5")]
    pub count: i64,
}
"#,
        "api",
    )
    .unwrap();
    assert_eq!(compile_model(&model), compile_model(&model));
}

#[test]
fn test_default_masks_required_for_empty_input() {
    let mut spec = string_field("status");
    spec.default = Some(FieldValue::Str("active".into()));
    spec.required = true;

    let pipeline = compile_field(&spec);
    assert_eq!(
        pipeline.evaluate("").unwrap(),
        FieldValue::Str("active".into())
    );
    assert_eq!(
        pipeline.evaluate("paused").unwrap(),
        FieldValue::Str("paused".into())
    );
}

#[test]
fn test_required_rejects_zero_values() {
    let mut login = string_field("login");
    login.required = true;
    let err = compile_field(&login).evaluate("").unwrap_err();
    assert_eq!(err.to_string(), "login must not be empty");

    let mut age = int_field("age");
    age.required = true;
    let pipeline = compile_field(&age);
    assert_eq!(pipeline.evaluate("").unwrap_err().to_string(), "age must not be empty");
    assert_eq!(pipeline.evaluate("0").unwrap_err().to_string(), "age must not be empty");
    assert_eq!(pipeline.evaluate("7").unwrap(), FieldValue::Int(7));
}

#[test]
fn test_coercion_failure_short_circuits() {
    let mut spec = FieldSpec::new("age", FieldKind::Int(IntType::I8));
    spec.required = true;
    let pipeline = compile_field(&spec);

    for raw in ["abc", "1.5", " 3", "300"] {
        let err = pipeline.evaluate(raw).unwrap_err();
        assert_eq!(err, Violation::NotInteger { field: "age".into() }, "{raw}");
        assert_eq!(err.to_string(), "age must be int");
    }
    assert_eq!(pipeline.evaluate("-12").unwrap(), FieldValue::Int(-12));
}

#[test]
fn test_enum_rejects_non_members_in_declared_order() {
    let mut spec = string_field("status");
    spec.enum_values = Some(vec!["test1".into(), "test2".into()]);
    let pipeline = compile_field(&spec);

    assert!(pipeline.evaluate("test2").is_ok());
    let err = pipeline.evaluate("test3").unwrap_err();
    assert_eq!(err.to_string(), "status must be one of [test1, test2]");
    assert!(pipeline.evaluate("").is_err());
}

#[test]
fn test_integer_enum_compares_rendered_value() {
    let mut spec = int_field("level");
    spec.enum_values = Some(vec!["1".into(), "5".into()]);
    let pipeline = compile_field(&spec);
    assert_eq!(pipeline.evaluate("5").unwrap(), FieldValue::Int(5));
    assert!(pipeline.evaluate("05").is_ok());
    assert!(pipeline.evaluate("4").is_err());
}

#[test]
fn test_string_bounds_compare_length() {
    let mut spec = string_field("login");
    spec.min = Some(10);
    spec.max = Some(12);
    let pipeline = compile_field(&spec);

    let err = pipeline.evaluate("short").unwrap_err();
    assert_eq!(err.to_string(), "login len must be >= 10");
    assert!(pipeline.evaluate("0123456789").is_ok());
    let err = pipeline.evaluate("0123456789abc").unwrap_err();
    assert_eq!(err.to_string(), "login len must be <= 12");
}

#[test]
fn test_integer_bounds_compare_value() {
    let mut spec = int_field("count");
    spec.max = Some(5);
    let pipeline = compile_field(&spec);

    assert_eq!(pipeline.evaluate("5").unwrap(), FieldValue::Int(5));
    let err = pipeline.evaluate("6").unwrap_err();
    assert_eq!(err.to_string(), "count must be <= 5");
}

#[test]
fn test_min_check_uses_minimum_not_maximum() {
    let mut spec = int_field("age");
    spec.min = Some(18);
    spec.max = Some(65);
    let pipeline = compile_field(&spec);

    assert_eq!(pipeline.steps[1], Step::Min(18));
    assert!(pipeline.evaluate("30").is_ok());
    let err = pipeline.evaluate("17").unwrap_err();
    assert_eq!(
        err,
        Violation::BelowMin {
            field: "age".into(),
            bound: 18,
            by_length: false,
        }
    );
}

#[test]
fn test_default_is_substituted_before_bounds() {
    let mut spec = int_field("limit");
    spec.default = Some(FieldValue::Int(20));
    spec.min = Some(1);
    let pipeline = compile_field(&spec);
    assert_eq!(pipeline.evaluate("").unwrap(), FieldValue::Int(20));
    assert_eq!(pipeline.evaluate("0").unwrap(), FieldValue::Int(20));
}

#[test]
fn test_validate_form_reads_source_params_and_stops_at_first_failure() {
    let model = parse_model(
        r#"
pub struct CreateParams {
    #[apivalidator("required")]
    pub login: String,
    #[apivalidator("paramname=full_name,required")]
    pub name: String,
    #[apivalidator("default=0,max=128")]
    pub age: i32,
}
"#,
        "api",
    )
    .unwrap();
    let plan = compile_model(&model);
    let pipelines = plan.for_shape("CreateParams");
    assert_eq!(pipelines.len(), 3);

    let form: HashMap<&str, &str> = [("login", "alice"), ("full_name", "Alice"), ("age", "30")]
        .into_iter()
        .collect();
    let values = validate_form(pipelines, |p| form.get(p).copied()).unwrap();
    assert_eq!(values[1], ("name".to_string(), FieldValue::Str("Alice".into())));
    assert_eq!(values[2], ("age".to_string(), FieldValue::Int(30)));

    let form: HashMap<&str, &str> = [("age", "999")].into_iter().collect();
    let err = validate_form(pipelines, |p| form.get(p).copied()).unwrap_err();
    assert_eq!(err.field(), "login");
}

#[test]
fn test_unknown_shape_has_empty_pipeline() {
    let plan = ValidationPlan::default();
    assert!(plan.for_shape("Missing").is_empty());
}

#[test]
fn test_step_display() {
    assert_eq!(Step::Coerce(IntType::I64).to_string(), "coerce(i64)");
    assert_eq!(Step::Default(FieldValue::Str("a b".into())).to_string(), "default(\"a b\")");
    assert_eq!(Step::Enum(vec!["a".into(), "b".into()]).to_string(), "enum[a|b]");
}

#[test]
fn test_revalidating_accepted_values_is_stable() {
    let model = parse_model(
        r#"
pub struct CreateParams {
    #[apivalidator("required,min=3,max=12")]
    pub login: String,
    #[apivalidator("enum=user|moderator|admin,default=user")]
    pub status: String,
    #[apivalidator("default=5,min=1,max=10")]
    pub limit: i32,
    #[apivalidator("enum=1|2|3,default=2")]
    pub level: i8,
    pub note: String,
}
"#,
        "api",
    )
    .unwrap();
    let plan = compile_model(&model);
    let pipelines = plan.for_shape("CreateParams");

    for raw in ["alice", "", "7", "moderator", "3"] {
        for pipeline in pipelines {
            if let Ok(value) = pipeline.evaluate(raw) {
                let again = pipeline.evaluate(&value.to_string());
                assert_eq!(again, Ok(value), "{} with {raw:?}", pipeline.field);
            }
        }
    }

    let form: HashMap<&str, &str> = [("login", "alice"), ("level", "3")].into_iter().collect();
    let first = validate_form(pipelines, |p| form.get(p).copied()).unwrap();
    let rendered: Vec<(String, String)> = pipelines
        .iter()
        .zip(&first)
        .map(|(pipeline, (_, value))| (pipeline.param.clone(), value.to_string()))
        .collect();
    let second = validate_form(pipelines, |p| {
        rendered
            .iter()
            .find(|(param, _)| param == p)
            .map(|(_, value)| value.as_str())
    })
    .unwrap();
    assert_eq!(first, second);
    assert_eq!(second[1].1, FieldValue::Str("user".into()));
    assert_eq!(second[2].1, FieldValue::Int(5));
}
