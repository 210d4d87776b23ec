//! # Validation Rule Compiler
//!
//! Turns each [`FieldSpec`] into a [`FieldPipeline`]: the ordered list of
//! checks the emitter renders into the generated handler. The order is fixed
//! because every step may replace the working value the next one reads:
//!
//! 1. **coerce** the raw string into the declared integer type (integer fields only)
//! 2. **default** replaces a zero value (empty string, `0`) with the declared default
//! 3. **required** rejects a value that is still zero
//! 4. **enum** rejects a value that is not one of the declared members
//! 5. **min** rejects a value (or string length) below the bound
//! 6. **max** rejects a value (or string length) above the bound
//!
//! Only declared steps are present. The first failing step stops the field and
//! the whole handler; the generated code answers with a bad request.
//!
//! Declaring both `default` and `required` makes the required check
//! unreachable for empty input, since the default is substituted first. The
//! order is kept and the linter reports the combination.
//!
//! [`FieldPipeline::evaluate`] runs the same steps in-process. The generated
//! code and the evaluator produce the same messages (see [`Violation`]).

use crate::spec::{FieldKind, FieldSpec, FieldValue, GenerationModel, IntType, ParamShapeSpec};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// One check or transform of a field pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Coerce(IntType),
    Default(FieldValue),
    Required,
    Enum(Vec<String>),
    Min(i64),
    Max(i64),
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Coerce(_) => "coerce",
            Step::Default(_) => "default",
            Step::Required => "required",
            Step::Enum(_) => "enum",
            Step::Min(_) => "min",
            Step::Max(_) => "max",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Coerce(int) => write!(f, "coerce({})", int.as_str()),
            Step::Default(FieldValue::Str(s)) => write!(f, "default({s:?})"),
            Step::Default(FieldValue::Int(n)) => write!(f, "default({n})"),
            Step::Required => f.write_str("required"),
            Step::Enum(members) => write!(f, "enum[{}]", members.join("|")),
            Step::Min(bound) => write!(f, "min({bound})"),
            Step::Max(bound) => write!(f, "max({bound})"),
        }
    }
}

/// Why a field value was rejected. `Display` gives the message placed in the
/// `error` member of the response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    NotInteger {
        field: String,
    },
    Empty {
        field: String,
    },
    NotInEnum {
        field: String,
        allowed: Vec<String>,
    },
    BelowMin {
        field: String,
        bound: i64,
        /// The bound applies to a string length
        by_length: bool,
    },
    AboveMax {
        field: String,
        bound: i64,
        by_length: bool,
    },
}

impl Violation {
    pub fn field(&self) -> &str {
        match self {
            Violation::NotInteger { field }
            | Violation::Empty { field }
            | Violation::NotInEnum { field, .. }
            | Violation::BelowMin { field, .. }
            | Violation::AboveMax { field, .. } => field,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = |by_length: bool| if by_length { " len" } else { "" };
        match self {
            Violation::NotInteger { field } => write!(f, "{field} must be int"),
            Violation::Empty { field } => write!(f, "{field} must not be empty"),
            Violation::NotInEnum { field, allowed } => {
                write!(f, "{field} must be one of [{}]", allowed.join(", "))
            }
            Violation::BelowMin {
                field,
                bound,
                by_length,
            } => write!(f, "{field}{} must be >= {bound}", len(*by_length)),
            Violation::AboveMax {
                field,
                bound,
                by_length,
            } => write!(f, "{field}{} must be <= {bound}", len(*by_length)),
        }
    }
}

/// Compiled checks for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPipeline {
    /// Field name used in messages
    pub field: String,
    /// Field identifier as written in the struct
    pub ident: String,
    /// Request parameter the raw value is read from
    pub param: String,
    pub kind: FieldKind,
    pub steps: Vec<Step>,
}

impl FieldPipeline {
    /// Run every step against a raw request value (`""` when absent).
    pub fn evaluate(&self, raw: &str) -> Result<FieldValue, Violation> {
        self.steps
            .iter()
            .try_fold(FieldValue::Str(raw.to_owned()), |value, step| {
                self.apply(step, value)
            })
    }

    fn apply(&self, step: &Step, value: FieldValue) -> Result<FieldValue, Violation> {
        let field = || self.field.clone();
        match step {
            Step::Coerce(int) => coerce(*int, value).ok_or_else(|| Violation::NotInteger {
                field: field(),
            }),
            Step::Default(default) if value.is_zero() => Ok(default.clone()),
            Step::Default(_) => Ok(value),
            Step::Required if value.is_zero() => Err(Violation::Empty { field: field() }),
            Step::Required => Ok(value),
            Step::Enum(allowed) => {
                let text = value.to_string();
                if allowed.iter().any(|member| *member == text) {
                    Ok(value)
                } else {
                    Err(Violation::NotInEnum {
                        field: field(),
                        allowed: allowed.clone(),
                    })
                }
            }
            Step::Min(bound) if measure(&value) < *bound => Err(Violation::BelowMin {
                field: field(),
                bound: *bound,
                by_length: !self.kind.is_int(),
            }),
            Step::Max(bound) if measure(&value) > *bound => Err(Violation::AboveMax {
                field: field(),
                bound: *bound,
                by_length: !self.kind.is_int(),
            }),
            Step::Min(_) | Step::Max(_) => Ok(value),
        }
    }
}

/// Empty input coerces to `0`; anything else must parse and fit the type.
fn coerce(int: IntType, value: FieldValue) -> Option<FieldValue> {
    match value {
        FieldValue::Str(raw) if raw.is_empty() => Some(FieldValue::Int(0)),
        FieldValue::Str(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|n| int.contains(*n))
            .map(FieldValue::Int),
        already => Some(already),
    }
}

fn measure(value: &FieldValue) -> i64 {
    match value {
        FieldValue::Str(s) => i64::try_from(s.len()).unwrap_or(i64::MAX),
        FieldValue::Int(n) => *n,
    }
}

/// Compile one field into its ordered pipeline.
pub fn compile_field(spec: &FieldSpec) -> FieldPipeline {
    let mut steps = Vec::new();

    if let FieldKind::Int(int) = spec.kind {
        steps.push(Step::Coerce(int));
    }
    if let Some(default) = &spec.default {
        steps.push(Step::Default(default.clone()));
    }
    if spec.required {
        steps.push(Step::Required);
    }
    if let Some(members) = &spec.enum_values {
        steps.push(Step::Enum(members.clone()));
    }
    if let Some(min) = spec.min {
        steps.push(Step::Min(min));
    }
    if let Some(max) = spec.max {
        steps.push(Step::Max(max));
    }

    FieldPipeline {
        field: spec.name.clone(),
        ident: spec.ident.clone(),
        param: spec.source_param(),
        kind: spec.kind,
        steps,
    }
}

pub fn compile_shape(shape: &ParamShapeSpec) -> Vec<FieldPipeline> {
    shape.fields.iter().map(compile_field).collect()
}

/// Compiled pipelines of every parameter struct, keyed by struct name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationPlan {
    pub pipelines: BTreeMap<String, Vec<FieldPipeline>>,
}

impl ValidationPlan {
    /// Pipelines for a parameter struct; empty when it has no annotated fields.
    pub fn for_shape(&self, name: &str) -> &[FieldPipeline] {
        self.pipelines.get(name).map_or(&[], Vec::as_slice)
    }
}

/// Compile every shape of the model.
pub fn compile_model(model: &GenerationModel) -> ValidationPlan {
    let pipelines: BTreeMap<_, _> = model
        .shapes
        .values()
        .map(|shape| (shape.name.clone(), compile_shape(shape)))
        .collect();
    debug!(
        shapes = pipelines.len(),
        steps = pipelines.values().flatten().map(|p| p.steps.len()).sum::<usize>(),
        "compiled validation plan"
    );
    ValidationPlan { pipelines }
}

/// Validate a whole parameter set, stopping at the first violation.
///
/// `lookup` returns the raw request value of a parameter; absent parameters
/// are evaluated as `""`.
pub fn validate_form<'a, F>(
    pipelines: &[FieldPipeline],
    lookup: F,
) -> Result<Vec<(String, FieldValue)>, Violation>
where
    F: Fn(&str) -> Option<&'a str>,
{
    pipelines
        .iter()
        .map(|pipeline| {
            let raw = lookup(&pipeline.param).unwrap_or_default();
            pipeline
                .evaluate(raw)
                .map(|value| (pipeline.field.clone(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests;
