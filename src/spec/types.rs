use http::Method;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Route metadata decoded from an `apigen:api` doc marker.
///
/// Missing `auth` / `method` keys decode to `false` / `""`; unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteAnnotation {
    pub url: String,
    #[serde(default)]
    pub auth: bool,
    #[serde(default)]
    pub method: String,
}

/// Signed integer primitives accepted for integer fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntType {
    I8,
    I16,
    I32,
    I64,
    Isize,
}

impl IntType {
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "i8" => Some(IntType::I8),
            "i16" => Some(IntType::I16),
            "i32" => Some(IntType::I32),
            "i64" => Some(IntType::I64),
            "isize" => Some(IntType::Isize),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntType::I8 => "i8",
            IntType::I16 => "i16",
            IntType::I32 => "i32",
            IntType::I64 => "i64",
            IntType::Isize => "isize",
        }
    }

    /// Inclusive range representable by the type. `isize` is taken as 64-bit.
    pub fn range(&self) -> (i64, i64) {
        match self {
            IntType::I8 => (i8::MIN.into(), i8::MAX.into()),
            IntType::I16 => (i16::MIN.into(), i16::MAX.into()),
            IntType::I32 => (i32::MIN.into(), i32::MAX.into()),
            IntType::I64 | IntType::Isize => (i64::MIN, i64::MAX),
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        let (lo, hi) = self.range();
        (lo..=hi).contains(&value)
    }
}

/// Declared value kind of a validated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Int(IntType),
}

impl FieldKind {
    pub fn is_int(&self) -> bool {
        matches!(self, FieldKind::Int(_))
    }

    /// Rust type the generated working variable is declared with.
    pub fn rust_type(&self) -> &'static str {
        match self {
            FieldKind::Str => "String",
            FieldKind::Int(int) => int.as_str(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rust_type())
    }
}

/// A typed field value: defaults in the model, working values in evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
}

impl FieldValue {
    /// The kind's zero value: empty string or `0`.
    pub fn zero(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Str => FieldValue::Str(String::new()),
            FieldKind::Int(_) => FieldValue::Int(0),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            FieldValue::Str(s) => s.is_empty(),
            FieldValue::Int(n) => *n == 0,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => f.write_str(s),
            FieldValue::Int(n) => write!(f, "{n}"),
        }
    }
}

/// One validated field of a parameter struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name without a raw-identifier prefix
    pub name: String,
    /// Field identifier as written (`r#type` stays `r#type`)
    pub ident: String,
    pub kind: FieldKind,
    pub default: Option<FieldValue>,
    pub required: bool,
    /// Allowed values in declaration order; never empty when present
    pub enum_values: Option<Vec<String>>,
    pub param_name: Option<String>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    /// Directives that were not recognised and therefore ignored
    pub ignored: Vec<String>,
    pub line: usize,
}

impl FieldSpec {
    /// A field with no facets set.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        FieldSpec {
            ident: name.clone(),
            name,
            kind,
            default: None,
            required: false,
            enum_values: None,
            param_name: None,
            min: None,
            max: None,
            ignored: Vec::new(),
            line: 0,
        }
    }

    /// Request parameter the field is read from: the override, else the lowercased field name.
    pub fn source_param(&self) -> String {
        self.param_name
            .clone()
            .unwrap_or_else(|| self.name.to_lowercase())
    }
}

/// An annotated parameter struct and its validated fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamShapeSpec {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    pub line: usize,
}

/// One annotated handler method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSpec {
    pub owner: String,
    pub name: String,
    pub path: String,
    /// `None` accepts any method
    pub method: Option<Method>,
    pub auth: bool,
    /// Referent of the `&Context` argument, as source text
    pub context_type: String,
    /// Name of the parameter struct
    pub params_type: String,
    pub line: usize,
}

impl HandlerSpec {
    /// Name of the generated per-handler method.
    pub fn generated_fn(&self) -> String {
        format!("handle_{}", self.name.trim_start_matches("r#"))
    }

    pub fn method_label(&self) -> &str {
        self.method.as_ref().map_or("ANY", Method::as_str)
    }
}

/// All handlers of one owning type, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerRoutes {
    pub owner: String,
    pub context_type: String,
    pub handlers: Vec<HandlerSpec>,
    /// Associated fns and consts the source already defines on the owner;
    /// generated methods must not reuse these names
    pub defined_items: BTreeSet<String>,
}

/// Immutable snapshot consumed by the rule compiler and the emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationModel {
    /// Name of the annotated module the output is a child of
    pub module: String,
    pub owners: Vec<OwnerRoutes>,
    pub shapes: BTreeMap<String, ParamShapeSpec>,
}

impl GenerationModel {
    /// Validated shape for a handler's parameter type, if it has annotated fields.
    pub fn shape_for(&self, handler: &HandlerSpec) -> Option<&ParamShapeSpec> {
        self.shapes.get(&handler.params_type)
    }

    pub fn handlers(&self) -> impl Iterator<Item = &HandlerSpec> {
        self.owners.iter().flat_map(|o| o.handlers.iter())
    }

    pub fn requires_auth(&self) -> bool {
        self.handlers().any(|h| h.auth)
    }
}
