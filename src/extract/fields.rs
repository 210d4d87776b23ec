use super::{line_of, type_text, VALIDATOR_ATTR};
use crate::error::{GenResult, GenerationError, SourceLocation};
use crate::spec::{FieldKind, FieldSpec, FieldValue, IntType, ParamShapeSpec};
use syn::{Attribute, Expr, ExprLit, ItemStruct, Lit, LitStr, Meta, Type};
use tracing::debug;

/// One entry of a comma-separated `apivalidator` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Required,
    ParamName(String),
    Enum(Vec<String>),
    Default(String),
    Min(i64),
    Max(i64),
    /// Unrecognised directive, kept verbatim
    Unknown(String),
}

/// Split a directive string into typed directives.
///
/// Unknown directives are returned as [`Directive::Unknown`]; the error string
/// describes the first directive that is recognised but malformed.
pub fn parse_directives(text: &str) -> Result<Vec<Directive>, String> {
    let mut directives = Vec::new();

    for raw in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (key, value) = match raw.split_once('=') {
            Some((key, value)) => (key.trim(), Some(value)),
            None => (raw, None),
        };

        let directive = match (key, value) {
            ("required", None) => Directive::Required,
            ("required", Some(_)) => return Err("`required` takes no value".into()),
            ("paramname" | "enum" | "default" | "min" | "max", None) => {
                return Err(format!("`{key}` expects a value"))
            }
            (_, Some(value)) if is_known(key) && value.trim().is_empty() => {
                return Err(format!("`{key}` expects a value"))
            }
            ("paramname", Some(value)) => Directive::ParamName(value.trim().to_owned()),
            ("enum", Some(value)) => {
                let members: Vec<String> = value.split('|').map(|m| m.trim().to_owned()).collect();
                if members.iter().any(String::is_empty) {
                    return Err(format!("`enum` has an empty member in '{}'", value.trim()));
                }
                Directive::Enum(members)
            }
            ("default", Some(value)) => Directive::Default(value.to_owned()),
            ("min", Some(value)) => Directive::Min(parse_bound(key, value)?),
            ("max", Some(value)) => Directive::Max(parse_bound(key, value)?),
            _ => Directive::Unknown(raw.to_owned()),
        };
        directives.push(directive);
    }

    Ok(directives)
}

fn is_known(key: &str) -> bool {
    matches!(key, "paramname" | "enum" | "default" | "min" | "max")
}

fn parse_bound(key: &str, value: &str) -> Result<i64, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("`{key}` expects an integer, found '{}'", value.trim()))
}

/// Build the shape of a struct, or `None` when no field is annotated.
pub(crate) fn extract_struct(item: &ItemStruct) -> GenResult<Option<ParamShapeSpec>> {
    let shape_name = item.ident.to_string();
    let mut fields = Vec::new();

    for (index, field) in item.fields.iter().enumerate() {
        let Some(text) = validator_text(&field.attrs, &shape_name)? else {
            continue;
        };

        let Some(ident) = &field.ident else {
            return Err(GenerationError::mismatch(
                SourceLocation::new(format!("{shape_name}.{index}"), line_of(field)),
                "validation directives require a named field",
            ));
        };
        let name = syn::ext::IdentExt::unraw(ident).to_string();
        let location = SourceLocation::new(format!("{shape_name}.{name}"), line_of(ident));

        let kind = field_kind(&field.ty).ok_or_else(|| GenerationError::UnsupportedFieldKind {
            location: location.clone(),
            ty: type_text(&field.ty),
        })?;
        let directives = parse_directives(&text)
            .map_err(|reason| GenerationError::malformed(location.clone(), &text, reason))?;

        let mut spec = build_field(name, kind, directives, &location, &text)?;
        spec.ident = ident.to_string();
        spec.line = location.line;
        fields.push(spec);
    }

    if fields.is_empty() {
        return Ok(None);
    }

    Ok(Some(ParamShapeSpec {
        name: shape_name,
        fields,
        line: line_of(&item.ident),
    }))
}

/// Joined directive text of every `apivalidator` attribute on a field.
fn validator_text(attrs: &[Attribute], shape: &str) -> GenResult<Option<String>> {
    let mut parts = Vec::new();

    for attr in attrs.iter().filter(|a| a.path().is_ident(VALIDATOR_ATTR)) {
        let text = match &attr.meta {
            Meta::List(list) => list.parse_args::<LitStr>().ok().map(|lit| lit.value()),
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(lit), ..
                }) => Some(lit.value()),
                _ => None,
            },
            Meta::Path(_) => None,
        };
        match text {
            Some(text) => parts.push(text),
            None => {
                return Err(GenerationError::malformed(
                    SourceLocation::new(shape, line_of(attr)),
                    type_text(&attr.meta),
                    "expected `#[apivalidator(\"...\")]` with a string of directives",
                ))
            }
        }
    }

    Ok(if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    })
}

fn field_kind(ty: &Type) -> Option<FieldKind> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if !segment.arguments.is_none() {
        return None;
    }
    let ident = segment.ident.to_string();
    if ident == "String" {
        return Some(FieldKind::Str);
    }
    if path.path.segments.len() == 1 {
        return IntType::from_ident(&ident).map(FieldKind::Int);
    }
    None
}

fn build_field(
    name: String,
    kind: FieldKind,
    directives: Vec<Directive>,
    location: &SourceLocation,
    text: &str,
) -> GenResult<FieldSpec> {
    let malformed = |reason: String| GenerationError::malformed(location.clone(), text, reason);
    let mut spec = FieldSpec::new(name, kind);

    for directive in directives {
        match directive {
            Directive::Required => spec.required = true,
            Directive::ParamName(param) => spec.param_name = Some(param),
            Directive::Enum(members) => spec.enum_values = Some(members),
            Directive::Default(raw) => {
                spec.default = Some(match kind {
                    FieldKind::Str => FieldValue::Str(raw),
                    FieldKind::Int(int) => {
                        let value: i64 = raw.trim().parse().map_err(|_| {
                            malformed(format!("`default` expects an integer for {kind} fields"))
                        })?;
                        if !int.contains(value) {
                            return Err(malformed(format!("`default` {value} does not fit {kind}")));
                        }
                        FieldValue::Int(value)
                    }
                });
            }
            Directive::Min(bound) => spec.min = Some(bound),
            Directive::Max(bound) => spec.max = Some(bound),
            Directive::Unknown(raw) => {
                debug!(field = %location, directive = %raw, "ignoring unknown directive");
                spec.ignored.push(raw);
            }
        }
    }

    for (key, bound) in [("min", spec.min), ("max", spec.max)] {
        let Some(bound) = bound else { continue };
        match kind {
            FieldKind::Str if bound < 0 => {
                return Err(malformed(format!(
                    "`{key}` bounds the length of a string and cannot be negative"
                )))
            }
            FieldKind::Int(int) if !int.contains(bound) => {
                return Err(malformed(format!("`{key}` {bound} does not fit {kind}")))
            }
            _ => {}
        }
    }
    if let (Some(min), Some(max)) = (spec.min, spec.max) {
        if min > max {
            return Err(malformed(format!("`min` {min} is greater than `max` {max}")));
        }
    }

    Ok(spec)
}
