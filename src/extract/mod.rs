//! # Metadata Extractor
//!
//! Walks the top-level items of an annotated Rust module and pulls out the two
//! kinds of declarative metadata the generator understands:
//!
//! - **route markers** on handler methods, a doc line of the form
//!   `/// apigen:api {"url": "/user/profile", "auth": true, "method": "POST"}`
//! - **validation directives** on struct fields, written as
//!   `#[apivalidator("required,min=10")]`
//!
//! ```rust,ignore
//! impl MyApi {
//!     /// apigen:api {"url": "/user/profile", "auth": true}
//!     pub fn profile(&self, ctx: &Context, params: ProfileParams) -> Result<User, ApiError> {
//!         // ...
//!     }
//! }
//!
//! #[derive(Default, ApiParams)]
//! pub struct ProfileParams {
//!     #[apivalidator("required,min=10")]
//!     pub login: String,
//! }
//! ```
//!
//! Methods without the marker and structs without annotated fields are skipped.
//! Anything that carries a marker but does not decode is a fatal error.

mod fields;
mod route;

pub use fields::{parse_directives, Directive};
pub use route::decode_route;

use crate::error::{GenResult, GenerationError, SourceLocation};
use crate::spec::{HandlerSpec, ParamShapeSpec};
use quote::ToTokens;
use std::collections::{BTreeMap, BTreeSet};
use syn::spanned::Spanned;
use syn::Item;
use tracing::debug;

/// Doc-line prefix that marks a method as part of the generated API.
pub const ROUTE_MARKER: &str = "apigen:api";

/// Field attribute carrying validation directives.
pub const VALIDATOR_ATTR: &str = "apivalidator";

/// Everything the extractor found in one source file, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedSource {
    pub handlers: Vec<HandlerSpec>,
    pub shapes: Vec<ParamShapeSpec>,
    /// Names of inherent associated fns and consts, keyed by self type
    pub defined_items: BTreeMap<String, BTreeSet<String>>,
}

/// Parse Rust source text into a syntax tree.
pub fn parse_source(source: &str) -> GenResult<syn::File> {
    syn::parse_file(source).map_err(|err| {
        let start = err.span().start();
        GenerationError::MalformedSource {
            message: err.to_string(),
            line: start.line,
            column: start.column + 1,
        }
    })
}

/// Extract route-bearing handlers and annotated structs from a parsed file.
pub fn extract(file: &syn::File) -> GenResult<ExtractedSource> {
    let mut extracted = ExtractedSource::default();

    for item in &file.items {
        match item {
            Item::Impl(block) => {
                if let Some(owner) = route::inherent_owner(block) {
                    extracted
                        .defined_items
                        .entry(owner)
                        .or_default()
                        .extend(route::item_names(block));
                }
                extracted.handlers.extend(route::extract_impl(block)?);
            }
            Item::Fn(func) => {
                if route::route_marker(&func.attrs).is_some() {
                    return Err(GenerationError::mismatch(
                        SourceLocation::new(func.sig.ident.to_string(), line_of(&func.sig.ident)),
                        "route marker on a free function; handlers must be `&self` methods of an owning type",
                    ));
                }
            }
            Item::Struct(item) => match fields::extract_struct(item)? {
                Some(shape) => extracted.shapes.push(shape),
                None => debug!(name = %item.ident, "skipping struct without validation directives"),
            },
            _ => {}
        }
    }

    debug!(
        handlers = extracted.handlers.len(),
        shapes = extracted.shapes.len(),
        "extraction finished"
    );
    Ok(extracted)
}

/// 1-based line where a syntax node starts.
pub(crate) fn line_of<T: Spanned>(node: &T) -> usize {
    node.span().start().line
}

/// Source text of a type with the token spacing tidied up.
pub(crate) fn type_text<T: ToTokens>(ty: &T) -> String {
    ty.to_token_stream()
        .to_string()
        .replace(" :: ", "::")
        .replace(":: ", "::")
        .replace(" <", "<")
        .replace("< ", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
        .replace("& ", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_reports_position() {
        let Err(GenerationError::MalformedSource { line, .. }) = parse_source("struct Broken {")
        else {
            panic!("expected MalformedSource");
        };
        assert_eq!(line, 1);
    }

    #[test]
    fn test_free_function_with_marker_is_rejected() {
        let file = parse_source(
            r#"
/// apigen:api {"url": "/ping"}
pub fn ping(ctx: &Context, params: PingParams) -> Result<(), ApiError> { Ok(()) }
"#,
        )
        .unwrap();
        let err = extract(&file).unwrap_err();
        assert_eq!(err.kind(), "StructuralMismatch");
        assert!(err.to_string().contains("ping"));
    }

    #[test]
    fn test_nested_modules_are_not_inspected() {
        let file = parse_source(
            r#"
mod inner {
    impl Api {
        /// apigen:api {"url": "/hidden"}
        pub fn hidden(&self, ctx: &Ctx, params: P) -> Result<(), E> { Ok(()) }
    }
}
"#,
        )
        .unwrap();
        let extracted = extract(&file).unwrap();
        assert!(extracted.handlers.is_empty());
    }

    #[test]
    fn test_type_text_is_compact() {
        let ty: syn::Type = syn::parse_str("crate :: ctx :: Context < 'static >").unwrap();
        assert_eq!(type_text(&ty), "crate::ctx::Context<'static>");
    }
}
