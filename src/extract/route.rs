use super::{line_of, type_text, ROUTE_MARKER};
use crate::error::{GenResult, GenerationError, SourceLocation};
use crate::spec::{HandlerSpec, RouteAnnotation};
use http::Method;
use syn::ext::IdentExt;
use syn::{Attribute, Expr, ExprLit, FnArg, ImplItem, ImplItemFn, ItemImpl, Lit, Meta, ReturnType, Type};
use tracing::debug;

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// Payload of the first `apigen:api` doc line, if any.
pub(crate) fn route_marker(attrs: &[Attribute]) -> Option<String> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(text),
                    ..
                }) => Some(text.value()),
                _ => None,
            },
            _ => None,
        })
        .flat_map(|doc| doc.lines().map(str::to_owned).collect::<Vec<_>>())
        .find_map(|line| {
            let rest = line.trim_start().strip_prefix(ROUTE_MARKER)?;
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                Some(rest.trim().to_owned())
            } else {
                None
            }
        })
}

/// Decode a marker payload into `(path, method, auth)`.
pub fn decode_route(
    payload: &str,
    location: &SourceLocation,
) -> GenResult<(String, Option<Method>, bool)> {
    let annotation: RouteAnnotation = serde_json::from_str(payload).map_err(|err| {
        GenerationError::malformed(location.clone(), payload, format!("invalid route payload: {err}"))
    })?;

    if annotation.url.is_empty() {
        return Err(GenerationError::malformed(
            location.clone(),
            payload,
            "`url` must not be empty",
        ));
    }
    if annotation.url.chars().any(char::is_control) {
        return Err(GenerationError::malformed(
            location.clone(),
            payload,
            "`url` must not contain control characters",
        ));
    }

    let method = if annotation.method.is_empty() {
        None
    } else {
        let upper = annotation.method.to_ascii_uppercase();
        let method = ALLOWED_METHODS
            .iter()
            .find(|m| m.as_str() == upper)
            .cloned()
            .ok_or_else(|| {
                GenerationError::malformed(
                    location.clone(),
                    payload,
                    format!(
                        "unsupported method '{}', expected one of GET, POST, PUT, PATCH, DELETE or empty",
                        annotation.method
                    ),
                )
            })?;
        Some(method)
    };

    Ok((annotation.url, method, annotation.auth))
}

/// Collect every marked method of one `impl` block.
pub(crate) fn extract_impl(block: &ItemImpl) -> GenResult<Vec<HandlerSpec>> {
    let mut handlers = Vec::new();

    for item in &block.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let Some(payload) = route_marker(&method.attrs) else {
            debug!(name = %method.sig.ident, "skipping method without route marker");
            continue;
        };

        let owner = owner_name(block, method)?;
        let location = SourceLocation::new(
            format!("{owner}::{}", method.sig.ident),
            line_of(&method.sig.ident),
        );
        let (path, http_method, auth) = decode_route(&payload, &location)?;
        let (context_type, params_type) = handler_arguments(method, &location)?;

        debug!(%owner, handler = %method.sig.ident, %path, "found handler");
        handlers.push(HandlerSpec {
            owner,
            name: method.sig.ident.to_string(),
            path,
            method: http_method,
            auth,
            context_type,
            params_type,
            line: location.line,
        });
    }

    Ok(handlers)
}

/// Self type name of an inherent `impl` block, if it names a type by path.
pub(crate) fn inherent_owner(block: &ItemImpl) -> Option<String> {
    if block.trait_.is_some() {
        return None;
    }
    let Type::Path(path) = block.self_ty.as_ref() else {
        return None;
    };
    path.path.segments.last().map(|s| s.ident.to_string())
}

/// Names of the associated fns and consts declared in an `impl` block.
pub(crate) fn item_names(block: &ItemImpl) -> impl Iterator<Item = String> + '_ {
    block.items.iter().filter_map(|item| match item {
        ImplItem::Fn(method) => Some(method.sig.ident.unraw().to_string()),
        ImplItem::Const(constant) => Some(constant.ident.unraw().to_string()),
        _ => None,
    })
}

fn owner_name(block: &ItemImpl, method: &ImplItemFn) -> GenResult<String> {
    let location = || SourceLocation::new(method.sig.ident.to_string(), line_of(&method.sig.ident));

    if !block.generics.params.is_empty() {
        return Err(GenerationError::mismatch(
            location(),
            "handlers cannot live in a generic impl block",
        ));
    }
    let Type::Path(path) = block.self_ty.as_ref() else {
        return Err(GenerationError::mismatch(
            location(),
            format!("owning type `{}` is not a named type", type_text(&block.self_ty)),
        ));
    };
    match path.path.segments.last() {
        Some(segment) if path.qself.is_none() && segment.arguments.is_none() => {
            Ok(segment.ident.to_string())
        }
        _ => Err(GenerationError::mismatch(
            location(),
            format!(
                "owning type `{}` must be a plain type name",
                type_text(&block.self_ty)
            ),
        )),
    }
}

/// Check the `(&self, ctx: &Context, params: Params) -> R` convention and
/// return the context and parameter type names.
fn handler_arguments(method: &ImplItemFn, location: &SourceLocation) -> GenResult<(String, String)> {
    let sig = &method.sig;
    let fail = |reason: String| Err(GenerationError::mismatch(location.clone(), reason));

    if sig.asyncness.is_some() {
        return fail("handlers must be synchronous".into());
    }
    if !sig.generics.params.is_empty() {
        return fail("handlers cannot be generic".into());
    }

    let mut inputs = sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(receiver))
            if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => return fail("handlers must take `&self` as their first argument".into()),
    }

    let typed: Vec<&Type> = inputs
        .filter_map(|arg| match arg {
            FnArg::Typed(pat) => Some(pat.ty.as_ref()),
            FnArg::Receiver(_) => None,
        })
        .collect();
    let [context, params] = typed.as_slice() else {
        return fail(format!(
            "handlers take exactly two arguments after `&self` (context, params), found {}",
            typed.len()
        ));
    };

    let context_type = match context {
        Type::Reference(reference) if reference.mutability.is_none() => type_text(&reference.elem),
        other => {
            return fail(format!(
                "context argument must be a shared reference, found `{}`",
                type_text(*other)
            ))
        }
    };

    let params_type = match params {
        Type::Path(path)
            if path.qself.is_none()
                && path.path.segments.len() == 1
                && path.path.segments[0].arguments.is_none() =>
        {
            path.path.segments[0].ident.to_string()
        }
        other => {
            return fail(format!(
                "params argument must be an owned struct named in this module, found `{}`",
                type_text(*other)
            ))
        }
    };

    if matches!(sig.output, ReturnType::Default) {
        return fail("handlers must return a `Result`".into());
    }

    Ok((context_type, params_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{extract, parse_source};

    fn handlers(source: &str) -> GenResult<Vec<HandlerSpec>> {
        let file = parse_source(source)?;
        Ok(extract(&file)?.handlers)
    }

    #[test]
    fn test_marker_payload_is_found_among_docs() {
        let found = handlers(
            r#"
impl MyApi {
    /// Fetches the profile.
    ///
    /// apigen:api {"url": "/user/profile", "auth": true, "method": "post"}
    pub fn profile(&self, ctx: &Context, params: ProfileParams) -> Result<User, ApiError> {
        todo!()
    }

    /// Not exported.
    pub fn helper(&self) {}
}
"#,
        )
        .unwrap();
        assert_eq!(found.len(), 1);
        let h = &found[0];
        assert_eq!(h.owner, "MyApi");
        assert_eq!(h.name, "profile");
        assert_eq!(h.path, "/user/profile");
        assert_eq!(h.method, Some(Method::POST));
        assert!(h.auth);
        assert_eq!(h.context_type, "Context");
        assert_eq!(h.params_type, "ProfileParams");
        assert_eq!(h.line, 6);
    }

    #[test]
    fn test_marker_requires_separator() {
        let attrs: Vec<Attribute> = vec![syn::parse_quote!(#[doc = " apigen:apix {}"])];
        assert!(route_marker(&attrs).is_none());
        let attrs: Vec<Attribute> = vec![syn::parse_quote!(#[doc = " apigen:api {\"url\":\"/a\"}"])];
        assert_eq!(route_marker(&attrs).as_deref(), Some("{\"url\":\"/a\"}"));
    }

    #[test]
    fn test_missing_optional_keys_default() {
        let loc = SourceLocation::new("Api::f", 1);
        let (path, method, auth) = decode_route(r#"{"url": "/x", "extra": 1}"#, &loc).unwrap();
        assert_eq!(path, "/x");
        assert_eq!(method, None);
        assert!(!auth);
    }

    #[test]
    fn test_malformed_payload_is_fatal() {
        let loc = SourceLocation::new("Api::f", 1);
        let err = decode_route(r#"{"url": "/x", "auth": "yes"}"#, &loc).unwrap_err();
        assert_eq!(err.kind(), "MalformedAnnotation");
        let err = decode_route("{url: /x}", &loc).unwrap_err();
        assert_eq!(err.kind(), "MalformedAnnotation");
        let err = decode_route(r#"{"url": ""}"#, &loc).unwrap_err();
        assert!(err.to_string().contains("`url` must not be empty"));
        let err = decode_route(r#"{"url": "/x", "method": "TRACE"}"#, &loc).unwrap_err();
        assert!(err.to_string().contains("unsupported method"));
    }

    #[test]
    fn test_control_characters_in_url_are_rejected() {
        let loc = SourceLocation::new("Api::f", 1);
        for payload in [
            r#"{"url": "/a\nfn broken("}"#,
            r#"{"url": "/a\rb"}"#,
            r#"{"url": "/a\u0000"}"#,
        ] {
            let err = decode_route(payload, &loc).unwrap_err();
            assert_eq!(err.kind(), "MalformedAnnotation", "{payload}");
            assert!(err.to_string().contains("control characters"));
        }
        assert!(decode_route(r#"{"url": "/a/*b*/\"c"}"#, &loc).is_ok());
    }

    #[test]
    fn test_inherent_item_names() {
        let block: ItemImpl = syn::parse_quote! {
            impl MyApi {
                const LIMIT: usize = 3;
                fn r#handle_x(&self) {}
                type Ignored = ();
            }
        };
        assert_eq!(inherent_owner(&block).as_deref(), Some("MyApi"));
        assert_eq!(item_names(&block).collect::<Vec<_>>(), ["LIMIT", "handle_x"]);

        let block: ItemImpl = syn::parse_quote! {
            impl Display for MyApi {}
        };
        assert!(inherent_owner(&block).is_none());
    }

    #[test]
    fn test_convention_violations() {
        let cases = [
            ("pub fn f(self, ctx: &Ctx, p: P) -> Result<(), E> { Ok(()) }", "`&self`"),
            ("pub fn f(&mut self, ctx: &Ctx, p: P) -> Result<(), E> { Ok(()) }", "`&self`"),
            ("pub fn f(&self, p: P) -> Result<(), E> { Ok(()) }", "exactly two"),
            ("pub fn f(&self, ctx: Ctx, p: P) -> Result<(), E> { Ok(()) }", "shared reference"),
            ("pub fn f(&self, ctx: &Ctx, p: &P) -> Result<(), E> { Ok(()) }", "owned struct"),
            ("pub fn f(&self, ctx: &Ctx, p: Vec<P>) -> Result<(), E> { Ok(()) }", "owned struct"),
            ("pub fn f(&self, ctx: &Ctx, p: P) { }", "`Result`"),
            ("pub async fn f(&self, ctx: &Ctx, p: P) -> Result<(), E> { Ok(()) }", "synchronous"),
        ];
        for (method, expected) in cases {
            let source = format!("impl Api {{\n/// apigen:api {{\"url\": \"/f\"}}\n{method}\n}}");
            let err = handlers(&source).unwrap_err();
            assert_eq!(err.kind(), "StructuralMismatch", "{method}");
            assert!(err.to_string().contains(expected), "{method}: {err}");
        }
    }

    #[test]
    fn test_generic_owner_is_rejected() {
        let err = handlers(
            r#"
impl<T> Api<T> {
    /// apigen:api {"url": "/f"}
    pub fn f(&self, ctx: &Ctx, p: P) -> Result<(), E> { Ok(()) }
}
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("generic impl"));
    }
}
