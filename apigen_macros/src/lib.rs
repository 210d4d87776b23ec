//! `#[derive(ApiParams)]` for parameter structs read by generated handlers.
//!
//! The derive registers `apivalidator` as a field attribute, so structs can
//! carry validation directives and still compile:
//!
//! ```rust,ignore
//! #[derive(Default, ApiParams)]
//! pub struct CreateParams {
//!     #[apivalidator("required,min=10")]
//!     pub login: String,
//!     #[apivalidator("paramname=full_name")]
//!     pub name: String,
//! }
//!
//! assert_eq!(CreateParams::PARAM_NAMES, &["login", "full_name"]);
//! ```
//!
//! `PARAM_NAMES` lists the request parameter each annotated field is read
//! from, in declaration order. Directive semantics are checked by the
//! generator, not here; this macro only rejects attributes it cannot read.

use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DeriveInput, Expr, ExprLit, Fields, Lit, LitStr, Meta};

const ATTR: &str = "apivalidator";

#[proc_macro_derive(ApiParams, attributes(apivalidator))]
pub fn derive_api_params(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "ApiParams can only be derived for structs",
        ));
    };

    let mut params = Vec::new();
    for field in &data.fields {
        let Some(directives) = directives(&field.attrs)? else {
            continue;
        };
        let Fields::Named(_) = &data.fields else {
            return Err(syn::Error::new_spanned(
                field,
                "#[apivalidator] requires a named field",
            ));
        };
        let default = field
            .ident
            .as_ref()
            .map(|ident| ident.unraw().to_string().to_lowercase())
            .unwrap_or_default();
        params.push(param_name(&directives).unwrap_or(default));
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            /// Request parameters read into the annotated fields, in declaration order.
            pub const PARAM_NAMES: &'static [&'static str] = &[#(#params),*];
        }
    })
}

/// Directive text of every `apivalidator` attribute on a field, comma-joined.
fn directives(attrs: &[syn::Attribute]) -> syn::Result<Option<String>> {
    let mut parts = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident(ATTR)) {
        let text = match &attr.meta {
            Meta::List(list) => list.parse_args::<LitStr>()?.value(),
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(lit), ..
                }) => lit.value(),
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "expected a string of directives",
                    ))
                }
            },
            Meta::Path(path) => {
                return Err(syn::Error::new_spanned(
                    path,
                    "expected #[apivalidator(\"...\")]",
                ))
            }
        };
        parts.push(text);
    }
    Ok((!parts.is_empty()).then(|| parts.join(",")))
}

/// Last `paramname=` override, if any.
fn param_name(directives: &str) -> Option<String> {
    directives
        .split(',')
        .filter_map(|d| d.trim().split_once('='))
        .filter(|(key, _)| key.trim() == "paramname")
        .map(|(_, value)| value.trim().to_string())
        .last()
}
