use askama::Template;

/// Per-handler data for the dispatch template
#[derive(Debug, Clone)]
pub struct HandlerView {
    /// Business method as written (may be a raw identifier)
    pub name: String,
    /// Generated per-handler method
    pub generated_fn: String,
    /// Route path as a Rust string literal
    pub path_literal: String,
    /// Whether the route is restricted to one method
    pub has_method: bool,
    /// `http::Method` associated constant, e.g. `POST`
    pub method: String,
    pub auth: bool,
    pub params_type: String,
    pub has_fields: bool,
    /// Rendered field validation blocks, in declaration order
    pub fields: Vec<String>,
    /// One-line doc for the generated method
    pub summary: String,
}

/// All routes of one owning type
#[derive(Debug, Clone)]
pub struct OwnerView {
    pub owner: String,
    pub context_type: String,
    pub handlers: Vec<HandlerView>,
}

/// The whole generated file
#[derive(Template)]
#[template(path = "api_handlers.rs.txt", escape = "none")]
pub struct ApiHandlersTemplate<'a> {
    pub module: &'a str,
    /// Route table lines for the header comment
    pub routes: Vec<String>,
    /// Header name as a Rust string literal
    pub auth_header: String,
    pub token_predicate: &'a str,
    pub dispatch_fn: &'a str,
    pub requires_auth: bool,
    pub reads_form: bool,
    pub owners: Vec<OwnerView>,
}

/// Read, validate and assign one field
#[derive(Template)]
#[template(path = "validation/field.rs.txt", escape = "none")]
pub struct FieldTemplate<'a> {
    pub field: &'a str,
    pub ident: &'a str,
    /// Prefix of the `_raw` / `_value` locals
    pub var: &'a str,
    pub param_literal: String,
    pub is_int: bool,
    pub steps: Vec<String>,
}

#[derive(Template)]
#[template(path = "validation/coerce.rs.txt", escape = "none")]
pub struct CoerceTemplate<'a> {
    pub var: &'a str,
    pub int_type: &'a str,
    pub message: String,
}

#[derive(Template)]
#[template(path = "validation/default.rs.txt", escape = "none")]
pub struct DefaultTemplate<'a> {
    pub var: &'a str,
    pub zero_check: String,
    pub default_expr: String,
}

#[derive(Template)]
#[template(path = "validation/required.rs.txt", escape = "none")]
pub struct RequiredTemplate {
    pub zero_check: String,
    pub message: String,
}

#[derive(Template)]
#[template(path = "validation/enum.rs.txt", escape = "none")]
pub struct EnumTemplate {
    /// Comma-separated string literals
    pub members: String,
    /// `&str` expression for the working value
    pub subject: String,
    pub message: String,
}

/// Shared by the min and max checks
#[derive(Template)]
#[template(path = "validation/bound.rs.txt", escape = "none")]
pub struct BoundTemplate {
    pub subject: String,
    pub op: &'static str,
    pub bound: i64,
    pub message: String,
}
