use super::templates::{
    ApiHandlersTemplate, BoundTemplate, CoerceTemplate, DefaultTemplate, EnumTemplate,
    FieldTemplate, HandlerView, OwnerView, RequiredTemplate,
};
use crate::config::GeneratorConfig;
use crate::error::{GenResult, GenerationError};
use crate::spec::{FieldKind, FieldValue, GenerationModel, HandlerSpec, OwnerRoutes};
use crate::validation::{FieldPipeline, Step, ValidationPlan, Violation};
use askama::Template;
use std::collections::HashSet;
use tracing::debug;

/// Render the complete handler file.
///
/// The output depends only on the arguments. Nothing is written here; callers
/// decide whether and where the buffered text goes.
pub fn render(
    model: &GenerationModel,
    plan: &ValidationPlan,
    config: &GeneratorConfig,
) -> GenResult<String> {
    check_consistency(model, plan, config)?;

    let owners = model
        .owners
        .iter()
        .map(|owner| owner_view(model, plan, owner))
        .collect::<GenResult<Vec<_>>>()?;
    let reads_form = owners
        .iter()
        .flat_map(|owner| &owner.handlers)
        .any(|handler| handler.has_fields);

    let template = ApiHandlersTemplate {
        module: &model.module,
        routes: route_lines(model),
        auth_header: literal(&config.auth_header),
        token_predicate: &config.token_predicate,
        dispatch_fn: &config.dispatch_fn,
        requires_auth: model.requires_auth(),
        reads_form,
        owners,
    };
    let mut code = render_template(&template, "api_handlers")?;
    if !code.ends_with('\n') {
        code.push('\n');
    }
    debug!(module = %model.module, bytes = code.len(), "rendered handler file");
    Ok(code)
}

fn render_template<T: Template>(template: &T, name: &str) -> GenResult<String> {
    template.render().map_err(|err| {
        GenerationError::inconsistent(format!("template `{name}` failed to render: {err}"))
    })
}

/// Rust string literal for arbitrary text.
fn literal(text: &str) -> String {
    format!("{text:?}")
}

fn owner_view(
    model: &GenerationModel,
    plan: &ValidationPlan,
    owner: &OwnerRoutes,
) -> GenResult<OwnerView> {
    let handlers = owner
        .handlers
        .iter()
        .map(|handler| {
            let pipelines = match model.shape_for(handler) {
                Some(shape) => plan.for_shape(&shape.name),
                None => &[],
            };
            handler_view(handler, pipelines)
        })
        .collect::<GenResult<Vec<_>>>()?;

    Ok(OwnerView {
        owner: owner.owner.clone(),
        context_type: owner.context_type.clone(),
        handlers,
    })
}

fn handler_view(handler: &HandlerSpec, pipelines: &[FieldPipeline]) -> GenResult<HandlerView> {
    let fields = pipelines
        .iter()
        .map(render_field)
        .collect::<GenResult<Vec<_>>>()?;
    let auth = if handler.auth { ", auth required" } else { "" };

    Ok(HandlerView {
        name: handler.name.clone(),
        generated_fn: handler.generated_fn(),
        path_literal: literal(&handler.path),
        has_method: handler.method.is_some(),
        method: handler.method_label().to_string(),
        auth: handler.auth,
        params_type: handler.params_type.clone(),
        has_fields: !fields.is_empty(),
        fields,
        summary: format!(
            "`{} {}` calls `{}`{auth}.",
            handler.method_label(),
            handler.path,
            handler.name
        ),
    })
}

fn route_lines(model: &GenerationModel) -> Vec<String> {
    let owner_width = model.owners.iter().map(|o| o.owner.len()).max().unwrap_or(0);
    let path_width = model.handlers().map(|h| h.path.len()).max().unwrap_or(0);

    model
        .owners
        .iter()
        .flat_map(|owner| {
            owner.handlers.iter().map(move |h| {
                let line = format!(
                    "{:<owner_width$}  {:<6}  {:<path_width$}  -> {}{}",
                    owner.owner,
                    h.method_label(),
                    h.path,
                    h.name,
                    if h.auth { " (auth)" } else { "" },
                );
                line.trim_end().to_string()
            })
        })
        .collect()
}

fn render_field(pipeline: &FieldPipeline) -> GenResult<String> {
    let steps = pipeline
        .steps
        .iter()
        .map(|step| render_step(pipeline, step))
        .collect::<GenResult<Vec<_>>>()?;

    let template = FieldTemplate {
        field: &pipeline.field,
        ident: &pipeline.ident,
        var: &pipeline.field,
        param_literal: literal(&pipeline.param),
        is_int: pipeline.kind.is_int(),
        steps,
    };
    Ok(render_template(&template, "field")?.trim_end().to_string())
}

fn render_step(pipeline: &FieldPipeline, step: &Step) -> GenResult<String> {
    let var = pipeline.field.as_str();
    let value = format!("{var}_value");
    let field = pipeline.field.clone();
    let by_length = !pipeline.kind.is_int();
    let message = |violation: Violation| literal(&violation.to_string());
    let zero_check = match pipeline.kind {
        FieldKind::Str => format!("{value}.is_empty()"),
        FieldKind::Int(_) => format!("{value} == 0"),
    };
    let bound_subject = match pipeline.kind {
        FieldKind::Str => format!("{value}.len()"),
        FieldKind::Int(_) => value.clone(),
    };

    let rendered = match step {
        Step::Coerce(int) => render_template(
            &CoerceTemplate {
                var,
                int_type: int.as_str(),
                message: message(Violation::NotInteger { field }),
            },
            "coerce",
        )?,
        Step::Default(default) => {
            let default_expr = match (pipeline.kind, default) {
                (FieldKind::Str, FieldValue::Str(text)) => {
                    format!("::std::string::String::from({})", literal(text))
                }
                (FieldKind::Int(_), FieldValue::Int(n)) => n.to_string(),
                _ => {
                    return Err(GenerationError::inconsistent(format!(
                        "default of `{var}` does not match its kind {}",
                        pipeline.kind
                    )))
                }
            };
            render_template(
                &DefaultTemplate {
                    var,
                    zero_check,
                    default_expr,
                },
                "default",
            )?
        }
        Step::Required => render_template(
            &RequiredTemplate {
                zero_check,
                message: message(Violation::Empty { field }),
            },
            "required",
        )?,
        Step::Enum(allowed) => {
            let subject = match pipeline.kind {
                FieldKind::Str => format!("{value}.as_str()"),
                FieldKind::Int(_) => format!("{value}.to_string().as_str()"),
            };
            render_template(
                &EnumTemplate {
                    members: allowed
                        .iter()
                        .map(|member| literal(member))
                        .collect::<Vec<_>>()
                        .join(", "),
                    subject,
                    message: message(Violation::NotInEnum {
                        field,
                        allowed: allowed.clone(),
                    }),
                },
                "enum",
            )?
        }
        Step::Min(bound) => render_template(
            &BoundTemplate {
                subject: bound_subject,
                op: "<",
                bound: *bound,
                message: message(Violation::BelowMin {
                    field,
                    bound: *bound,
                    by_length,
                }),
            },
            "min",
        )?,
        Step::Max(bound) => render_template(
            &BoundTemplate {
                subject: bound_subject,
                op: ">",
                bound: *bound,
                message: message(Violation::AboveMax {
                    field,
                    bound: *bound,
                    by_length,
                }),
            },
            "max",
        )?,
    };
    Ok(rendered.trim_end().to_string())
}

fn step_rank(step: &Step) -> u8 {
    match step {
        Step::Coerce(_) => 0,
        Step::Default(_) => 1,
        Step::Required => 2,
        Step::Enum(_) => 3,
        Step::Min(_) => 4,
        Step::Max(_) => 5,
    }
}

/// Reject models and plans the templates cannot render into valid code.
fn check_consistency(
    model: &GenerationModel,
    plan: &ValidationPlan,
    config: &GeneratorConfig,
) -> GenResult<()> {
    let fail = |reason: String| Err(GenerationError::inconsistent(reason));

    for owner in &model.owners {
        if owner.handlers.is_empty() {
            return fail(format!("owning type `{}` has no handlers", owner.owner));
        }
        if owner.defined_items.contains(&config.dispatch_fn) {
            return fail(format!(
                "`{}::{}` is already defined and collides with the dispatch method",
                owner.owner, config.dispatch_fn
            ));
        }
        let mut paths = HashSet::new();
        let mut methods = HashSet::new();
        for handler in &owner.handlers {
            if handler.owner != owner.owner || handler.context_type != owner.context_type {
                return fail(format!(
                    "handler `{}` is grouped under `{}` but declared on `{}`",
                    handler.name, owner.owner, handler.owner
                ));
            }
            if handler.path.chars().any(char::is_control) {
                return fail(format!(
                    "path {:?} of `{}::{}` contains control characters",
                    handler.path, owner.owner, handler.name
                ));
            }
            if !paths.insert(handler.path.as_str()) {
                return fail(format!(
                    "path '{}' appears twice under `{}`",
                    handler.path, owner.owner
                ));
            }
            let generated = handler.generated_fn();
            for name in [generated.as_str(), handler.name.trim_start_matches("r#")] {
                if name == config.dispatch_fn {
                    return fail(format!(
                        "`{}::{name}` collides with the dispatch method `{}`",
                        owner.owner, config.dispatch_fn
                    ));
                }
            }
            if owner.defined_items.contains(&generated) {
                return fail(format!(
                    "generated method `{}::{generated}` collides with an item already defined on `{}`",
                    owner.owner, owner.owner
                ));
            }
            if !methods.insert(generated.clone()) {
                return fail(format!(
                    "two handlers of `{}` map to the generated method `{generated}`",
                    owner.owner
                ));
            }
        }
    }

    for name in plan.pipelines.keys() {
        if !model.shapes.contains_key(name) {
            return fail(format!("validation plan has pipelines for unknown struct `{name}`"));
        }
    }
    for shape in model.shapes.values() {
        let pipelines = plan.for_shape(&shape.name);
        if pipelines.len() != shape.fields.len() {
            return fail(format!(
                "struct `{}` has {} validated fields but {} compiled pipelines",
                shape.name,
                shape.fields.len(),
                pipelines.len()
            ));
        }
        let mut vars = HashSet::new();
        for pipeline in pipelines {
            if !vars.insert(pipeline.field.as_str()) {
                return fail(format!(
                    "struct `{}` validates field `{}` twice",
                    shape.name, pipeline.field
                ));
            }
            let ordered = pipeline
                .steps
                .windows(2)
                .all(|pair| step_rank(&pair[0]) < step_rank(&pair[1]));
            if !ordered {
                return fail(format!(
                    "checks of `{}.{}` are out of order",
                    shape.name, pipeline.field
                ));
            }
            let coerces = matches!(pipeline.steps.first(), Some(Step::Coerce(_)));
            if coerces != pipeline.kind.is_int() {
                return fail(format!(
                    "`{}.{}` is {} but its coercion step does not match",
                    shape.name, pipeline.field, pipeline.kind
                ));
            }
            if let Some(Step::Enum(members)) =
                pipeline.steps.iter().find(|s| matches!(s, Step::Enum(_)))
            {
                if members.is_empty() {
                    return fail(format!(
                        "`{}.{}` has an empty enum set",
                        shape.name, pipeline.field
                    ));
                }
            }
        }
    }

    Ok(())
}
