use super::types::{GenerationModel, OwnerRoutes};
use crate::error::{GenResult, GenerationError, SourceLocation};
use crate::extract::ExtractedSource;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Combine extracted handlers and shapes into one immutable [`GenerationModel`].
///
/// Handlers are grouped by owning type in first-seen order, so dispatch code is
/// emitted deterministically. Within an owning type:
///
/// - every handler must take the same context type, because the generated
///   dispatch method receives a single context;
/// - no two handlers may claim the same path. Conflicts are reported, never
///   resolved.
///
/// A handler whose parameter struct has no annotated fields gets an empty
/// validation pipeline.
pub fn build_model(module: &str, extracted: ExtractedSource) -> GenResult<GenerationModel> {
    let mut owners: Vec<OwnerRoutes> = Vec::new();
    let mut defined_items = extracted.defined_items;

    for handler in extracted.handlers {
        let index = match owners.iter().position(|o| o.owner == handler.owner) {
            Some(index) => index,
            None => {
                owners.push(OwnerRoutes {
                    owner: handler.owner.clone(),
                    context_type: handler.context_type.clone(),
                    handlers: Vec::new(),
                    defined_items: defined_items.remove(&handler.owner).unwrap_or_default(),
                });
                owners.len() - 1
            }
        };
        let group = &mut owners[index];

        if group.context_type != handler.context_type {
            return Err(GenerationError::mismatch(
                SourceLocation::new(format!("{}::{}", handler.owner, handler.name), handler.line),
                format!(
                    "context type `{}` differs from `{}` used by other handlers of `{}`",
                    handler.context_type, group.context_type, group.owner
                ),
            ));
        }

        if let Some(existing) = group.handlers.iter().find(|h| h.path == handler.path) {
            return Err(GenerationError::RouteConflict {
                owner: group.owner.clone(),
                path: handler.path.clone(),
                first: existing.name.clone(),
                second: handler.name.clone(),
            });
        }

        group.handlers.push(handler);
    }

    let mut shapes = BTreeMap::new();
    for shape in extracted.shapes {
        if let Some(previous) = shapes.insert(shape.name.clone(), shape) {
            return Err(GenerationError::mismatch(
                SourceLocation::new(previous.name.clone(), previous.line),
                "parameter struct is declared more than once",
            ));
        }
    }

    let model = GenerationModel {
        module: module.to_owned(),
        owners,
        shapes,
    };

    for handler in model.handlers() {
        if model.shape_for(handler).is_none() {
            debug!(
                handler = %handler.name,
                params = %handler.params_type,
                "parameter struct has no validated fields"
            );
        }
    }
    info!(
        module,
        owners = model.owners.len(),
        handlers = model.handlers().count(),
        shapes = model.shapes.len(),
        "built generation model"
    );

    Ok(model)
}
