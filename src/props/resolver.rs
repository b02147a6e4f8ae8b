//! Prop merging and partial-reload resolution.
//!
//! # Responsibilities
//! - Merge shared, request-context, and render-call props (later layers win)
//! - Select which props a request receives (full load vs. partial reload)
//! - Materialize producers and install validation errors under `errors`
//!
//! # Design Decisions
//! - Output order follows the merged insertion order, not the selection order
//! - `except` always dominates: it removes a prop even if it is `Always` or listed in `only`
//! - A failing producer aborts the whole resolution; no partial page is produced

use indexmap::IndexSet;
use serde_json::{Map, Value};

use crate::error::InertiaError;
use crate::props::value::{Prop, PropKind, Props, ValidationErrors};

/// Key under which validation errors are always serialized.
pub const ERRORS_KEY: &str = "errors";

/// Partial reload request parsed from the `X-Inertia-Partial-*` headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialReload {
    /// Component the client expects to be rendered.
    pub component: String,
    /// Props to include; empty means "no only-filter".
    pub only: IndexSet<String>,
    /// Props to drop, applied after everything else.
    pub except: IndexSet<String>,
}

impl PartialReload {
    /// A partial reload only applies when it targets the component being rendered.
    pub fn targets(&self, component: &str) -> bool {
        !self.component.is_empty() && self.component == component
    }

    /// Whether a prop survives selection under this partial reload.
    fn selects(&self, name: &str, prop: &Prop) -> bool {
        if self.except.contains(name) {
            return false;
        }
        if self.only.is_empty() {
            return prop.kind() != PropKind::Lazy;
        }
        self.only.contains(name) || prop.kind() == PropKind::Always
    }
}

/// Merge prop layers from lowest to highest precedence.
pub fn merge<'a>(layers: impl IntoIterator<Item = &'a Props>) -> Props {
    let mut merged = Props::new();
    for layer in layers {
        merged.extend(layer);
    }
    merged
}

/// Resolve merged props into the final serialized prop object.
///
/// `partial` must only be `Some` when the partial reload targets the rendered component.
pub fn resolve(
    props: &Props,
    partial: Option<&PartialReload>,
    errors: &ValidationErrors,
) -> Result<Map<String, Value>, InertiaError> {
    let mut resolved = Map::with_capacity(props.len() + 1);

    for (name, prop) in props.iter() {
        let selected = match partial {
            Some(partial) => partial.selects(name, prop),
            // Lazy props exist only to be fetched by an explicit partial reload.
            None => prop.kind() != PropKind::Lazy,
        };
        if !selected {
            continue;
        }

        let value = prop.materialize().map_err(|source| InertiaError::Producer {
            prop: name.clone(),
            source,
        })?;
        resolved.insert(name.clone(), value);
    }

    resolved.insert(ERRORS_KEY.to_string(), errors.to_value());
    Ok(resolved)
}
