//! Definition descriptors for introspection and export.

#[cfg(feature = "graph-export")]
use serde::Serialize;

use crate::definition::Definition;
use crate::graph::Graph;

/// A snapshot of one registered definition.
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{bind, Graph, Provider, Slot};
/// use std::sync::Arc;
///
/// let port = Slot::with_value(8080u16);
/// let url: Slot<String> = Slot::named("url");
///
/// let mut graph = Graph::default();
/// graph
///     .define(&url, Provider::new(|p: Arc<u16>| format!(":{p}"), bind![&port]).unwrap())
///     .unwrap();
///
/// let descriptors = graph.descriptors();
/// assert_eq!(descriptors[0].slot, "url");
/// assert_eq!(descriptors[0].parameters, vec!["u16".to_string()]);
/// assert!(!descriptors[0].resolved);
///
/// graph.resolve_all().unwrap();
/// assert!(graph.descriptors()[0].resolved);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize))]
pub struct DefinitionDescriptor {
    /// Slot label
    pub slot: String,
    /// Declared type of the slot
    pub slot_type: &'static str,
    /// Type the provider's constructor returns
    pub output_type: &'static str,
    /// Constructor parameters, variadic ones prefixed with `...`
    pub parameters: Vec<String>,
    /// Bound slot labels, or `auto`
    pub bindings: Vec<String>,
    pub resolved: bool,
}

impl DefinitionDescriptor {
    pub(crate) fn of(definition: &Definition) -> Self {
        let provider = definition.provider();
        DefinitionDescriptor {
            slot: definition.slot().label(),
            slot_type: definition.slot().type_key().name(),
            output_type: provider.return_type().name(),
            parameters: provider.params().iter().map(ToString::to_string).collect(),
            bindings: provider.bindings().iter().map(ToString::to_string).collect(),
            resolved: definition.is_resolved(),
        }
    }
}

impl Graph {
    /// Descriptors for every definition, sorted by slot label.
    pub fn descriptors(&self) -> Vec<DefinitionDescriptor> {
        let mut descriptors: Vec<DefinitionDescriptor> =
            self.definitions().map(DefinitionDescriptor::of).collect();
        descriptors.sort_by(|a, b| a.slot.cmp(&b.slot));
        descriptors
    }

    /// Pretty-printed JSON array of [`descriptors`](Self::descriptors).
    #[cfg(feature = "graph-export")]
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.descriptors())
    }
}
