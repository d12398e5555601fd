//! Static wiring checks that run no constructors.

use std::fmt;

use crate::error::InjectError;
use crate::graph::Graph;
use crate::key::SlotId;
use crate::provider::Binding;

/// Problems found by [`Graph::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<InjectError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), Vec<InjectError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return f.write_str("graph wiring is valid");
        }
        writeln!(f, "graph wiring has {} problem(s):", self.errors.len())?;
        for error in &self.errors {
            writeln!(f, "  - {error}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Active,
    Done,
}

impl Graph {
    /// Checks the wiring without resolving anything.
    ///
    /// Reports explicit bindings to slots that are neither defined nor
    /// filled, automatic bindings with zero or several candidates, and
    /// dependency cycles.
    ///
    /// ```
    /// use ferrous_inject::{bind, Graph, InjectError, Provider, Slot};
    /// use std::sync::Arc;
    ///
    /// let a: Slot<u8> = Slot::named("a");
    /// let b: Slot<u8> = Slot::named("b");
    ///
    /// let mut graph = Graph::default();
    /// graph.define(&a, Provider::new(|v: Arc<u8>| *v, bind![&b]).unwrap()).unwrap();
    /// graph.define(&b, Provider::new(|v: Arc<u8>| *v, bind![&a]).unwrap()).unwrap();
    ///
    /// let report = graph.validate();
    /// assert_eq!(
    ///     report.errors,
    ///     vec![InjectError::Cyclic(vec!["a".into(), "b".into(), "a".into()])]
    /// );
    /// ```
    pub fn validate(&self) -> ValidationReport {
        let definitions: Vec<_> = self.definitions().collect();
        let mut errors = Vec::new();
        let mut edges: Vec<Vec<usize>> = vec![Vec::new(); definitions.len()];

        let position = |id: SlotId| definitions.iter().position(|d| d.slot().id() == id);

        for (from, definition) in definitions.iter().enumerate() {
            let provider = definition.provider();
            for (_, param, binding) in provider.bound_params() {
                match binding {
                    Binding::Slot(slot) => match position(slot.id()) {
                        Some(to) => edges[from].push(to),
                        None if !slot.is_set() => errors.push(InjectError::UnsetSlot(slot.label())),
                        None => {}
                    },
                    Binding::Auto => {
                        let candidates: Vec<usize> = definitions
                            .iter()
                            .enumerate()
                            .filter(|(_, d)| self.types().assignable(&d.output_type(), &param.ty))
                            .map(|(i, _)| i)
                            .collect();
                        match (param.variadic, candidates.len()) {
                            (true, _) | (false, 1) => edges[from].extend(candidates),
                            (false, 0) => errors.push(InjectError::no_assignable_match(param.ty.name())),
                            (false, count) => {
                                errors.push(InjectError::ambiguous_assignable(param.ty.name(), count))
                            }
                        }
                    }
                }
            }
        }

        let labels: Vec<String> = definitions.iter().map(|d| d.slot().label()).collect();
        let mut marks = vec![Mark::Unvisited; definitions.len()];
        let mut path = Vec::new();
        for start in 0..definitions.len() {
            if marks[start] == Mark::Unvisited {
                visit(start, &edges, &labels, &mut marks, &mut path, &mut errors);
            }
        }

        tracing::debug!(problems = errors.len(), "validated graph wiring");
        ValidationReport { errors }
    }
}

fn visit(
    node: usize,
    edges: &[Vec<usize>],
    labels: &[String],
    marks: &mut [Mark],
    path: &mut Vec<usize>,
    errors: &mut Vec<InjectError>,
) {
    marks[node] = Mark::Active;
    path.push(node);
    for &next in &edges[node] {
        match marks[next] {
            Mark::Unvisited => visit(next, edges, labels, marks, path, errors),
            Mark::Active => {
                let start = path.iter().position(|&n| n == next).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|&n| labels[n].clone()).collect();
                cycle.push(labels[next].clone());
                errors.push(InjectError::Cyclic(cycle));
            }
            Mark::Done => {}
        }
    }
    path.pop();
    marks[node] = Mark::Done;
}
