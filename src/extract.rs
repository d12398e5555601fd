//! Type-directed lookups that write into caller storage.
//!
//! The `extract_*` functions require exactly one matching definition and
//! store it in a slot; the `find_*` functions append every match to a list.

use std::sync::Arc;

use crate::error::{InjectError, InjectResult};
use crate::graph::Graph;
use crate::key::TypeKey;
use crate::slot::Slot;
use crate::value::Value;

/// Resolves the one definition whose output is exactly `T` into `slot`.
///
/// ```
/// use ferrous_inject::{extract_by_type, Graph, Provider, Slot};
///
/// let defined: Slot<String> = Slot::new();
/// let mut graph = Graph::default();
/// graph.define(&defined, Provider::new(|| "a1".to_string(), vec![]).unwrap()).unwrap();
///
/// let target: Slot<String> = Slot::new();
/// extract_by_type(&graph, &target).unwrap();
/// assert_eq!(target.get().unwrap().as_str(), "a1");
/// ```
pub fn extract_by_type<T>(graph: &Graph, slot: &Slot<T>) -> InjectResult<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    let value = graph.resolve_by_type(&slot.type_key())?;
    store(slot, value)
}

/// Resolves the one definition whose output is assignable to `T` into `slot`.
pub fn extract_assignable<T>(graph: &Graph, slot: &Slot<T>) -> InjectResult<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    let value = graph.resolve_one_assignable(&slot.type_key())?;
    store(slot, value)
}

/// Appends every definition whose output is exactly `T`, in registration
/// order. Returns how many were appended.
pub fn find_by_type<T>(graph: &Graph, list: &mut Vec<Arc<T>>) -> InjectResult<usize>
where
    T: ?Sized + Send + Sync + 'static,
{
    let values = graph.resolve_all_by_type(&TypeKey::of::<T>())?;
    append(list, values)
}

/// Appends every definition whose output is assignable to `T`, in
/// registration order. Returns how many were appended.
///
/// ```
/// use ferrous_inject::{find_assignable, implements, Graph, Provider, Slot, TypeRegistry};
/// use std::sync::Arc;
///
/// trait Plugin: Send + Sync {}
/// struct Audit;
/// struct Metrics;
/// impl Plugin for Audit {}
/// impl Plugin for Metrics {}
///
/// let mut types = TypeRegistry::new();
/// implements!(types, Audit => dyn Plugin);
/// implements!(types, Metrics => dyn Plugin);
///
/// let audit: Slot<Audit> = Slot::new();
/// let metrics: Slot<Metrics> = Slot::new();
/// let mut graph = Graph::new(types);
/// graph.define(&audit, Provider::new(|| Audit, vec![]).unwrap()).unwrap();
/// graph.define(&metrics, Provider::new(|| Metrics, vec![]).unwrap()).unwrap();
///
/// let mut plugins: Vec<Arc<dyn Plugin>> = Vec::new();
/// assert_eq!(find_assignable(&graph, &mut plugins).unwrap(), 2);
/// ```
pub fn find_assignable<T>(graph: &Graph, list: &mut Vec<Arc<T>>) -> InjectResult<usize>
where
    T: ?Sized + Send + Sync + 'static,
{
    let values = graph.resolve_by_assignable_type(&TypeKey::of::<T>())?;
    append(list, values)
}

fn store<T>(slot: &Slot<T>, value: Value) -> InjectResult<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    let typed = downcast::<T>(&value)?;
    slot.set_arc(typed.clone());
    Ok(typed)
}

fn append<T>(list: &mut Vec<Arc<T>>, values: Vec<Value>) -> InjectResult<usize>
where
    T: ?Sized + Send + Sync + 'static,
{
    let typed = values
        .iter()
        .map(downcast::<T>)
        .collect::<InjectResult<Vec<_>>>()?;
    let count = typed.len();
    list.extend(typed);
    Ok(count)
}

fn downcast<T: ?Sized + Send + Sync + 'static>(value: &Value) -> InjectResult<Arc<T>> {
    value.downcast::<T>().ok_or(InjectError::TypeMismatch {
        expected: TypeKey::of::<T>().name(),
        found: value.type_key().name(),
    })
}
