//! The graph: the registry of definitions and the resolution entry points.

use std::fmt;
use std::sync::Arc;

use crate::config::{GraphConfig, TeardownOrder};
use crate::definition::Definition;
use crate::error::{InjectError, InjectResult};
use crate::internal::{Map, ResolutionStack};
use crate::key::{exact, SlotId, TypeKey};
use crate::observer::{GraphObserver, Observers};
use crate::provider::Provider;
use crate::render;
use crate::slot::{Slot, SlotRef};
use crate::types::TypeRegistry;
use crate::value::Value;

/// A registry of definitions keyed by slot identity.
///
/// Resolving a slot runs its definition's provider, which resolves the
/// provider's own bindings through the same graph first. Every definition
/// runs its provider at most once; results are shared with the caller's
/// slots.
///
/// # Examples
///
/// ```
/// use ferrous_inject::{bind, Graph, Provider, Slot};
/// use std::sync::Arc;
///
/// struct B(String);
/// struct A(Arc<B>);
///
/// let a: Slot<A> = Slot::named("a");
/// let b: Slot<B> = Slot::named("b");
///
/// let mut graph = Graph::default();
/// graph.define(&a, Provider::new(A, bind![&b]).unwrap()).unwrap();
/// graph.define(&b, Provider::new(|| B("X".into()), vec![]).unwrap()).unwrap();
///
/// let resolved = graph.resolve(&a).unwrap();
/// assert_eq!(resolved.0 .0, "X");
/// assert!(Arc::ptr_eq(&resolved.0, &b.get().unwrap()));
/// ```
pub struct Graph {
    types: TypeRegistry,
    config: GraphConfig,
    definitions: Vec<Definition>,
    index: Map<SlotId, usize>,
    stack: ResolutionStack,
    observers: Observers,
}

impl Graph {
    /// Creates an empty graph with the default configuration.
    pub fn new(types: TypeRegistry) -> Self {
        Self::with_config(types, GraphConfig::default())
    }

    pub fn with_config(types: TypeRegistry, config: GraphConfig) -> Self {
        Graph {
            stack: ResolutionStack::new(config.max_depth, config.detect_cycles),
            types,
            config,
            definitions: Vec::new(),
            index: Map::default(),
            observers: Observers::default(),
        }
    }

    /// Creates a graph pre-seeded with `definitions`, later ones replacing
    /// earlier ones for the same slot.
    pub fn with_definitions<I>(types: TypeRegistry, definitions: I) -> Self
    where
        I: IntoIterator<Item = Definition>,
    {
        let mut graph = Self::new(types);
        for definition in definitions {
            graph.add(definition);
        }
        graph
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn add_observer(&mut self, observer: Arc<dyn GraphObserver>) {
        self.observers.add(observer);
    }

    pub(crate) fn observers(&self) -> &Observers {
        &self.observers
    }

    pub(crate) fn stack(&self) -> &ResolutionStack {
        &self.stack
    }

    /// Registers `definition`, replacing any definition for the same slot in place.
    ///
    /// Replacement does not merge and does not tear down: a replaced definition
    /// that was already resolved is dropped without running its `Finalize`
    /// hook, and its value stays in the slot until the new definition resolves
    /// or is obscured.
    pub fn add(&mut self, definition: Definition) -> &Definition {
        let id = definition.slot().id();
        let position = match self.index.get(&id) {
            Some(&position) => {
                tracing::debug!(slot = %definition.slot().label(), "replacing definition");
                self.definitions[position] = definition;
                position
            }
            None => {
                self.definitions.push(definition);
                self.index.insert(id, self.definitions.len() - 1);
                self.definitions.len() - 1
            }
        };
        &self.definitions[position]
    }

    /// Binds `slot` to `provider` and registers the definition.
    ///
    /// The returned definition can be resolved directly, without going
    /// through [`resolve_all`](Self::resolve_all).
    ///
    /// Defining a slot twice replaces the earlier definition; see [`add`](Self::add).
    pub fn define<T>(&mut self, slot: &Slot<T>, provider: Provider) -> InjectResult<&Definition>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let definition = Definition::new(slot, provider, &self.types)?;
        tracing::trace!(
            slot = %definition.slot().label(),
            output = definition.provider().return_type().name(),
            "defined slot"
        );
        Ok(self.add(definition))
    }

    /// The definition registered for `slot`, if any.
    pub fn definition(&self, slot: &SlotRef) -> Option<&Definition> {
        self.index.get(&slot.id()).map(|&position| &self.definitions[position])
    }

    pub fn contains<T: ?Sized + Send + Sync + 'static>(&self, slot: &Slot<T>) -> bool {
        self.index.contains_key(&slot.id())
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Resolves `slot` through its definition, or returns its current content
    /// when no definition is registered for it.
    pub fn resolve<T>(&self, slot: &Slot<T>) -> InjectResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let value = self.resolve_ref(&slot.erased())?;
        value.downcast::<T>().ok_or(InjectError::TypeMismatch {
            expected: slot.type_key().name(),
            found: value.type_key().name(),
        })
    }

    /// Type-erased [`resolve`](Self::resolve).
    pub fn resolve_ref(&self, slot: &SlotRef) -> InjectResult<Value> {
        match self.definition(slot) {
            Some(definition) => definition.resolve(self),
            None => slot.read().ok_or_else(|| InjectError::UnsetSlot(slot.label())),
        }
    }

    /// Resolves the one definition whose output type is exactly `ty`.
    pub fn resolve_by_type(&self, ty: &TypeKey) -> InjectResult<Value> {
        let mut matches = self.matching(|output| exact(output, ty));
        match (matches.next(), matches.next()) {
            (Some(definition), None) => definition.resolve(self),
            (None, _) => Err(InjectError::no_exact_match(ty.name())),
            (Some(_), Some(_)) => Err(InjectError::ambiguous_exact(ty.name(), 2 + matches.count())),
        }
    }

    /// Resolves every definition whose output type is exactly `ty`, in
    /// registration order. Empty when nothing matches.
    pub fn resolve_all_by_type(&self, ty: &TypeKey) -> InjectResult<Vec<Value>> {
        self.matching(|output| exact(output, ty))
            .map(|definition| definition.resolve(self))
            .collect()
    }

    /// Resolves every definition whose output is assignable to `ty`, in
    /// registration order, each value cast to `ty`. Empty when nothing matches.
    pub fn resolve_by_assignable_type(&self, ty: &TypeKey) -> InjectResult<Vec<Value>> {
        self.matching(|output| self.types.assignable(output, ty))
            .map(|definition| self.resolve_as(definition, ty))
            .collect()
    }

    /// Resolves the one definition whose output is assignable to `ty`.
    pub fn resolve_one_assignable(&self, ty: &TypeKey) -> InjectResult<Value> {
        let mut matches = self.matching(|output| self.types.assignable(output, ty));
        match (matches.next(), matches.next()) {
            (Some(definition), None) => self.resolve_as(definition, ty),
            (None, _) => Err(InjectError::no_assignable_match(ty.name())),
            (Some(_), Some(_)) => Err(InjectError::ambiguous_assignable(ty.name(), 2 + matches.count())),
        }
    }

    fn matching<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a Definition> + 'a
    where
        P: Fn(&TypeKey) -> bool + 'a,
    {
        self.definitions
            .iter()
            .filter(move |definition| predicate(&definition.output_type()))
    }

    fn resolve_as(&self, definition: &Definition, ty: &TypeKey) -> InjectResult<Value> {
        let value = definition.resolve(self)?;
        self.types.assign(&value, ty).ok_or(InjectError::TypeMismatch {
            expected: ty.name(),
            found: value.type_key().name(),
        })
    }

    /// Resolves every registered definition.
    pub fn resolve_all(&self) -> InjectResult<()> {
        tracing::debug!(definitions = self.definitions.len(), "resolving all definitions");
        for definition in &self.definitions {
            definition.resolve(self)?;
        }
        Ok(())
    }

    /// Obscures every definition in the configured teardown order.
    ///
    /// Unresolved definitions are skipped, so calling this twice is safe.
    pub fn finalize(&self) {
        tracing::debug!(definitions = self.definitions.len(), order = ?self.config.teardown, "finalizing graph");
        match self.config.teardown {
            TeardownOrder::Reverse => self.definitions.iter().rev().for_each(|d| d.obscure(self)),
            TeardownOrder::Registration => self.definitions.iter().for_each(|d| d.obscure(self)),
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(TypeRegistry::new())
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("definitions", &self.definitions.len())
            .field("observers", &self.observers.len())
            .field("config", &self.config)
            .finish()
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut definitions: Vec<String> = self.definitions.iter().map(Definition::to_string).collect();
        definitions.sort();
        f.write_str(&render::block("graph", &[("definitions", render::list(&definitions))]))
    }
}
