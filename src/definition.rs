//! Definitions: one slot bound to one provider, with a memoized value.

use std::fmt;
use std::time::Instant;

use parking_lot::{Mutex, ReentrantMutex};

use crate::error::{InjectError, InjectResult};
use crate::graph::Graph;
use crate::key::TypeKey;
use crate::provider::Provider;
use crate::render;
use crate::slot::{Slot, SlotRef};
use crate::traits::{Finalize, Initialize};
use crate::types::{CastFn, TypeRegistry};
use crate::value::Value;

struct Resolved {
    // stored as the slot's declared type
    value: Value,
    // as the provider produced it, for the lifecycle casts
    produced: Value,
}

/// The binding of one [`Slot`] to one [`Provider`].
///
/// The provider's output type must be assignable to the slot's declared type;
/// that is checked once, when the definition is created. The provider then
/// runs at most once: the first [`resolve`](Self::resolve) caches its value
/// and writes it into the slot, later calls return the cache until
/// [`obscure`](Self::obscure) tears it down.
///
/// Resolution holds a per-definition lock from provider call through the
/// `Initialize` hook. Other threads block until the value is initialized;
/// the resolving thread itself may re-enter and gets the cached value.
pub struct Definition {
    slot: SlotRef,
    provider: Provider,
    assign: CastFn,
    initialize: Option<CastFn>,
    finalize: Option<CastFn>,
    cache: Mutex<Option<Resolved>>,
    building: ReentrantMutex<()>,
}

impl Definition {
    /// Binds `slot` to `provider`, checking types against `types`.
    ///
    /// Fails with [`InjectError::TypeMismatch`] when the provider's output is
    /// not assignable to the slot, or [`InjectError::ArgumentType`] when an
    /// explicit binding can never feed its parameter.
    pub fn new<T>(slot: &Slot<T>, provider: Provider, types: &TypeRegistry) -> InjectResult<Self>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self::from_ref(slot.erased(), provider, types)
    }

    pub fn from_ref(slot: SlotRef, provider: Provider, types: &TypeRegistry) -> InjectResult<Self> {
        let output = provider.return_type();
        let target = slot.type_key();
        let assign = types
            .caster(&output, &target)
            .ok_or(InjectError::TypeMismatch {
                expected: target.name(),
                found: output.name(),
            })?;
        provider.check_types(types)?;

        Ok(Definition {
            initialize: types.caster(&output, &TypeKey::of::<dyn Initialize>()),
            finalize: types.caster(&output, &TypeKey::of::<dyn Finalize>()),
            slot,
            provider,
            assign,
            cache: Mutex::new(None),
            building: ReentrantMutex::new(()),
        })
    }

    pub fn slot(&self) -> &SlotRef {
        &self.slot
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    /// The type this definition produces into its slot: the slot's declared type.
    pub fn output_type(&self) -> TypeKey {
        self.slot.type_key()
    }

    pub fn is_resolved(&self) -> bool {
        self.cache.lock().is_some()
    }

    /// The cached value, if resolved.
    pub fn value(&self) -> Option<Value> {
        self.cache.lock().as_ref().map(|resolved| resolved.value.clone())
    }

    /// Returns the cached value, or runs the provider and caches its result.
    ///
    /// On first resolution the value is cached, written into the slot, and
    /// then handed to its `Initialize` hook if the type registers one.
    pub fn resolve(&self, graph: &Graph) -> InjectResult<Value> {
        let _building = self.building.lock();
        if let Some(resolved) = self.cache.lock().as_ref() {
            return Ok(resolved.value.clone());
        }

        let _frame = graph.stack().enter(&self.slot)?;
        let observers = graph.observers();
        observers.resolving(&self.slot);
        tracing::trace!(slot = %self.slot.label(), depth = graph.stack().depth(), "resolving definition");

        let started = Instant::now();
        let produced = match self.provider.provide(graph) {
            Ok(produced) => produced,
            Err(err) => {
                observers.failed(&self.slot, &err);
                return Err(err);
            }
        };
        let value = (self.assign)(&produced).ok_or(InjectError::TypeMismatch {
            expected: self.slot.type_key().name(),
            found: produced.type_key().name(),
        })?;

        *self.cache.lock() = Some(Resolved {
            value: value.clone(),
            produced: produced.clone(),
        });
        self.slot.write(value.clone());
        observers.resolved(&self.slot, started.elapsed());

        if let Some(target) = hook::<dyn Initialize>(&self.initialize, &produced) {
            target.initialize();
            observers.initialized(&self.slot);
        }

        Ok(value)
    }

    /// Tears down a resolved value: clears the cache, clears the slot, and
    /// only then runs the `Finalize` hook. No-op when unresolved.
    pub fn obscure(&self, graph: &Graph) {
        let _building = self.building.lock();
        let Some(resolved) = self.cache.lock().take() else {
            return;
        };

        let target = hook::<dyn Finalize>(&self.finalize, &resolved.produced);
        self.slot.clear();
        tracing::trace!(slot = %self.slot.label(), "obscured definition");

        if let Some(target) = target {
            target.finalize();
            graph.observers().finalized(&self.slot);
        }
    }
}

fn hook<T: ?Sized + 'static>(cast: &Option<CastFn>, produced: &Value) -> Option<std::sync::Arc<T>> {
    cast.as_ref()
        .and_then(|cast| cast(produced))
        .and_then(|value| value.downcast::<T>())
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("slot", &self.slot)
            .field("provider", &self.provider)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self.value() {
            Some(value) => value.to_string(),
            None => "<nil>".to_string(),
        };
        f.write_str(&render::block(
            "definition",
            &[
                ("slot", self.slot.to_string()),
                ("provider", self.provider.to_string()),
                ("value", value),
            ],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implements;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    trait Animal: Send + Sync {
        fn legs(&self) -> u32;
    }

    struct Dog;

    impl Animal for Dog {
        fn legs(&self) -> u32 {
            4
        }
    }

    #[test]
    fn output_must_be_assignable_to_the_slot() {
        let slot: Slot<dyn Animal> = Slot::new();
        let types = TypeRegistry::new();
        let err = Definition::new(&slot, Provider::new(|| Dog, vec![]).unwrap(), &types).unwrap_err();
        assert!(matches!(err, InjectError::TypeMismatch { .. }));

        let mut types = TypeRegistry::new();
        implements!(types, Dog => dyn Animal);
        assert!(Definition::new(&slot, Provider::new(|| Dog, vec![]).unwrap(), &types).is_ok());
    }

    #[test]
    fn resolve_memoizes_and_writes_the_slot() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let slot: Slot<String> = Slot::new();
        let provider = Provider::new(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                "built".to_string()
            },
            vec![],
        )
        .unwrap();

        let graph = Graph::default();
        let definition = Definition::new(&slot, provider, graph.types()).unwrap();
        let first = definition.resolve(&graph).unwrap();
        let second = definition.resolve(&graph).unwrap();

        assert!(first.ptr_eq(&second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(slot.get().unwrap().as_str(), "built");
    }

    #[test]
    fn capability_slots_keep_the_produced_instance() {
        let mut types = TypeRegistry::new();
        implements!(types, Dog => dyn Animal);
        let slot: Slot<dyn Animal> = Slot::new();

        let graph = Graph::new(types);
        let definition = Definition::new(&slot, Provider::new(|| Dog, vec![]).unwrap(), graph.types()).unwrap();
        let value = definition.resolve(&graph).unwrap();

        assert_eq!(value.type_key(), TypeKey::of::<dyn Animal>());
        assert_eq!(slot.get().unwrap().legs(), 4);
    }

    #[test]
    fn obscure_is_a_noop_until_resolved() {
        let slot = Slot::with_value(7u8);
        let graph = Graph::default();
        let definition = Definition::new(&slot, Provider::new(|| 9u8, vec![]).unwrap(), graph.types()).unwrap();

        definition.obscure(&graph);
        assert_eq!(*slot.get().unwrap(), 7);

        definition.resolve(&graph).unwrap();
        assert_eq!(*slot.get().unwrap(), 9);
        definition.obscure(&graph);
        assert!(!definition.is_resolved());
        assert!(slot.get().is_none());
    }
}
