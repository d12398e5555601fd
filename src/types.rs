//! Type matching: exact equality, capability assignability and conversions.
//!
//! Rust has no runtime "does this value satisfy that trait" query, so the
//! capability set of each type is declared up front in a [`TypeRegistry`].
//! A registered capability carries the unsizing cast that moves an
//! `Arc<Src>` into an `Arc<dyn Trait>`; a registered conversion builds a new
//! value and is only consulted when binding constructor arguments.

use std::fmt;
use std::sync::Arc;

use crate::internal::Map;
use crate::key::TypeKey;
use crate::value::Value;

macro_rules! widen {
    ($registry:ident, $($source:ty => [$($target:ty),*]),* $(,)?) => {
        $($(
            $registry.conversion::<$source, $target, _>(|value: &$source| <$target>::from(*value));
        )*)*
    };
}

pub(crate) type CastFn = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

#[derive(Clone)]
struct Rule {
    source: TypeKey,
    target: TypeKey,
    apply: CastFn,
}

/// Registry of the capability and conversion relations between types.
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{implements, TypeKey, TypeRegistry};
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".into() }
/// }
///
/// let mut types = TypeRegistry::new();
/// implements!(types, English => dyn Greeter);
///
/// let english = TypeKey::of::<English>();
/// let greeter = TypeKey::of::<dyn Greeter>();
/// assert!(types.assignable(&english, &greeter));
/// assert!(!types.assignable(&greeter, &english));
///
/// // widening is a conversion, never an assignment
/// assert!(types.convertible(&TypeKey::of::<u8>(), &TypeKey::of::<u64>()));
/// assert!(!types.assignable(&TypeKey::of::<u8>(), &TypeKey::of::<u64>()));
/// ```
#[derive(Clone, Default)]
pub struct TypeRegistry {
    capabilities: Map<(TypeKey, TypeKey), Rule>,
    conversions: Map<(TypeKey, TypeKey), Rule>,
}

impl TypeRegistry {
    /// Registry pre-loaded with lossless numeric widening and `&'static str`
    /// to `String`.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        widen!(registry,
            u8 => [u16, u32, u64, u128, usize, i16, i32, i64, i128, isize, f32, f64],
            u16 => [u32, u64, u128, usize, i32, i64, i128, f32, f64],
            u32 => [u64, u128, i64, i128, f64],
            u64 => [u128, i128],
            i8 => [i16, i32, i64, i128, isize, f32, f64],
            i16 => [i32, i64, i128, isize, f32, f64],
            i32 => [i64, i128, f64],
            i64 => [i128],
            f32 => [f64],
            char => [u32, u64, u128]
        );
        registry.conversion::<&'static str, String, _>(|text| text.to_string());
        registry
    }

    /// Registry with no relations at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Declares that `S` satisfies the capability set `D`.
    ///
    /// `cast` is normally the identity closure `|value| value`, which the
    /// compiler turns into the unsizing coercion `Arc<S> -> Arc<dyn Trait>`.
    /// The [`implements!`](crate::implements) macro writes that closure for you.
    pub fn implements<S, D, F>(&mut self, cast: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        D: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<S>) -> Arc<D> + Send + Sync + 'static,
    {
        let (source, target) = (TypeKey::of::<S>(), TypeKey::of::<D>());
        let apply: CastFn = Arc::new(move |value: &Value| {
            value.downcast::<S>().map(|inner| Value::from_arc(cast(inner)))
        });
        self.capabilities.insert((source, target), Rule { source, target, apply });
        self
    }

    /// Declares a representational conversion from `S` to `D`.
    ///
    /// Conversions are applied to constructor arguments only; they never make
    /// `S` assignable to `D`.
    pub fn conversion<S, D, F>(&mut self, convert: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        D: Send + Sync + 'static,
        F: Fn(&S) -> D + Send + Sync + 'static,
    {
        let (source, target) = (TypeKey::of::<S>(), TypeKey::of::<D>());
        let apply: CastFn = Arc::new(move |value: &Value| {
            value.downcast::<S>().map(|inner| Value::new(convert(&inner)))
        });
        self.conversions.insert((source, target), Rule { source, target, apply });
        self
    }

    /// True when a value of type `source` can be stored where `target` is
    /// declared: identical types, or a registered capability.
    pub fn assignable(&self, source: &TypeKey, target: &TypeKey) -> bool {
        source == target || self.capabilities.contains_key(&(*source, *target))
    }

    pub fn convertible(&self, source: &TypeKey, target: &TypeKey) -> bool {
        self.conversions.contains_key(&(*source, *target))
    }

    /// Assignable or convertible, the test used for constructor arguments.
    pub fn compatible(&self, source: &TypeKey, target: &TypeKey) -> bool {
        self.assignable(source, target) || self.convertible(source, target)
    }

    /// Every capability registered for `source`, sorted by name.
    pub fn capabilities_of(&self, source: &TypeKey) -> Vec<TypeKey> {
        let mut targets: Vec<TypeKey> = self
            .capabilities
            .values()
            .filter(|rule| rule.source == *source)
            .map(|rule| rule.target)
            .collect();
        targets.sort_by_key(|target| target.name());
        targets
    }

    /// Re-tags `value` as `target` when assignable.
    pub fn assign(&self, value: &Value, target: &TypeKey) -> Option<Value> {
        let source = value.type_key();
        if source == *target {
            return Some(value.clone());
        }
        self.capabilities
            .get(&(source, *target))
            .and_then(|rule| (rule.apply)(value))
    }

    /// Assigns when possible, otherwise converts.
    pub fn coerce(&self, value: &Value, target: &TypeKey) -> Option<Value> {
        self.assign(value, target).or_else(|| {
            self.conversions
                .get(&(value.type_key(), *target))
                .and_then(|rule| (rule.apply)(value))
        })
    }

    /// The cast for `source -> target`, looked up once at definition time.
    pub(crate) fn caster(&self, source: &TypeKey, target: &TypeKey) -> Option<CastFn> {
        if source == target {
            return Some(Arc::new(|value: &Value| Some(value.clone())));
        }
        self.capabilities
            .get(&(*source, *target))
            .map(|rule| rule.apply.clone())
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("capabilities", &self.capabilities.len())
            .field("conversions", &self.conversions.len())
            .finish()
    }
}

/// Registers one or more capabilities for a type.
///
/// ```rust
/// use ferrous_inject::{implements, Finalize, TypeKey, TypeRegistry};
/// use std::fmt::Debug;
///
/// #[derive(Debug)]
/// struct Cache;
/// impl Finalize for Cache {
///     fn finalize(&self) {}
/// }
///
/// let mut types = TypeRegistry::new();
/// implements!(types, Cache => dyn Finalize, dyn Debug + Send + Sync);
/// assert_eq!(types.capabilities_of(&TypeKey::of::<Cache>()).len(), 2);
/// ```
#[macro_export]
macro_rules! implements {
    ($registry:expr, $source:ty => $($target:ty),+ $(,)?) => {{
        $( $registry.implements::<$source, $target, _>(|value| value); )+
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape: Send + Sync {
        fn sides(&self) -> u32;
    }

    struct Square;

    impl Shape for Square {
        fn sides(&self) -> u32 {
            4
        }
    }

    struct Blob;

    #[test]
    fn identical_types_are_assignable_without_registration() {
        let types = TypeRegistry::empty();
        let key = TypeKey::of::<Square>();
        assert!(types.assignable(&key, &key));
        assert!(!types.convertible(&key, &key));
    }

    #[test]
    fn capability_assignment_keeps_the_instance() {
        let mut types = TypeRegistry::empty();
        implements!(types, Square => dyn Shape);

        let square = Arc::new(Square);
        let value = Value::from_arc(square.clone());
        let shaped = types.assign(&value, &TypeKey::of::<dyn Shape>()).unwrap();

        assert_eq!(shaped.type_key(), TypeKey::of::<dyn Shape>());
        let shape: Arc<dyn Shape> = shaped.downcast().unwrap();
        assert_eq!(shape.sides(), 4);
        assert!(std::ptr::eq(
            Arc::as_ptr(&shape) as *const u8,
            Arc::as_ptr(&square) as *const u8
        ));
    }

    #[test]
    fn unregistered_types_are_not_assignable() {
        let mut types = TypeRegistry::empty();
        implements!(types, Square => dyn Shape);

        let blob = Value::new(Blob);
        assert!(types.assign(&blob, &TypeKey::of::<dyn Shape>()).is_none());
        assert!(types.coerce(&blob, &TypeKey::of::<dyn Shape>()).is_none());
    }

    #[test]
    fn widening_conversions_build_new_values() {
        let types = TypeRegistry::new();
        let byte = Value::new(200u8);
        let wide = types.coerce(&byte, &TypeKey::of::<u64>()).unwrap();
        assert_eq!(*wide.downcast::<u64>().unwrap(), 200);

        // narrowing is never registered
        assert!(types.coerce(&Value::new(300u32), &TypeKey::of::<u8>()).is_none());
    }

    #[test]
    fn static_str_converts_to_string() {
        let types = TypeRegistry::new();
        let text = types
            .coerce(&Value::new("name"), &TypeKey::of::<String>())
            .unwrap();
        assert_eq!(text.downcast::<String>().unwrap().as_str(), "name");
    }
}
