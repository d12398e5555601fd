//! Type-erased resolved values.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::key::TypeKey;

// Erased storage; the payload is always an `Arc<T>` so unsized `T` fits too.
type AnyArc = Arc<dyn Any + Send + Sync>;

/// A resolved value tagged with the type it is stored as.
///
/// Cloning a `Value` shares the underlying `Arc<T>`, which is how a
/// definition's cache and its slot end up holding the same instance.
///
/// ```rust
/// use ferrous_inject::{TypeKey, Value};
/// use std::sync::Arc;
///
/// let value = Value::new(String::from("hello"));
/// assert_eq!(value.type_key(), TypeKey::of::<String>());
///
/// let text: Arc<String> = value.downcast().unwrap();
/// assert_eq!(text.as_str(), "hello");
/// assert!(value.downcast::<u32>().is_none());
/// ```
#[derive(Clone)]
pub struct Value {
    ty: TypeKey,
    inner: AnyArc,
}

impl Value {
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Value {
            ty: TypeKey::of::<T>(),
            inner: Arc::new(value),
        }
    }

    pub fn type_key(&self) -> TypeKey {
        self.ty
    }

    /// Recover the typed `Arc`, or `None` when `T` is not the stored type.
    pub fn downcast<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.inner.downcast_ref::<Arc<T>>().cloned()
    }

    /// True when both values share one allocation.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} value>", self.ty.name())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
