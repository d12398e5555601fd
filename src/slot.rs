//! Caller-owned typed slots.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::key::{SlotId, TypeKey};
use crate::value::Value;

pub(crate) struct SlotCell {
    id: SlotId,
    ty: TypeKey,
    label: Option<String>,
    content: RwLock<Option<Value>>,
}

/// A typed, mutable storage cell that the graph fills in.
///
/// A slot is a cheap handle: clones refer to the same cell, and the cell's
/// identity (its [`SlotId`]) is what the graph keys definitions by. The graph
/// only keeps a back-reference; the caller keeps the slot and reads the
/// resolved value from it.
///
/// `T` is the declared type and may be unsized (`Slot<dyn Store>`), in which
/// case only values whose type is registered as implementing `T` can be
/// bound to it.
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::Slot;
///
/// let port: Slot<u16> = Slot::named("port");
/// assert!(port.get().is_none());
///
/// port.set(8080);
/// assert_eq!(*port.get().unwrap(), 8080);
///
/// let alias = port.clone();
/// assert_eq!(alias.id(), port.id());
/// ```
pub struct Slot<T: ?Sized + 'static> {
    cell: Arc<SlotCell>,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Slot<T> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::build(None, None)
    }

    /// Creates an empty slot with a label used in diagnostics and cycle paths.
    pub fn named(label: impl Into<String>) -> Self {
        Self::build(Some(label.into()), None)
    }

    /// Creates a slot already holding `value`.
    pub fn with_value(value: T) -> Self
    where
        T: Sized,
    {
        Self::with_arc(Arc::new(value))
    }

    pub fn with_arc(value: Arc<T>) -> Self {
        Self::build(None, Some(Value::from_arc(value)))
    }

    fn build(label: Option<String>, content: Option<Value>) -> Self {
        Slot {
            cell: Arc::new(SlotCell {
                id: SlotId::next(),
                ty: TypeKey::of::<T>(),
                label,
                content: RwLock::new(content),
            }),
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> SlotId {
        self.cell.id
    }

    /// The declared type of this slot.
    pub fn type_key(&self) -> TypeKey {
        self.cell.ty
    }

    pub fn label(&self) -> String {
        self.erased().label()
    }

    /// Current content, `None` until resolved or set and after finalization.
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.content.read().as_ref().and_then(Value::downcast::<T>)
    }

    pub fn is_set(&self) -> bool {
        self.cell.content.read().is_some()
    }

    pub fn set(&self, value: T)
    where
        T: Sized,
    {
        self.set_arc(Arc::new(value));
    }

    pub fn set_arc(&self, value: Arc<T>) {
        *self.cell.content.write() = Some(Value::from_arc(value));
    }

    pub fn clear(&self) {
        self.erased().clear();
    }

    /// Type-erased handle to the same cell.
    pub fn erased(&self) -> SlotRef {
        SlotRef { cell: self.cell.clone() }
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + 'static> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Slot {
            cell: self.cell.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("label", &self.label())
            .field("set", &self.is_set())
            .finish()
    }
}

/// Type-erased slot handle held by definitions and bindings.
#[derive(Clone)]
pub struct SlotRef {
    cell: Arc<SlotCell>,
}

impl SlotRef {
    pub fn id(&self) -> SlotId {
        self.cell.id
    }

    pub fn type_key(&self) -> TypeKey {
        self.cell.ty
    }

    /// The explicit label, or `<type><id>` when the slot was created unnamed.
    pub fn label(&self) -> String {
        match &self.cell.label {
            Some(label) => label.clone(),
            None => format!("{}{}", self.cell.ty.name(), self.cell.id),
        }
    }

    pub fn is_set(&self) -> bool {
        self.cell.content.read().is_some()
    }

    pub(crate) fn read(&self) -> Option<Value> {
        self.cell.content.read().clone()
    }

    pub(crate) fn write(&self, value: Value) {
        debug_assert_eq!(value.type_key(), self.cell.ty);
        *self.cell.content.write() = Some(value);
    }

    pub(crate) fn clear(&self) {
        *self.cell.content.write() = None;
    }
}

impl fmt::Debug for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotRef")
            .field("label", &self.label())
            .field("type", &self.cell.ty.name())
            .finish()
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.cell.ty.name(), self.label())
    }
}
