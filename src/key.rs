//! Type descriptors and slot identities.

use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Descriptor for a declared type.
///
/// Carries the `TypeId` for lookups and the `type_name` for diagnostics.
/// Unsized targets such as `dyn Trait` are supported, which is what makes
/// capability (assignable) lookups possible.
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::TypeKey;
///
/// let key = TypeKey::of::<String>();
/// assert_eq!(key.name(), "alloc::string::String");
/// assert_eq!(key, TypeKey::of::<String>());
/// assert_ne!(key, TypeKey::of::<dyn std::fmt::Debug>());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Descriptor for `T`.
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeKey {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Human-readable type name, the `std::any::type_name` result.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

// TypeId-only comparison; the name is diagnostic
impl PartialEq for TypeKey {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl std::hash::Hash for TypeKey {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Exact type equality.
#[inline(always)]
pub fn exact(a: &TypeKey, b: &TypeKey) -> bool {
    a == b
}

/// Stable identity of a slot.
///
/// Identities are handed out from a process-wide counter when a slot is
/// created and never reused, so the graph can key its registry by handle
/// instead of by memory address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u64);

static NEXT_SLOT_ID: AtomicU64 = AtomicU64::new(1);

impl SlotId {
    pub(crate) fn next() -> Self {
        SlotId(NEXT_SLOT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
