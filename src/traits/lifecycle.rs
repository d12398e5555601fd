//! Post-construction and pre-teardown hooks.

/// Trait for values that need work after construction.
///
/// A definition calls `initialize` exactly once, right after its value has
/// been cached and written into the slot. Resolving the same slot from inside
/// `initialize` returns the cached value.
///
/// A type only exposes the hook once it is registered as implementing
/// `dyn Initialize` with the graph's [`TypeRegistry`](crate::TypeRegistry).
///
/// # Examples
///
/// ```
/// use ferrous_inject::{implements, Graph, Initialize, Provider, Slot, TypeRegistry};
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// #[derive(Default)]
/// struct Pool {
///     warmed: AtomicBool,
/// }
///
/// impl Initialize for Pool {
///     fn initialize(&self) {
///         self.warmed.store(true, Ordering::SeqCst);
///     }
/// }
///
/// let mut types = TypeRegistry::new();
/// implements!(types, Pool => dyn Initialize);
///
/// let pool: Slot<Pool> = Slot::new();
/// let mut graph = Graph::new(types);
/// graph.define(&pool, Provider::new(Pool::default, vec![]).unwrap()).unwrap();
/// graph.resolve_all().unwrap();
///
/// assert!(pool.get().unwrap().warmed.load(Ordering::SeqCst));
/// ```
pub trait Initialize: Send + Sync + 'static {
    fn initialize(&self);
}

/// Trait for values that release resources at teardown.
///
/// `finalize` runs once per resolved value when the graph is finalized,
/// after the bound slot has already been cleared.
///
/// # Examples
///
/// ```
/// use ferrous_inject::{implements, Finalize, Graph, Provider, Slot, TypeRegistry};
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// #[derive(Default)]
/// struct Connection {
///     closed: AtomicBool,
/// }
///
/// impl Finalize for Connection {
///     fn finalize(&self) {
///         self.closed.store(true, Ordering::SeqCst);
///     }
/// }
///
/// let mut types = TypeRegistry::new();
/// implements!(types, Connection => dyn Finalize);
///
/// let conn: Slot<Connection> = Slot::new();
/// let mut graph = Graph::new(types);
/// graph.define(&conn, Provider::new(Connection::default, vec![]).unwrap()).unwrap();
///
/// let live = graph.resolve(&conn).unwrap();
/// graph.finalize();
///
/// assert!(conn.get().is_none());
/// assert!(live.closed.load(Ordering::SeqCst));
/// ```
pub trait Finalize: Send + Sync + 'static {
    fn finalize(&self);
}
