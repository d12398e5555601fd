//! Error types for graph wiring and resolution.

use thiserror::Error;

/// Wiring and resolution errors.
///
/// Every variant describes a programmer wiring mistake rather than a transient
/// condition: nothing inside the engine catches or retries them, they surface
/// at the call that detected the violation.
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{Graph, InjectError, TypeKey};
///
/// let graph = Graph::default();
/// match graph.resolve_by_type(&TypeKey::of::<String>()) {
///     Err(InjectError::NoMatch { wanted, .. }) => {
///         assert_eq!(wanted, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
///
/// let cyclic = InjectError::Cyclic(vec!["a".into(), "b".into(), "a".into()]);
/// assert_eq!(cyclic.to_string(), "cyclic dependency: a -> b -> a");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectError {
    /// A binding or constructor shape that can never be invoked
    #[error("invalid binding: {0}")]
    InvalidBinding(String),

    /// A value type that cannot be stored where another type is declared
    #[error("type mismatch: {found} is not assignable to {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A resolved argument that can neither be assigned nor converted
    #[error("argument {index} of type {found} cannot be assigned or converted to {expected}")]
    ArgumentType {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// No definition qualifies for a single-value type lookup
    #[error("no defined slot {relation} {wanted}")]
    NoMatch {
        wanted: &'static str,
        relation: &'static str,
    },

    /// More than one definition qualifies for a single-value type lookup
    #[error("{count} defined slots {relation} {wanted}")]
    AmbiguousMatch {
        wanted: &'static str,
        relation: &'static str,
        count: usize,
    },

    /// Explicit bindings do not line up with the constructor parameters
    #[error("constructor takes {expected} arguments, {found} bindings supplied")]
    ArityMismatch { expected: String, found: usize },

    /// A slot with no definition was read before the caller filled it
    #[error("slot {0} has no definition and no value")]
    UnsetSlot(String),

    /// Resolution re-entered a definition that is still being built
    #[error("cyclic dependency: {}", .0.join(" -> "))]
    Cyclic(Vec<String>),

    /// Resolution went deeper than the configured limit
    #[error("max resolution depth {0} exceeded")]
    DepthExceeded(usize),

    /// A configuration source held a value that could not be parsed
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl InjectError {
    pub(crate) fn no_exact_match(wanted: &'static str) -> Self {
        InjectError::NoMatch { wanted, relation: "matches" }
    }

    pub(crate) fn no_assignable_match(wanted: &'static str) -> Self {
        InjectError::NoMatch { wanted, relation: "is assignable to" }
    }

    pub(crate) fn ambiguous_exact(wanted: &'static str, count: usize) -> Self {
        InjectError::AmbiguousMatch { wanted, relation: "match", count }
    }

    pub(crate) fn ambiguous_assignable(wanted: &'static str, count: usize) -> Self {
        InjectError::AmbiguousMatch { wanted, relation: "are assignable to", count }
    }
}

/// Result type for wiring and resolution.
///
/// ```rust
/// use ferrous_inject::{InjectError, InjectResult};
///
/// fn lookup() -> InjectResult<u32> {
///     Err(InjectError::UnsetSlot("port".into()))
/// }
///
/// assert_eq!(
///     lookup().unwrap_err().to_string(),
///     "slot port has no definition and no value"
/// );
/// ```
pub type InjectResult<T> = Result<T, InjectError>;
