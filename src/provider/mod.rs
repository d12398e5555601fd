//! Providers: a constructor plus the bindings that feed its arguments.

use std::fmt;

use crate::error::{InjectError, InjectResult};
use crate::graph::Graph;
use crate::key::TypeKey;
use crate::render;
use crate::slot::{Slot, SlotRef};
use crate::types::TypeRegistry;
use crate::value::Value;

mod constructor;

pub use constructor::{Argument, Constructor, Param, Parameter, Variadic};
use constructor::{signature, ErasedConstructor, Typed};

/// Where a constructor argument comes from.
#[derive(Clone, Debug)]
pub enum Binding {
    /// The value of a specific slot, resolved through the graph
    Slot(SlotRef),
    /// Whichever definition is assignable to the parameter type
    Auto,
}

impl Binding {
    pub fn slot<T: ?Sized + Send + Sync + 'static>(slot: &Slot<T>) -> Self {
        Binding::Slot(slot.erased())
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Binding::Auto)
    }
}

impl<T: ?Sized + Send + Sync + 'static> From<&Slot<T>> for Binding {
    fn from(slot: &Slot<T>) -> Self {
        Binding::slot(slot)
    }
}

impl From<SlotRef> for Binding {
    fn from(slot: SlotRef) -> Self {
        Binding::Slot(slot)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Slot(slot) => fmt::Display::fmt(slot, f),
            Binding::Auto => f.write_str("auto"),
        }
    }
}

/// Builds a `Vec<Binding>` from slot references.
///
/// ```rust
/// use ferrous_inject::{bind, Binding, Slot};
///
/// let host: Slot<String> = Slot::new();
/// let port: Slot<u16> = Slot::new();
/// let bindings: Vec<Binding> = bind![&host, &port];
/// assert_eq!(bindings.len(), 2);
/// ```
#[macro_export]
macro_rules! bind {
    ($($slot:expr),* $(,)?) => {
        vec![$($crate::Binding::from($slot)),*]
    };
}

/// A recipe for producing one value: a constructor and its argument bindings.
///
/// Bindings are matched to parameters by position. A trailing
/// [`Variadic`] parameter takes every binding past the fixed parameters,
/// possibly none.
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{bind, Graph, Provider, Slot};
/// use std::sync::Arc;
///
/// let name = Slot::with_value(String::from("db"));
/// let port = Slot::with_value(5432u16);
/// let url: Slot<String> = Slot::new();
///
/// let provider = Provider::new(
///     |name: Arc<String>, port: Arc<u16>| format!("{name}:{port}"),
///     bind![&name, &port],
/// )
/// .unwrap();
/// assert_eq!(provider.return_type().name(), "alloc::string::String");
///
/// let mut graph = Graph::default();
/// graph.define(&url, provider).unwrap();
/// assert_eq!(graph.resolve(&url).unwrap().as_str(), "db:5432");
/// ```
pub struct Provider {
    constructor: Box<dyn ErasedConstructor>,
    bindings: Vec<Binding>,
    // parameters before the variadic tail, or all of them
    fixed: usize,
}

impl Provider {
    /// Creates a provider with explicit bindings, one per parameter.
    ///
    /// Fails with [`InjectError::ArityMismatch`] when the bindings do not line
    /// up with the signature and [`InjectError::InvalidBinding`] when a
    /// variadic parameter is not last or an automatic binding is mixed into a
    /// variadic tail.
    ///
    /// Only the shape is checked here. Whether each bound slot's type can feed
    /// its parameter depends on the graph's [`TypeRegistry`] (a registered
    /// capability or conversion can make any pair fit), so that check runs
    /// when the provider is defined, where a mismatch fails with
    /// [`InjectError::ArgumentType`].
    pub fn new<F, Args>(constructor: F, bindings: Vec<Binding>) -> InjectResult<Self>
    where
        F: Constructor<Args>,
        Args: 'static,
    {
        Self::build(Box::new(Typed::new(constructor)), bindings)
    }

    /// Creates a provider whose arguments are all resolved by type.
    ///
    /// A plain parameter takes the single definition assignable to its type;
    /// a variadic parameter takes every assignable definition.
    pub fn auto<F, Args>(constructor: F) -> InjectResult<Self>
    where
        F: Constructor<Args>,
        Args: 'static,
    {
        let constructor: Box<dyn ErasedConstructor> = Box::new(Typed::new(constructor));
        let bindings = vec![Binding::Auto; constructor.params().len()];
        Self::build(constructor, bindings)
    }

    fn build(constructor: Box<dyn ErasedConstructor>, bindings: Vec<Binding>) -> InjectResult<Self> {
        let params = constructor.params();
        let variadic = params.iter().position(|param| param.variadic);

        let fixed = match variadic {
            Some(position) if position + 1 != params.len() => {
                return Err(InjectError::InvalidBinding(format!(
                    "variadic parameter {position} must be the last parameter"
                )));
            }
            Some(position) => position,
            None => params.len(),
        };

        if variadic.is_none() && bindings.len() != fixed {
            return Err(InjectError::ArityMismatch {
                expected: fixed.to_string(),
                found: bindings.len(),
            });
        }
        if variadic.is_some() && bindings.len() < fixed {
            return Err(InjectError::ArityMismatch {
                expected: format!("at least {fixed}"),
                found: bindings.len(),
            });
        }

        let tail = &bindings[fixed..];
        if tail.len() > 1 && tail.iter().any(Binding::is_auto) {
            return Err(InjectError::InvalidBinding(
                "an automatic variadic binding must be the only binding in the tail".to_string(),
            ));
        }

        Ok(Provider { constructor, bindings, fixed })
    }

    /// The type of value [`provide`](Self::provide) produces.
    pub fn return_type(&self) -> TypeKey {
        self.constructor.output()
    }

    pub fn params(&self) -> &[Param] {
        self.constructor.params()
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn is_variadic(&self) -> bool {
        self.fixed < self.params().len()
    }

    /// Pairs every binding with the parameter it feeds, by argument index.
    pub(crate) fn bound_params(&self) -> impl Iterator<Item = (usize, &Param, &Binding)> {
        let params = self.params();
        self.bindings.iter().enumerate().map(move |(index, binding)| {
            let param = &params[index.min(params.len().saturating_sub(1))];
            (index, param, binding)
        })
    }

    /// Checks that every explicit binding's slot type can feed its parameter.
    pub(crate) fn check_types(&self, types: &TypeRegistry) -> InjectResult<()> {
        for (index, param, binding) in self.bound_params() {
            if let Binding::Slot(slot) = binding {
                let found = slot.type_key();
                if !types.compatible(&found, &param.ty) {
                    return Err(InjectError::ArgumentType {
                        index,
                        expected: param.ty.name(),
                        found: found.name(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Resolves every binding through `graph` and calls the constructor.
    ///
    /// Bindings are resolved left to right. Each value is assigned to its
    /// parameter type when assignable and converted otherwise.
    pub fn provide(&self, graph: &Graph) -> InjectResult<Value> {
        let types = graph.types();
        let params = self.params();
        let mut arguments = Vec::with_capacity(params.len());

        for (index, param) in params.iter().enumerate() {
            if param.variadic {
                let values = match &self.bindings[index..] {
                    [Binding::Auto] => graph.resolve_by_assignable_type(&param.ty)?,
                    tail => tail
                        .iter()
                        .map(|binding| resolve_binding(graph, binding, param))
                        .collect::<InjectResult<Vec<_>>>()?,
                };
                let values = values
                    .iter()
                    .enumerate()
                    .map(|(offset, value)| coerce(types, index + offset, value, param))
                    .collect::<InjectResult<Vec<_>>>()?;
                arguments.push(Argument::Variadic(values));
            } else {
                let value = resolve_binding(graph, &self.bindings[index], param)?;
                arguments.push(Argument::Single(coerce(types, index, &value, param)?));
            }
        }

        self.constructor.call(arguments)
    }
}

fn resolve_binding(graph: &Graph, binding: &Binding, param: &Param) -> InjectResult<Value> {
    match binding {
        Binding::Slot(slot) => graph.resolve_ref(slot),
        Binding::Auto => graph.resolve_one_assignable(&param.ty),
    }
}

fn coerce(types: &TypeRegistry, index: usize, value: &Value, param: &Param) -> InjectResult<Value> {
    types
        .coerce(value, &param.ty)
        .ok_or_else(|| InjectError::ArgumentType {
            index,
            expected: param.ty.name(),
            found: value.type_key().name(),
        })
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("constructor", &signature(self.params(), self.return_type()))
            .field("bindings", &self.bindings)
            .finish()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bindings: Vec<String> = self.bindings.iter().map(Binding::to_string).collect();
        f.write_str(&render::block(
            "provider",
            &[
                ("constructor", signature(self.params(), self.return_type())),
                ("bindings", render::list(&bindings)),
            ],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn join(head: Arc<String>, rest: Variadic<String>) -> String {
        let mut out = head.to_string();
        for part in rest.iter() {
            out.push_str(part);
        }
        out
    }

    #[test]
    fn fixed_arity_must_match() {
        let a: Slot<u8> = Slot::new();
        let err = Provider::new(|_: Arc<u8>, _: Arc<u8>| (), bind![&a]).unwrap_err();
        assert_eq!(
            err,
            InjectError::ArityMismatch { expected: "2".into(), found: 1 }
        );
    }

    #[test]
    fn variadic_tail_may_be_empty() {
        let head: Slot<String> = Slot::new();
        let provider = Provider::new(join, bind![&head]).unwrap();
        assert!(provider.is_variadic());

        let err = Provider::new(join, vec![]).unwrap_err();
        assert_eq!(
            err,
            InjectError::ArityMismatch { expected: "at least 1".into(), found: 0 }
        );
    }

    #[test]
    fn variadic_must_be_last() {
        let err = Provider::new(|_: Variadic<u8>, _: Arc<u8>| (), vec![Binding::Auto]).unwrap_err();
        assert!(matches!(err, InjectError::InvalidBinding(_)));
    }

    #[test]
    fn auto_cannot_mix_into_a_variadic_tail() {
        let head: Slot<String> = Slot::new();
        let other: Slot<String> = Slot::new();
        let err = Provider::new(
            join,
            vec![Binding::slot(&head), Binding::slot(&other), Binding::Auto],
        )
        .unwrap_err();
        assert!(matches!(err, InjectError::InvalidBinding(_)));
    }

    #[test]
    fn explicit_binding_types_are_checked_against_the_registry() {
        let byte: Slot<u8> = Slot::new();
        let text: Slot<String> = Slot::new();
        let types = TypeRegistry::new();

        let widened = Provider::new(|value: Arc<u64>| *value, bind![&byte]).unwrap();
        assert!(widened.check_types(&types).is_ok());

        let wrong = Provider::new(|value: Arc<u64>| *value, bind![&text]).unwrap();
        assert_eq!(
            wrong.check_types(&types),
            Err(InjectError::ArgumentType {
                index: 0,
                expected: "u64",
                found: "alloc::string::String",
            })
        );
    }

    #[test]
    fn display_lists_constructor_and_bindings() {
        let head: Slot<String> = Slot::named("head");
        let provider = Provider::new(join, bind![&head]).unwrap();
        assert_eq!(
            provider.to_string(),
            "&provider{\n  constructor: fn(alloc::string::String, ...alloc::string::String) -> alloc::string::String,\n  bindings: [\n    alloc::string::String=head\n  ]\n}"
        );
    }
}
