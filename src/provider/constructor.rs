//! Constructor signatures and argument extraction.
//!
//! Any `Fn(A1, .., An) -> R` with up to eight parameters is a constructor as
//! long as every parameter is an `Arc<P>` or, in last position only, a
//! [`Variadic<P>`]. The declared parameter types are read from the signature
//! without calling it, which is what lets a [`Provider`](crate::Provider)
//! validate its bindings at wiring time.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use crate::error::{InjectError, InjectResult};
use crate::key::TypeKey;
use crate::value::Value;

/// A declared constructor parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    /// Element type of the parameter (the `P` in `Arc<P>` or `Variadic<P>`)
    pub ty: TypeKey,
    /// Whether this parameter consumes the remaining bindings
    pub variadic: bool,
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variadic {
            write!(f, "...{}", self.ty)
        } else {
            write!(f, "{}", self.ty)
        }
    }
}

/// A bound argument handed to a constructor.
#[derive(Debug, Clone)]
pub enum Argument {
    Single(Value),
    Variadic(Vec<Value>),
}

impl Argument {
    fn type_name(&self) -> &'static str {
        match self {
            Argument::Single(value) => value.type_key().name(),
            Argument::Variadic(_) => "variadic list",
        }
    }
}

/// A type usable as a constructor parameter.
pub trait Parameter: Sized + 'static {
    fn param() -> Param;

    fn extract(argument: Argument) -> Option<Self>;
}

impl<T: ?Sized + Send + Sync + 'static> Parameter for Arc<T> {
    fn param() -> Param {
        Param { ty: TypeKey::of::<T>(), variadic: false }
    }

    fn extract(argument: Argument) -> Option<Self> {
        match argument {
            Argument::Single(value) => value.downcast::<T>(),
            Argument::Variadic(_) => None,
        }
    }
}

/// Variadic tail parameter: every remaining binding, in order.
///
/// ```rust
/// use ferrous_inject::{bind, Graph, Provider, Slot, Variadic};
///
/// let a = Slot::with_value(1u32);
/// let b = Slot::with_value(2u32);
/// let total: Slot<u32> = Slot::new();
///
/// let mut graph = Graph::default();
/// let sum = |values: Variadic<u32>| values.iter().map(|v| **v).sum::<u32>();
/// graph.define(&total, Provider::new(sum, bind![&a, &b]).unwrap()).unwrap();
///
/// assert_eq!(*graph.resolve(&total).unwrap(), 3);
/// ```
pub struct Variadic<T: ?Sized>(pub Vec<Arc<T>>);

impl<T: ?Sized> Variadic<T> {
    pub fn into_inner(self) -> Vec<Arc<T>> {
        self.0
    }
}

impl<T: ?Sized> Deref for Variadic<T> {
    type Target = [Arc<T>];

    fn deref(&self) -> &[Arc<T>] {
        &self.0
    }
}

impl<T: ?Sized + Send + Sync + 'static> Parameter for Variadic<T> {
    fn param() -> Param {
        Param { ty: TypeKey::of::<T>(), variadic: true }
    }

    fn extract(argument: Argument) -> Option<Self> {
        match argument {
            Argument::Variadic(values) => values
                .iter()
                .map(Value::downcast::<T>)
                .collect::<Option<Vec<_>>>()
                .map(Variadic),
            Argument::Single(_) => None,
        }
    }
}

/// A function that builds one value from bound arguments.
///
/// Implemented for every `Fn` of arity 0 to 8 whose parameters implement
/// [`Parameter`]. `Args` is the parameter tuple and only exists to keep the
/// arity impls apart.
pub trait Constructor<Args>: Send + Sync + 'static {
    type Output: Send + Sync + 'static;

    fn params(&self) -> Vec<Param>;

    fn construct(&self, arguments: Vec<Argument>) -> InjectResult<Self::Output>;
}

fn extract<P: Parameter>(index: usize, argument: Argument) -> InjectResult<P> {
    let found = argument.type_name();
    P::extract(argument).ok_or_else(|| InjectError::ArgumentType {
        index,
        expected: P::param().ty.name(),
        found,
    })
}

macro_rules! impl_constructor {
    ($($param:ident),*) => {
        impl<F, R, $($param,)*> Constructor<($($param,)*)> for F
        where
            F: Fn($($param),*) -> R + Send + Sync + 'static,
            R: Send + Sync + 'static,
            $($param: Parameter,)*
        {
            type Output = R;

            fn params(&self) -> Vec<Param> {
                vec![$($param::param()),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn construct(&self, arguments: Vec<Argument>) -> InjectResult<R> {
                let expected = self.params().len();
                if arguments.len() != expected {
                    return Err(InjectError::ArityMismatch {
                        expected: expected.to_string(),
                        found: arguments.len(),
                    });
                }
                let mut arguments = arguments.into_iter().enumerate();
                $(
                    let $param = arguments
                        .next()
                        .map(|(index, argument)| extract::<$param>(index, argument))
                        .ok_or(InjectError::ArityMismatch { expected: expected.to_string(), found: 0 })??;
                )*
                Ok((self)($($param),*))
            }
        }
    };
}

impl_constructor!();
impl_constructor!(A1);
impl_constructor!(A1, A2);
impl_constructor!(A1, A2, A3);
impl_constructor!(A1, A2, A3, A4);
impl_constructor!(A1, A2, A3, A4, A5);
impl_constructor!(A1, A2, A3, A4, A5, A6);
impl_constructor!(A1, A2, A3, A4, A5, A6, A7);
impl_constructor!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Object-safe view of a constructor, erased over its signature.
pub(crate) trait ErasedConstructor: Send + Sync {
    fn params(&self) -> &[Param];

    fn output(&self) -> TypeKey;

    fn call(&self, arguments: Vec<Argument>) -> InjectResult<Value>;
}

pub(crate) struct Typed<F, Args> {
    constructor: F,
    params: Vec<Param>,
    _args: PhantomData<fn(Args)>,
}

impl<F, Args> Typed<F, Args>
where
    F: Constructor<Args>,
{
    pub(crate) fn new(constructor: F) -> Self {
        let params = constructor.params();
        Typed { constructor, params, _args: PhantomData }
    }
}

impl<F, Args> ErasedConstructor for Typed<F, Args>
where
    F: Constructor<Args>,
    Args: 'static,
{
    fn params(&self) -> &[Param] {
        &self.params
    }

    fn output(&self) -> TypeKey {
        TypeKey::of::<F::Output>()
    }

    fn call(&self, arguments: Vec<Argument>) -> InjectResult<Value> {
        self.constructor.construct(arguments).map(Value::new)
    }
}

/// Renders a signature as `fn(P1, ...Pn) -> R`.
pub(crate) fn signature(params: &[Param], output: TypeKey) -> String {
    let params: Vec<String> = params.iter().map(Param::to_string).collect();
    format!("fn({}) -> {}", params.join(", "), output)
}
