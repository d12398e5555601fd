//! # ferrous-inject
//!
//! Constructor-driven object graph wiring for Rust.
//!
//! You own typed [`Slot`]s; the [`Graph`] owns [`Definition`]s that bind each
//! slot to a [`Provider`] (a constructor plus the slots that feed its
//! arguments). Resolving any slot resolves its dependencies first, in
//! whatever order they were defined, and writes every produced value back
//! into the caller's slots.
//!
//! ## Features
//!
//! - **Lazy, memoized resolution**: each provider runs at most once per graph
//! - **Type-directed lookups**: exact and capability (`dyn Trait`) matching
//! - **Variadic and automatic bindings**: collect every match, or let the
//!   graph pick the single assignable definition
//! - **Lifecycle hooks**: [`Initialize`] after construction, [`Finalize`] at teardown
//! - **Cycle detection**: cyclic wiring fails with the full slot path
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_inject::{bind, Graph, Provider, Slot};
//! use std::sync::Arc;
//!
//! struct Config {
//!     url: String,
//! }
//!
//! struct Database {
//!     config: Arc<Config>,
//! }
//!
//! let config: Slot<Config> = Slot::named("config");
//! let database: Slot<Database> = Slot::named("database");
//!
//! let mut graph = Graph::default();
//! graph
//!     .define(&database, Provider::new(|config: Arc<Config>| Database { config }, bind![&config]).unwrap())
//!     .unwrap();
//! graph
//!     .define(&config, Provider::new(|| Config { url: "postgres://localhost".into() }, vec![]).unwrap())
//!     .unwrap();
//!
//! graph.resolve_all().unwrap();
//! assert_eq!(database.get().unwrap().config.url, "postgres://localhost");
//! assert!(config.is_set());
//! ```
//!
//! ## Capabilities
//!
//! Rust cannot ask at runtime whether a value implements a trait, so the
//! [`TypeRegistry`] records it. A slot declared as `Slot<dyn Trait>` accepts
//! any provider whose output type is registered as implementing `Trait`.
//!
//! ```rust
//! use ferrous_inject::{implements, Graph, Provider, Slot, TypeRegistry};
//!
//! trait Logger: Send + Sync {
//!     fn prefix(&self) -> &str;
//! }
//!
//! struct Console;
//! impl Logger for Console {
//!     fn prefix(&self) -> &str { "[console]" }
//! }
//!
//! let mut types = TypeRegistry::new();
//! implements!(types, Console => dyn Logger);
//!
//! let logger: Slot<dyn Logger> = Slot::new();
//! let mut graph = Graph::new(types);
//! graph.define(&logger, Provider::new(|| Console, vec![]).unwrap()).unwrap();
//!
//! assert_eq!(graph.resolve(&logger).unwrap().prefix(), "[console]");
//! ```

pub mod config;
pub mod definition;
pub mod descriptors;
pub mod error;
pub mod extract;
pub mod graph;
pub mod key;
pub mod observer;
pub mod provider;
pub mod slot;
pub mod traits;
pub mod types;
pub mod validation;
pub mod value;

mod internal;
mod render;

pub use config::{GraphConfig, TeardownOrder};
pub use definition::Definition;
pub use descriptors::DefinitionDescriptor;
pub use error::{InjectError, InjectResult};
pub use extract::{extract_assignable, extract_by_type, find_assignable, find_by_type};
pub use graph::Graph;
pub use key::{exact, SlotId, TypeKey};
pub use observer::{GraphObserver, LoggingObserver, MetricsObserver};
pub use provider::{Binding, Constructor, Parameter, Provider, Variadic};
pub use slot::{Slot, SlotRef};
pub use traits::{Finalize, Initialize};
pub use types::TypeRegistry;
pub use validation::ValidationReport;
pub use value::Value;
