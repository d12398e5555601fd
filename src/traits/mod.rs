//! Lifecycle capability traits.

mod lifecycle;

pub use lifecycle::{Finalize, Initialize};
