//! NEST Registry - Named objects shared with the surrounding framework
//!
//! The framework hands the engine identifiers for types it must recognise
//! (tensors, variables, ...) without the engine importing their crates:
//! - Name → object store with an explicit initialization phase
//! - Process-wide instance
//! - Well-known type names and their default tags

pub mod registry;
pub mod names;

pub use registry::*;
pub use names::*;
