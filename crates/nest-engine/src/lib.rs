//! NEST Engine - Traversal and structural comparison of nested values
//!
//! This crate implements the operations over [`nest_core::Value`] trees:
//! - Classification of values into structural roles
//! - Flattening into leaves in a canonical, deterministic order
//! - Packing flat leaves back into a template's shape
//! - Lock-step structural comparison with path-aware errors
//!
//! The free functions use the process-wide registry, default configuration
//! and never expand composites. Use [`Nest`] for anything else.

pub mod classify;
pub mod engine;

mod compare;
mod flatten;
mod pack;
mod walk;

pub use classify::*;
pub use engine::*;

use nest_core::{NestResult, NodeKind, Value};

/// Structural role of `value`
pub fn classify(value: &Value) -> NodeKind {
    Nest::new().classify(value)
}

/// Leaves of `root` in canonical order
pub fn flatten(root: &Value) -> NestResult<Vec<Value>> {
    Nest::new().flatten(root, false)
}

/// Rebuild `template`'s shape around `flat`
pub fn pack_sequence_as(template: &Value, flat: Vec<Value>) -> NestResult<Value> {
    Nest::new().pack(template, flat, false)
}

pub fn assert_same_structure(a: &Value, b: &Value, check_types: bool) -> NestResult<()> {
    Nest::new().assert_same_structure(a, b, check_types, false)
}

/// Nested under the data-pipeline profile (lists are leaves)
pub fn is_nested_for_data(value: &Value) -> bool {
    Nest::for_data().is_nested(value)
}

pub fn flatten_for_data(root: &Value) -> NestResult<Vec<Value>> {
    Nest::for_data().flatten(root, false)
}

pub fn assert_same_structure_for_data(a: &Value, b: &Value, check_types: bool) -> NestResult<()> {
    Nest::for_data().assert_same_structure(a, b, check_types, false)
}
