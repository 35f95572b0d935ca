//! Well-known registry names
//!
//! The surrounding framework registers its own types under these names so
//! the engine can recognise them without importing the defining crates.

use nest_core::{NestError, NestResult, TypeTag};

use crate::Registry;

pub const TENSOR: &str = "Tensor";
pub const TYPE_SPEC: &str = "TypeSpec";
pub const TENSOR_SPEC: &str = "TensorSpec";
pub const EAGER_TENSOR: &str = "EagerTensor";
pub const INDEXED_SLICES: &str = "IndexedSlices";
pub const VARIABLE: &str = "Variable";
pub const RESOURCE_VARIABLE: &str = "ResourceVariable";
pub const OWNED_ITERATOR: &str = "OwnedIterator";

/// All well-known type names
pub const WELL_KNOWN_TYPES: &[&str] = &[
    TENSOR,
    TYPE_SPEC,
    TENSOR_SPEC,
    EAGER_TENSOR,
    INDEXED_SLICES,
    VARIABLE,
    RESOURCE_VARIABLE,
    OWNED_ITERATOR,
];

/// Register a default tag for every well-known type.
///
/// Eager tensors derive from tensors, tensor specs from type specs and
/// resource variables from variables, so subtype queries behave like the
/// framework's own hierarchy.
/// Names that are already registered are left alone.
pub fn register_defaults(registry: &Registry) -> NestResult<()> {
    let tensor = TypeTag::new(TENSOR);
    let type_spec = TypeTag::new(TYPE_SPEC);
    let variable = TypeTag::new(VARIABLE);
    let defaults = [
        (TENSOR, tensor.clone()),
        (TYPE_SPEC, type_spec.clone()),
        (TENSOR_SPEC, TypeTag::derived(TENSOR_SPEC, &[type_spec])),
        (EAGER_TENSOR, TypeTag::derived(EAGER_TENSOR, &[tensor])),
        (INDEXED_SLICES, TypeTag::new(INDEXED_SLICES)),
        (VARIABLE, variable.clone()),
        (
            RESOURCE_VARIABLE,
            TypeTag::derived(RESOURCE_VARIABLE, &[variable]),
        ),
        (OWNED_ITERATOR, TypeTag::new(OWNED_ITERATOR)),
    ];

    for (name, tag) in defaults {
        match registry.register_type(name, tag) {
            Ok(()) | Err(NestError::AlreadyRegistered(_)) => {}
            Err(err) => return Err(err),
        }
    }
    Ok(())
}
