//! Type classifier
//!
//! Predicates answer what a value *can* act as (a record is also a tuple).
//! [`Classifier::classify`] resolves those capabilities into the single
//! role the value plays during traversal.

use nest_core::{
    ClassifierConfig, Key, Leaf, NestError, NestResult, NodeKind, SequenceKind, Value,
};
use nest_registry::{
    Registry, EAGER_TENSOR, INDEXED_SLICES, OWNED_ITERATOR, RESOURCE_VARIABLE, TENSOR,
    TENSOR_SPEC, TYPE_SPEC, VARIABLE,
};

/// Structural capabilities of a value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub composite: bool,
    pub record: bool,
    pub mapping: bool,
    pub mapping_view: bool,
    pub sequence: bool,
}

impl Capabilities {
    /// Highest-precedence role among the capabilities
    pub fn resolve(self) -> NodeKind {
        if self.composite {
            NodeKind::Composite
        } else if self.record {
            NodeKind::Record
        } else if self.mapping {
            NodeKind::Mapping
        } else if self.mapping_view {
            NodeKind::MappingView
        } else if self.sequence {
            NodeKind::Sequence
        } else {
            NodeKind::Leaf
        }
    }
}

/// Classifies values, consulting the registry for framework types
#[derive(Clone, Debug)]
pub struct Classifier<'r> {
    config: ClassifierConfig,
    registry: &'r Registry,
}

impl<'r> Classifier<'r> {
    pub fn new(config: ClassifierConfig, registry: &'r Registry) -> Self {
        Classifier { config, registry }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Everything `value` can structurally act as
    pub fn capabilities(&self, value: &Value) -> Capabilities {
        let mut caps = Capabilities::default();
        match value {
            Value::Composite(_) => caps.composite = true,
            Value::Record(record) => {
                caps.record =
                    !self.config.strict_records || record.record_type().is_plain();
                caps.sequence = true;
            }
            Value::Mapping(_) => caps.mapping = true,
            Value::MappingView(_) => caps.mapping_view = true,
            Value::Sequence(seq) => {
                caps.sequence = !(self.config.lists_are_atomic && seq.kind == SequenceKind::List);
            }
            // Text and bytes iterate, but are never a level of nesting
            Value::Leaf(_) => {}
        }
        caps
    }

    /// Structural role of `value`
    pub fn classify(&self, value: &Value) -> NodeKind {
        self.capabilities(value).resolve()
    }

    /// Role during a traversal: unexpanded composites are leaves
    pub fn traversal_kind(&self, value: &Value, expand_composites: bool) -> NodeKind {
        match self.classify(value) {
            NodeKind::Composite if !expand_composites => NodeKind::Leaf,
            kind => kind,
        }
    }

    /// Sequence, mapping, view or record
    pub fn is_nested(&self, value: &Value) -> bool {
        !matches!(self.classify(value), NodeKind::Leaf | NodeKind::Composite)
    }

    /// Anything but a leaf, or a type spec
    pub fn is_nested_or_composite(&self, value: &Value) -> bool {
        self.classify(value) != NodeKind::Leaf || self.is_type_spec(value)
    }

    pub fn is_sequence_like(&self, value: &Value) -> bool {
        self.capabilities(value).sequence
    }

    pub fn is_mapping(&self, value: &Value) -> bool {
        self.capabilities(value).mapping
    }

    pub fn is_mapping_like(&self, value: &Value) -> bool {
        let caps = self.capabilities(value);
        caps.mapping || caps.mapping_view
    }

    pub fn is_mutable_mapping(&self, value: &Value) -> bool {
        matches!(value, Value::Mapping(m) if m.kind.is_mutable())
    }

    pub fn is_mapping_view(&self, value: &Value) -> bool {
        self.capabilities(value).mapping_view
    }

    /// Tuples, including every record
    pub fn is_tuple(&self, value: &Value) -> bool {
        match value {
            Value::Sequence(seq) => seq.kind == SequenceKind::Tuple,
            Value::Record(_) => true,
            _ => false,
        }
    }

    /// Record check with explicit strictness.
    ///
    /// With `strict`, records whose type extends another record type do not
    /// count.
    pub fn is_record_like(&self, value: &Value, strict: bool) -> bool {
        match value {
            Value::Record(record) => !strict || record.record_type().is_plain(),
            _ => false,
        }
    }

    pub fn is_composite(&self, value: &Value) -> bool {
        self.capabilities(value).composite
    }

    /// Composite value, or the type spec describing one
    pub fn is_composite_or_spec(&self, value: &Value) -> bool {
        self.is_composite(value) || self.is_type_spec(value)
    }

    /// Opaque leaf of a registered type-spec type, tensor specs excepted.
    ///
    /// Spec values carry no components, so traversal keeps them as leaves.
    /// When no type-spec type is registered nothing matches.
    pub fn is_type_spec(&self, value: &Value) -> bool {
        let Value::Leaf(Leaf::Opaque(opaque)) = value else {
            return false;
        };
        let Ok(spec) = self.registry.get_type(TYPE_SPEC) else {
            return false;
        };
        opaque.tag().is_subtype_of(&spec)
            && !self
                .registry
                .get_type(TENSOR_SPEC)
                .is_ok_and(|tensor_spec| opaque.tag().is_subtype_of(&tensor_spec))
    }

    pub fn is_opaque_atomic(&self, value: &Value) -> bool {
        self.classify(value) == NodeKind::Leaf
    }

    /// Values that handle operation dispatch themselves
    pub fn is_dispatchable(&self, value: &Value) -> bool {
        match value {
            Value::Leaf(Leaf::Opaque(opaque)) => opaque.tag().is_dispatchable(),
            Value::Composite(composite) => composite.is_dispatchable(),
            _ => false,
        }
    }

    /// Check if `value` is an opaque leaf of the type registered under
    /// `name`, or of a type derived from it.
    pub fn is_instance(&self, value: &Value, name: &str) -> NestResult<bool> {
        let tag = self.registry.get_type(name)?;
        Ok(match value {
            Value::Leaf(Leaf::Opaque(opaque)) => opaque.tag().is_subtype_of(&tag),
            _ => false,
        })
    }

    pub fn is_tensor(&self, value: &Value) -> NestResult<bool> {
        self.is_instance(value, TENSOR)
    }

    pub fn is_tensor_spec(&self, value: &Value) -> NestResult<bool> {
        self.is_instance(value, TENSOR_SPEC)
    }

    pub fn is_eager_tensor(&self, value: &Value) -> NestResult<bool> {
        self.is_instance(value, EAGER_TENSOR)
    }

    pub fn is_indexed_slices(&self, value: &Value) -> NestResult<bool> {
        self.is_instance(value, INDEXED_SLICES)
    }

    pub fn is_variable(&self, value: &Value) -> NestResult<bool> {
        self.is_instance(value, VARIABLE)
    }

    pub fn is_resource_variable(&self, value: &Value) -> NestResult<bool> {
        self.is_instance(value, RESOURCE_VARIABLE)
    }

    pub fn is_owned_iterator(&self, value: &Value) -> NestResult<bool> {
        self.is_instance(value, OWNED_ITERATOR)
    }

    /// Check if two records have the same type identity
    pub fn same_records(&self, a: &Value, b: &Value) -> NestResult<bool> {
        match (a, b) {
            (Value::Record(x), Value::Record(y)) => Ok(x.record_type() == y.record_type()),
            (Value::Record(_), other) | (other, _) => {
                Err(NestError::NotARecord(self.classify(other)))
            }
        }
    }

    /// Keys of a mapping in insertion order
    pub fn mapping_keys(&self, value: &Value) -> NestResult<Vec<Key>> {
        match value {
            Value::Mapping(mapping) => Ok(mapping.keys().cloned().collect()),
            other => Err(NestError::NotAMapping(self.classify(other))),
        }
    }
}
