//! Nest engine - configuration, classifier and registry behind one handle

use nest_core::{NestConfig, NestError, NestResult, NodeKind, Value};
use nest_registry::Registry;

use crate::walk::Walk;
use crate::{compare, flatten, pack, Classifier};

/// Entry point for classify, flatten, pack and compare.
///
/// All operations are pure: they read their inputs and build new values.
/// A `Nest` can be shared freely between threads.
#[derive(Clone, Debug)]
pub struct Nest<'r> {
    /// Configuration
    config: NestConfig,
    /// Classifier bound to the registry
    classifier: Classifier<'r>,
}

impl Nest<'static> {
    /// Create an engine over the process-wide registry with default configuration
    pub fn new() -> Self {
        Self::with_config(NestConfig::default())
    }

    /// Create an engine over the process-wide registry
    pub fn with_config(config: NestConfig) -> Self {
        Nest::with_registry(config, nest_registry::global())
    }

    /// Data-pipeline engine: lists are leaves, composites are never expanded
    pub fn for_data() -> Self {
        Self::with_config(NestConfig::for_data())
    }
}

impl Default for Nest<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> Nest<'r> {
    /// Create an engine over a specific registry
    pub fn with_registry(config: NestConfig, registry: &'r Registry) -> Self {
        let classifier = Classifier::new(config.classifier.clone(), registry);
        Nest { config, classifier }
    }

    pub fn config(&self) -> &NestConfig {
        &self.config
    }

    /// The classifier, for the full query surface
    pub fn classifier(&self) -> &Classifier<'r> {
        &self.classifier
    }

    fn walk(&self, expand_composites: bool) -> Walk<'_, 'r> {
        Walk {
            classifier: &self.classifier,
            max_depth: self.config.max_depth,
            expand_composites: expand_composites && !self.config.atomic_composites,
        }
    }

    /// Structural role of `value`
    pub fn classify(&self, value: &Value) -> NodeKind {
        self.classifier.classify(value)
    }

    /// Does `value` have children?
    pub fn is_nested(&self, value: &Value) -> bool {
        self.classifier.is_nested(value)
    }

    /// Leaves of `root` in canonical order.
    ///
    /// Mapping values come out by ascending key; composites are emitted whole
    /// unless `expand_composites` is set.
    pub fn flatten(&self, root: &Value, expand_composites: bool) -> NestResult<Vec<Value>> {
        let leaves = flatten::flatten(self.walk(expand_composites), root)?;
        tracing::trace!(leaves = leaves.len(), expand_composites, "flattened");
        Ok(leaves)
    }

    /// Number of leaves `flatten` would return
    pub fn leaf_count(&self, root: &Value, expand_composites: bool) -> NestResult<usize> {
        flatten::leaf_count(self.walk(expand_composites), root)
    }

    /// Build a value shaped like `template` whose leaves are `flat`, in
    /// flatten order. Fails with [`NestError::LengthMismatch`] before building
    /// anything when the counts differ.
    pub fn pack(
        &self,
        template: &Value,
        flat: Vec<Value>,
        expand_composites: bool,
    ) -> NestResult<Value> {
        let leaves = flat.len();
        let packed = pack::pack(self.walk(expand_composites), template, flat);
        if let Err(err) = &packed {
            tracing::debug!(leaves, error = %err, "pack failed");
        }
        packed
    }

    /// Check that `a` and `b` have the same nested structure.
    ///
    /// Leaf values are not compared. With `check_types` the concrete
    /// container types must match too (records always compare by identity).
    pub fn assert_same_structure(
        &self,
        a: &Value,
        b: &Value,
        check_types: bool,
        expand_composites: bool,
    ) -> NestResult<()> {
        let result =
            compare::assert_same_structure(self.walk(expand_composites), a, b, check_types);
        if let Err(err) = &result {
            tracing::debug!(check_types, expand_composites, error = %err, "structures differ");
        }
        result
    }

    /// `assert_same_structure` as a predicate. Errors other than a
    /// structural mismatch (depth, unorderable keys) are still returned.
    pub fn same_structure(
        &self,
        a: &Value,
        b: &Value,
        check_types: bool,
        expand_composites: bool,
    ) -> NestResult<bool> {
        match self.assert_same_structure(a, b, check_types, expand_composites) {
            Ok(()) => Ok(true),
            Err(NestError::StructureMismatch(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
