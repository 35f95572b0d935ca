//! Composite values - structured domain types with their own decomposition
//!
//! A composite (a sparse matrix, a ragged batch, ...) plugs into traversal
//! through a three-part contract:
//! - a [`TypeSpec`] identifying its kind for structural comparison
//! - an ordered decomposition into component values
//! - a reconstruction function building a same-spec value from components
//!
//! The engine never looks inside a composite; it only calls [`Composite`].

use std::fmt;
use std::sync::Arc;

use crate::{NestResult, Value};

/// Opaque identity token of a composite kind.
///
/// Two specs are equal when their names and ordered parameters are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeSpec {
    name: Arc<str>,
    params: Vec<(Arc<str>, Arc<str>)>,
}

impl TypeSpec {
    pub fn new(name: &str) -> Self {
        TypeSpec {
            name: Arc::from(name),
            params: Vec::new(),
        }
    }

    /// Add a parameter (dtype, rank, ...) that is part of the identity
    pub fn with_param(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.params
            .push((Arc::from(key), Arc::from(value.to_string().as_str())));
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[(Arc<str>, Arc<str>)] {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| &**k == key)
            .map(|(_, v)| &**v)
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.params.is_empty() {
            f.write_str("<")?;
            for (i, (k, v)) in self.params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}={}", k, v)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// Decomposition contract implemented by composite value types
pub trait Composite: fmt::Debug + Send + Sync {
    /// Identity of this value's kind
    fn type_spec(&self) -> TypeSpec;

    /// Ordered components. Components may themselves be nested structures
    /// or composites.
    fn components(&self) -> Vec<Value>;

    /// Build a value of this composite's spec from `components`.
    ///
    /// `components` has the shape produced by [`Composite::components`]
    /// with its leaves replaced.
    fn rebuild(&self, components: Vec<Value>) -> NestResult<Arc<dyn Composite>>;

    /// Whether this value handles operation dispatch itself
    fn is_dispatchable(&self) -> bool {
        false
    }
}
