//! Sample composites
//!
//! Two structured value types that plug into traversal through
//! [`Composite`]:
//! - [`SparseComposite`]: coordinate-format sparse matrix
//! - [`RaggedComposite`]: rows of varying length, possibly nested

use std::sync::Arc;

use nest_core::{Composite, NestError, NestResult, TypeSpec, Value};

/// Sparse tensor in coordinate format.
///
/// Components, in order: indices (tuple of index tuples), values (tuple),
/// dense shape (tuple of ints).
#[derive(Clone, Debug)]
pub struct SparseComposite {
    indices: Value,
    values: Value,
    dense_shape: Value,
    rank: usize,
}

impl SparseComposite {
    pub fn new(indices: &[Vec<i64>], values: &[f64], dense_shape: &[i64]) -> Self {
        SparseComposite {
            indices: Value::tuple(
                indices
                    .iter()
                    .map(|index| Value::tuple(index.iter().copied().map(Value::int).collect()))
                    .collect(),
            ),
            values: Value::tuple(values.iter().copied().map(Value::float).collect()),
            dense_shape: Value::tuple(dense_shape.iter().copied().map(Value::int).collect()),
            rank: dense_shape.len(),
        }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn values(&self) -> &Value {
        &self.values
    }
}

impl Composite for SparseComposite {
    fn type_spec(&self) -> TypeSpec {
        TypeSpec::new("SparseTensor").with_param("rank", self.rank)
    }

    fn components(&self) -> Vec<Value> {
        vec![
            self.indices.clone(),
            self.values.clone(),
            self.dense_shape.clone(),
        ]
    }

    fn rebuild(&self, components: Vec<Value>) -> NestResult<Arc<dyn Composite>> {
        let [indices, values, dense_shape]: [Value; 3] =
            components.try_into().map_err(|c: Vec<Value>| NestError::Reconstruction {
                spec: self.type_spec().to_string(),
                reason: format!("expected 3 components, got {}", c.len()),
            })?;
        Ok(Arc::new(SparseComposite {
            indices,
            values,
            dense_shape,
            rank: self.rank,
        }))
    }

    fn is_dispatchable(&self) -> bool {
        true
    }
}

/// Ragged tensor: flat values split into rows.
///
/// Components, in order: values, row splits. The values component may itself
/// be a ragged composite, adding a ragged dimension.
#[derive(Clone, Debug)]
pub struct RaggedComposite {
    values: Value,
    row_splits: Value,
}

impl RaggedComposite {
    /// Build from rows of leaves
    pub fn from_rows(rows: Vec<Vec<Value>>) -> Self {
        let mut splits = vec![0i64];
        let mut flat = Vec::new();
        for row in rows {
            flat.extend(row);
            splits.push(flat.len() as i64);
        }
        RaggedComposite {
            values: Value::list(flat),
            row_splits: Value::tuple(splits.into_iter().map(Value::int).collect()),
        }
    }

    /// Add a ragged dimension on top of `inner`
    pub fn nested(inner: RaggedComposite, row_splits: &[i64]) -> Self {
        RaggedComposite {
            values: Value::composite(inner),
            row_splits: Value::tuple(row_splits.iter().copied().map(Value::int).collect()),
        }
    }

    /// Number of ragged dimensions
    pub fn ragged_rank(&self) -> usize {
        ragged_rank_of(&self.values) + 1
    }

    pub fn row_count(&self) -> usize {
        match &self.row_splits {
            Value::Sequence(seq) => seq.len().saturating_sub(1),
            _ => 0,
        }
    }
}

fn ragged_rank_of(values: &Value) -> usize {
    match values {
        Value::Composite(c) => c
            .type_spec()
            .param("ragged_rank")
            .and_then(|rank| rank.parse().ok())
            .unwrap_or(0),
        _ => 0,
    }
}

impl Composite for RaggedComposite {
    fn type_spec(&self) -> TypeSpec {
        TypeSpec::new("RaggedTensor").with_param("ragged_rank", self.ragged_rank())
    }

    fn components(&self) -> Vec<Value> {
        vec![self.values.clone(), self.row_splits.clone()]
    }

    fn rebuild(&self, components: Vec<Value>) -> NestResult<Arc<dyn Composite>> {
        let [values, row_splits]: [Value; 2] =
            components.try_into().map_err(|c: Vec<Value>| NestError::Reconstruction {
                spec: self.type_spec().to_string(),
                reason: format!("expected 2 components, got {}", c.len()),
            })?;
        let rebuilt = RaggedComposite { values, row_splits };
        if rebuilt.ragged_rank() != self.ragged_rank() {
            return Err(NestError::Reconstruction {
                spec: self.type_spec().to_string(),
                reason: format!("ragged rank changed to {}", rebuilt.ragged_rank()),
            });
        }
        Ok(Arc::new(rebuilt))
    }

    fn is_dispatchable(&self) -> bool {
        true
    }
}
