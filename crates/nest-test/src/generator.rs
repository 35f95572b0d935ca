//! Structure Generator - seeded random nested values
//!
//! Produces every container kind the engine knows: lists, tuples, dicts,
//! ordered dicts, mapping views, records and the sample composites, with
//! leaves of every scalar kind plus opaque tensor handles.

use nest_core::{Mapping, MappingKind, RecordType, TypeTag, Value, ViewKind};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use crate::{RaggedComposite, SparseComposite};

/// Generator configuration
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Number of structures per run
    pub case_count: usize,
    /// Deepest container nesting
    pub max_depth: usize,
    /// Fewest children per container
    pub min_width: usize,
    /// Most children per container
    pub max_width: usize,
    /// Container budget per structure; once spent, every new node is a leaf
    pub max_nodes: usize,
    /// Distinct mapping keys to draw from
    pub key_pool: usize,
    /// Probability that a non-root node is a leaf (0.0 - 1.0)
    pub leaf_prob: f64,
    /// Probability that a container is a composite
    pub composite_prob: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            case_count: 200,
            max_depth: 6,
            min_width: 0,
            max_width: 5,
            max_nodes: 256,
            key_pool: 8,
            leaf_prob: 0.4,
            composite_prob: 0.1,
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    /// Small structures for quick tests
    pub fn light() -> Self {
        GeneratorConfig {
            case_count: 50,
            max_depth: 3,
            min_width: 0,
            max_width: 3,
            max_nodes: 32,
            key_pool: 4,
            leaf_prob: 0.5,
            composite_prob: 0.1,
            seed: 42,
        }
    }

    /// Many wide structures for thorough testing
    pub fn heavy() -> Self {
        GeneratorConfig {
            case_count: 2000,
            max_depth: 8,
            min_width: 0,
            max_width: 8,
            max_nodes: 2048,
            key_pool: 16,
            leaf_prob: 0.3,
            composite_prob: 0.15,
            seed: 42,
        }
    }

    /// Narrow, deeply nested structures
    pub fn deep() -> Self {
        GeneratorConfig {
            case_count: 20,
            max_depth: 200,
            min_width: 1,
            max_width: 2,
            max_nodes: 400,
            key_pool: 4,
            leaf_prob: 0.0,
            composite_prob: 0.0,
            seed: 42,
        }
    }
}

/// Seeded generator of nested values
pub struct StructureGenerator {
    config: GeneratorConfig,
    rng: StdRng,
    record_types: Vec<RecordType>,
    tensor: TypeTag,
    /// Containers built for the current structure
    nodes: usize,
}

impl StructureGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        let point = RecordType::new("Point", &["x", "y"]);
        let record_types = vec![
            RecordType::derived("LabeledPoint", &point),
            point,
            RecordType::new("Span", &["start", "stop", "step"]),
        ];

        StructureGenerator {
            config,
            rng,
            record_types,
            tensor: TypeTag::new("Tensor"),
            nodes: 0,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Tag carried by generated opaque leaves
    pub fn tensor_tag(&self) -> &TypeTag {
        &self.tensor
    }

    /// Generate one structure; the root is always a container
    pub fn generate(&mut self) -> Value {
        self.nodes = 0;
        self.container(0)
    }

    /// Generate `config.case_count` structures
    pub fn generate_batch(&mut self) -> Vec<Value> {
        (0..self.config.case_count).map(|_| self.generate()).collect()
    }

    fn node(&mut self, depth: usize) -> Value {
        if depth >= self.config.max_depth
            || self.nodes >= self.config.max_nodes
            || self.rng.gen::<f64>() < self.config.leaf_prob
        {
            self.leaf()
        } else {
            self.container(depth)
        }
    }

    fn width(&mut self, most: usize) -> usize {
        let least = self.config.min_width.min(most);
        self.rng.gen_range(least..=most)
    }

    fn children(&mut self, depth: usize) -> Vec<Value> {
        let width = self.width(self.config.max_width);
        (0..width).map(|_| self.node(depth + 1)).collect()
    }

    fn container(&mut self, depth: usize) -> Value {
        self.nodes += 1;
        if self.rng.gen::<f64>() < self.config.composite_prob {
            return self.composite(depth);
        }
        match self.rng.gen_range(0..6) {
            0 => Value::list(self.children(depth)),
            1 => Value::tuple(self.children(depth)),
            2 => Value::Mapping(self.mapping(MappingKind::Dict, depth)),
            3 => Value::Mapping(self.mapping(MappingKind::Ordered, depth)),
            4 => {
                let view = match self.rng.gen_range(0..3) {
                    0 => ViewKind::Keys,
                    1 => ViewKind::Values,
                    _ => ViewKind::Items,
                };
                Value::view(view, self.mapping(MappingKind::Dict, depth))
            }
            _ => self.record(depth),
        }
    }

    /// Keys of one mapping are all strings or all ints, so they stay orderable
    fn mapping(&mut self, kind: MappingKind, depth: usize) -> Mapping {
        let pool = self.config.key_pool.max(1);
        let width = self.width(self.config.max_width.min(pool));
        let string_keys = self.rng.gen_bool(0.7);

        let mut mapping = Mapping::new(kind);
        for k in index::sample(&mut self.rng, pool, width).into_vec() {
            let value = self.node(depth + 1);
            if string_keys {
                mapping.insert(format!("k{}", k), value);
            } else {
                mapping.insert(k as i64, value);
            }
        }
        mapping
    }

    fn record(&mut self, depth: usize) -> Value {
        let ty = self.record_types[self.rng.gen_range(0..self.record_types.len())].clone();
        let values = (0..ty.field_count()).map(|_| self.node(depth + 1)).collect();
        Value::record(&ty, values).unwrap_or_else(Value::none)
    }

    fn composite(&mut self, depth: usize) -> Value {
        if self.rng.gen_bool(0.5) {
            let rank = self.rng.gen_range(1..=3);
            let nnz = self.rng.gen_range(0..=self.config.max_width);
            let dense_shape: Vec<i64> = (0..rank).map(|_| self.rng.gen_range(1..10)).collect();
            let indices: Vec<Vec<i64>> = (0..nnz)
                .map(|_| dense_shape.iter().map(|&d| self.rng.gen_range(0..d)).collect())
                .collect();
            let values: Vec<f64> = (0..nnz).map(|_| self.rng.gen_range(-1.0..1.0)).collect();
            Value::composite(SparseComposite::new(&indices, &values, &dense_shape))
        } else {
            let row_count = self.rng.gen_range(0..=self.config.max_width);
            let rows = (0..row_count).map(|_| self.children(depth)).collect();
            Value::composite(RaggedComposite::from_rows(rows))
        }
    }

    fn leaf(&mut self) -> Value {
        match self.rng.gen_range(0..7) {
            0 => Value::none(),
            1 => Value::bool(self.rng.gen()),
            2 => Value::int(self.rng.gen_range(-1000..1000)),
            3 => Value::float(self.rng.gen_range(-1.0e3..1.0e3)),
            4 => Value::str(&format!("s{}", self.rng.gen_range(0..100))),
            5 => {
                let len = self.rng.gen_range(0..8);
                let data: Vec<u8> = (0..len).map(|_| self.rng.gen()).collect();
                Value::bytes(data)
            }
            _ => Value::opaque(self.tensor.clone(), self.rng.gen::<f32>()),
        }
    }
}

/// A list nested `depth` levels deep around a single leaf
pub fn chain(depth: usize) -> Value {
    let mut value = Value::int(0);
    for _ in 0..depth {
        value = Value::list(vec![value]);
    }
    value
}
