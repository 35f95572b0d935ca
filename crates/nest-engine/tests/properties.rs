//! Property tests for flatten, pack and structural comparison

use std::sync::Arc;

use nest_core::{
    Composite, Key, Mapping, MappingKind, MismatchKind, NestConfig, NestError, NestResult,
    RecordType, TypeSpec, Value, ViewKind,
};
use nest_engine::Nest;
use nest_registry::Registry;
use proptest::prelude::*;

// =============================================================================
// Fixtures
// =============================================================================

/// Composite over an arbitrary list of components
#[derive(Debug)]
struct Bundle(Vec<Value>);

impl Composite for Bundle {
    fn type_spec(&self) -> TypeSpec {
        TypeSpec::new("Bundle").with_param("arity", self.0.len())
    }

    fn components(&self) -> Vec<Value> {
        self.0.clone()
    }

    fn rebuild(&self, components: Vec<Value>) -> NestResult<Arc<dyn Composite>> {
        Ok(Arc::new(Bundle(components)))
    }
}

/// Composite whose spec is just a name
#[derive(Debug)]
struct Named(&'static str, Vec<Value>);

impl Composite for Named {
    fn type_spec(&self) -> TypeSpec {
        TypeSpec::new(self.0)
    }

    fn components(&self) -> Vec<Value> {
        self.1.clone()
    }

    fn rebuild(&self, components: Vec<Value>) -> NestResult<Arc<dyn Composite>> {
        Ok(Arc::new(Named(self.0, components)))
    }
}

fn point() -> RecordType {
    RecordType::new("Point", &["x", "y"])
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::int),
        any::<bool>().prop_map(Value::bool),
        (-1.0e6..1.0e6f64).prop_map(Value::float),
        "[a-z]{0,4}".prop_map(|s| Value::str(&s)),
        Just(Value::none()),
    ]
}

fn structure() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(5, 64, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::list),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::tuple),
            prop::collection::hash_map("[a-e]", inner.clone(), 0..4).prop_map(|m| Value::dict(m)),
            (inner.clone(), inner.clone())
                .prop_map(|(x, y)| Value::record(&point(), vec![x, y]).unwrap()),
            prop::collection::vec(inner, 0..3).prop_map(|c| Value::composite(Bundle(c))),
        ]
    })
}

fn engine(registry: &Registry) -> Nest<'_> {
    Nest::with_registry(NestConfig::default(), registry)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_round_trip(value in structure(), expand in any::<bool>()) {
        let registry = Registry::new();
        let nest = engine(&registry);

        let flat = nest.flatten(&value, expand).unwrap();
        let packed = nest.pack(&value, flat, expand).unwrap();
        prop_assert_eq!(packed, value);
    }

    #[test]
    fn prop_flatten_is_deterministic(value in structure(), expand in any::<bool>()) {
        let registry = Registry::new();
        let nest = engine(&registry);

        prop_assert_eq!(
            nest.flatten(&value, expand).unwrap(),
            nest.flatten(&value, expand).unwrap()
        );
    }

    #[test]
    fn prop_reflexive(value in structure()) {
        let registry = Registry::new();
        let nest = engine(&registry);

        prop_assert!(nest.assert_same_structure(&value, &value, true, true).is_ok());
    }

    #[test]
    fn prop_leaf_count_matches_flatten(value in structure(), expand in any::<bool>()) {
        let registry = Registry::new();
        let nest = engine(&registry);

        prop_assert_eq!(
            nest.leaf_count(&value, expand).unwrap(),
            nest.flatten(&value, expand).unwrap().len()
        );
    }

    #[test]
    fn prop_pack_then_flatten_preserves_order(value in structure(), expand in any::<bool>()) {
        let registry = Registry::new();
        let nest = engine(&registry);

        let count = nest.leaf_count(&value, expand).unwrap();
        let numbered: Vec<Value> = (0..count as i64).map(Value::int).collect();
        let packed = nest.pack(&value, numbered.clone(), expand).unwrap();

        prop_assert_eq!(nest.flatten(&packed, expand).unwrap(), numbered);
        prop_assert!(nest.assert_same_structure(&value, &packed, true, expand).is_ok());
    }

    #[test]
    fn prop_wrong_length_rejected(value in structure(), extra in 1usize..3) {
        let registry = Registry::new();
        let nest = engine(&registry);

        let count = nest.leaf_count(&value, false).unwrap();
        let flat = vec![Value::none(); count + extra];
        prop_assert_eq!(
            nest.pack(&value, flat, false).unwrap_err(),
            NestError::LengthMismatch { expected: count, actual: count + extra }
        );
    }
}

// =============================================================================
// Examples
// =============================================================================

#[test]
fn test_mapping_flattens_by_key() {
    let registry = Registry::new();
    let nest = engine(&registry);
    let value = Value::dict([("b", Value::int(1)), ("a", Value::int(2))]);

    assert_eq!(
        nest.flatten(&value, false).unwrap(),
        vec![Value::int(2), Value::int(1)]
    );
}

#[test]
fn test_independent_point_records() {
    let registry = Registry::new();
    let nest = engine(&registry);
    let a = RecordType::new("Point", &["x", "y"]);
    let b = RecordType::new("Point", &["x", "y"]);
    let c = RecordType::new("Point", &["x", "y", "z"]);

    let pa = Value::record(&a, vec![Value::int(1), Value::int(2)]).unwrap();
    let pb = Value::record(&b, vec![Value::int(3), Value::int(4)]).unwrap();
    let pc = Value::record(&c, vec![Value::int(1), Value::int(2), Value::int(3)]).unwrap();

    assert!(nest.assert_same_structure(&pa, &pb, true, false).is_ok());

    let err = nest.assert_same_structure(&pa, &pc, true, false).unwrap_err();
    assert!(matches!(
        err.as_mismatch().map(|m| &m.kind),
        Some(MismatchKind::KeyMismatch { key, .. }) if key == "z"
    ));
}

#[test]
fn test_depth_guard() {
    let registry = Registry::new();
    let nest = engine(&registry);

    let mut value = Value::int(0);
    for _ in 0..1000 {
        value = Value::list(vec![value]);
    }
    assert_eq!(nest.flatten(&value, false).unwrap().len(), 1);

    let deeper = Value::list(vec![value]);
    assert!(matches!(
        nest.flatten(&deeper, false),
        Err(NestError::DepthExceeded { max_depth: 1000, .. })
    ));
    assert!(matches!(
        nest.assert_same_structure(&deeper, &deeper, false, false),
        Err(NestError::DepthExceeded { .. })
    ));
}

#[test]
fn test_three_component_composite() {
    let registry = Registry::new();
    let nest = engine(&registry);
    let value = Value::composite(Bundle(vec![
        Value::int(1),
        Value::int(2),
        Value::int(3),
    ]));

    assert_eq!(nest.flatten(&value, false).unwrap().len(), 1);
    assert_eq!(nest.flatten(&value, true).unwrap().len(), 3);
}

#[test]
fn test_composite_count_mismatch() {
    let registry = Registry::new();
    let nest = engine(&registry);
    let two = Value::composite(Bundle(vec![Value::int(1), Value::int(2)]));
    let three = Value::composite(Bundle(vec![
        Value::int(1),
        Value::int(2),
        Value::int(3),
    ]));

    assert!(nest.assert_same_structure(&two, &three, false, false).is_ok());
    let err = nest.assert_same_structure(&two, &three, false, true).unwrap_err();
    assert_eq!(
        err.as_mismatch().map(|m| m.kind.clone()),
        Some(MismatchKind::CountMismatch { left: 2, right: 3 })
    );
    // Specs differ too, but the count is reported first
    assert!(nest.assert_same_structure(&two, &three, true, true).is_err());
}

#[test]
fn test_composite_type_spec_mismatch() {
    let registry = Registry::new();
    let nest = engine(&registry);
    let sparse = Value::composite(Named("Sparse", vec![Value::int(1), Value::int(2)]));
    let ragged = Value::composite(Named("Ragged", vec![Value::int(1), Value::int(2)]));

    assert!(nest.assert_same_structure(&sparse, &ragged, false, true).is_ok());
    assert!(nest.assert_same_structure(&sparse, &ragged, true, false).is_ok());

    let err = nest.assert_same_structure(&sparse, &ragged, true, true).unwrap_err();
    let mismatch = err.as_mismatch().unwrap();
    assert_eq!(mismatch.path.to_string(), "<root>");
    assert_eq!(
        mismatch.kind,
        MismatchKind::TypeMismatch {
            left: "Sparse".into(),
            right: "Ragged".into()
        }
    );
}

#[test]
fn test_mapping_view_flattens_by_key() {
    let registry = Registry::new();
    let nest = engine(&registry);
    let source = Mapping::from_entries(
        MappingKind::Dict,
        [("b", Value::int(1)), ("c", Value::int(3)), ("a", Value::int(2))],
    );
    let view = Value::view(ViewKind::Values, source);

    assert_eq!(
        nest.flatten(&view, false).unwrap(),
        vec![Value::int(2), Value::int(1), Value::int(3)]
    );
}

#[test]
fn test_unorderable_keys_surface_from_every_operation() {
    let registry = Registry::new();
    let nest = engine(&registry);
    let mut mixed = Mapping::new(MappingKind::Dict);
    mixed.insert("a", Value::int(1));
    mixed.insert(1, Value::int(2));
    let value = Value::list(vec![Value::Mapping(mixed)]);

    let unorderable = |result: NestError| match result {
        NestError::UnorderableKeys { path, .. } => path.to_string(),
        other => panic!("unexpected error: {}", other),
    };
    assert_eq!(unorderable(nest.flatten(&value, false).unwrap_err()), "[0]");
    assert_eq!(
        unorderable(nest.assert_same_structure(&value, &value, false, false).unwrap_err()),
        "[0]"
    );
    assert_eq!(
        unorderable(nest.pack(&value, vec![Value::none(); 2], false).unwrap_err()),
        "[0]"
    );
}

#[test]
fn test_numerically_equal_keys_flatten_consistently() {
    let registry = Registry::new();
    let nest = engine(&registry);
    let a = Value::dict([
        (Key::Int(1), Value::str("int")),
        (Key::Float(1.0), Value::str("float")),
    ]);
    let b = Value::dict([
        (Key::Float(1.0), Value::str("float")),
        (Key::Int(1), Value::str("int")),
    ]);

    let expected = vec![Value::str("int"), Value::str("float")];
    assert_eq!(nest.flatten(&a, false).unwrap(), expected);
    assert_eq!(nest.flatten(&b, false).unwrap(), expected);
    assert!(nest.same_structure(&a, &b, true, false).unwrap());

    let repacked = nest.pack(&a, nest.flatten(&b, false).unwrap(), false).unwrap();
    assert_eq!(repacked, a);
}

#[test]
fn test_drop_after_depth_exceeded() {
    // A small stack: neither the walk nor dropping the value may recurse
    std::thread::Builder::new()
        .stack_size(512 * 1024)
        .spawn(|| {
            let registry = Registry::new();
            let nest = engine(&registry);
            let mut value = Value::int(0);
            for _ in 0..200_000 {
                value = Value::list(vec![value]);
            }

            assert!(matches!(
                nest.flatten(&value, false),
                Err(NestError::DepthExceeded { max_depth: 1000, .. })
            ));
            drop(value);
        })
        .unwrap()
        .join()
        .unwrap();
}
