//! Fuzz flatten, pack and compare over arbitrary nested values

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use nest_core::{Mapping, MappingKind, NestConfig, NestError, RecordType, Value, ViewKind};
use nest_engine::Nest;
use nest_registry::Registry;

#[derive(Arbitrary, Debug)]
enum Shape {
    Int(i64),
    Text(String),
    Nothing,
    List(Vec<Shape>),
    Tuple(Vec<Shape>),
    Dict(Vec<(u8, Shape)>),
    Ordered(Vec<(String, Shape)>),
    Values(Vec<(u8, Shape)>),
    Point(Box<Shape>, Box<Shape>),
}

impl Shape {
    fn build(self) -> Value {
        match self {
            Shape::Int(i) => Value::int(i),
            Shape::Text(s) => Value::str(&s),
            Shape::Nothing => Value::none(),
            Shape::List(items) => Value::list(items.into_iter().map(Shape::build).collect()),
            Shape::Tuple(items) => Value::tuple(items.into_iter().map(Shape::build).collect()),
            Shape::Dict(entries) => Value::dict(
                entries
                    .into_iter()
                    .map(|(k, v)| (i64::from(k), v.build())),
            ),
            Shape::Ordered(entries) => {
                Value::ordered_dict(entries.into_iter().map(|(k, v)| (k, v.build())))
            }
            Shape::Values(entries) => Value::view(
                ViewKind::Values,
                Mapping::from_entries(
                    MappingKind::Dict,
                    entries.into_iter().map(|(k, v)| (i64::from(k), v.build())),
                ),
            ),
            Shape::Point(x, y) => {
                let point = RecordType::new("Point", &["x", "y"]);
                Value::record(&point, vec![(*x).build(), (*y).build()]).unwrap_or_else(Value::none)
            }
        }
    }
}

fuzz_target!(|shape: Shape| {
    let registry = Registry::new();
    let nest = Nest::with_registry(NestConfig::default(), &registry);
    let value = shape.build();

    match nest.flatten(&value, true) {
        Ok(flat) => {
            assert_eq!(nest.leaf_count(&value, true).ok(), Some(flat.len()));
            let packed = nest.pack(&value, flat, true).expect("pack of own leaves");
            assert_eq!(packed, value);
            nest.assert_same_structure(&value, &packed, true, true)
                .expect("round trip keeps structure");
        }
        Err(NestError::DepthExceeded { .. }) => {}
        Err(err) => panic!("unexpected error: {}", err),
    }
});
