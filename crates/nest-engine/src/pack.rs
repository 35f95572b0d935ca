//! Packing: rebuild a template's shape around a flat list of leaves
//!
//! Leaves are consumed in the order flattening would emit them. The leaf
//! count is checked before anything is built, so a failed pack has no
//! partial result.

use std::borrow::Cow;

use nest_core::{
    Key, Mapping, MappingKind, MappingView, NestError, NestResult, Path, PathStep, Record,
    Sequence, Value,
};

use crate::flatten::leaf_count;
use crate::walk::{descend, Node, Shell, Walk};

/// A container whose children are being packed
struct Frame<'a> {
    shell: Shell,
    pending: std::vec::IntoIter<(PathStep, Cow<'a, Value>)>,
    built: Vec<Value>,
}

enum Opened<'a> {
    Value(Value),
    Frame(Frame<'a>),
}

struct Packer<'w, 'c, 'r> {
    walk: &'w Walk<'c, 'r>,
    path: Path,
    leaves: std::vec::IntoIter<Value>,
    /// Leaf positions the walk has reached so far
    visited: usize,
}

impl<'w, 'c, 'r> Packer<'w, 'c, 'r> {
    fn open<'a>(
        &mut self,
        depth: usize,
        step: Option<PathStep>,
        node: Cow<'a, Value>,
    ) -> NestResult<Opened<'a>> {
        descend(&mut self.path, depth, step);
        self.walk.check_depth(&self.path)?;

        match self.walk.decompose(node, &self.path)? {
            Node::Leaf(_) => {
                self.visited += 1;
                // Ran dry: keep walking so the final count is exact
                Ok(Opened::Value(self.leaves.next().unwrap_or_else(Value::none)))
            }
            Node::Branch { shell, children } => Ok(Opened::Frame(Frame {
                shell,
                built: Vec::with_capacity(children.len()),
                pending: children.into_iter(),
            })),
        }
    }
}

pub(crate) fn pack(walk: Walk<'_, '_>, template: &Value, flat: Vec<Value>) -> NestResult<Value> {
    let supplied = flat.len();
    let expected = leaf_count(walk, template)?;
    if supplied != expected {
        return Err(NestError::LengthMismatch {
            expected,
            actual: supplied,
        });
    }

    let mut packer = Packer {
        walk: &walk,
        path: Path::root(),
        leaves: flat.into_iter(),
        visited: 0,
    };

    let mut frame = match packer.open(0, None, Cow::Borrowed(template))? {
        Opened::Value(leaf) => return Ok(leaf),
        Opened::Frame(frame) => frame,
    };

    // `frames` holds the ancestors of `frame`
    let mut frames: Vec<Frame<'_>> = Vec::new();
    let packed = loop {
        match frame.pending.next() {
            Some((step, child)) => {
                let depth = frames.len() + 1;
                match packer.open(depth, Some(step), child)? {
                    Opened::Value(leaf) => frame.built.push(leaf),
                    Opened::Frame(child) => frames.push(std::mem::replace(&mut frame, child)),
                }
            }
            None => {
                let value = assemble(frame.shell, frame.built)?;
                match frames.pop() {
                    Some(mut parent) => {
                        parent.built.push(value);
                        frame = parent;
                    }
                    None => break value,
                }
            }
        }
    };

    // A composite may decompose differently than it did when counted
    if packer.visited != supplied {
        return Err(NestError::LengthMismatch {
            expected: packer.visited,
            actual: supplied,
        });
    }
    Ok(packed)
}

/// Put packed children back into their container
fn assemble(shell: Shell, built: Vec<Value>) -> NestResult<Value> {
    let value = match shell {
        Shell::Sequence(kind) => Value::Sequence(Sequence::new(kind, built)),
        Shell::Mapping { kind, keys, order } => {
            Value::Mapping(restore_mapping(kind, keys, &order, built))
        }
        Shell::View {
            view,
            kind,
            keys,
            order,
        } => Value::MappingView(MappingView::new(
            view,
            restore_mapping(kind, keys, &order, built),
        )),
        Shell::Record(ty) => {
            let spec = ty.to_string();
            let given = built.len();
            Record::new(ty, built)
                .map(Value::Record)
                .ok_or_else(|| NestError::Reconstruction {
                    spec,
                    reason: format!("{} values for the record's fields", given),
                })?
        }
        Shell::Composite(composite) => {
            tracing::trace!(spec = %composite.type_spec(), components = built.len(), "rebuilding composite");
            Value::Composite(composite.rebuild(built)?)
        }
    };
    Ok(value)
}

/// Rebuild a mapping in its original key order. `built` holds the values in
/// ascending key order; `order[i]` is the insertion position of the i-th
/// smallest key.
fn restore_mapping(kind: MappingKind, keys: Vec<Key>, order: &[usize], built: Vec<Value>) -> Mapping {
    let mut slots: Vec<Option<Value>> = vec![None; keys.len()];
    for (&position, value) in order.iter().zip(built) {
        slots[position] = Some(value);
    }
    Mapping::from_entries(
        kind,
        keys.into_iter()
            .zip(slots)
            .filter_map(|(key, value)| value.map(|value| (key, value))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Classifier;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Arc;

    use nest_core::{ClassifierConfig, Composite, TypeSpec, ViewKind};
    use nest_registry::Registry;

    fn run(template: &Value, flat: Vec<Value>) -> NestResult<Value> {
        let registry = Registry::new();
        let classifier = Classifier::new(ClassifierConfig::default(), &registry);
        pack(
            Walk {
                classifier: &classifier,
                max_depth: 100,
                expand_composites: false,
            },
            template,
            flat,
        )
    }

    #[test]
    fn test_leaf_template() {
        assert_eq!(
            run(&Value::none(), vec![Value::int(3)]).unwrap(),
            Value::int(3)
        );
    }

    #[test]
    fn test_mapping_keeps_key_order() {
        let template = Value::dict([("b", Value::none()), ("a", Value::none())]);
        // Sorted order is a, b
        let packed = run(&template, vec![Value::int(1), Value::int(2)]).unwrap();

        let Value::Mapping(m) = packed else {
            panic!("expected a mapping");
        };
        let keys: Vec<String> = m.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["\"b\"", "\"a\""]);
        assert_eq!(m.get(&Key::str("a")), Some(&Value::int(1)));
        assert_eq!(m.get(&Key::str("b")), Some(&Value::int(2)));
    }

    #[test]
    fn test_view_template() {
        let source = Mapping::from_entries(MappingKind::Ordered, [("k", Value::none())]);
        let template = Value::view(ViewKind::Values, source);

        let packed = run(&template, vec![Value::int(9)]).unwrap();
        let Value::MappingView(view) = packed else {
            panic!("expected a view");
        };
        assert_eq!(view.view, ViewKind::Values);
        assert_eq!(view.source.kind, MappingKind::Ordered);
        assert_eq!(view.source.get(&Key::str("k")), Some(&Value::int(9)));
    }

    #[test]
    fn test_nested_shapes() {
        let template = Value::list(vec![
            Value::tuple(vec![Value::none(), Value::none()]),
            Value::list(vec![]),
            Value::none(),
        ]);
        let packed = run(&template, vec![Value::int(1), Value::int(2), Value::int(3)]).unwrap();
        assert_eq!(
            packed,
            Value::list(vec![
                Value::tuple(vec![Value::int(1), Value::int(2)]),
                Value::list(vec![]),
                Value::int(3),
            ])
        );
    }

    #[test]
    fn test_length_mismatch() {
        let template = Value::list(vec![Value::none(), Value::none()]);
        assert_eq!(
            run(&template, vec![Value::int(1)]).unwrap_err(),
            NestError::LengthMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    /// Decomposes into one more leaf on every call
    #[derive(Debug, Default)]
    struct Growing {
        calls: AtomicUsize,
    }

    impl Composite for Growing {
        fn type_spec(&self) -> TypeSpec {
            TypeSpec::new("Growing")
        }

        fn components(&self) -> Vec<Value> {
            let n = self.calls.fetch_add(1, AtomicOrdering::SeqCst) + 1;
            vec![Value::none(); n]
        }

        fn rebuild(&self, _components: Vec<Value>) -> NestResult<Arc<dyn Composite>> {
            Ok(Arc::new(Growing::default()))
        }
    }

    #[test]
    fn test_unstable_composite_reports_walked_count() {
        let registry = Registry::new();
        let classifier = Classifier::new(ClassifierConfig::default(), &registry);
        let walk = Walk {
            classifier: &classifier,
            max_depth: 100,
            expand_composites: true,
        };
        let template = Value::composite(Growing::default());

        // Counted with one component, packed with two
        assert_eq!(
            pack(walk, &template, vec![Value::int(1)]).unwrap_err(),
            NestError::LengthMismatch {
                expected: 2,
                actual: 1
            }
        );
    }
}
