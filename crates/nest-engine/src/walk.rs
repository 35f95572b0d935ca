//! Traversal primitives shared by flatten, pack and compare
//!
//! Every traversal runs on an explicit stack, so nesting depth is bounded
//! by configuration rather than by the thread's stack size.
//!
//! # Canonical child order
//!
//! | Node | Children |
//! |------|----------|
//! | Sequence | elements, in order |
//! | Mapping / MappingView | values, by ascending key |
//! | Record | fields, in declared order |
//! | Composite (expanded) | components, in the composite's order |

use std::borrow::Cow;
use std::sync::Arc;

use nest_core::{
    sorted_order, Composite, Key, Mapping, MappingKind, NestError, NestResult, NodeKind, Path,
    PathStep, RecordType, SequenceKind, Value, ViewKind,
};

use crate::Classifier;

/// Everything needed to rebuild a container around new children
pub(crate) enum Shell {
    Sequence(SequenceKind),
    Mapping {
        kind: MappingKind,
        /// Keys in insertion order
        keys: Vec<Key>,
        /// Insertion positions in ascending key order
        order: Vec<usize>,
    },
    View {
        view: ViewKind,
        kind: MappingKind,
        keys: Vec<Key>,
        order: Vec<usize>,
    },
    Record(RecordType),
    Composite(Arc<dyn Composite>),
}

/// A value split into its container and its children
pub(crate) enum Node<'a> {
    Leaf(Cow<'a, Value>),
    Branch {
        shell: Shell,
        /// Children in canonical order
        children: Vec<(PathStep, Cow<'a, Value>)>,
    },
}

/// Settings of one traversal
#[derive(Clone, Copy)]
pub(crate) struct Walk<'c, 'r> {
    pub classifier: &'c Classifier<'r>,
    pub max_depth: usize,
    pub expand_composites: bool,
}

impl<'c, 'r> Walk<'c, 'r> {
    /// Role of `value` in this traversal
    pub(crate) fn kind(&self, value: &Value) -> NodeKind {
        self.classifier.traversal_kind(value, self.expand_composites)
    }

    /// Fail once `path` addresses a node deeper than allowed
    pub(crate) fn check_depth(&self, path: &Path) -> NestResult<()> {
        if path.len() > self.max_depth {
            return Err(NestError::DepthExceeded {
                max_depth: self.max_depth,
                path: path.clone(),
            });
        }
        Ok(())
    }

    /// Split `node` into container and children in canonical order
    pub(crate) fn decompose<'a>(&self, node: Cow<'a, Value>, path: &Path) -> NestResult<Node<'a>> {
        let kind = self.kind(&node);
        if kind == NodeKind::Leaf {
            return Ok(Node::Leaf(node));
        }
        let Some(shell) = shell_of(&node, path)? else {
            return Ok(Node::Leaf(node));
        };

        let parts = into_parts(node);
        let children = match &shell {
            Shell::Sequence(_) => indexed(parts, PathStep::Index),
            Shell::Composite(_) => indexed(parts, PathStep::Component),
            // A record traversed as a plain tuple is addressed by position
            Shell::Record(_) if kind == NodeKind::Sequence => indexed(parts, PathStep::Index),
            Shell::Record(ty) => ty
                .fields()
                .iter()
                .cloned()
                .map(PathStep::Field)
                .zip(parts)
                .collect(),
            Shell::Mapping { keys, order, .. } | Shell::View { keys, order, .. } => {
                by_key(parts, keys, order)
            }
        };

        Ok(Node::Branch { shell, children })
    }
}

/// Keep `path` in step with a depth-first stack: the node being visited sits
/// at `depth` and was reached through `step`.
pub(crate) fn descend(path: &mut Path, depth: usize, step: Option<PathStep>) {
    path.truncate(depth.saturating_sub(1));
    if let Some(step) = step {
        path.push(step);
    }
}

fn shell_of(value: &Value, path: &Path) -> NestResult<Option<Shell>> {
    let shell = match value {
        Value::Leaf(_) => return Ok(None),
        Value::Sequence(seq) => Shell::Sequence(seq.kind.clone()),
        Value::Mapping(mapping) => {
            let (keys, order) = sort_keys(mapping, path)?;
            Shell::Mapping {
                kind: mapping.kind.clone(),
                keys,
                order,
            }
        }
        Value::MappingView(view) => {
            let (keys, order) = sort_keys(&view.source, path)?;
            Shell::View {
                view: view.view,
                kind: view.source.kind.clone(),
                keys,
                order,
            }
        }
        Value::Record(record) => Shell::Record(record.record_type().clone()),
        Value::Composite(composite) => Shell::Composite(composite.clone()),
    };
    Ok(Some(shell))
}

fn sort_keys(mapping: &Mapping, path: &Path) -> NestResult<(Vec<Key>, Vec<usize>)> {
    let keys: Vec<Key> = mapping.keys().cloned().collect();
    let order = sorted_order(keys.iter()).map_err(|(left, right)| NestError::UnorderableKeys {
        path: path.clone(),
        left,
        right,
    })?;
    Ok((keys, order))
}

/// Children in declared order. Borrowed nodes lend their children; owned
/// nodes (expanded composite components) give them up.
fn into_parts(node: Cow<'_, Value>) -> Vec<Cow<'_, Value>> {
    match node {
        Cow::Borrowed(value) => match value {
            Value::Leaf(_) => Vec::new(),
            Value::Sequence(seq) => seq.items.iter().map(Cow::Borrowed).collect(),
            Value::Mapping(mapping) => mapping.values().map(Cow::Borrowed).collect(),
            Value::MappingView(view) => view.source.values().map(Cow::Borrowed).collect(),
            Value::Record(record) => record.values().iter().map(Cow::Borrowed).collect(),
            Value::Composite(composite) => {
                composite.components().into_iter().map(Cow::Owned).collect()
            }
        },
        Cow::Owned(value) => match value {
            Value::Leaf(_) => Vec::new(),
            Value::Sequence(seq) => seq.into_items().into_iter().map(Cow::Owned).collect(),
            Value::Mapping(mapping) => values_of(mapping),
            Value::MappingView(view) => values_of(view.source),
            Value::Record(record) => record.into_parts().1.into_iter().map(Cow::Owned).collect(),
            Value::Composite(composite) => {
                composite.components().into_iter().map(Cow::Owned).collect()
            }
        },
    }
}

fn values_of<'a>(mapping: Mapping) -> Vec<Cow<'a, Value>> {
    mapping
        .into_entries()
        .into_iter()
        .map(|(_, value)| Cow::Owned(value))
        .collect()
}

fn indexed<'a>(
    parts: Vec<Cow<'a, Value>>,
    step: fn(usize) -> PathStep,
) -> Vec<(PathStep, Cow<'a, Value>)> {
    parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| (step(i), part))
        .collect()
}

fn by_key<'a>(
    parts: Vec<Cow<'a, Value>>,
    keys: &[Key],
    order: &[usize],
) -> Vec<(PathStep, Cow<'a, Value>)> {
    let mut slots: Vec<Option<Cow<'a, Value>>> = parts.into_iter().map(Some).collect();
    order
        .iter()
        .filter_map(|&i| {
            slots[i]
                .take()
                .map(|part| (PathStep::Key(keys[i].clone()), part))
        })
        .collect()
}
