//! Structural comparison of two values visited in lock-step
//!
//! Leaf values are never compared, only shapes. The first divergence in
//! canonical order is reported together with its path from the root.

use std::borrow::Cow;
use std::collections::HashMap;

use nest_core::{
    Key, MismatchKind, NestError, NestResult, NodeKind, Path, PathStep, RecordType, Side, Value,
};

use crate::walk::{descend, Node, Shell, Walk};

type Pair<'a> = (usize, Option<PathStep>, Cow<'a, Value>, Cow<'a, Value>);

pub(crate) fn assert_same_structure(
    walk: Walk<'_, '_>,
    a: &Value,
    b: &Value,
    check_types: bool,
) -> NestResult<()> {
    let mut path = Path::root();
    let mut stack: Vec<Pair<'_>> = vec![(0, None, Cow::Borrowed(a), Cow::Borrowed(b))];

    while let Some((depth, step, left, right)) = stack.pop() {
        descend(&mut path, depth, step);
        walk.check_depth(&path)?;

        let (left_kind, right_kind) = (walk.kind(&left), walk.kind(&right));
        if left_kind == NodeKind::Leaf && right_kind == NodeKind::Leaf {
            continue;
        }
        if !left_kind.same_shape(right_kind) {
            return Err(NestError::mismatch(
                path,
                MismatchKind::KindMismatch {
                    left: left_kind,
                    right: right_kind,
                },
            ));
        }
        if left_kind == NodeKind::Record {
            compare_records(&left, &right, &path)?;
        }

        let type_mismatch = check_types && differ_in_type(&left, &right);
        let left_type = type_mismatch.then(|| left.type_name());
        let right_type = type_mismatch.then(|| right.type_name());

        let (Node::Branch { shell, children: left_children, .. }, Node::Branch { children: right_children, .. }) =
            (walk.decompose(left, &path)?, walk.decompose(right, &path)?)
        else {
            continue;
        };

        let pairs = match shell {
            Shell::Mapping { .. } | Shell::View { .. } => {
                pair_by_key(left_children, right_children, &path)?
            }
            _ => {
                if left_children.len() != right_children.len() {
                    return Err(NestError::mismatch(
                        path,
                        MismatchKind::CountMismatch {
                            left: left_children.len(),
                            right: right_children.len(),
                        },
                    ));
                }
                left_children
                    .into_iter()
                    .zip(right_children)
                    .map(|((step, l), (_, r))| (step, l, r))
                    .collect()
            }
        };

        if let (Some(left), Some(right)) = (left_type, right_type) {
            return Err(NestError::mismatch(
                path,
                MismatchKind::TypeMismatch { left, right },
            ));
        }

        stack.extend(
            pairs
                .into_iter()
                .rev()
                .map(|(step, l, r)| (depth + 1, Some(step), l, r)),
        );
    }

    Ok(())
}

/// Concrete types differ in a way `check_types` cares about
fn differ_in_type(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Composite(l), Value::Composite(r)) => l.type_spec() != r.type_spec(),
        _ => left.type_name() != right.type_name(),
    }
}

fn record_type(value: &Value) -> Option<&RecordType> {
    match value {
        Value::Record(record) => Some(record.record_type()),
        _ => None,
    }
}

/// Records match only when their declared identities are equal
fn compare_records(left: &Value, right: &Value, path: &Path) -> NestResult<()> {
    let (Some(l), Some(r)) = (record_type(left), record_type(right)) else {
        return Ok(());
    };
    if l == r {
        return Ok(());
    }
    let kind = match l.first_field_difference(r) {
        Some(field) => MismatchKind::KeyMismatch {
            side: if l.field_index(&field).is_some() {
                Side::Left
            } else {
                Side::Right
            },
            key: field.to_string(),
        },
        None => MismatchKind::TypeMismatch {
            left: l.to_string(),
            right: r.to_string(),
        },
    };
    Err(NestError::mismatch(path.clone(), kind))
}

/// Pair mapping children by key. Both sides arrive in ascending key order.
fn pair_by_key<'a>(
    left: Vec<(PathStep, Cow<'a, Value>)>,
    right: Vec<(PathStep, Cow<'a, Value>)>,
    path: &Path,
) -> NestResult<Vec<(PathStep, Cow<'a, Value>, Cow<'a, Value>)>> {
    let mut by_key: HashMap<Key, Cow<'a, Value>> = right
        .into_iter()
        .filter_map(|(step, value)| match step {
            PathStep::Key(key) => Some((key, value)),
            _ => None,
        })
        .collect();

    let mut pairs = Vec::with_capacity(left.len());
    for (step, value) in left {
        let PathStep::Key(key) = &step else {
            continue;
        };
        match by_key.remove(key) {
            Some(other) => pairs.push((step, value, other)),
            None => {
                return Err(NestError::mismatch(
                    path.clone(),
                    MismatchKind::KeyMismatch {
                        key: key.to_string(),
                        side: Side::Left,
                    },
                ))
            }
        }
    }

    // Whatever is left exists only on the right; report the smallest
    if let Some(key) = smallest_key(by_key.keys()) {
        return Err(NestError::mismatch(
            path.clone(),
            MismatchKind::KeyMismatch {
                key: key.to_string(),
                side: Side::Right,
            },
        ));
    }

    Ok(pairs)
}

fn smallest_key<'k>(keys: impl Iterator<Item = &'k Key>) -> Option<&'k Key> {
    keys.min_by(|a, b| a.try_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
}
