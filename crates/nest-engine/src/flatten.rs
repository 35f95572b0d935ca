//! Flattening: leaves in canonical depth-first order

use std::borrow::Cow;

use nest_core::{NestResult, Path, PathStep, Value};

use crate::walk::{descend, Node, Walk};

/// Visit every leaf of `root` in canonical order
pub(crate) fn for_each_leaf<'a>(
    walk: Walk<'_, '_>,
    root: &'a Value,
    mut visit: impl FnMut(Cow<'a, Value>),
) -> NestResult<()> {
    let mut path = Path::root();
    let mut stack: Vec<(usize, Option<PathStep>, Cow<'a, Value>)> =
        vec![(0, None, Cow::Borrowed(root))];

    while let Some((depth, step, node)) = stack.pop() {
        descend(&mut path, depth, step);
        walk.check_depth(&path)?;

        match walk.decompose(node, &path)? {
            Node::Leaf(leaf) => visit(leaf),
            Node::Branch { children, .. } => {
                // Reversed so the first child is popped first
                stack.extend(
                    children
                        .into_iter()
                        .rev()
                        .map(|(step, child)| (depth + 1, Some(step), child)),
                );
            }
        }
    }

    Ok(())
}

pub(crate) fn flatten(walk: Walk<'_, '_>, root: &Value) -> NestResult<Vec<Value>> {
    let mut leaves = Vec::new();
    for_each_leaf(walk, root, |leaf| leaves.push(leaf.into_owned()))?;
    Ok(leaves)
}

pub(crate) fn leaf_count(walk: Walk<'_, '_>, root: &Value) -> NestResult<usize> {
    let mut count = 0;
    for_each_leaf(walk, root, |_| count += 1)?;
    Ok(count)
}
