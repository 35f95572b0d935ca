//! Structural roles
//!
//! Every value plays exactly one structural role during traversal. When a
//! value could satisfy several capabilities the highest-precedence role wins:
//! Composite > Record > Mapping/MappingView > Sequence > Leaf.

use std::fmt;

/// Structural role of a value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Leaf,
    Sequence,
    MappingView,
    Mapping,
    Record,
    Composite,
}

impl NodeKind {
    /// Classification precedence (higher wins)
    pub fn precedence(self) -> u8 {
        match self {
            NodeKind::Leaf => 0,
            NodeKind::Sequence => 1,
            NodeKind::MappingView | NodeKind::Mapping => 2,
            NodeKind::Record => 3,
            NodeKind::Composite => 4,
        }
    }

    /// Does this role have children?
    #[inline]
    pub fn is_nested(self) -> bool {
        !matches!(self, NodeKind::Leaf)
    }

    /// Mappings and their views share one structural shape
    #[inline]
    pub fn is_mapping_like(self) -> bool {
        matches!(self, NodeKind::Mapping | NodeKind::MappingView)
    }

    /// Kinds that compare as the same structure
    pub fn same_shape(self, other: NodeKind) -> bool {
        self == other || (self.is_mapping_like() && other.is_mapping_like())
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Leaf => "leaf",
            NodeKind::Sequence => "sequence",
            NodeKind::MappingView => "mapping view",
            NodeKind::Mapping => "mapping",
            NodeKind::Record => "record",
            NodeKind::Composite => "composite",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order() {
        assert!(NodeKind::Composite.precedence() > NodeKind::Record.precedence());
        assert!(NodeKind::Record.precedence() > NodeKind::Mapping.precedence());
        assert_eq!(
            NodeKind::Mapping.precedence(),
            NodeKind::MappingView.precedence()
        );
        assert!(NodeKind::Mapping.precedence() > NodeKind::Sequence.precedence());
        assert!(NodeKind::Sequence.precedence() > NodeKind::Leaf.precedence());
    }

    #[test]
    fn test_same_shape() {
        assert!(NodeKind::Mapping.same_shape(NodeKind::MappingView));
        assert!(!NodeKind::Sequence.same_shape(NodeKind::Record));
        assert!(!NodeKind::Leaf.is_nested());
    }
}
