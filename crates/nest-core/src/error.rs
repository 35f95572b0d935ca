//! Error types for NEST

use thiserror::Error;

use crate::{Key, NodeKind, Path};

/// Core NEST errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NestError {
    // Traversal errors
    #[error("Mapping keys at {path} cannot be ordered: {left} vs {right}")]
    UnorderableKeys { path: Path, left: Key, right: Key },

    #[error("Maximum depth {max_depth} exceeded at {path}")]
    DepthExceeded { max_depth: usize, path: Path },

    // Packing errors
    #[error("Length mismatch: structure has {expected} leaves, got {actual} flat values")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Composite {spec} could not be rebuilt: {reason}")]
    Reconstruction { spec: String, reason: String },

    // Comparison errors
    #[error(transparent)]
    StructureMismatch(#[from] StructureMismatch),

    // Query errors
    #[error("Expected a record, got {0}")]
    NotARecord(NodeKind),

    #[error("Expected a mapping, got {0}")]
    NotAMapping(NodeKind),

    // Registry errors
    #[error("Nothing registered under {0:?}")]
    NotFound(String),

    #[error("Name {0:?} is already registered")]
    AlreadyRegistered(String),

    #[error("Registry is sealed, cannot register {0:?}")]
    RegistrySealed(String),

    #[error("Registered object {0:?} is not a type")]
    NotAType(String),
}

/// Two structures diverge at `path`
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Structures differ at {path}: {kind}")]
pub struct StructureMismatch {
    pub path: Path,
    pub kind: MismatchKind,
}

/// How two structures diverge
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MismatchKind {
    #[error("{left} elements vs {right} elements")]
    CountMismatch { left: usize, right: usize },

    #[error("key {key} only present on the {side} side")]
    KeyMismatch { key: String, side: Side },

    #[error("{left} vs {right}")]
    KindMismatch { left: NodeKind, right: NodeKind },

    #[error("type {left} vs type {right}")]
    TypeMismatch { left: String, right: String },
}

/// Which operand of a comparison
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

impl NestError {
    pub fn mismatch(path: Path, kind: MismatchKind) -> Self {
        NestError::StructureMismatch(StructureMismatch { path, kind })
    }

    /// The mismatch details, if this is a structural divergence
    pub fn as_mismatch(&self) -> Option<&StructureMismatch> {
        match self {
            NestError::StructureMismatch(m) => Some(m),
            _ => None,
        }
    }
}

/// Result type for NEST operations
pub type NestResult<T> = Result<T, NestError>;
