//! Type tags for opaque leaves
//!
//! Framework types (tensors, variables, iterators) never expose their
//! internals to the engine. Each opaque leaf carries a [`TypeTag`] instead,
//! and the registry maps well-known names to tags so the engine can answer
//! "is this a tensor?" without depending on the tensor crate.

use std::fmt;
use std::sync::Arc;

/// Identity of an opaque leaf type
#[derive(Clone)]
pub struct TypeTag {
    inner: Arc<TagInner>,
}

struct TagInner {
    name: Arc<str>,
    bases: Vec<TypeTag>,
    dispatchable: bool,
}

impl TypeTag {
    /// A root type with no bases
    pub fn new(name: &str) -> Self {
        TypeTag {
            inner: Arc::new(TagInner {
                name: Arc::from(name),
                bases: Vec::new(),
                dispatchable: false,
            }),
        }
    }

    /// A type derived from one or more base types
    pub fn derived(name: &str, bases: &[TypeTag]) -> Self {
        TypeTag {
            inner: Arc::new(TagInner {
                name: Arc::from(name),
                bases: bases.to_vec(),
                dispatchable: false,
            }),
        }
    }

    /// Mark values of this type as handling dispatch themselves
    pub fn dispatchable(self) -> Self {
        TypeTag {
            inner: Arc::new(TagInner {
                name: self.inner.name.clone(),
                bases: self.inner.bases.clone(),
                dispatchable: true,
            }),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn bases(&self) -> &[TypeTag] {
        &self.inner.bases
    }

    #[inline]
    pub fn is_dispatchable(&self) -> bool {
        self.inner.dispatchable
    }

    /// Check if this type is `other` or derives from it, directly or not.
    pub fn is_subtype_of(&self, other: &TypeTag) -> bool {
        let mut pending: Vec<&TypeTag> = vec![self];
        while let Some(tag) = pending.pop() {
            if tag == other {
                return true;
            }
            pending.extend(tag.bases());
        }
        false
    }
}

/// Tags are equal when they share a declaration or have the same name.
impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner.name == other.inner.name
    }
}

impl Eq for TypeTag {}

impl std::hash::Hash for TypeTag {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.name.hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({})", self.name())
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
