//! Record types - tuple-like values with named fields
//!
//! A record type's identity is its declared name plus its ordered field
//! names. Two independently declared types with the same identity are the
//! same kind of record; nothing else about the declaration matters.

use std::fmt;
use std::sync::Arc;

/// Declared record type
#[derive(Clone)]
pub struct RecordType {
    inner: Arc<RecordInner>,
}

struct RecordInner {
    name: Arc<str>,
    fields: Vec<Arc<str>>,
    base: Option<RecordType>,
}

impl RecordType {
    /// Declare a plain record type
    pub fn new(name: &str, fields: &[&str]) -> Self {
        RecordType {
            inner: Arc::new(RecordInner {
                name: Arc::from(name),
                fields: fields.iter().map(|f| Arc::from(*f)).collect(),
                base: None,
            }),
        }
    }

    /// Declare a record type that extends `base`.
    ///
    /// The derived type keeps the base's fields; only its name may differ.
    pub fn derived(name: &str, base: &RecordType) -> Self {
        RecordType {
            inner: Arc::new(RecordInner {
                name: Arc::from(name),
                fields: base.inner.fields.clone(),
                base: Some(base.clone()),
            }),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn fields(&self) -> &[Arc<str>] {
        &self.inner.fields
    }

    pub fn field_count(&self) -> usize {
        self.inner.fields.len()
    }

    pub fn base(&self) -> Option<&RecordType> {
        self.inner.base.as_ref()
    }

    /// A plain record was declared directly, not by extending another one.
    #[inline]
    pub fn is_plain(&self) -> bool {
        self.inner.base.is_none()
    }

    /// Position of a field by name
    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.inner.fields.iter().position(|f| &**f == field)
    }

    /// First field name present in one type but not the other.
    ///
    /// Falls back to the first position where the field lists disagree,
    /// which catches reorderings of the same field set.
    pub fn first_field_difference(&self, other: &RecordType) -> Option<Arc<str>> {
        let missing_in_other = self
            .fields()
            .iter()
            .find(|f| other.field_index(f).is_none());
        let missing_in_self = || {
            other
                .fields()
                .iter()
                .find(|f| self.field_index(f).is_none())
        };
        let reordered = || {
            self.fields()
                .iter()
                .zip(other.fields())
                .find(|(a, b)| a != b)
                .map(|(a, _)| a)
        };

        missing_in_other
            .or_else(missing_in_self)
            .or_else(reordered)
            .cloned()
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.name == other.inner.name && self.inner.fields == other.inner.fields)
    }
}

impl Eq for RecordType {}

impl std::hash::Hash for RecordType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.name.hash(state);
        self.inner.fields.hash(state);
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordType({})", self)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name())?;
        for (i, field) in self.fields().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(field)?;
        }
        f.write_str(")")
    }
}
