//! Nested values
//!
//! [`Value`] is the tagged union every traversal operates on. Containers own
//! their children; leaves are cheap to clone (shared payloads).
//!
//! Containers tear down their children iteratively, so dropping a value
//! nested far beyond any traversal limit does not grow the call stack.
//! Composite components are dropped by the composite type itself.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::{Composite, Key, RecordType, TypeTag};

/// A nested value
#[derive(Clone, Debug)]
pub enum Value {
    Leaf(Leaf),
    Sequence(Sequence),
    Mapping(Mapping),
    MappingView(MappingView),
    Record(Record),
    Composite(Arc<dyn Composite>),
}

/// Atomic value, never decomposed
#[derive(Clone, Debug)]
pub enum Leaf {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Bytes(Bytes),
    Opaque(Opaque),
}

/// Framework value the engine only knows by its type tag
#[derive(Clone)]
pub struct Opaque {
    tag: TypeTag,
    payload: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    pub fn new<T: Any + Send + Sync>(tag: TypeTag, payload: T) -> Self {
        Opaque {
            tag,
            payload: Arc::new(payload),
        }
    }

    #[inline]
    pub fn tag(&self) -> &TypeTag {
        &self.tag
    }

    /// Borrow the payload as a concrete type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque<{}>", self.tag)
    }
}

impl PartialEq for Leaf {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Leaf::None, Leaf::None) => true,
            (Leaf::Bool(a), Leaf::Bool(b)) => a == b,
            (Leaf::Int(a), Leaf::Int(b)) => a == b,
            // Bitwise, so NaN payloads survive a round trip as equal
            (Leaf::Float(a), Leaf::Float(b)) => a.to_bits() == b.to_bits(),
            (Leaf::Str(a), Leaf::Str(b)) => a == b,
            (Leaf::Bytes(a), Leaf::Bytes(b)) => a == b,
            (Leaf::Opaque(a), Leaf::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

/// Declared kind of a sequence
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    List,
    Tuple,
    /// User-declared sequence type
    Named(Arc<str>),
}

impl SequenceKind {
    pub fn name(&self) -> &str {
        match self {
            SequenceKind::List => "list",
            SequenceKind::Tuple => "tuple",
            SequenceKind::Named(name) => name,
        }
    }
}

/// Ordered sequence of values
#[derive(Clone, Debug, PartialEq)]
pub struct Sequence {
    pub kind: SequenceKind,
    pub items: Vec<Value>,
}

impl Sequence {
    pub fn new(kind: SequenceKind, items: Vec<Value>) -> Self {
        Sequence { kind, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(mut self) -> Vec<Value> {
        std::mem::take(&mut self.items)
    }
}

impl Drop for Sequence {
    fn drop(&mut self) {
        dismantle(&mut self.items);
    }
}

/// Declared kind of a mapping
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MappingKind {
    Dict,
    Ordered,
    /// Read-only mapping
    Frozen,
    /// User-declared mapping type
    Named { name: Arc<str>, mutable: bool },
}

impl MappingKind {
    pub fn name(&self) -> &str {
        match self {
            MappingKind::Dict => "dict",
            MappingKind::Ordered => "ordered_dict",
            MappingKind::Frozen => "frozen_dict",
            MappingKind::Named { name, .. } => name,
        }
    }

    pub fn is_mutable(&self) -> bool {
        match self {
            MappingKind::Dict | MappingKind::Ordered => true,
            MappingKind::Frozen => false,
            MappingKind::Named { mutable, .. } => *mutable,
        }
    }
}

/// Key-value association.
///
/// Entries keep insertion order; traversal order is decided by the engine.
/// Keys are unique: inserting an existing key replaces its value in place.
#[derive(Clone, Debug, PartialEq)]
pub struct Mapping {
    pub kind: MappingKind,
    entries: Vec<(Key, Value)>,
}

impl Mapping {
    pub fn new(kind: MappingKind) -> Self {
        Mapping {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn from_entries<K: Into<Key>>(
        kind: MappingKind,
        entries: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        let mut mapping = Mapping::new(kind);
        for (key, value) in entries {
            mapping.insert(key, value);
        }
        mapping
    }

    /// Insert or replace an entry, returning the previous value
    pub fn insert(&mut self, key: impl Into<Key>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn entries(&self) -> &[(Key, Value)] {
        &self.entries
    }

    pub fn into_entries(mut self) -> Vec<(Key, Value)> {
        std::mem::take(&mut self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        if self.entries.iter().any(|(_, value)| value.has_children()) {
            let mut values: Vec<Value> = self.entries.drain(..).map(|(_, value)| value).collect();
            dismantle(&mut values);
        }
    }
}

/// Which projection of a mapping a view exposes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Keys,
    Values,
    Items,
}

impl ViewKind {
    pub fn name(self) -> &'static str {
        match self {
            ViewKind::Keys => "keys",
            ViewKind::Values => "values",
            ViewKind::Items => "items",
        }
    }
}

/// Read-only projection over a snapshot of a mapping
#[derive(Clone, Debug, PartialEq)]
pub struct MappingView {
    pub view: ViewKind,
    pub source: Mapping,
}

impl MappingView {
    pub fn new(view: ViewKind, source: Mapping) -> Self {
        MappingView { view, source }
    }

    /// Concrete type name, e.g. `dict_values`
    pub fn type_name(&self) -> String {
        format!("{}_{}", self.source.kind.name(), self.view.name())
    }
}

/// Tuple-like value with named fields
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    ty: RecordType,
    values: Vec<Value>,
}

impl Record {
    /// Build a record; `values` must hold exactly one value per field.
    pub fn new(ty: RecordType, values: Vec<Value>) -> Option<Self> {
        if values.len() != ty.field_count() {
            return None;
        }
        Some(Record { ty, values })
    }

    #[inline]
    pub fn record_type(&self) -> &RecordType {
        &self.ty
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.ty.field_index(field).map(|i| &self.values[i])
    }

    /// Field names paired with values, in declared order
    pub fn fields(&self) -> impl Iterator<Item = (&Arc<str>, &Value)> {
        self.ty.fields().iter().zip(self.values.iter())
    }

    pub fn into_parts(mut self) -> (RecordType, Vec<Value>) {
        (self.ty.clone(), std::mem::take(&mut self.values))
    }
}

impl Drop for Record {
    fn drop(&mut self) {
        dismantle(&mut self.values);
    }
}

/// Drop `values` and everything below them without recursing
fn dismantle(values: &mut Vec<Value>) {
    if !values.iter().any(Value::has_children) {
        return;
    }
    let mut stack = std::mem::take(values);
    while let Some(mut value) = stack.pop() {
        // Emptied before `value` goes out of scope, so its own drop is shallow
        match &mut value {
            Value::Sequence(seq) => stack.append(&mut seq.items),
            Value::Mapping(mapping) => stack.extend(mapping.entries.drain(..).map(|(_, v)| v)),
            Value::MappingView(view) => {
                stack.extend(view.source.entries.drain(..).map(|(_, v)| v))
            }
            Value::Record(record) => stack.append(&mut record.values),
            Value::Leaf(_) | Value::Composite(_) => {}
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Leaf(a), Value::Leaf(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Mapping(a), Value::Mapping(b)) => a == b,
            (Value::MappingView(a), Value::MappingView(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Composite(a), Value::Composite(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.type_spec() == b.type_spec() && a.components() == b.components())
            }
            _ => false,
        }
    }
}

// Constructors
impl Value {
    pub fn none() -> Self {
        Value::Leaf(Leaf::None)
    }

    pub fn int(i: i64) -> Self {
        Value::Leaf(Leaf::Int(i))
    }

    pub fn float(f: f64) -> Self {
        Value::Leaf(Leaf::Float(f))
    }

    pub fn bool(b: bool) -> Self {
        Value::Leaf(Leaf::Bool(b))
    }

    pub fn str(s: &str) -> Self {
        Value::Leaf(Leaf::Str(Arc::from(s)))
    }

    pub fn bytes(b: impl Into<Bytes>) -> Self {
        Value::Leaf(Leaf::Bytes(b.into()))
    }

    pub fn opaque<T: Any + Send + Sync>(tag: TypeTag, payload: T) -> Self {
        Value::Leaf(Leaf::Opaque(Opaque::new(tag, payload)))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::Sequence(Sequence::new(SequenceKind::List, items))
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Sequence(Sequence::new(SequenceKind::Tuple, items))
    }

    pub fn dict<K: Into<Key>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Mapping(Mapping::from_entries(MappingKind::Dict, entries))
    }

    pub fn ordered_dict<K: Into<Key>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Mapping(Mapping::from_entries(MappingKind::Ordered, entries))
    }

    pub fn view(view: ViewKind, source: Mapping) -> Self {
        Value::MappingView(MappingView::new(view, source))
    }

    /// Build a record value; `None` when the value count does not match the
    /// type's fields.
    pub fn record(ty: &RecordType, values: Vec<Value>) -> Option<Self> {
        Record::new(ty.clone(), values).map(Value::Record)
    }

    pub fn composite(c: impl Composite + 'static) -> Self {
        Value::Composite(Arc::new(c))
    }

    /// Container with at least one child
    fn has_children(&self) -> bool {
        match self {
            Value::Sequence(seq) => !seq.items.is_empty(),
            Value::Mapping(mapping) => !mapping.entries.is_empty(),
            Value::MappingView(view) => !view.source.entries.is_empty(),
            Value::Record(record) => !record.values.is_empty(),
            Value::Leaf(_) | Value::Composite(_) => false,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Value::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Leaf(Leaf::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Concrete type name used in diagnostics and type-strict comparison
    pub fn type_name(&self) -> String {
        match self {
            Value::Leaf(Leaf::None) => "none".into(),
            Value::Leaf(Leaf::Bool(_)) => "bool".into(),
            Value::Leaf(Leaf::Int(_)) => "int".into(),
            Value::Leaf(Leaf::Float(_)) => "float".into(),
            Value::Leaf(Leaf::Str(_)) => "str".into(),
            Value::Leaf(Leaf::Bytes(_)) => "bytes".into(),
            Value::Leaf(Leaf::Opaque(o)) => o.tag().name().to_string(),
            Value::Sequence(s) => s.kind.name().to_string(),
            Value::Mapping(m) => m.kind.name().to_string(),
            Value::MappingView(v) => v.type_name(),
            Value::Record(r) => r.record_type().name().to_string(),
            Value::Composite(c) => c.type_spec().to_string(),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<Leaf> for Value {
    fn from(leaf: Leaf) -> Self {
        Value::Leaf(leaf)
    }
}
