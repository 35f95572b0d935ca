//! Mapping keys
//!
//! Keys are compared under a total order *within* an order class:
//! - Numeric: booleans, integers and floats compare by exact numeric value,
//!   then Bool < Int < Float between numerically equal keys
//! - Text: strings compare lexicographically
//! - Bytes: byte strings compare lexicographically
//! - Tuple: tuples compare element-wise, then by length
//!
//! Keys from different classes are not comparable. A mapping holding such a
//! mix cannot be traversed in canonical order.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

/// A mapping key
#[derive(Clone, Debug)]
pub enum Key {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Bytes(Bytes),
    Tuple(Vec<Key>),
}

/// Order class of a key. Only keys of the same class are comparable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyClass {
    Numeric,
    Text,
    Bytes,
    Tuple,
}

impl Key {
    pub fn str(s: &str) -> Self {
        Key::Str(Arc::from(s))
    }

    /// Order class of this key
    pub fn class(&self) -> KeyClass {
        match self {
            Key::Bool(_) | Key::Int(_) | Key::Float(_) => KeyClass::Numeric,
            Key::Str(_) => KeyClass::Text,
            Key::Bytes(_) => KeyClass::Bytes,
            Key::Tuple(_) => KeyClass::Tuple,
        }
    }

    /// Compare two keys, returning `None` when they are not comparable.
    pub fn try_cmp(&self, other: &Key) -> Option<Ordering> {
        match (self, other) {
            (Key::Str(a), Key::Str(b)) => Some(a.cmp(b)),
            (Key::Bytes(a), Key::Bytes(b)) => Some(a.cmp(b)),
            (Key::Tuple(a), Key::Tuple(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.try_cmp(y)? {
                        Ordering::Equal => continue,
                        ord => return Some(ord),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            (a, b) if a.class() == KeyClass::Numeric && b.class() == KeyClass::Numeric => {
                Some(numeric_cmp(a, b))
            }
            _ => None,
        }
    }

    /// Check if two keys can be ordered against each other
    #[inline]
    pub fn is_comparable(&self, other: &Key) -> bool {
        self.try_cmp(other).is_some()
    }
}

/// Exact comparison between numeric keys.
///
/// Values compare exactly, with no detour through floating point for
/// integers. Numerically equal keys of different types order as
/// Bool < Int < Float, so only equal keys compare `Equal`.
fn numeric_cmp(a: &Key, b: &Key) -> Ordering {
    let by_value = match (a, b) {
        (Key::Float(x), Key::Float(y)) => x.total_cmp(y),
        (Key::Float(x), other) => int_float_cmp(as_int(other), *x).reverse(),
        (other, Key::Float(y)) => int_float_cmp(as_int(other), *y),
        _ => as_int(a).cmp(&as_int(b)),
    };
    by_value.then_with(|| numeric_rank(a).cmp(&numeric_rank(b)))
}

/// Bound of the i64 range as a float (2^63, exact)
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn int_float_cmp(i: i64, f: f64) -> Ordering {
    if f.is_nan() {
        // Positive NaN sorts above everything, negative NaN below
        return if f.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if f >= I64_BOUND {
        return Ordering::Less;
    }
    if f < -I64_BOUND {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal if f > whole => Ordering::Less,
        Ordering::Equal if f < whole => Ordering::Greater,
        ord => ord,
    }
}

fn as_int(key: &Key) -> i64 {
    match key {
        Key::Bool(b) => *b as i64,
        Key::Int(i) => *i,
        _ => 0,
    }
}

fn numeric_rank(key: &Key) -> u8 {
    match key {
        Key::Bool(_) => 0,
        Key::Int(_) => 1,
        _ => 2,
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Str(a), Key::Str(b)) => a == b,
            (Key::Bytes(a), Key::Bytes(b)) => a == b,
            (Key::Tuple(a), Key::Tuple(b)) => a == b,
            (Key::Float(a), Key::Float(b)) => a.to_bits() == b.to_bits(),
            (Key::Bool(a), Key::Bool(b)) => a == b,
            (Key::Int(a), Key::Int(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Key::Bool(b) => b.hash(state),
            Key::Int(i) => i.hash(state),
            Key::Float(f) => f.to_bits().hash(state),
            Key::Str(s) => s.hash(state),
            Key::Bytes(b) => b.hash(state),
            Key::Tuple(t) => t.hash(state),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Bool(b) => write!(f, "{}", b),
            Key::Int(i) => write!(f, "{}", i),
            Key::Float(x) => write!(f, "{:?}", x),
            Key::Str(s) => write!(f, "{:?}", s),
            Key::Bytes(b) => write!(f, "{:?}", b),
            Key::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::str(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(Arc::from(s))
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i as i64)
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

impl From<f64> for Key {
    fn from(f: f64) -> Self {
        Key::Float(f)
    }
}

/// Indices of `keys` in ascending key order.
///
/// Returns the first incomparable pair found instead. Every key is checked
/// against the first one, then the sort reports any pair it cannot order
/// (tuples can hide a mismatch behind equal prefixes). Only equal keys
/// compare `Equal`, so the order never depends on insertion position.
pub fn sorted_order<'a, I>(keys: I) -> Result<Vec<usize>, (Key, Key)>
where
    I: IntoIterator<Item = &'a Key>,
{
    let keys: Vec<&Key> = keys.into_iter().collect();
    if let Some(first) = keys.first() {
        if let Some(bad) = keys.iter().find(|k| !first.is_comparable(k)) {
            return Err(((*first).clone(), (*bad).clone()));
        }
    }

    let mut failure: Option<(Key, Key)> = None;
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| match keys[a].try_cmp(keys[b]) {
        Some(ord) => ord,
        None => {
            if failure.is_none() {
                failure = Some((keys[a].clone(), keys[b].clone()));
            }
            Ordering::Equal
        }
    });

    match failure {
        Some(pair) => Err(pair),
        None => Ok(order),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn numeric_key() -> impl Strategy<Value = Key> {
        let near = -3i64..3;
        prop_oneof![
            any::<bool>().prop_map(Key::Bool),
            near.clone().prop_map(Key::Int),
            any::<i64>().prop_map(Key::Int),
            near.prop_map(|i| Key::Float(i as f64)),
            prop::num::f64::ANY.prop_map(Key::Float),
            Just(Key::Int((1 << 53) + 1)),
            Just(Key::Float((1i64 << 53) as f64)),
        ]
    }

    #[test]
    fn test_numeric_keys_compare_across_types() {
        assert_eq!(Key::Int(1).try_cmp(&Key::Float(1.5)), Some(Ordering::Less));
        assert_eq!(Key::Float(-0.5).try_cmp(&Key::Int(0)), Some(Ordering::Less));
        assert_eq!(Key::Int(-1).try_cmp(&Key::Float(-0.5)), Some(Ordering::Less));
    }

    #[test]
    fn test_numerically_equal_keys_order_by_type() {
        assert_eq!(Key::Bool(true).try_cmp(&Key::Int(1)), Some(Ordering::Less));
        assert_eq!(Key::Int(1).try_cmp(&Key::Float(1.0)), Some(Ordering::Less));
        assert_eq!(Key::Float(1.0).try_cmp(&Key::Bool(true)), Some(Ordering::Greater));

        let forward = [Key::Float(1.0), Key::Int(1), Key::Bool(true)];
        let backward = [Key::Bool(true), Key::Int(1), Key::Float(1.0)];
        assert_eq!(sorted_order(forward.iter()).unwrap(), vec![2, 1, 0]);
        assert_eq!(sorted_order(backward.iter()).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_large_int_against_float() {
        let two_53 = 1i64 << 53;
        assert_eq!(
            Key::Int(two_53 + 1).try_cmp(&Key::Float(two_53 as f64)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Key::Float(two_53 as f64).try_cmp(&Key::Int(two_53 + 1)),
            Some(Ordering::Less)
        );
        assert_eq!(Key::Int(i64::MAX).try_cmp(&Key::Float(9.3e18)), Some(Ordering::Less));
        assert_eq!(Key::Int(i64::MIN).try_cmp(&Key::Float(i64::MIN as f64)), Some(Ordering::Less));
    }

    #[test]
    fn test_non_finite_floats() {
        assert_eq!(Key::Int(i64::MAX).try_cmp(&Key::Float(f64::INFINITY)), Some(Ordering::Less));
        assert_eq!(Key::Int(i64::MIN).try_cmp(&Key::Float(f64::NEG_INFINITY)), Some(Ordering::Greater));
        assert_eq!(Key::Int(0).try_cmp(&Key::Float(f64::NAN)), Some(Ordering::Less));
        assert_eq!(Key::Int(0).try_cmp(&Key::Float(-f64::NAN)), Some(Ordering::Greater));
        assert_eq!(Key::Float(f64::NAN).try_cmp(&Key::Float(f64::INFINITY)), Some(Ordering::Greater));
    }

    #[test]
    fn test_cross_class_is_unorderable() {
        assert!(Key::str("a").try_cmp(&Key::Int(1)).is_none());
        assert!(Key::Bytes(Bytes::from_static(b"a")).try_cmp(&Key::str("a")).is_none());
    }

    #[test]
    fn test_tuple_ordering() {
        let a = Key::Tuple(vec![Key::Int(1), Key::str("a")]);
        let b = Key::Tuple(vec![Key::Int(1), Key::str("b")]);
        let c = Key::Tuple(vec![Key::Int(1)]);
        assert_eq!(a.try_cmp(&b), Some(Ordering::Less));
        assert_eq!(c.try_cmp(&a), Some(Ordering::Less));

        // Mismatch is only found once the first elements tie
        let d = Key::Tuple(vec![Key::Int(1), Key::Int(2)]);
        assert!(a.try_cmp(&d).is_none());
    }

    #[test]
    fn test_sorted_order() {
        let keys = [Key::str("b"), Key::str("a"), Key::str("c")];
        assert_eq!(sorted_order(keys.iter()).unwrap(), vec![1, 0, 2]);
    }

    #[test]
    fn test_sorted_order_rejects_mixed_keys() {
        let keys = [Key::str("b"), Key::Int(3)];
        let (a, b) = sorted_order(keys.iter()).unwrap_err();
        assert_eq!(a, Key::str("b"));
        assert_eq!(b, Key::Int(3));
    }

    #[test]
    fn test_display() {
        assert_eq!(Key::str("a").to_string(), "\"a\"");
        assert_eq!(Key::Tuple(vec![Key::Int(1)]).to_string(), "(1,)");
    }

    proptest! {
        #[test]
        fn prop_int_order_is_antisymmetric(a in any::<i64>(), b in any::<i64>()) {
            let x = Key::Int(a);
            let y = Key::Int(b);
            prop_assert_eq!(x.try_cmp(&y).map(Ordering::reverse), y.try_cmp(&x));
        }

        #[test]
        fn prop_equal_order_means_equal_key(a in numeric_key(), b in numeric_key()) {
            prop_assert_eq!(a.try_cmp(&b) == Some(Ordering::Equal), a == b);
            prop_assert_eq!(a.try_cmp(&b).map(Ordering::reverse), b.try_cmp(&a));
        }

        #[test]
        fn prop_numeric_order_is_transitive(
            a in numeric_key(),
            b in numeric_key(),
            c in numeric_key(),
        ) {
            let mut keys = [a, b, c];
            keys.sort_by(|x, y| x.try_cmp(y).unwrap_or(Ordering::Equal));
            prop_assert_ne!(keys[0].try_cmp(&keys[2]), Some(Ordering::Greater));
        }

        #[test]
        fn prop_sorted_order_is_sorted(values in prop::collection::vec(any::<i64>(), 0..32)) {
            let keys: Vec<Key> = values.iter().copied().map(Key::Int).collect();
            let order = sorted_order(keys.iter()).unwrap();
            for pair in order.windows(2) {
                prop_assert!(values[pair[0]] <= values[pair[1]]);
            }
        }
    }
}
