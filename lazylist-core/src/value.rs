// lazylist-core - Value type for lazy lists
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Core value type.
//!
//! `Value` is the closed set of kinds a lazy list may hold: integers, exact
//! rationals, strings, and nested lazy lists. Anything else must pass through
//! [`crate::canonicalize`] first.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::list::LazyList;

/// A canonical value.
///
/// Lists have reference semantics: a cloned `Value::List` shares its cache
/// and producer with the list it was cloned from.
#[derive(Clone)]
pub enum Value {
    /// Arbitrary precision integer
    Int(BigInt),
    /// Exact rational, never with a denominator of one
    Rational(BigRational),
    /// Immutable string
    Str(Rc<str>),
    /// Lazy, memoizing list
    List(LazyList),
}

impl Value {
    /// The integer zero, returned when indexing an empty list.
    pub fn zero() -> Self {
        Value::Int(BigInt::zero())
    }

    /// Create an integer value
    pub fn int(n: impl Into<BigInt>) -> Self {
        Value::Int(n.into())
    }

    /// Create a rational value (automatically reduces).
    ///
    /// # Panics
    ///
    /// Panics if `den` is zero.
    pub fn ratio(num: i64, den: i64) -> Self {
        Value::rational(BigRational::new(num.into(), den.into()))
    }

    /// Create a value from an exact rational, collapsing whole numbers to
    /// integers.
    pub fn rational(r: BigRational) -> Self {
        if r.denom().is_one() {
            Value::Int(r.to_integer())
        } else {
            Value::Rational(r)
        }
    }

    /// Create a string value
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Wrap a lazy list
    pub fn list(list: LazyList) -> Self {
        Value::List(list)
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Rational(_) => "rational",
            Value::Str(_) => "string",
            Value::List(_) => "list",
        }
    }

    /// Borrow the list, if this is one.
    pub fn as_list(&self) -> Option<&LazyList> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Returns true for integers and rationals.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Rational(_))
    }

    fn as_ratio(&self) -> Option<BigRational> {
        match self {
            Value::Int(n) => Some(BigRational::from_integer(n.clone())),
            Value::Rational(r) => Some(r.clone()),
            _ => None,
        }
    }
}

/// Numbers compare by value, strings and lists structurally. A number never
/// equals a string or a list.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Rational(a), Value::Rational(b)) => a == b,
            (Value::Int(_), Value::Rational(_)) | (Value::Rational(_), Value::Int(_)) => {
                self.as_ratio() == other.as_ratio()
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

/// Numbers order numerically and strings lexicographically; every other
/// pairing is unordered.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => Some(self.as_ratio()?.cmp(&other.as_ratio()?)),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::int(n)
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::Int(n)
    }
}

impl From<BigRational> for Value {
    fn from(r: BigRational) -> Self {
        Value::rational(r)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<LazyList> for Value {
    fn from(list: LazyList) -> Self {
        Value::List(list)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Rational(r) => write!(f, "Rational({r})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::List(list) => write!(f, "{list:?}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Rational(r) => write!(f, "{r}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(list) => write!(f, "{list}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int() {
        let val = Value::int(42);
        assert_eq!(format!("{}", val), "42");
        assert_eq!(val.type_name(), "int");
    }

    #[test]
    fn test_ratio() {
        // Ratio reduces automatically
        let val = Value::ratio(2, 4);
        assert_eq!(format!("{}", val), "1/2");

        // Ratio becomes int when denominator is 1
        let whole = Value::ratio(4, 2);
        assert!(matches!(whole, Value::Int(ref n) if *n == BigInt::from(2)));
    }

    #[test]
    fn test_string() {
        let val = Value::string("hello");
        assert_eq!(format!("{}", val), "\"hello\"");
        assert_eq!(val.type_name(), "string");
    }

    #[test]
    fn test_equality() {
        assert_eq!(Value::int(42), Value::int(42));
        assert_ne!(Value::int(42), Value::int(43));
        assert_ne!(Value::int(1), Value::string("1"));
        assert_eq!(Value::ratio(1, 2), Value::ratio(2, 4));
    }

    #[test]
    fn test_ordering() {
        assert!(Value::int(1) < Value::int(2));
        assert!(Value::ratio(1, 2) < Value::int(1));
        assert!(Value::int(1) <= Value::ratio(3, 2));
        assert!(Value::string("a") < Value::string("b"));
        assert_eq!(Value::int(1).partial_cmp(&Value::string("1")), None);
    }

    #[test]
    fn test_zero() {
        assert_eq!(Value::zero(), Value::int(0));
        assert!(Value::zero().is_number());
    }
}
