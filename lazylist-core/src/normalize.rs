// lazylist-core - Value normalization
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Normalization between external values and canonical [`Value`]s.
//!
//! [`canonicalize`] maps whatever the numeric layer or the host hands us into
//! one of the four canonical kinds. [`flatten`] goes the other way, reducing a
//! value tree to plain nested containers and scalars for comparison and
//! emission.

use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};

use crate::error::{Error, Result};
use crate::list::LazyList;
use crate::value::Value;

// ============================================================================
// Symbolic numbers
// ============================================================================

/// Structural class of a symbolic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolicForm {
    /// An exact integer
    Integer,
    /// An exact rational
    Rational,
    /// A product of factors
    Product,
    /// A factorial expression
    Factorial,
    /// Anything else
    Other,
}

/// A number supplied by the symbolic-math layer.
///
/// Only the capabilities needed for canonicalization are required: an
/// integer test, a floating-point evaluation and an exact rational form.
pub trait Symbolic: fmt::Debug {
    /// The structural class of this number.
    fn form(&self) -> SymbolicForm;

    /// The integer value, if this number is integral.
    fn to_integer(&self) -> Option<BigInt>;

    /// The exact rational value, if there is one.
    fn to_rational(&self) -> Option<BigRational>;

    /// Numerical evaluation to a double.
    fn evalf(&self) -> f64;
}

// ============================================================================
// External values
// ============================================================================

/// A value arriving from outside the lazy list core.
pub enum External {
    Int(BigInt),
    Rational(BigRational),
    Float(f64),
    Str(String),
    /// Already canonical
    Value(Value),
    Symbolic(Rc<dyn Symbolic>),
    /// A finite container
    Items(Vec<External>),
    /// A one-shot iterator
    Iter(Box<dyn Iterator<Item = External>>),
}

impl fmt::Debug for External {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            External::Int(n) => write!(f, "Int({n})"),
            External::Rational(r) => write!(f, "Rational({r})"),
            External::Float(x) => write!(f, "Float({x})"),
            External::Str(s) => write!(f, "Str({s:?})"),
            External::Value(v) => write!(f, "Value({v:?})"),
            External::Symbolic(s) => write!(f, "Symbolic({s:?})"),
            External::Items(items) => f.debug_tuple("Items").field(items).finish(),
            External::Iter(_) => write!(f, "Iter(..)"),
        }
    }
}

impl From<i64> for External {
    fn from(n: i64) -> Self {
        External::Int(n.into())
    }
}

impl From<i32> for External {
    fn from(n: i32) -> Self {
        External::Int(n.into())
    }
}

impl From<usize> for External {
    fn from(n: usize) -> Self {
        External::Int(n.into())
    }
}

impl From<BigInt> for External {
    fn from(n: BigInt) -> Self {
        External::Int(n)
    }
}

impl From<BigRational> for External {
    fn from(r: BigRational) -> Self {
        External::Rational(r)
    }
}

impl From<f64> for External {
    fn from(x: f64) -> Self {
        External::Float(x)
    }
}

impl From<String> for External {
    fn from(s: String) -> Self {
        External::Str(s)
    }
}

impl From<&str> for External {
    fn from(s: &str) -> Self {
        External::Str(s.to_string())
    }
}

impl From<Value> for External {
    fn from(v: Value) -> Self {
        External::Value(v)
    }
}

impl From<LazyList> for External {
    fn from(list: LazyList) -> Self {
        External::Value(Value::List(list))
    }
}

impl From<Rc<dyn Symbolic>> for External {
    fn from(s: Rc<dyn Symbolic>) -> Self {
        External::Symbolic(s)
    }
}

impl<T: Into<External>> From<Vec<T>> for External {
    fn from(items: Vec<T>) -> Self {
        External::Items(items.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// canonicalize
// ============================================================================

/// Coerce an external value into one of the four canonical kinds.
///
/// - integers pass through; rationals collapse to integers when whole
/// - integral symbolic numbers collapse to integers
/// - symbolic products and factorials, and native floats, are narrowed
///   through their shortest decimal rendering into an exact rational. This is
///   lossy: `0.1 + 0.2` evaluates to `0.30000000000000004`, which becomes
///   `30000000000000004/100000000000000000`
/// - strings and canonical values pass through
/// - containers and iterators become lazy lists whose elements are
///   canonicalized on demand
pub fn canonicalize(value: External) -> Result<Value> {
    match value {
        External::Int(n) => Ok(Value::Int(n)),
        External::Rational(r) => Ok(Value::rational(r)),
        External::Float(x) => narrow_float(x),
        External::Str(s) => Ok(Value::string(s)),
        External::Value(v) => Ok(v),
        External::Symbolic(s) => canonicalize_symbolic(s.as_ref()),
        External::Items(items) => Ok(Value::List(LazyList::from_container(items))),
        External::Iter(iter) => Ok(Value::List(LazyList::from_producer(iter, false))),
    }
}

fn canonicalize_symbolic(s: &dyn Symbolic) -> Result<Value> {
    match s.form() {
        SymbolicForm::Integer => s
            .to_integer()
            .map(Value::Int)
            .ok_or_else(|| Error::Unrepresentable(format!("{s:?}"))),
        SymbolicForm::Product | SymbolicForm::Factorial => narrow_float(s.evalf()),
        SymbolicForm::Rational | SymbolicForm::Other => {
            if let Some(n) = s.to_integer() {
                Ok(Value::Int(n))
            } else if let Some(r) = s.to_rational() {
                Ok(Value::rational(r))
            } else {
                Err(Error::Unrepresentable(format!("{s:?}")))
            }
        }
    }
}

fn narrow_float(x: f64) -> Result<Value> {
    if !x.is_finite() {
        return Err(Error::NonFinite(x));
    }
    parse_decimal(&x.to_string()).map(Value::rational)
}

/// Largest power of ten a decimal literal may scale by. Shortest renderings
/// of finite doubles stay far below it.
const MAX_DECIMAL_SCALE: u32 = 10_000;

/// Parse a decimal literal (`-12`, `3.25`, `.5`, `1e-3`) into an exact
/// rational.
///
/// Literals whose effective power of ten exceeds 10^10000 in magnitude are
/// rejected.
pub fn parse_decimal(text: &str) -> Result<BigRational> {
    let invalid = || Error::InvalidDecimal(text.to_string());
    let s = text.trim();

    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(pos) => {
            let exp: i32 = s[pos + 1..].parse().map_err(|_| invalid())?;
            (&s[..pos], exp)
        }
        None => (s, 0),
    };
    let (whole, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let digits = format!("{whole}{frac}");
    let mut numer: BigInt = if digits.is_empty() {
        BigInt::zero()
    } else {
        digits.parse().map_err(|_| invalid())?
    };
    if negative {
        numer = -numer;
    }

    let scale = i32::try_from(frac.len())
        .ok()
        .and_then(|digits| exponent.checked_sub(digits))
        .filter(|scale| scale.unsigned_abs() <= MAX_DECIMAL_SCALE)
        .ok_or_else(invalid)?;
    let ten = BigInt::from(10);
    let power = num_traits::pow(ten, scale.unsigned_abs() as usize);
    let r = if scale >= 0 {
        BigRational::from_integer(numer * power)
    } else {
        BigRational::new(numer, power)
    };
    Ok(r)
}

// ============================================================================
// flatten
// ============================================================================

/// A value reduced to plain containers and scalars.
#[derive(Debug, Clone)]
pub enum Flat {
    Int(BigInt),
    Float(f64),
    Str(String),
    List(Vec<Flat>),
}

impl Flat {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Flat::Int(_) => "int",
            Flat::Float(_) => "float",
            Flat::Str(_) => "string",
            Flat::List(_) => "list",
        }
    }
}

/// Integers and floats compare numerically; containers element-wise.
impl PartialEq for Flat {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Flat::Int(a), Flat::Int(b)) => a == b,
            (Flat::Float(a), Flat::Float(b)) => a == b,
            (Flat::Int(a), Flat::Float(b)) | (Flat::Float(b), Flat::Int(a)) => {
                a.to_f64() == Some(*b)
            }
            (Flat::Str(a), Flat::Str(b)) => a == b,
            (Flat::List(a), Flat::List(b)) => a == b,
            _ => false,
        }
    }
}

/// Integers that fit in an `i64` serialize as numbers, larger ones as their
/// decimal string.
#[cfg(feature = "serde")]
impl serde::Serialize for Flat {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;

        match self {
            Flat::Int(n) => match n.to_i64() {
                Some(n) => serializer.serialize_i64(n),
                None => serializer.serialize_str(&n.to_string()),
            },
            Flat::Float(x) => serializer.serialize_f64(*x),
            Flat::Str(s) => serializer.serialize_str(s),
            Flat::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Reduce a value to plain nested containers and scalars.
///
/// Rationals widen to `f64`. Nested lists are fully materialized, so this
/// never returns for an infinite list unless a materialization limit is set.
pub fn flatten(value: &Value) -> Result<Flat> {
    match value {
        Value::Int(n) => Ok(Flat::Int(n.clone())),
        Value::Rational(r) => Ok(Flat::Float(rational_to_f64(r))),
        Value::Str(s) => Ok(Flat::Str(s.to_string())),
        Value::List(list) => list
            .materialize()?
            .iter()
            .map(flatten)
            .collect::<Result<Vec<_>>>()
            .map(Flat::List),
    }
}

fn rational_to_f64(r: &BigRational) -> f64 {
    r.to_f64().unwrap_or_else(|| {
        let numer = r.numer().to_f64().unwrap_or(f64::NAN);
        let denom = r.denom().to_f64().unwrap_or(f64::NAN);
        numer / denom
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_integers() {
        assert_eq!(parse_decimal("42").unwrap(), BigRational::from_integer(42.into()));
        assert_eq!(parse_decimal("-7").unwrap(), BigRational::from_integer((-7).into()));
    }

    #[test]
    fn decimal_fractions() {
        assert_eq!(
            parse_decimal("0.1").unwrap(),
            BigRational::new(1.into(), 10.into())
        );
        assert_eq!(
            parse_decimal("-2.50").unwrap(),
            BigRational::new((-5).into(), 2.into())
        );
        assert_eq!(
            parse_decimal(".5").unwrap(),
            BigRational::new(1.into(), 2.into())
        );
    }

    #[test]
    fn decimal_exponents() {
        assert_eq!(
            parse_decimal("1e3").unwrap(),
            BigRational::from_integer(1000.into())
        );
        assert_eq!(
            parse_decimal("2.5E-2").unwrap(),
            BigRational::new(1.into(), 40.into())
        );
    }

    #[test]
    fn decimal_rejects_garbage() {
        assert!(matches!(parse_decimal(""), Err(Error::InvalidDecimal(_))));
        assert!(matches!(parse_decimal("."), Err(Error::InvalidDecimal(_))));
        assert!(matches!(parse_decimal("1.2.3"), Err(Error::InvalidDecimal(_))));
        assert!(matches!(parse_decimal("inf"), Err(Error::InvalidDecimal(_))));
        assert!(matches!(parse_decimal("1e"), Err(Error::InvalidDecimal(_))));
    }

    #[test]
    fn decimal_rejects_extreme_exponents() {
        assert!(matches!(
            parse_decimal("1.5e-2147483648"),
            Err(Error::InvalidDecimal(_))
        ));
        assert!(matches!(
            parse_decimal("1e2147483647"),
            Err(Error::InvalidDecimal(_))
        ));
        assert!(matches!(parse_decimal("1e10001"), Err(Error::InvalidDecimal(_))));
        assert_eq!(
            parse_decimal("1e-300").unwrap(),
            BigRational::new(1.into(), num_traits::pow(BigInt::from(10), 300))
        );
    }

    #[test]
    fn smallest_subnormal_narrows_exactly() {
        let value = canonicalize(External::Float(5e-324)).unwrap();
        let expected = BigRational::new(5.into(), num_traits::pow(BigInt::from(10), 324));
        assert_eq!(value, Value::rational(expected));
    }

    #[test]
    fn floats_narrow_to_exact_rationals() {
        assert_eq!(canonicalize(External::Float(0.25)).unwrap(), Value::ratio(1, 4));
        assert_eq!(canonicalize(External::Float(6.0)).unwrap(), Value::int(6));
        assert_eq!(
            canonicalize(External::Float(f64::NAN)).unwrap_err().to_string(),
            "cannot represent non-finite number NaN as a rational"
        );
    }

    #[test]
    fn flat_numeric_equality() {
        assert_eq!(Flat::Int(1.into()), Flat::Float(1.0));
        assert_ne!(Flat::Int(1.into()), Flat::Float(1.5));
        assert_ne!(Flat::Int(1.into()), Flat::Str("1".into()));
        assert_eq!(
            Flat::List(vec![Flat::Int(1.into()), Flat::Float(2.0)]),
            Flat::List(vec![Flat::Float(1.0), Flat::Int(2.into())])
        );
    }

    #[test]
    fn flatten_widens_rationals() {
        assert_eq!(flatten(&Value::ratio(1, 2)).unwrap(), Flat::Float(0.5));
        assert!(matches!(flatten(&Value::ratio(1, 3)).unwrap(), Flat::Float(_)));
    }
}
