// lazylist-embed - Type conversion traits
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Type conversion between Rust and lazy list values.
//!
//! [`IntoExternal`] turns host values into [`External`] inputs for
//! [`canonicalize`]; [`FromFlat`] reads host values back out of a
//! [`Flat`] tree produced by [`flatten`].
//!
//! # Built-in Conversions
//!
//! | Rust Type | Canonical kind |
//! |-----------|----------------|
//! | `i32`, `i64`, `usize`, `BigInt` | integer |
//! | `f32`, `f64` | rational (narrowed through decimal) |
//! | `String`, `&str`, `Rc<str>` | string |
//! | `Vec<T>` | list |
//!
//! Reading back, rationals arrive as `f64` and integers convert to any
//! integer type they fit.
//!
//! # Custom Conversions
//!
//! ```rust
//! use lazylist_embed::{Error, External, Flat, FromFlat, IntoExternal, Result};
//!
//! struct Point { x: i64, y: i64 }
//!
//! impl IntoExternal for Point {
//!     fn into_external(self) -> External {
//!         vec![self.x, self.y].into_external()
//!     }
//! }
//!
//! impl FromFlat for Point {
//!     fn from_flat(flat: &Flat) -> Result<Self> {
//!         match flat {
//!             Flat::List(items) if items.len() == 2 => Ok(Point {
//!                 x: i64::from_flat(&items[0])?,
//!                 y: i64::from_flat(&items[1])?,
//!             }),
//!             other => Err(Error::conversion("list of 2 integers", other.type_name())),
//!         }
//!     }
//! }
//! ```

use std::rc::Rc;

use lazylist_core::{
    Error, External, Flat, LazyList, Result, Value, canonicalize, flatten,
};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// Convert a Rust type into an external value.
pub trait IntoExternal {
    fn into_external(self) -> External;
}

/// Convert a flattened value into a Rust type.
pub trait FromFlat: Sized {
    fn from_flat(flat: &Flat) -> Result<Self>;
}

// ============================================================================
// IntoExternal implementations
// ============================================================================

impl IntoExternal for External {
    fn into_external(self) -> External {
        self
    }
}

impl IntoExternal for Value {
    fn into_external(self) -> External {
        External::Value(self)
    }
}

impl IntoExternal for LazyList {
    fn into_external(self) -> External {
        External::Value(Value::List(self))
    }
}

impl IntoExternal for i64 {
    fn into_external(self) -> External {
        External::Int(self.into())
    }
}

impl IntoExternal for i32 {
    fn into_external(self) -> External {
        External::Int(self.into())
    }
}

impl IntoExternal for usize {
    fn into_external(self) -> External {
        External::Int(self.into())
    }
}

impl IntoExternal for BigInt {
    fn into_external(self) -> External {
        External::Int(self)
    }
}

impl IntoExternal for f64 {
    fn into_external(self) -> External {
        External::Float(self)
    }
}

impl IntoExternal for f32 {
    fn into_external(self) -> External {
        // Through the f32's own shortest rendering, not its widened f64 bits
        match self.to_string().parse::<f64>() {
            Ok(x) => External::Float(x),
            Err(_) => External::Float(f64::from(self)),
        }
    }
}

impl IntoExternal for String {
    fn into_external(self) -> External {
        External::Str(self)
    }
}

impl IntoExternal for &str {
    fn into_external(self) -> External {
        External::Str(self.to_string())
    }
}

impl IntoExternal for Rc<str> {
    fn into_external(self) -> External {
        External::Value(Value::Str(self))
    }
}

impl<T: IntoExternal> IntoExternal for Vec<T> {
    fn into_external(self) -> External {
        External::Items(self.into_iter().map(IntoExternal::into_external).collect())
    }
}

// ============================================================================
// FromFlat implementations
// ============================================================================

impl FromFlat for Flat {
    fn from_flat(flat: &Flat) -> Result<Self> {
        Ok(flat.clone())
    }
}

impl FromFlat for BigInt {
    fn from_flat(flat: &Flat) -> Result<Self> {
        match flat {
            Flat::Int(n) => Ok(n.clone()),
            other => Err(Error::conversion("integer", other.type_name())),
        }
    }
}

impl FromFlat for i64 {
    fn from_flat(flat: &Flat) -> Result<Self> {
        match flat {
            Flat::Int(n) => n
                .to_i64()
                .ok_or_else(|| Error::conversion("integer in i64 range", "big integer")),
            other => Err(Error::conversion("integer", other.type_name())),
        }
    }
}

impl FromFlat for i32 {
    fn from_flat(flat: &Flat) -> Result<Self> {
        match flat {
            Flat::Int(n) => n
                .to_i32()
                .ok_or_else(|| Error::conversion("integer in i32 range", "integer")),
            other => Err(Error::conversion("integer", other.type_name())),
        }
    }
}

impl FromFlat for usize {
    fn from_flat(flat: &Flat) -> Result<Self> {
        match flat {
            Flat::Int(n) => n
                .to_usize()
                .ok_or_else(|| Error::conversion("non-negative integer", "integer")),
            other => Err(Error::conversion("non-negative integer", other.type_name())),
        }
    }
}

impl FromFlat for f64 {
    fn from_flat(flat: &Flat) -> Result<Self> {
        match flat {
            Flat::Float(x) => Ok(*x),
            Flat::Int(n) => n
                .to_f64()
                .ok_or_else(|| Error::conversion("number", "big integer")),
            other => Err(Error::conversion("number", other.type_name())),
        }
    }
}

impl FromFlat for String {
    fn from_flat(flat: &Flat) -> Result<Self> {
        match flat {
            Flat::Str(s) => Ok(s.clone()),
            other => Err(Error::conversion("string", other.type_name())),
        }
    }
}

impl<T: FromFlat> FromFlat for Vec<T> {
    fn from_flat(flat: &Flat) -> Result<Self> {
        match flat {
            Flat::List(items) => items.iter().map(T::from_flat).collect(),
            other => Err(Error::conversion("list", other.type_name())),
        }
    }
}

// ============================================================================
// Convenience functions
// ============================================================================

/// Canonicalize a Rust value.
pub fn to_value<T: IntoExternal>(value: T) -> Result<Value> {
    canonicalize(value.into_external())
}

/// Flatten a value and convert it into a Rust type.
///
/// Lists are fully materialized.
pub fn from_value<T: FromFlat>(value: &Value) -> Result<T> {
    T::from_flat(&flatten(value)?)
}

/// A finite lazy list over the items of a vector.
#[must_use]
pub fn to_list<T: IntoExternal>(items: Vec<T>) -> LazyList {
    LazyList::from_container(items.into_iter().map(IntoExternal::into_external))
}

/// Materialize a list and convert every value.
pub fn from_list<T: FromFlat>(list: &LazyList) -> Result<Vec<T>> {
    from_value(&Value::List(list.clone()))
}
