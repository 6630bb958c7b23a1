// lazylist-core - Lazy list values for a pull-based interpreter
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # lazylist-core
//!
//! Lazy, memoizing lists used as the runtime representation of list values
//! in a pull-based interpreter. Values are produced on demand, cached, and
//! can be re-iterated, indexed, sliced and overwritten without re-running the
//! producer. Finite and infinite lists share one representation.
//!
//! ```rust
//! use lazylist_core::{LazyList, Value};
//!
//! let list = LazyList::from_container(vec![1i64, 2, 3]);
//! assert_eq!(list.get(0).unwrap(), Value::int(1));
//! // Past the end, indexing wraps around
//! assert_eq!(list.get(5).unwrap(), Value::int(3));
//! ```

pub mod config;
pub mod error;
pub mod list;
pub mod normalize;
pub mod tee;
pub mod value;

pub use config::{display_length, materialize_limit, set_display_length, set_materialize_limit};
pub use error::{Error, Result};
pub use list::{LazyIter, LazyList, Slice, Source, concatenate};
pub use normalize::{External, Flat, Symbolic, SymbolicForm, canonicalize, flatten, parse_decimal};
pub use tee::Producer;
pub use value::Value;

// Re-export number types for convenience
pub use num_bigint::BigInt;
pub use num_rational::BigRational;
