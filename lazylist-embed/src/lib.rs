// lazylist-embed - Host conversions for lazy list values
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # lazylist-embed
//!
//! Conversions between Rust types and lazy list values, for hosts that hand
//! lists to an interpreter or read results back out.
//!
//! ## Quick Start
//!
//! ```rust
//! use lazylist_embed::{from_list, to_list, to_json_string};
//! use lazylist_embed::Value;
//!
//! let list = to_list(vec![1i64, 2, 3]);
//! assert_eq!(list.get(4).unwrap(), Value::int(2));
//!
//! let back: Vec<i64> = from_list(&list).unwrap();
//! assert_eq!(back, vec![1, 2, 3]);
//!
//! let json = to_json_string(&Value::List(list)).unwrap();
//! assert_eq!(json, "[1,2,3]");
//! ```

mod convert;
mod json;

pub use convert::{FromFlat, IntoExternal, from_list, from_value, to_list, to_value};
pub use json::{from_json, list_from_json, to_json, to_json_string};

// Re-export core types for convenience
pub use lazylist_core::{Error, External, Flat, LazyList, Result, Value};
