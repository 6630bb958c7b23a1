// lazylist-embed - Property-based tests for host conversions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Property-based tests for conversions and JSON.
//!
//! Tests the following properties:
//! - Rust vectors survive a trip through a lazy list unchanged
//! - Floats read back as the double they were narrowed from
//! - JSON integer and string arrays survive ingestion and emission

use lazylist_embed::{Value, from_json, from_list, from_value, to_json, to_list, to_value};
use proptest::prelude::*;
use serde_json::json;

// =============================================================================
// Strategies
// =============================================================================

fn arb_ints() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(any::<i64>(), 0..30)
}

fn arb_nested() -> impl Strategy<Value = Vec<Vec<i64>>> {
    prop::collection::vec(prop::collection::vec(-1000i64..1000, 0..6), 0..6)
}

fn arb_strings() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z0-9 ]{0,8}", 0..10)
}

/// Finite doubles of moderate magnitude
fn arb_float() -> impl Strategy<Value = f64> {
    (-1.0e12f64..1.0e12).prop_filter("must be finite", |f| f.is_finite())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// to_list then from_list gives the vector back
    #[test]
    fn ints_round_trip(values in arb_ints()) {
        let back: Vec<i64> = from_list(&to_list(values.clone())).unwrap();
        prop_assert_eq!(back, values);
    }

    /// Nested vectors become nested lists and come back intact
    #[test]
    fn nested_round_trip(values in arb_nested()) {
        let back: Vec<Vec<i64>> = from_list(&to_list(values.clone())).unwrap();
        prop_assert_eq!(back, values);
    }

    /// Strings come back unchanged
    #[test]
    fn strings_round_trip(values in arb_strings()) {
        let back: Vec<String> = from_list(&to_list(values.clone())).unwrap();
        prop_assert_eq!(back, values);
    }

    /// Narrowing a double to a rational and widening it again is lossless
    #[test]
    fn float_narrowing_is_reversible(x in arb_float()) {
        let value = to_value(x).unwrap();
        prop_assert!(value.is_number());
        let back: f64 = from_value(&value).unwrap();
        prop_assert_eq!(back, x);
    }

    /// Wraparound indexing on a converted list follows the vector
    #[test]
    fn converted_list_wraps(values in prop::collection::vec(any::<i64>(), 1..20), index in 0i64..100) {
        let list = to_list(values.clone());
        let expected = Value::int(values[index as usize % values.len()]);
        prop_assert_eq!(list.get(index).unwrap(), expected);
    }

    /// JSON arrays of integers and strings survive ingestion and emission
    #[test]
    fn json_round_trip(ints in arb_ints(), strings in arb_strings()) {
        let document = json!([ints, strings]);
        let value = from_json(document.clone()).unwrap();
        prop_assert_eq!(to_json(&value).unwrap(), document);
    }
}
