// lazylist-core - Common test utilities
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared test helpers and utilities for lazy list integration tests.
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

pub use lazylist_core::{
    BigInt, BigRational, Error, External, Flat, LazyList, Slice, Source, Symbolic, SymbolicForm,
    Value,
};

/// Install a test-writer subscriber so `RUST_LOG=trace cargo test` shows
/// the list's tracing output. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Integer values from a slice of i64.
#[must_use]
pub fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::int).collect()
}

/// A finite list over `values` together with a counter of producer pulls.
#[must_use]
pub fn counted(values: &[i64]) -> (LazyList, Rc<Cell<usize>>) {
    let pulls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&pulls);
    let values = values.to_vec();
    let list = LazyList::from_producer(
        values.into_iter().inspect(move |_| counter.set(counter.get() + 1)),
        false,
    );
    (list, pulls)
}

/// The infinite list 0, 1, 2, ... together with a counter of producer pulls.
#[must_use]
pub fn naturals() -> (LazyList, Rc<Cell<usize>>) {
    let pulls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&pulls);
    let list = LazyList::from_producer(
        (0i64..).inspect(move |_| counter.set(counter.get() + 1)),
        true,
    );
    (list, pulls)
}

/// Run a fresh iteration to the end, panicking on errors.
#[must_use]
pub fn collect(list: &LazyList) -> Vec<Value> {
    list.iter().map(|v| v.unwrap()).collect()
}

/// A stand-in for the symbolic-math layer.
#[derive(Debug)]
pub struct MockSymbolic {
    pub form: SymbolicForm,
    pub integer: Option<i64>,
    pub rational: Option<(i64, i64)>,
    pub float: f64,
}

impl MockSymbolic {
    pub fn integer(n: i64) -> Rc<dyn Symbolic> {
        Rc::new(MockSymbolic {
            form: SymbolicForm::Integer,
            integer: Some(n),
            rational: None,
            float: n as f64,
        })
    }

    pub fn product(value: f64) -> Rc<dyn Symbolic> {
        Rc::new(MockSymbolic {
            form: SymbolicForm::Product,
            integer: None,
            rational: None,
            float: value,
        })
    }

    pub fn factorial(value: f64) -> Rc<dyn Symbolic> {
        Rc::new(MockSymbolic {
            form: SymbolicForm::Factorial,
            integer: None,
            rational: None,
            float: value,
        })
    }

    pub fn rational(num: i64, den: i64) -> Rc<dyn Symbolic> {
        Rc::new(MockSymbolic {
            form: SymbolicForm::Rational,
            integer: None,
            rational: Some((num, den)),
            float: num as f64 / den as f64,
        })
    }

    pub fn opaque(value: f64) -> Rc<dyn Symbolic> {
        Rc::new(MockSymbolic {
            form: SymbolicForm::Other,
            integer: None,
            rational: None,
            float: value,
        })
    }
}

impl Symbolic for MockSymbolic {
    fn form(&self) -> SymbolicForm {
        self.form
    }

    fn to_integer(&self) -> Option<BigInt> {
        self.integer.map(BigInt::from)
    }

    fn to_rational(&self) -> Option<BigRational> {
        self.rational
            .map(|(n, d)| BigRational::new(n.into(), d.into()))
    }

    fn evalf(&self) -> f64 {
        self.float
    }
}
