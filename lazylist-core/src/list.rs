// lazylist-core - Lazy, memoizing list
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The lazy list.
//!
//! A [`LazyList`] pairs a one-shot producer with a cache of everything it has
//! produced so far. Elements are pulled on demand and never recomputed: the
//! cache is always a prefix of the full sequence. Fresh iterations are made
//! by tee-splitting the remaining producer (see [`crate::tee`]), so several
//! consumers can walk the same list without losing or repeating values.
//!
//! Operations that need the whole list (`len`, negative indexing, `reversed`,
//! unbounded slicing, equality) force it to exhaustion. On an infinite list
//! they never return, unless [`crate::config::set_materialize_limit`] has been
//! used to turn that into an error.

use std::cell::RefCell;
use std::fmt;
use std::ops::Add;
use std::rc::Rc;

use im::Vector;
use tracing::{debug, trace};

use crate::config;
use crate::error::{Error, Result};
use crate::normalize::{External, canonicalize, flatten};
use crate::tee::{Producer, Tee, tee};
use crate::value::Value;

// ============================================================================
// Construction
// ============================================================================

/// Where a lazy list gets its values from.
pub enum Source {
    /// A zero-argument function returning the producer. Called immediately.
    Callable(Box<dyn FnOnce() -> Box<dyn Iterator<Item = External>>>),
    /// A finite container.
    Container(Vec<External>),
    /// A producer, possibly partially consumed already. Adopted as is.
    Producer(Box<dyn Iterator<Item = External>>),
}

/// The upstream end of a list: the untouched producer, or this list's branch
/// of a tee once an iteration has been split off.
enum Upstream {
    Direct(Producer),
    Shared(Tee),
    Exhausted,
}

impl Upstream {
    fn next(&mut self) -> Option<Result<Value>> {
        match self {
            Upstream::Direct(producer) => producer.next(),
            Upstream::Shared(branch) => branch.next(),
            Upstream::Exhausted => None,
        }
    }

    /// Split off a new branch for an iteration.
    fn split(&mut self) -> Option<Tee> {
        match std::mem::replace(self, Upstream::Exhausted) {
            Upstream::Direct(producer) => {
                let (ours, theirs) = tee(producer);
                *self = Upstream::Shared(ours);
                Some(theirs)
            }
            Upstream::Shared(branch) => {
                let theirs = branch.split();
                *self = Upstream::Shared(branch);
                Some(theirs)
            }
            Upstream::Exhausted => None,
        }
    }

    /// Whether a `None` from [`Upstream::next`] is final. A shared branch
    /// can come up empty while a sibling is mid-pull without being done.
    fn is_finished(&self) -> bool {
        match self {
            Upstream::Shared(branch) => branch.is_exhausted(),
            Upstream::Direct(_) | Upstream::Exhausted => true,
        }
    }
}

struct Inner {
    upstream: Upstream,
    cache: Vector<Value>,
    infinite: bool,
    /// Set while the upstream producer is being driven.
    busy: bool,
    /// The error that ended production. Every attempt to produce past the
    /// cache reports it again.
    failure: Option<Error>,
}

impl Inner {
    fn is_exhausted(&self) -> bool {
        !self.busy && matches!(self.upstream, Upstream::Exhausted)
    }
}

/// A lazy, memoizing list of canonical values.
///
/// Cloning is cheap and shares state: every clone sees the same cache and
/// drives the same producer.
#[derive(Clone)]
pub struct LazyList {
    inner: Rc<RefCell<Inner>>,
}

fn canonical<I, T>(iter: I) -> Producer
where
    I: Iterator<Item = T> + 'static,
    T: Into<External>,
{
    Box::new(iter.map(|item| canonicalize(item.into())))
}

impl LazyList {
    /// Create a list from a source. `infinite` is a hint that cannot be
    /// detected: it selects the monotonic strategy of [`LazyList::contains`]
    /// and propagates to derived lists.
    pub fn new(source: Source, infinite: bool) -> Self {
        let producer = match source {
            Source::Callable(make) => canonical(make()),
            Source::Container(items) => canonical(items.into_iter()),
            Source::Producer(iter) => canonical(iter),
        };
        Self::with_producer(producer, infinite)
    }

    /// Create a list from a function that builds its producer.
    pub fn from_fn<F, I>(make: F, infinite: bool) -> Self
    where
        F: FnOnce() -> I,
        I: IntoIterator,
        I::IntoIter: 'static,
        I::Item: Into<External>,
    {
        Self::with_producer(canonical(make().into_iter()), infinite)
    }

    /// Create a finite list over the items of a container.
    pub fn from_container<T: Into<External>>(items: impl IntoIterator<Item = T>) -> Self {
        let items: Vec<External> = items.into_iter().map(Into::into).collect();
        Self::new(Source::Container(items), false)
    }

    /// Adopt an existing iterator as the producer.
    pub fn from_producer<I>(iter: I, infinite: bool) -> Self
    where
        I: Iterator + 'static,
        I::Item: Into<External>,
    {
        Self::with_producer(canonical(iter), infinite)
    }

    /// Create a finite list over values that are already canonical.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let values: Vec<Value> = values.into_iter().collect();
        Self::with_producer(Box::new(values.into_iter().map(Ok::<Value, Error>)), false)
    }

    /// Create a list over a producer of canonical values.
    pub fn with_producer(producer: Producer, infinite: bool) -> Self {
        LazyList {
            inner: Rc::new(RefCell::new(Inner {
                upstream: Upstream::Direct(producer),
                cache: Vector::new(),
                infinite,
                busy: false,
                failure: None,
            })),
        }
    }

    /// Whether the creator flagged this list as infinite.
    pub fn is_infinite(&self) -> bool {
        self.inner.borrow().infinite
    }

    /// Whether the producer is known to be exhausted. False while a pull is
    /// in progress.
    pub fn is_exhausted(&self) -> bool {
        self.inner.borrow().is_exhausted()
    }

    /// Number of values produced so far.
    pub fn cached_len(&self) -> usize {
        self.inner.borrow().cache.len()
    }

    /// Snapshot of the values produced so far, without forcing anything.
    pub fn cached(&self) -> Vector<Value> {
        self.inner.borrow().cache.clone()
    }

    /// Returns true if both handles share the same state.
    pub fn ptr_eq(&self, other: &LazyList) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ========================================================================
    // Forward production
    // ========================================================================

    fn pull(&self) -> Option<Result<Value>> {
        let mut upstream = {
            let mut inner = self.inner.borrow_mut();
            if inner.busy {
                // The producer is asking for its own list.
                trace!(cached = inner.cache.len(), "re-entrant pull sees no further values");
                return None;
            }
            inner.busy = true;
            std::mem::replace(&mut inner.upstream, Upstream::Exhausted)
        };

        let item = upstream.next();

        let mut inner = self.inner.borrow_mut();
        inner.busy = false;
        inner.upstream = match item {
            None if upstream.is_finished() => Upstream::Exhausted,
            _ => upstream,
        };
        item
    }

    /// Pull the next value from the producer into the cache and return it.
    /// `Ok(None)` means the producer is exhausted.
    ///
    /// A producer failure ends production: the cache keeps what came before
    /// it and every later attempt to advance returns the same error.
    pub fn advance(&self) -> Result<Option<Value>> {
        if let Some(e) = self.inner.borrow().failure.clone() {
            return Err(e);
        }
        match self.pull() {
            None => Ok(None),
            Some(Err(e)) => {
                let released = {
                    let mut inner = self.inner.borrow_mut();
                    debug!(error = %e, cached = inner.cache.len(), "producer failed");
                    inner.failure = Some(e.clone());
                    std::mem::replace(&mut inner.upstream, Upstream::Exhausted)
                };
                drop(released);
                Err(e)
            }
            Some(Ok(value)) => {
                self.inner.borrow_mut().cache.push_back(value.clone());
                Ok(Some(value))
            }
        }
    }

    /// Produce until `index` is cached. Returns false if the producer ran
    /// out first.
    fn force_through(&self, index: usize) -> Result<bool> {
        while self.cached_len() <= index {
            if self.advance()?.is_none() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Force the producer to exhaustion and return every value.
    ///
    /// The complete cache becomes the list's stable restart point; the
    /// producer is released once it reports its end. Called from inside the
    /// list's own producer, this returns the values cached so far and leaves
    /// the producer in place.
    pub fn materialize(&self) -> Result<Vector<Value>> {
        let limit = config::materialize_limit();
        let before = self.cached_len();
        while self.advance()?.is_some() {
            if let Some(limit) = limit
                && self.cached_len() > limit
            {
                return Err(Error::MaterializeLimit { limit });
            }
        }

        let inner = self.inner.borrow();
        if inner.cache.len() > before {
            debug!(
                produced = inner.cache.len() - before,
                len = inner.cache.len(),
                "materialized lazy list"
            );
        }
        Ok(inner.cache.clone())
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Start a fresh, independent iteration.
    ///
    /// The iteration yields a snapshot of the cached prefix, then the rest of
    /// the producer through its own tee branch. Neither this list nor other
    /// iterations are disturbed, and no value is produced twice.
    pub fn iter(&self) -> LazyIter {
        let mut inner = self.inner.borrow_mut();
        let prefix = inner.cache.clone();
        let rest = if inner.busy {
            None
        } else {
            inner.upstream.split()
        };
        if rest.is_some() {
            debug!(cached = prefix.len(), "split iteration from lazy list");
        }
        let failure = if rest.is_none() {
            inner.failure.clone()
        } else {
            None
        };
        LazyIter {
            prefix,
            rest,
            failure,
        }
    }

    // ========================================================================
    // Indexing
    // ========================================================================

    /// Get the value at `index`.
    ///
    /// Production is forced through `index`. If the list ends first, the
    /// index wraps around the values produced so far; an empty list yields
    /// zero. A negative index counts from the end of the fully materialized
    /// list (and wraps the same way).
    pub fn get(&self, index: i64) -> Result<Value> {
        if index < 0 {
            let items = self.materialize()?;
            if items.is_empty() {
                return Ok(Value::zero());
            }
            let pos = index.rem_euclid(items.len() as i64) as usize;
            return Ok(items[pos].clone());
        }

        let index = index as usize;
        self.force_through(index)?;
        let inner = self.inner.borrow();
        match inner.cache.len() {
            0 => Ok(Value::zero()),
            len => {
                if index >= len {
                    trace!(index, len, "index wrapped around exhausted list");
                }
                Ok(inner.cache[index % len].clone())
            }
        }
    }

    /// Overwrite the value at `index`.
    ///
    /// Production is forced through `index` first. Only the cache changes:
    /// iterations started later see the new value as part of their cached
    /// prefix. A negative index counts from the end of the materialized list.
    pub fn set(&self, index: i64, value: impl Into<External>) -> Result<()> {
        let value = canonicalize(value.into())?;
        let pos = if index < 0 {
            let len = self.materialize()?.len();
            let pos = len as i64 + index;
            if pos < 0 {
                return Err(Error::IndexOutOfBounds { index, length: len });
            }
            pos as usize
        } else {
            let pos = index as usize;
            if !self.force_through(pos)? {
                return Err(Error::IndexOutOfBounds {
                    index,
                    length: self.cached_len(),
                });
            }
            pos
        };
        self.inner.borrow_mut().cache.set(pos, value);
        Ok(())
    }

    // ========================================================================
    // Slicing
    // ========================================================================

    /// Slice with `start`, `stop` and `step` (defaults 0, unbounded, 1; a step
    /// of 0 counts as 1).
    ///
    /// With no `stop` the result is a new lazy list that, once driven,
    /// materializes this one and strides over it. With a `stop` the result is
    /// computed eagerly by indexing every position of the range; a negative
    /// `stop` counts from the end of the materialized list.
    pub fn slice(&self, start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Result<Slice> {
        let start = start.unwrap_or(0);
        let step = match step {
            None | Some(0) => 1,
            Some(step) => step,
        };

        let Some(mut stop) = stop else {
            let list = self.clone();
            let producer = Deferred::new(move || {
                let items = list.materialize()?;
                Ok(stride(&items, start, step)
                    .into_iter()
                    .map(Ok::<Value, Error>))
            });
            return Ok(Slice::Lazy(LazyList::with_producer(
                Box::new(producer),
                false,
            )));
        };

        if stop < 0 {
            stop += self.len()? as i64;
        }
        let mut items = Vec::new();
        let mut i = start;
        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            items.push(self.get(i)?);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
        Ok(Slice::Items(items))
    }

    // ========================================================================
    // Searching
    // ========================================================================

    /// Membership test.
    ///
    /// On an infinite list the values are assumed to be non-decreasing: the
    /// cached prefix is checked, then production continues only while the
    /// latest value is `<=` the target. Otherwise this is a linear scan of a
    /// fresh iteration.
    pub fn contains(&self, target: &Value) -> Result<bool> {
        if !self.is_infinite() {
            for item in self.iter() {
                if item? == *target {
                    return Ok(true);
                }
            }
            return Ok(false);
        }

        let cached = self.cached();
        if cached.iter().any(|v| v == target) {
            return Ok(true);
        }
        let mut last = cached.last().cloned().unwrap_or_else(Value::zero);
        while last <= *target {
            match self.advance()? {
                None => return Ok(false),
                Some(value) if value == *target => return Ok(true),
                Some(value) => last = value,
            }
        }
        Ok(false)
    }

    /// Number of values equal to `target`. Materializes the list.
    pub fn count(&self, target: &Value) -> Result<usize> {
        Ok(self.materialize()?.iter().filter(|v| *v == target).count())
    }

    // ========================================================================
    // Derived lists
    // ========================================================================

    /// A lazy view of the values satisfying `predicate`.
    ///
    /// The iteration over this list is opened on the first pull. Nothing
    /// bounds the search: on an infinite list whose remaining values all fail
    /// the predicate, pulling never returns.
    pub fn filter<P>(&self, predicate: P) -> LazyList
    where
        P: Fn(&Value) -> Result<bool> + 'static,
    {
        debug!(infinite = self.is_infinite(), "derived filtered list");
        let list = self.clone();
        let producer = Deferred::new(move || {
            Ok::<_, Error>(list.iter().filter_map(move |item| match item {
                Ok(value) => match predicate(&value) {
                    Ok(true) => Some(Ok(value)),
                    Ok(false) => None,
                    Err(e) => Some(Err(e)),
                },
                Err(e) => Some(Err(e)),
            }))
        });
        LazyList::with_producer(Box::new(producer), self.is_infinite())
    }

    /// The values in reverse order. Materializes the list.
    pub fn reversed(&self) -> Result<LazyList> {
        let items = self.materialize()?;
        Ok(LazyList::from_values(items.iter().rev().cloned()))
    }

    /// This list followed by `rhs`. See [`concatenate`].
    pub fn concat(&self, rhs: &LazyList) -> LazyList {
        concatenate(self, rhs)
    }

    // ========================================================================
    // Whole-list queries
    // ========================================================================

    /// Number of values. Materializes the list.
    pub fn len(&self) -> Result<usize> {
        Ok(self.materialize()?.len())
    }

    /// Structural equality after flattening both sides.
    pub fn equals(&self, other: &Value) -> Result<bool> {
        Ok(flatten(&Value::List(self.clone()))? == flatten(other)?)
    }
}

/// A list yielding every value of `lhs`, then every value of `rhs`.
///
/// Lazy on both sides; `rhs` is only opened once `lhs` is exhausted, so it is
/// never reached when `lhs` is infinite.
pub fn concatenate(lhs: &LazyList, rhs: &LazyList) -> LazyList {
    let right = rhs.clone();
    let producer = lhs
        .iter()
        .chain(Deferred::new(move || Ok::<_, Error>(right.iter())));
    LazyList::with_producer(Box::new(producer), lhs.is_infinite() || rhs.is_infinite())
}

impl Add for LazyList {
    type Output = LazyList;

    fn add(self, rhs: LazyList) -> LazyList {
        concatenate(&self, &rhs)
    }
}

impl Add<&LazyList> for &LazyList {
    type Output = LazyList;

    fn add(self, rhs: &LazyList) -> LazyList {
        concatenate(self, rhs)
    }
}

/// Two lists are equal when they share state or flatten to the same values.
/// A failure while flattening (such as hitting the materialization limit)
/// counts as unequal.
impl PartialEq for LazyList {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.equals(&Value::List(other.clone())).unwrap_or_else(|e| {
            trace!(error = %e, "list comparison failed");
            false
        })
    }
}

impl fmt::Debug for LazyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("LazyList")
            .field("cached", &inner.cache)
            .field("infinite", &inner.infinite)
            .field("exhausted", &inner.is_exhausted())
            .finish()
    }
}

/// Shows the cached values only, never driving the producer. A trailing
/// `...` marks values not produced yet or beyond the display length.
impl fmt::Display for LazyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (cache, exhausted) = {
            let inner = self.inner.borrow();
            (inner.cache.clone(), inner.is_exhausted())
        };
        let max_display = config::display_length();

        write!(f, "⟨")?;
        for (i, value) in cache.iter().take(max_display).enumerate() {
            if i > 0 {
                write!(f, "|")?;
            }
            write!(f, "{value}")?;
        }
        if !exhausted || cache.len() > max_display {
            if !cache.is_empty() {
                write!(f, "|")?;
            }
            write!(f, "...")?;
        }
        write!(f, "⟩")
    }
}

// ============================================================================
// Iteration
// ============================================================================

/// An independent iteration over a [`LazyList`].
pub struct LazyIter {
    prefix: Vector<Value>,
    rest: Option<Tee>,
    /// Reported after the prefix when the list had already failed.
    failure: Option<Error>,
}

impl Iterator for LazyIter {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(value) = self.prefix.pop_front() {
            return Some(Ok(value));
        }
        let Some(rest) = self.rest.as_mut() else {
            return self.failure.take().map(Err);
        };
        let item = rest.next();
        if item.is_none() {
            self.rest = None;
        }
        item
    }
}

impl IntoIterator for &LazyList {
    type Item = Result<Value>;
    type IntoIter = LazyIter;

    fn into_iter(self) -> LazyIter {
        self.iter()
    }
}

// ============================================================================
// Slicing
// ============================================================================

/// Result of [`LazyList::slice`].
#[derive(Debug, Clone)]
pub enum Slice {
    /// Unbounded slice, still lazy
    Lazy(LazyList),
    /// Bounded slice, already computed
    Items(Vec<Value>),
}

impl Slice {
    /// Wrap the slice as a list value.
    pub fn into_list(self) -> LazyList {
        match self {
            Slice::Lazy(list) => list,
            Slice::Items(items) => LazyList::from_values(items),
        }
    }

    /// Collect the slice, materializing it if lazy.
    pub fn into_values(self) -> Result<Vec<Value>> {
        match self {
            Slice::Lazy(list) => Ok(list.materialize()?.into_iter().collect()),
            Slice::Items(items) => Ok(items),
        }
    }
}

/// `items[start::step]` with negative `start` counting from the end.
fn stride(items: &Vector<Value>, start: i64, step: i64) -> Vec<Value> {
    let len = items.len() as i64;
    let mut out = Vec::new();
    if step > 0 {
        let mut i = if start < 0 { (start + len).max(0) } else { start.min(len) };
        while i < len {
            out.push(items[i as usize].clone());
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    } else {
        let mut i = if start < 0 { start + len } else { start.min(len - 1) };
        while i >= 0 {
            out.push(items[i as usize].clone());
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    }
    out
}

// ============================================================================
// Deferred producers
// ============================================================================

/// A producer whose underlying iterator is only built on the first pull.
struct Deferred<F, I> {
    state: DeferredState<F, I>,
}

enum DeferredState<F, I> {
    Pending(F),
    Running(I),
    Done,
}

impl<F, I> Deferred<F, I> {
    fn new(open: F) -> Self {
        Deferred {
            state: DeferredState::Pending(open),
        }
    }
}

impl<F, I> Iterator for Deferred<F, I>
where
    F: FnOnce() -> Result<I>,
    I: Iterator<Item = Result<Value>>,
{
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, DeferredState::Done) {
                DeferredState::Pending(open) => match open() {
                    Ok(iter) => self.state = DeferredState::Running(iter),
                    Err(e) => return Some(Err(e)),
                },
                DeferredState::Running(mut iter) => {
                    let item = iter.next();
                    if item.is_some() {
                        self.state = DeferredState::Running(iter);
                    }
                    return item;
                }
                DeferredState::Done => return None,
            }
        }
    }
}
