// lazylist-core - Tee-split of one-shot producers
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Splitting a one-shot producer into independent, synchronized branches.
//!
//! All branches of a tee share one upstream producer. Whichever branch runs
//! ahead pulls from the producer and leaves a copy of each item in the buffer
//! of every other live branch, so each item is produced exactly once and every
//! branch sees the full remaining sequence. Dropped branches stop receiving
//! copies. A failure is the last item: the producer is not pulled again.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::trace;

use crate::error::Result;
use crate::value::Value;

/// A one-shot source of canonical values.
pub type Producer = Box<dyn Iterator<Item = Result<Value>>>;

struct TeeState {
    source: Producer,
    /// Pending items per branch; `None` once the branch is dropped.
    branches: Vec<Option<VecDeque<Result<Value>>>>,
    /// Set while the upstream producer is being driven.
    busy: bool,
    exhausted: bool,
}

/// One branch of a tee-split producer.
pub struct Tee {
    state: Rc<RefCell<TeeState>>,
    /// Branches dropped while `state` was borrowed, freed on the next access.
    released: Rc<RefCell<Vec<usize>>>,
    branch: usize,
}

/// Split `source` into two independent branches.
pub fn tee(source: Producer) -> (Tee, Tee) {
    let state = Rc::new(RefCell::new(TeeState {
        source,
        branches: vec![Some(VecDeque::new()), Some(VecDeque::new())],
        busy: false,
        exhausted: false,
    }));
    let released = Rc::new(RefCell::new(Vec::new()));
    (
        Tee {
            state: Rc::clone(&state),
            released: Rc::clone(&released),
            branch: 0,
        },
        Tee {
            state,
            released,
            branch: 1,
        },
    )
}

impl Tee {
    /// Create another branch positioned where this one is.
    ///
    /// The new branch starts with a copy of this branch's pending buffer, so
    /// both go on to yield the same items.
    pub fn split(&self) -> Tee {
        let mut state = self.state.borrow_mut();
        self.reap(&mut state);
        let pending = state.branches[self.branch].clone().unwrap_or_default();
        let branch = match state.branches.iter().position(Option::is_none) {
            Some(free) => {
                state.branches[free] = Some(pending);
                free
            }
            None => {
                state.branches.push(Some(pending));
                state.branches.len() - 1
            }
        };
        trace!(branch, live = state.live(), "split tee branch");
        Tee {
            state: Rc::clone(&self.state),
            released: Rc::clone(&self.released),
            branch,
        }
    }

    /// Free the slots of branches whose drop could not reach the state.
    fn reap(&self, state: &mut TeeState) {
        let released = std::mem::take(&mut *self.released.borrow_mut());
        for branch in released {
            state.branches[branch] = None;
        }
    }

    /// Whether the shared producer has signalled exhaustion.
    pub fn is_exhausted(&self) -> bool {
        self.state.borrow().exhausted
    }
}

impl TeeState {
    fn live(&self) -> usize {
        self.branches.iter().filter(|b| b.is_some()).count()
    }
}

impl Iterator for Tee {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut source = {
            let mut state = self.state.borrow_mut();
            self.reap(&mut state);
            if let Some(item) = state.branches[self.branch]
                .as_mut()
                .and_then(VecDeque::pop_front)
            {
                return Some(item);
            }
            if state.exhausted {
                return None;
            }
            if state.busy {
                trace!(branch = self.branch, "re-entrant pull on a tee branch");
                return None;
            }
            state.busy = true;
            std::mem::replace(&mut state.source, Box::new(std::iter::empty()))
        };

        // The borrow is released while the producer runs so that it may
        // touch other lists (or other branches) freely.
        let item = source.next();

        let mut state = self.state.borrow_mut();
        state.busy = false;
        match item {
            None => {
                state.exhausted = true;
                None
            }
            Some(item) => {
                if item.is_err() {
                    trace!(branch = self.branch, "producer failed, ending tee");
                    state.exhausted = true;
                } else {
                    state.source = source;
                }
                let me = self.branch;
                for (i, branch) in state.branches.iter_mut().enumerate() {
                    if i != me
                        && let Some(buffer) = branch
                    {
                        buffer.push_back(item.clone());
                    }
                }
                Some(item)
            }
        }
    }
}

impl Drop for Tee {
    fn drop(&mut self) {
        match self.state.try_borrow_mut() {
            Ok(mut state) => state.branches[self.branch] = None,
            Err(_) => {
                trace!(branch = self.branch, "tee state busy, deferring branch release");
                self.released.borrow_mut().push(self.branch);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn counting(n: i64, pulls: Rc<Cell<usize>>) -> Producer {
        Box::new((0..n).map(move |i| {
            pulls.set(pulls.get() + 1);
            Ok::<Value, crate::error::Error>(Value::int(i))
        }))
    }

    fn ints(branch: impl Iterator<Item = Result<Value>>) -> Vec<Value> {
        branch.map(|v| v.unwrap()).collect()
    }

    #[test]
    fn both_branches_see_everything_once() {
        let pulls = Rc::new(Cell::new(0));
        let (a, b) = tee(counting(4, Rc::clone(&pulls)));
        let expected: Vec<Value> = (0..4).map(Value::int).collect();
        assert_eq!(ints(a), expected);
        assert_eq!(ints(b), expected);
        assert_eq!(pulls.get(), 4);
    }

    #[test]
    fn interleaved_pulls() {
        let (mut a, mut b) = tee(counting(3, Rc::new(Cell::new(0))));
        assert_eq!(a.next().unwrap().unwrap(), Value::int(0));
        assert_eq!(a.next().unwrap().unwrap(), Value::int(1));
        assert_eq!(b.next().unwrap().unwrap(), Value::int(0));
        assert_eq!(b.next().unwrap().unwrap(), Value::int(1));
        assert_eq!(b.next().unwrap().unwrap(), Value::int(2));
        assert_eq!(a.next().unwrap().unwrap(), Value::int(2));
        assert!(a.next().is_none());
        assert!(b.next().is_none());
    }

    #[test]
    fn split_copies_pending_buffer() {
        let (mut a, b) = tee(counting(3, Rc::new(Cell::new(0))));
        a.next();
        let c = b.split();
        assert_eq!(ints(b), ints(c));
    }

    #[test]
    fn dropped_branch_stops_buffering() {
        let (a, b) = tee(counting(100, Rc::new(Cell::new(0))));
        drop(b);
        assert_eq!(a.count(), 100);
    }

    #[test]
    fn dropped_slot_is_reused() {
        let (a, b) = tee(counting(2, Rc::new(Cell::new(0))));
        drop(b);
        let c = a.split();
        assert_eq!(c.branch, 1);
    }

    #[test]
    fn failure_ends_every_branch() {
        let pulls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&pulls);
        let source: Producer = Box::new((0..3).map(move |i| {
            counter.set(counter.get() + 1);
            if i == 1 {
                Err(crate::error::Error::producer("boom"))
            } else {
                Ok(Value::int(i))
            }
        }));
        let (mut a, mut b) = tee(source);
        assert_eq!(a.next().unwrap().unwrap(), Value::int(0));
        assert!(a.next().unwrap().is_err());
        assert!(a.next().is_none());
        assert_eq!(b.next().unwrap().unwrap(), Value::int(0));
        assert!(b.next().unwrap().is_err());
        assert!(b.next().is_none());
        assert!(a.is_exhausted());
        assert_eq!(pulls.get(), 2);
    }

    #[test]
    fn release_is_deferred_while_state_is_borrowed() {
        let (mut a, b) = tee(counting(3, Rc::new(Cell::new(0))));
        let guard = a.state.borrow();
        drop(b);
        drop(guard);
        assert!(a.state.borrow().branches[1].is_some());

        a.next();
        let state = a.state.borrow();
        assert!(state.branches[1].is_none());
        assert_eq!(state.live(), 1);
    }
}
