// lazylist-core - Runtime settings
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Thread-local runtime settings.
//!
//! Lists are `Rc`-based and never cross threads, so settings live per thread
//! and can be adjusted by the embedding runtime.

use std::cell::Cell;

/// Default number of cached elements rendered by `Display`.
pub const DEFAULT_DISPLAY_LENGTH: usize = 32;

thread_local! {
    /// Maximum number of elements a single materialization may hold.
    /// None means unlimited (forcing an infinite list never returns).
    static MATERIALIZE_LIMIT: Cell<Option<usize>> = const { Cell::new(None) };

    /// Maximum number of cached elements shown when displaying a list.
    static DISPLAY_LENGTH: Cell<usize> = const { Cell::new(DEFAULT_DISPLAY_LENGTH) };
}

/// Get the current materialization limit.
pub fn materialize_limit() -> Option<usize> {
    MATERIALIZE_LIMIT.with(|l| l.get())
}

/// Set the materialization limit. Returns the previous value.
pub fn set_materialize_limit(limit: Option<usize>) -> Option<usize> {
    MATERIALIZE_LIMIT.with(|l| l.replace(limit))
}

/// Get the current display length.
pub fn display_length() -> usize {
    DISPLAY_LENGTH.with(|d| d.get())
}

/// Set the display length. Returns the previous value.
pub fn set_display_length(len: usize) -> usize {
    DISPLAY_LENGTH.with(|d| d.replace(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_round_trip() {
        assert_eq!(materialize_limit(), None);
        assert_eq!(set_materialize_limit(Some(5)), None);
        assert_eq!(materialize_limit(), Some(5));
        assert_eq!(set_materialize_limit(None), Some(5));
    }

    #[test]
    fn display_length_round_trip() {
        assert_eq!(display_length(), DEFAULT_DISPLAY_LENGTH);
        assert_eq!(set_display_length(3), DEFAULT_DISPLAY_LENGTH);
        assert_eq!(display_length(), 3);
        set_display_length(DEFAULT_DISPLAY_LENGTH);
    }
}
