//! Request sequencing for last-writer-wins response handling.
//!
//! # Why sequence requests? (for beginners)
//!
//! The client may have several requests for the same domain outstanding at
//! once: the user changes the catalog filter, and a moment later the backend
//! announces that the catalog was rebuilt, which triggers another listing.
//! The two responses can arrive in either order.
//!
//! Each outstanding request is tagged with a number from a per-domain
//! [`RequestSequence`].  When a response arrives, the caller asks
//! [`RequestSequence::is_latest`]; if a newer request has been issued since,
//! the response is stale and is dropped instead of overwriting newer data.
//!
//! ```text
//! issue() -> #1   filter "editor"      ──────────────┐
//! issue() -> #2   catalog-refreshed  ───┐            │
//!                              #2 lands ┘ (latest)   │
//!                                        #1 lands ───┘ (stale, dropped)
//! ```
//!
//! There is no cancellation: a stale request still runs to completion on the
//! backend; only its answer is ignored.
//!
//! # Thread safety
//!
//! The counter is an `AtomicU64`, so tags can be issued from any task
//! without a lock.  Callers that must check-then-write atomically do so while
//! holding the lock that guards the data being written.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one issued request within a [`RequestSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceTag(u64);

impl SequenceTag {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SequenceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A monotonically increasing source of [`SequenceTag`]s for one domain.
///
/// The first tag issued is `#1`; `#0` means "nothing issued yet".  The
/// counter wraps around at `u64::MAX` without panicking.
///
/// # Examples
///
/// ```rust
/// use forge_core::RequestSequence;
///
/// let seq = RequestSequence::new();
/// let first = seq.issue();
/// let second = seq.issue();
/// assert!(!seq.is_latest(first));
/// assert!(seq.is_latest(second));
/// ```
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next tag; it becomes the latest.
    pub fn issue(&self) -> SequenceTag {
        // `fetch_add` returns the previous value and wraps on overflow.
        let previous = self.latest.fetch_add(1, Ordering::AcqRel);
        SequenceTag(previous.wrapping_add(1))
    }

    /// `true` when no tag has been issued after `tag`.
    pub fn is_latest(&self, tag: SequenceTag) -> bool {
        self.latest.load(Ordering::Acquire) == tag.0
    }

    /// The most recently issued tag value (`0` before the first issue).
    pub fn current(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_first_issued_tag_is_one() {
        // Arrange
        let seq = RequestSequence::new();

        // Act
        let tag = seq.issue();

        // Assert
        assert_eq!(tag.value(), 1);
        assert_eq!(seq.current(), 1);
    }

    #[test]
    fn test_only_newest_tag_is_latest() {
        let seq = RequestSequence::new();
        let older = seq.issue();
        let newer = seq.issue();

        assert!(!seq.is_latest(older));
        assert!(seq.is_latest(newer));
    }

    #[test]
    fn test_tags_increase_monotonically() {
        let seq = RequestSequence::new();
        let tags: Vec<SequenceTag> = (0..100).map(|_| seq.issue()).collect();
        for window in tags.windows(2) {
            assert!(window[1] > window[0], "tags must increase");
        }
    }

    #[test]
    fn test_sequence_wraps_at_u64_max() {
        // Arrange – one step before overflow
        let seq = RequestSequence {
            latest: AtomicU64::new(u64::MAX - 1),
        };

        // Act
        let last = seq.issue();
        let wrapped = seq.issue();

        // Assert
        assert_eq!(last.value(), u64::MAX);
        assert_eq!(wrapped.value(), 0);
        assert!(seq.is_latest(wrapped));
    }

    #[test]
    fn test_tags_are_unique_across_threads() {
        // Arrange
        let seq = Arc::new(RequestSequence::new());
        let thread_count = 8;
        let issues_per_thread = 1000;

        // Act
        let handles: Vec<_> = (0..thread_count)
            .map(|_| {
                let s = Arc::clone(&seq);
                thread::spawn(move || {
                    (0..issues_per_thread)
                        .map(|_| s.issue().value())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("thread panicked"))
            .collect();

        // Assert
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), thread_count * issues_per_thread);
    }

    #[test]
    fn test_tag_display_has_hash_prefix() {
        let seq = RequestSequence::new();
        assert_eq!(seq.issue().to_string(), "#1");
    }
}
