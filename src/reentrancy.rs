//! Debug-only latch around probe sequences.
//!
//! Probing calls into the caller's hashing strategy while the slot array is
//! being walked (and, during a rehash, while it is half rebuilt). A strategy
//! that reaches back into the same table from inside `hash` or `equals` would
//! observe that state. In debug builds the latch turns such a re-entry into a
//! panic; in release builds it compiles away.

use core::cell::Cell;
#[cfg(not(debug_assertions))]
use core::marker::PhantomData;

#[derive(Debug, Default)]
pub(crate) struct ProbeLatch {
    #[cfg(debug_assertions)]
    held: Cell<bool>,
    #[cfg(not(debug_assertions))]
    _unit: PhantomData<Cell<()>>,
}

impl Clone for ProbeLatch {
    // A cloned table starts with its own, open latch.
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl ProbeLatch {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            held: Cell::new(false),
            #[cfg(not(debug_assertions))]
            _unit: PhantomData,
        }
    }

    /// Closes the latch until the returned guard drops.
    #[inline]
    pub(crate) fn enter(&self) -> ProbeGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.held.replace(true),
                "hashing strategy re-entered the table during a probe"
            );
            ProbeGuard { latch: self }
        }

        #[cfg(not(debug_assertions))]
        {
            ProbeGuard {
                _latch: PhantomData,
            }
        }
    }
}

pub(crate) struct ProbeGuard<'a> {
    #[cfg(debug_assertions)]
    latch: &'a ProbeLatch,
    #[cfg(not(debug_assertions))]
    _latch: PhantomData<&'a ProbeLatch>,
}

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.latch.held.set(false);
    }
}
