//! Submit lock
//!
//! Mirrors a form's disabled submit button: while one submission of a kind
//! is in flight, the next one fails fast with `Busy`.

use std::sync::atomic::{AtomicBool, Ordering};
use verse_core::{Result, VerseError};

#[derive(Debug)]
pub(crate) struct SubmitLock {
    what: &'static str,
    busy: AtomicBool,
}

impl SubmitLock {
    pub(crate) const fn new(what: &'static str) -> Self {
        Self {
            what,
            busy: AtomicBool::new(false),
        }
    }

    pub(crate) fn acquire(&self) -> Result<SubmitGuard<'_>> {
        if self.busy.swap(true, Ordering::AcqRel) {
            tracing::debug!(operation = self.what, "Submission rejected while busy");
            return Err(VerseError::Busy(self.what.to_string()));
        }
        Ok(SubmitGuard { lock: self })
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the lock on drop, including on error paths
pub(crate) struct SubmitGuard<'a> {
    lock: &'a SubmitLock,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.lock.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_busy_until_release() {
        let lock = SubmitLock::new("create playlist");

        let guard = lock.acquire().unwrap();
        assert!(lock.is_busy());
        assert!(matches!(lock.acquire(), Err(VerseError::Busy(_))));

        drop(guard);
        assert!(!lock.is_busy());
        assert!(lock.acquire().is_ok());
    }
}
