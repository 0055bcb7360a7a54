use core::sync::atomic::{AtomicBool, Ordering};

/// Exclusivity token for the open/use/close lifecycle.
///
/// At most one session holds the lock at any instant; a second opener
/// is turned away until the holder releases. `const`-constructible so
/// it can live in a `static` shared between openers, next to the
/// [`EdgeCapture`](crate::EdgeCapture).
#[derive(Debug)]
pub struct SessionLock {
    held: AtomicBool,
}

impl SessionLock {
    /// Creates a released lock.
    pub const fn new() -> Self {
        SessionLock {
            held: AtomicBool::new(false),
        }
    }

    /// Attempts to take the lock; returns `false` when another
    /// session already holds it.
    pub fn try_acquire(&self) -> bool {
        self.held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Releases the lock unconditionally.
    pub fn release(&self) {
        self.held.store(false, Ordering::Release);
    }
}

impl Default for SessionLock {
    fn default() -> Self {
        Self::new()
    }
}
