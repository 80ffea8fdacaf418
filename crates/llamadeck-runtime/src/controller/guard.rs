use std::sync::atomic::{AtomicBool, Ordering};

/// Holds the controller's single-flight flag for one mutating operation.
///
/// The flag is cleared on drop, so every exit path of `start`/`stop`
/// (including early `?` returns) releases it.
pub(super) struct OperationGuard<'a> {
    in_flight: &'a AtomicBool,
}

impl<'a> OperationGuard<'a> {
    /// Claim the flag, or `None` if another operation holds it.
    pub(super) fn try_acquire(in_flight: &'a AtomicBool) -> Option<Self> {
        in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { in_flight })
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }
}
