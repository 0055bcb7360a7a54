/// Monotonic time source.
///
/// Used both to measure inter-edge intervals inside the falling-edge
/// handler and to enforce the minimum sampling interval between reads.
/// Timestamps are microseconds since an arbitrary epoch; the only
/// requirement is that they never go backwards.
pub trait MonotonicClock {
    /// Returns the current timestamp in microseconds.
    fn now_us(&self) -> u64;
}

impl<C: MonotonicClock + ?Sized> MonotonicClock for &C {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}
