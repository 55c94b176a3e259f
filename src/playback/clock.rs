use std::time::Duration;

/// Pacing seam for the scheduler's cooperative sleeps.
///
/// Playback throttling is sleep-based by design (no real-time guarantee),
/// so the sleep itself is the only thing to abstract: tests substitute a
/// recording clock and run without real-time waits.
pub trait Clock {
    /// Block for roughly `duration`.
    fn sleep(&mut self, duration: Duration);
}

/// Wall-clock implementation over [`std::thread::sleep`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock that never blocks; used when pacing is meaningless (e.g. when
/// piping frames straight into an encoder).
#[derive(Clone, Copy, Debug, Default)]
pub struct NullClock;

impl Clock for NullClock {
    fn sleep(&mut self, _duration: Duration) {}
}
