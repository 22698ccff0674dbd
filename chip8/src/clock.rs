//! CPU Clock.
use std::{
    thread,
    time::{Duration, Instant},
};

/// Timer to synchronize thread with the software clock of the virtual CPU.
///
/// It is designed to work with the yielding cooperative pattern
/// of the interpreter loop. When the VM yields control back to the
/// caller, time elapses until it is resumed. Once the interpreter
/// is resumed, the elapsed time is taken into account when determining
/// the next cycle.
pub(crate) struct Clock {
    start: Instant,
    interval: Duration,
}

impl Clock {
    /// Creates a new clock with the current time as internal state.
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            start: Instant::now(),
            interval,
        }
    }

    /// Set the clock state back to zero.
    pub(crate) fn reset(&mut self) {
        self.start = Instant::now()
    }

    /// Block the current thread until the next clock cycle.
    pub(crate) fn wait(&mut self) {
        loop {
            let elapsed = self.start.elapsed();
            if elapsed < self.interval {
                // Sleep does not have enough resolution, and causes
                // the clock to run at 30 FPS.
                //
                // Spinning a loop causes high CPU usage and fan madness.
                //
                // Yielding in a loop is the best alternative.
                thread::yield_now();
            } else {
                // Reset back to zero, rather than trying to catch up.
                //
                // If the VM was paused for debugging, and a large
                // amount of time has elapsed until it is resumed,
                // it should simply continue at the next cycle running
                // at its usual speed.
                self.reset();
                return;
            }
        }
    }
}

/// Fixed rate ticker driven by externally measured time.
///
/// Elapsed time is accumulated, and every whole interval
/// produces one tick. The remainder carries over to the next call,
/// so the tick rate doesn't drift with the caller's rate.
///
/// A single step longer than the stall threshold means the host was
/// paused. Only `max_ticks` of that backlog are handed out and the
/// rest is dropped.
#[derive(Debug)]
pub(crate) struct Ticker {
    interval: Duration,
    accumulator: Duration,
    /// Elapsed time beyond which a step counts as a host stall.
    stall: Duration,
    /// Most ticks handed out after a stall.
    max_ticks: u32,
}

impl Ticker {
    pub(crate) fn new(interval: Duration, stall: Duration, max_ticks: u32) -> Self {
        Self {
            interval,
            accumulator: Duration::ZERO,
            stall,
            max_ticks,
        }
    }

    /// Add elapsed time, and return the number of ticks that are due.
    pub(crate) fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.interval.is_zero() {
            return 0;
        }

        self.accumulator += elapsed;

        let mut ticks = 0;
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            ticks += 1;
        }

        if elapsed > self.stall && ticks > self.max_ticks {
            // The host stalled. Drop the backlog instead of catching up.
            log::debug!("dropped {} timer ticks", ticks - self.max_ticks);
            ticks = self.max_ticks;
        }

        ticks
    }

    pub(crate) fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}
