//! Wraparound-safe interval gate.
//!
//! The control loop never blocks; every "has it been long enough?" question is
//! answered by comparing the free-running millisecond counter against a stored
//! timestamp. The counter wraps at 2^32, so the comparison must go through
//! modular subtraction rather than a plain `>`.

/// Elapsed-time gate over a wrapping `u32` tick counter.
///
/// Holds the tick of the last event. `wrapping_sub` gives the correct modular
/// distance for up to one wrap between readings, which the polling rate
/// guarantees by a wide margin.
#[derive(Debug, Clone, Copy)]
pub struct IntervalGate {
    last: u32,
}

impl IntervalGate {
    /// A gate that has never fired. `last = 0` doubles as the startup
    /// sentinel, see [`ready`](Self::ready).
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Modular ticks since the last recorded event.
    pub fn elapsed(&self, now: u32) -> u32 {
        now.wrapping_sub(self.last)
    }

    /// True once at least `interval` ticks have passed since the last event.
    ///
    /// The extra `now >= interval` clause suppresses spurious firing in the
    /// first `interval` ticks after power-up, when `last` is still the 0
    /// sentinel and the modular distance alone would already be "elapsed".
    /// The guard is only meaningful for the first wrap cycle of the counter;
    /// after a wrap it can delay a firing by at most one interval, which the
    /// reference controller accepts.
    pub fn ready(&self, now: u32, interval: u32) -> bool {
        self.elapsed(now) >= interval && now >= interval
    }

    /// Record that the gated event happened at `now`.
    pub fn refresh(&mut self, now: u32) {
        self.last = now;
    }

    /// Combined check-and-refresh for periodic events (beacons, blink
    /// phases): returns true and restarts the interval when it has elapsed.
    pub fn fire(&mut self, now: u32, interval: u32) -> bool {
        if self.ready(now, interval) {
            self.last = now;
            true
        } else {
            false
        }
    }
}

impl Default for IntervalGate {
    fn default() -> Self {
        Self::new()
    }
}
