//! Shared counters, configuration, and the monotonic uptime clock.

use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use lazy_static::lazy_static;

/// Production period at boot.
pub const PERIOD_DEFAULT_MS: u32 = 100;
/// Lowest accepted production period.
pub const PERIOD_MIN_MS: u32 = 10;
/// Highest accepted production period.
pub const PERIOD_MAX_MS: u32 = 10_000;

lazy_static! {
    static ref BOOT: Instant = Instant::now();
}

/// Milliseconds of monotonic uptime, unaffected by wall-clock adjustments.
/// The zero point is pinned the first time anything asks for the time; the
/// boot path does so before starting the pipeline.
pub fn uptime_ms() -> i64 {
    BOOT.elapsed().as_millis() as i64
}

/// Shared runtime state.
///
/// Both fields are atomic: `seq` is shared between the worker and
/// administrative readers, `period_ms` between the administrative writer
/// and status readers. The timer itself is reconfigured by message and
/// never reads `period_ms` concurrently.
pub struct RuntimeState {
    seq: AtomicU32,
    period_ms: AtomicU32,
}

impl RuntimeState {
    pub fn new(period_ms: u32) -> Self {
        Self {
            seq: AtomicU32::new(0),
            period_ms: AtomicU32::new(period_ms),
        }
    }

    /// Claim the next sequence number. Strictly increasing and gap-free at
    /// production time; called exactly once per production tick.
    pub fn next_seq(&self) -> u32 {
        self.seq.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Number of messages produced so far.
    pub fn seq(&self) -> u32 {
        self.seq.load(Ordering::Relaxed)
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms.load(Ordering::Relaxed)
    }

    /// Update the period. Values outside [`PERIOD_MIN_MS`, `PERIOD_MAX_MS`]
    /// are rejected without touching any state.
    pub fn set_period(&self, ms: u32) -> io::Result<()> {
        if !(PERIOD_MIN_MS..=PERIOD_MAX_MS).contains(&ms) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "period out of range (10..10000 ms)",
            ));
        }
        self.period_ms.store(ms, Ordering::Relaxed);
        Ok(())
    }
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self::new(PERIOD_DEFAULT_MS)
    }
}
