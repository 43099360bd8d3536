// Fixed-size records carried by the bounded message queues

// no atomics in Msg; keep as plain integral types for a stable layout

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// One produced message. Immutable once written to a slot; ownership moves
/// to the consumer on dequeue. `ts_ms` is monotonic uptime in milliseconds.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Msg {
    pub seq: u32,
    pub ts_ms: i64,
}

/// Process-unique identifier for a queue, handed out at construction.
/// Grant entries and protection-layer checks are keyed by this id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u32);

static NEXT_CHANNEL_ID: AtomicU32 = AtomicU32::new(0);

impl ChannelId {
    pub(crate) fn next() -> Self {
        ChannelId(NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.0)
    }
}
