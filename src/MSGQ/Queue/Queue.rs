// Bounded FIFO message queue, capability-gated. Struct definitions; the
// operations live in Queue_impl.rs.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU32, AtomicU64};
use std::sync::{Arc, OnceLock};

use crossbeam_utils::CachePadded;

use crate::Guard::grant::GrantTable;
use crate::MSGQ::Structs::Queue_Structs::{ChannelId, Msg};

/// A single slot in the queue's ring.
///
/// The `sequence` word carries the synchronization:
/// - A producer claims a `tail` position and requires the target slot's
///   `sequence` to equal that position before writing.
/// - After writing, it stores `position + 1`, publishing the message.
/// - The consumer requires `sequence == head + 1` before reading, then
///   releases the slot by storing `head + capacity`.
pub struct Slot {
    pub(crate) sequence: AtomicU64,
    pub(crate) msg: UnsafeCell<Msg>,
}

/// Fixed-capacity FIFO message queue.
///
/// `put` never blocks: a full queue rejects the message, it never
/// overwrites. `get` suspends the caller on a futex-backed signal word
/// until a message is published; `try_get` is its non-blocking form.
///
/// Every operation passes through the protection layer before it touches
/// queue state. A caller in an isolated domain that was never granted this
/// queue does not get an error back; its whole domain is terminated (see
/// `Guard::domain`).
pub struct MsgQueue {
    pub(crate) name: &'static str,
    pub(crate) id: ChannelId,
    pub(crate) slots: Box<[Slot]>,
    pub(crate) capacity: usize,
    pub(crate) mask: usize,
    pub(crate) tail: CachePadded<AtomicU64>,
    pub(crate) head: CachePadded<AtomicU64>,
    pub(crate) signal: AtomicU32,
    pub(crate) grants: OnceLock<Arc<GrantTable>>,
}

// Synchronization is carried by the per-slot sequence words and cursors.
unsafe impl Send for MsgQueue {}
unsafe impl Sync for MsgQueue {}
