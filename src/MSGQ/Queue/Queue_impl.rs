use std::cell::UnsafeCell;
use std::io;
use std::sync::atomic::Ordering::{AcqRel, Acquire, Relaxed, Release};
use std::sync::atomic::{AtomicU32, AtomicU64};
use std::sync::{Arc, OnceLock};

use crossbeam_utils::CachePadded;

use super::Queue::{MsgQueue, Slot};
use crate::Core::futex;
use crate::Guard::domain::check_access;
use crate::Guard::grant::GrantTable;
use crate::MSGQ::Structs::Queue_Structs::{ChannelId, Msg};

impl MsgQueue {
    /// Create a queue with `capacity` slots. Capacity must be a power of
    /// two and greater than zero.
    pub fn new(name: &'static str, capacity: usize) -> io::Result<Self> {
        if capacity == 0 || (capacity & (capacity - 1)) != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "capacity must be a power of two and greater than zero",
            ));
        }

        let slots: Box<[Slot]> = (0..capacity)
            .map(|k| Slot {
                sequence: AtomicU64::new(k as u64),
                msg: UnsafeCell::new(Msg::default()),
            })
            .collect();

        let q = Self {
            name,
            id: ChannelId::next(),
            slots,
            capacity,
            mask: capacity - 1,
            tail: CachePadded::new(AtomicU64::new(0)),
            head: CachePadded::new(AtomicU64::new(0)),
            signal: AtomicU32::new(0),
            grants: OnceLock::new(),
        };
        log::debug!("[msgq] created {} ({}, {} slots)", q.name, q.id, capacity);
        Ok(q)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of messages currently queued. A racy snapshot; meaningful
    /// only for observability.
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Acquire);
        let head = self.head.load(Acquire);
        tail.saturating_sub(head) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attach the sealed grant table. Callable exactly once, from the
    /// trusted boot path before isolated domains start. A queue with no
    /// table bound denies all isolated access.
    pub fn bind_grants(&self, table: Arc<GrantTable>) -> io::Result<()> {
        self.grants.set(table).map_err(|_| {
            io::Error::new(io::ErrorKind::AlreadyExists, "grant table already bound")
        })
    }

    /// Non-blocking enqueue. Returns `WouldBlock` when the queue is full.
    pub fn put(&self, msg: Msg) -> io::Result<()> {
        check_access(self.id, self.name, self.grants.get().map(Arc::as_ref));
        loop {
            let tail = self.tail.load(Relaxed);
            let slot = &self.slots[(tail as usize) & self.mask];
            let seq = slot.sequence.load(Acquire);
            let dif = seq as i64 - tail as i64;

            if dif == 0 {
                if self
                    .tail
                    .compare_exchange_weak(tail, tail + 1, AcqRel, Relaxed)
                    .is_ok()
                {
                    // We own this slot now
                    unsafe { *slot.msg.get() = msg };
                    slot.sequence.store(tail + 1, Release);
                    self.signal_waiters();
                    return Ok(());
                }
            } else if dif < 0 {
                // full
                return Err(io::Error::new(io::ErrorKind::WouldBlock, "queue full"));
            } else {
                // another producer is mid-claim; retry
                std::hint::spin_loop();
            }
        }
    }

    /// Non-blocking dequeue.
    pub fn try_get(&self) -> Option<Msg> {
        check_access(self.id, self.name, self.grants.get().map(Arc::as_ref));
        self.dequeue()
    }

    /// Blocking dequeue. Suspends the caller until a message is published;
    /// there is no timeout, the consumer loops for process lifetime.
    pub fn get(&self) -> Msg {
        loop {
            // Re-checked on every wakeup so a thread whose domain faulted
            // while it slept terminates here instead of draining messages.
            check_access(self.id, self.name, self.grants.get().map(Arc::as_ref));
            // Sample the signal word before the dequeue attempt: a publish
            // landing between the attempt and the wait then changes the
            // word and the wait falls through instead of sleeping.
            let observed = self.signal.load(Acquire);
            if let Some(msg) = self.dequeue() {
                return msg;
            }
            futex::wait(&self.signal, observed);
        }
    }

    /// Claim and read the head slot. `None` when the queue appears empty.
    fn dequeue(&self) -> Option<Msg> {
        loop {
            let head = self.head.load(Relaxed);
            let slot = &self.slots[(head as usize) & self.mask];
            let seq = slot.sequence.load(Acquire);
            let dif = seq as i64 - (head as i64 + 1);

            if dif == 0 {
                if self
                    .head
                    .compare_exchange_weak(head, head + 1, AcqRel, Relaxed)
                    .is_ok()
                {
                    let msg = unsafe { *slot.msg.get() };
                    // free the slot for future producers
                    slot.sequence.store(head + self.capacity as u64, Release);
                    return Some(msg);
                }
            } else if dif < 0 {
                // empty
                return None;
            } else {
                // producer not finished publishing; retry
                std::hint::spin_loop();
            }
        }
    }

    /// Bump the signal word and wake one sleeping consumer.
    fn signal_waiters(&self) {
        self.signal.fetch_add(1, Release);
        futex::wake_one(&self.signal);
    }
}
