//! The isolated consumer.

use std::sync::Arc;

use crate::Guard::domain;
use crate::MSGQ::Queue::Queue::MsgQueue;

/// Long-lived service task draining the public queue from inside the
/// isolated domain. Holds nothing but the queue handle; everything else is
/// out of reach by construction of the grant table.
pub struct ConsumerTask {
    queue: Arc<MsgQueue>,
}

impl ConsumerTask {
    pub fn new(queue: Arc<MsgQueue>) -> Self {
        Self { queue }
    }

    /// Run forever: blocking dequeue, then emit the delivery record. The
    /// blocking `get` only ever returns a message, so the only way out of
    /// this loop is termination of the domain.
    pub fn run(self) {
        loop {
            domain::note_stack_use();
            let msg = self.queue.get();
            log::info!("[consumer] got seq={} at {} ms", msg.seq, msg.ts_ms);
        }
    }
}
