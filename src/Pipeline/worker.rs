//! Deferred production work.
//!
//! The timer's fire path never touches a queue. It hands a work item to
//! this module's queue and the trusted worker thread does the actual
//! production, the same split an interrupt handler makes when it defers to
//! a work queue.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::Core::state::{uptime_ms, RuntimeState};
use crate::MSGQ::Queue::Queue::MsgQueue;
use crate::MSGQ::Structs::Queue_Structs::Msg;

/// Units of trusted work deferred out of the timer's fire path.
pub enum Work {
    ProduceTick,
}

/// Submission side of the work queue. Submitting never blocks.
#[derive(Clone)]
pub struct WorkSender(Sender<Work>);

impl WorkSender {
    pub fn submit(&self, work: Work) {
        // A dropped receiver means shutdown is underway; the tick is
        // simply discarded.
        let _ = self.0.send(work);
    }
}

/// Spawn the trusted worker thread. It exits when every `WorkSender` is
/// gone.
pub fn spawn_worker(
    state: Arc<RuntimeState>,
    public: Arc<MsgQueue>,
) -> io::Result<(WorkSender, JoinHandle<()>)> {
    let (tx, rx): (Sender<Work>, Receiver<Work>) = mpsc::channel();
    let handle = thread::Builder::new()
        .name("producer_work".into())
        .spawn(move || {
            for work in rx {
                match work {
                    Work::ProduceTick => produce_tick(&state, &public),
                }
            }
        })?;
    Ok((WorkSender(tx), handle))
}

/// One production tick: claim the next sequence number, stamp it, offer it
/// to the public queue. A full queue is the backpressure policy, not an
/// error: the message is dropped and a warning recorded.
pub fn produce_tick(state: &RuntimeState, public: &MsgQueue) {
    let msg = Msg {
        seq: state.next_seq(),
        ts_ms: uptime_ms(),
    };
    if let Err(e) = public.put(msg) {
        debug_assert_eq!(e.kind(), io::ErrorKind::WouldBlock);
        log::warn!("{} full; dropped seq={}", public.name(), msg.seq);
    }
}
