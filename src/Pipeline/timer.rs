//! Periodic tick source.
//!
//! Stands in for a hardware timer: the thread's only fire-path action is
//! submitting a work item. Reconfiguration arrives over the same mailbox
//! the thread sleeps on, so re-arming needs no shared period variable.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use super::worker::{Work, WorkSender};

enum TimerCtl {
    Restart(u32),
    Stop,
}

/// Re-arm handle, held by the `set_period` command.
pub struct TimerHandle {
    ctl: Mutex<Sender<TimerCtl>>,
}

impl TimerHandle {
    /// Apply a new interval from the next wait onward. The sequence
    /// counter is untouched.
    pub fn restart(&self, period_ms: u32) {
        let _ = self.ctl.lock().send(TimerCtl::Restart(period_ms));
    }
}

impl Clone for TimerHandle {
    fn clone(&self) -> Self {
        Self {
            ctl: Mutex::new(self.ctl.lock().clone()),
        }
    }
}

/// Owning handle for the timer thread.
pub struct TickTimer {
    ctl: Sender<TimerCtl>,
    thread: Option<JoinHandle<()>>,
}

impl TickTimer {
    /// Start firing every `period_ms`, submitting one `ProduceTick` per
    /// fire.
    pub fn start(period_ms: u32, work: WorkSender) -> io::Result<Self> {
        let (ctl, rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("tick_timer".into())
            .spawn(move || {
                let mut period = Duration::from_millis(u64::from(period_ms));
                loop {
                    match rx.recv_timeout(period) {
                        Err(RecvTimeoutError::Timeout) => work.submit(Work::ProduceTick),
                        Ok(TimerCtl::Restart(ms)) => {
                            log::debug!("[timer] re-armed at {} ms", ms);
                            period = Duration::from_millis(u64::from(ms));
                        }
                        Ok(TimerCtl::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })?;
        Ok(Self {
            ctl,
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> TimerHandle {
        TimerHandle {
            ctl: Mutex::new(self.ctl.clone()),
        }
    }

    /// Stop the timer and join its thread. Test/demo teardown only; the
    /// production loop otherwise runs for process lifetime.
    pub fn stop(&mut self) {
        let _ = self.ctl.send(TimerCtl::Stop);
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
