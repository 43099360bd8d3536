//! Boot path: wires queues, grants, domains, worker, consumer, timer, and
//! the command surface into a running system.

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use super::consumer::ConsumerTask;
use super::timer::TickTimer;
use super::worker;
use crate::Control::router::{AttackCmd, CommandRouter, SetPeriodCmd, StatusCmd};
use crate::Core::state::{uptime_ms, RuntimeState, PERIOD_DEFAULT_MS, PERIOD_MAX_MS, PERIOD_MIN_MS};
use crate::Guard::domain::{self, DomainId};
use crate::Guard::grant::GrantTable;
use crate::MSGQ::Queue::Queue::MsgQueue;

/// Slot count of the public queue.
pub const PUBLIC_CAPACITY: usize = 16;
/// Slot count of the secret queue.
pub const SECRET_CAPACITY: usize = 1;
/// Default stack handed to consumer threads.
pub const CONSUMER_STACK_SIZE: usize = 128 * 1024;

pub struct SystemBuilder {
    period_ms: u32,
    consumer_stack: usize,
}

impl Default for SystemBuilder {
    fn default() -> Self {
        Self {
            period_ms: PERIOD_DEFAULT_MS,
            consumer_stack: CONSUMER_STACK_SIZE,
        }
    }
}

impl SystemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_period_ms(mut self, period_ms: u32) -> Self {
        self.period_ms = period_ms;
        self
    }

    pub fn with_consumer_stack(mut self, bytes: usize) -> Self {
        self.consumer_stack = bytes;
        self
    }

    /// Bring the pipeline up. Grants are sealed and bound before the
    /// isolated consumer starts; the timer is armed last.
    pub fn build(self) -> io::Result<System> {
        if !(PERIOD_MIN_MS..=PERIOD_MAX_MS).contains(&self.period_ms) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "period out of range (10..10000 ms)",
            ));
        }
        let _ = uptime_ms(); // pin the uptime zero point to boot

        let state = Arc::new(RuntimeState::new(self.period_ms));
        let public = Arc::new(MsgQueue::new("counter_q", PUBLIC_CAPACITY)?);
        let secret = Arc::new(MsgQueue::new("secret_q", SECRET_CAPACITY)?);

        let consumer_domain = domain::create_domain("consumer_user", self.consumer_stack);

        // The isolated domain gets the public queue and nothing else. The
        // secret queue is bound to the same table, which simply carries no
        // entry for it.
        let grants = GrantTable::builder()
            .allow(consumer_domain, public.id())
            .seal();
        public.bind_grants(Arc::clone(&grants))?;
        secret.bind_grants(Arc::clone(&grants))?;

        let (work, worker) = worker::spawn_worker(Arc::clone(&state), Arc::clone(&public))?;

        let task = ConsumerTask::new(Arc::clone(&public));
        let consumer = domain::spawn_in_domain(consumer_domain, "consumer_user", move || {
            task.run()
        })?;

        let timer = TickTimer::start(self.period_ms, work)?;

        let mut router = CommandRouter::new();
        router.register(Arc::new(StatusCmd::new(
            Arc::clone(&state),
            consumer_domain,
        )));
        router.register(Arc::new(SetPeriodCmd::new(
            Arc::clone(&state),
            timer.handle(),
        )));
        router.register(Arc::new(AttackCmd::new(
            Arc::clone(&secret),
            consumer_domain,
        )));

        log::info!("secure_counter pipeline up (period {} ms)", self.period_ms);

        Ok(System {
            state,
            public,
            secret,
            timer,
            worker: Some(worker),
            consumer,
            consumer_domain,
            router,
        })
    }
}

/// A running pipeline plus its administrative surface.
pub struct System {
    state: Arc<RuntimeState>,
    public: Arc<MsgQueue>,
    secret: Arc<MsgQueue>,
    timer: TickTimer,
    worker: Option<JoinHandle<()>>,
    consumer: JoinHandle<()>,
    consumer_domain: DomainId,
    router: CommandRouter,
}

impl System {
    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    pub fn state(&self) -> &RuntimeState {
        &self.state
    }

    pub fn public(&self) -> &Arc<MsgQueue> {
        &self.public
    }

    pub fn secret(&self) -> &Arc<MsgQueue> {
        &self.secret
    }

    pub fn consumer_domain(&self) -> DomainId {
        self.consumer_domain
    }

    /// True while the isolated consumer thread is alive.
    pub fn consumer_is_running(&self) -> bool {
        !self.consumer.is_finished()
    }

    /// Stop the timer and worker. The consumer has no cancellation point
    /// (blocking get, no timeout, by design) and ends with the process.
    pub fn shutdown(mut self) {
        self.timer.stop();
        // Timer gone -> its WorkSender dropped -> the worker's queue
        // disconnects and the loop ends.
        if let Some(w) = self.worker.take() {
            let _ = w.join();
        }
    }
}
