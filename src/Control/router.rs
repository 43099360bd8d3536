//! Administrative command surface.
//!
//! The core registers name -> handler pairs; whoever owns the actual
//! console (a stdin loop, a test harness) feeds lines to `dispatch`. The
//! core has no dependency on any particular shell technology.

use std::sync::Arc;

use super::command::ConsoleError;
use crate::Core::state::RuntimeState;
use crate::Guard::domain::{self, DomainId};
use crate::MSGQ::Queue::Queue::MsgQueue;
use crate::Pipeline::timer::TimerHandle;

/// One administrative command.
pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn help(&self) -> &'static str;
    fn run(&self, args: &[&str]) -> Result<String, ConsoleError>;
}

/// Name -> handler registry.
#[derive(Default, Clone)]
pub struct CommandRouter {
    handlers: Vec<Arc<dyn CommandHandler>>,
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) {
        self.handlers.push(handler);
    }

    pub fn handlers(&self) -> impl Iterator<Item = &Arc<dyn CommandHandler>> {
        self.handlers.iter()
    }

    /// Route one console line. The first whitespace token picks the
    /// handler; the rest are its arguments.
    pub fn dispatch(&self, line: &str) -> Result<String, ConsoleError> {
        let mut parts = line.split_whitespace();
        let name = parts.next().ok_or(ConsoleError::EmptyLine)?;
        let args: Vec<&str> = parts.collect();
        let handler = self
            .handlers
            .iter()
            .find(|h| h.name() == name)
            .ok_or(ConsoleError::UnknownCommand)?;
        handler.run(&args)
    }
}

/// `status`: pure read of the period, the sequence counter, and the
/// isolated domain's stack margin. Safe concurrently with production.
pub struct StatusCmd {
    state: Arc<RuntimeState>,
    domain: DomainId,
}

impl StatusCmd {
    pub fn new(state: Arc<RuntimeState>, domain: DomainId) -> Self {
        Self { state, domain }
    }
}

impl CommandHandler for StatusCmd {
    fn name(&self) -> &'static str {
        "status"
    }

    fn help(&self) -> &'static str {
        "show current period, seq, and consumer stack margin"
    }

    fn run(&self, _args: &[&str]) -> Result<String, ConsoleError> {
        Ok(format!(
            "period={} ms, seq={}, stack_free={} bytes",
            self.state.period_ms(),
            self.state.seq(),
            domain::stack_margin(self.domain),
        ))
    }
}

/// `set_period <ms>`: validated reconfiguration. Updates the shared state
/// and re-arms the timer; never touches the sequence counter.
pub struct SetPeriodCmd {
    state: Arc<RuntimeState>,
    timer: TimerHandle,
}

impl SetPeriodCmd {
    pub fn new(state: Arc<RuntimeState>, timer: TimerHandle) -> Self {
        Self { state, timer }
    }
}

impl CommandHandler for SetPeriodCmd {
    fn name(&self) -> &'static str {
        "set_period"
    }

    fn help(&self) -> &'static str {
        "set production period in ms (10..10000)"
    }

    fn run(&self, args: &[&str]) -> Result<String, ConsoleError> {
        let raw = match args {
            [] => return Err(ConsoleError::MissingArgument("ms")),
            [raw] => *raw,
            _ => return Err(ConsoleError::UnexpectedArgument("ms")),
        };
        // parse::<u32> already rejects empty input and trailing garbage
        let ms: u32 = raw.parse().map_err(|_| ConsoleError::InvalidValue("ms"))?;
        self.state
            .set_period(ms)
            .map_err(|_| ConsoleError::InvalidValue("ms"))?;
        self.timer.restart(ms);
        Ok(format!("period set to {} ms", ms))
    }
}

/// `attack`: the demonstration that the grant table is enforced by fault.
/// Drops the calling thread into the isolated domain and pokes the secret
/// queue. The guard terminates the domain before `try_get` can return; the
/// reply below is the demonstration-failure path and unreachable in a
/// correct build.
pub struct AttackCmd {
    secret: Arc<MsgQueue>,
    domain: DomainId,
}

impl AttackCmd {
    pub fn new(secret: Arc<MsgQueue>, domain: DomainId) -> Self {
        Self { secret, domain }
    }
}

impl CommandHandler for AttackCmd {
    fn name(&self) -> &'static str {
        "attack"
    }

    fn help(&self) -> &'static str {
        "touch the ungranted secret queue (expect domain fault)"
    }

    fn run(&self, _args: &[&str]) -> Result<String, ConsoleError> {
        log::warn!(
            "attempting unauthorized access to {} from the isolated domain...",
            self.secret.name()
        );
        domain::enter_domain(self.domain);
        let rc = self.secret.try_get();
        Ok(format!(
            "unexpectedly returned rc={:?} (should not happen)",
            rc.map(|m| m.seq)
        ))
    }
}
