//! Domain registry and protection layer.
//!
//! An isolated domain is a set of threads with restricted access to the
//! message queues. Membership is a one-way door: `enter_domain` drops the
//! calling thread into a domain and nothing brings it back out. Every
//! queue operation funnels through [`check_access`]; a violation does not
//! produce an error value, it terminates the whole domain.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use lazy_static::lazy_static;
use parking_lot::RwLock;

use crate::Guard::grant::GrantTable;
use crate::MSGQ::Structs::Queue_Structs::ChannelId;

/// Identifier of an isolated domain. Trusted context has no id: a thread
/// that never entered a domain passes every access check.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DomainId(pub u16);

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "domain {}", self.0)
    }
}

/// Unwind payload carried by a privilege fault. Nothing outside the spawn
/// supervisor should ever see this; it exists so the supervisor can tell a
/// fault from an ordinary panic.
#[derive(Debug, Clone, Copy)]
pub struct DomainFault {
    pub domain: DomainId,
    pub resource: ChannelId,
}

const STATE_RUNNING: u8 = 0;
const STATE_FAULTED: u8 = 1;

struct DomainCell {
    name: &'static str,
    stack_size: usize,
    state: AtomicU8,
    stack_high_water: AtomicUsize,
}

#[derive(Default)]
struct Registry {
    domains: RwLock<Vec<Arc<DomainCell>>>,
    members: RwLock<HashMap<ThreadId, DomainId>>,
}

lazy_static! {
    static ref REGISTRY: Registry = Registry::default();
}

thread_local! {
    // Stack base recorded when the thread enters a domain, for the
    // high-water estimate. 0 = trusted thread, never sampled.
    static STACK_BASE: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Register a new isolated domain. `stack_size` is the stack given to
/// threads spawned into it and the baseline for the stack margin report.
pub fn create_domain(name: &'static str, stack_size: usize) -> DomainId {
    let mut domains = REGISTRY.domains.write();
    let id = DomainId(domains.len() as u16);
    domains.push(Arc::new(DomainCell {
        name,
        stack_size,
        state: AtomicU8::new(STATE_RUNNING),
        stack_high_water: AtomicUsize::new(0),
    }));
    log::debug!(
        "[guard] registered {} ('{}', stack {} bytes)",
        id,
        name,
        stack_size
    );
    id
}

fn cell(id: DomainId) -> Arc<DomainCell> {
    REGISTRY
        .domains
        .read()
        .get(id.0 as usize)
        .cloned()
        .expect("unknown domain id")
}

/// Drop the current thread into an isolated domain. One-way: there is no
/// API to leave a domain or rejoin trusted context.
pub fn enter_domain(id: DomainId) {
    let _ = cell(id); // validate the id before recording membership
    let tid = thread::current().id();
    let mut members = REGISTRY.members.write();
    assert!(
        !members.contains_key(&tid),
        "thread is already in an isolated domain"
    );
    members.insert(tid, id);
    drop(members);

    let probe = 0u8;
    STACK_BASE.with(|b| b.set(&probe as *const u8 as usize));
}

/// Domain of the calling thread; `None` in trusted context.
pub fn current_domain() -> Option<DomainId> {
    REGISTRY
        .members
        .read()
        .get(&thread::current().id())
        .copied()
}

pub fn domain_name(id: DomainId) -> &'static str {
    cell(id).name
}

pub fn is_faulted(id: DomainId) -> bool {
    cell(id).state.load(Ordering::Acquire) == STATE_FAULTED
}

/// Record the current stack depth of an isolated thread into its domain's
/// high-water mark. No-op in trusted context. Stacks grow downward on
/// every platform this crate targets.
pub fn note_stack_use() {
    let base = STACK_BASE.with(|b| b.get());
    if base == 0 {
        return;
    }
    let Some(id) = current_domain() else { return };
    let probe = 0u8;
    let depth = base.saturating_sub(&probe as *const u8 as usize);
    cell(id).stack_high_water.fetch_max(depth, Ordering::Relaxed);
}

/// Estimated free stack for the domain's threads: configured stack size
/// minus the deepest use observed so far.
pub fn stack_margin(id: DomainId) -> usize {
    let cell = cell(id);
    cell.stack_size
        .saturating_sub(cell.stack_high_water.load(Ordering::Relaxed))
}

/// Spawn a thread inside `domain`, with the domain's configured stack
/// size. The wrapper observes a fault unwinding out of `f` and records the
/// domain's termination; any other panic is propagated unchanged.
pub fn spawn_in_domain<F>(domain: DomainId, thread_name: &str, f: F) -> io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    let stack_size = cell(domain).stack_size;
    thread::Builder::new()
        .name(thread_name.to_string())
        .stack_size(stack_size)
        .spawn(move || {
            enter_domain(domain);
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
                match payload.downcast::<DomainFault>() {
                    Ok(fault) => {
                        log::error!(
                            "[guard] {} ('{}') terminated by fault on {}",
                            fault.domain,
                            domain_name(fault.domain),
                            fault.resource
                        );
                        // Re-raise so the join handle reports the death.
                        panic::resume_unwind(fault);
                    }
                    Err(other) => panic::resume_unwind(other),
                }
            }
        })
}

/// Terminal privilege fault: marks the domain faulted and unwinds the
/// calling thread with a [`DomainFault`] payload. Never returns; the
/// violating caller cannot observe it as a value.
pub(crate) fn fault(domain: DomainId, resource: ChannelId, resource_name: &'static str) -> ! {
    let cell = cell(domain);
    cell.state.store(STATE_FAULTED, Ordering::Release);
    log::error!(
        "[guard] FATAL: {} ('{}') touched ungranted {} ('{}'); terminating domain",
        domain,
        cell.name,
        resource,
        resource_name
    );
    // resume_unwind skips the panic hook: the record above is the fatal
    // report, the unwind is only the termination mechanism.
    panic::resume_unwind(Box::new(DomainFault { domain, resource }))
}

/// Gate for every queue operation. Trusted context passes; a live isolated
/// caller passes iff the bound table grants it this queue; anything else
/// terminates the caller's domain.
pub(crate) fn check_access(
    resource: ChannelId,
    resource_name: &'static str,
    grants: Option<&GrantTable>,
) {
    let Some(id) = current_domain() else { return };
    let cell = cell(id);
    if cell.state.load(Ordering::Acquire) == STATE_FAULTED {
        // A faulted domain is terminal: any thread still running in it
        // dies at its next guarded operation.
        panic::resume_unwind(Box::new(DomainFault {
            domain: id,
            resource,
        }));
    }
    match grants {
        Some(table) if table.allows(id, resource) => {}
        _ => fault(id, resource, resource_name),
    }
}
