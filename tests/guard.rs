// Grant enforcement matrix: trusted context passes, granted domains pass,
// everything else dies by fault. Violating threads are observed through
// their join handles; a fault must never surface as a return value.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use dmxp_securecounter::Guard::domain;
use dmxp_securecounter::Guard::{create_domain, spawn_in_domain, GrantTable};
use dmxp_securecounter::MSGQ::Queue::MsgQueue;
use dmxp_securecounter::MSGQ::Structs::Msg;

const STACK: usize = 128 * 1024;

fn msg(seq: u32) -> Msg {
    Msg { seq, ts_ms: 0 }
}

#[test]
fn trusted_context_is_not_subject_to_grants() {
    // No table bound at all; a thread in no domain may still do anything.
    let q = MsgQueue::new("g_trusted", 1).unwrap();
    q.put(msg(1)).unwrap();
    assert_eq!(q.try_get().unwrap().seq, 1);
}

#[test]
fn granted_domain_passes() {
    let q = Arc::new(MsgQueue::new("g_granted", 16).unwrap());
    let d = create_domain("g_granted_dom", STACK);
    q.bind_grants(GrantTable::builder().allow(d, q.id()).seal())
        .unwrap();

    q.put(msg(9)).unwrap();

    let got = Arc::new(AtomicU32::new(0));
    let handle = {
        let q = Arc::clone(&q);
        let got = Arc::clone(&got);
        spawn_in_domain(d, "g_granted_thr", move || {
            got.store(q.get().seq, Ordering::SeqCst);
        })
        .unwrap()
    };

    handle.join().unwrap();
    assert_eq!(got.load(Ordering::SeqCst), 9);
    assert!(!domain::is_faulted(d));
}

#[test]
fn ungranted_access_faults_the_domain() {
    let public = Arc::new(MsgQueue::new("g_pub", 16).unwrap());
    let secret = Arc::new(MsgQueue::new("g_secret", 1).unwrap());
    let d = create_domain("g_attacker", STACK);

    let table = GrantTable::builder().allow(d, public.id()).seal();
    public.bind_grants(Arc::clone(&table)).unwrap();
    secret.bind_grants(table).unwrap();

    // The flag distinguishes "thread died inside try_get" from "try_get
    // returned and the thread died later".
    let returned = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let handle = {
        let secret = Arc::clone(&secret);
        let returned = Arc::clone(&returned);
        spawn_in_domain(d, "g_attacker_thr", move || {
            let _ = secret.try_get();
            returned.store(true, Ordering::SeqCst);
        })
        .unwrap()
    };

    assert!(
        handle.join().is_err(),
        "violating thread must die, not return"
    );
    assert!(
        !returned.load(Ordering::SeqCst),
        "ungranted try_get must never return a value"
    );
    assert!(domain::is_faulted(d));
}

#[test]
fn unbound_queue_denies_isolated_access() {
    let q = Arc::new(MsgQueue::new("g_unbound", 1).unwrap());
    let d = create_domain("g_unbound_dom", STACK);

    let handle = {
        let q = Arc::clone(&q);
        spawn_in_domain(d, "g_unbound_thr", move || {
            let _ = q.try_get();
        })
        .unwrap()
    };

    assert!(handle.join().is_err());
    assert!(domain::is_faulted(d));
}

#[test]
fn grant_binding_is_write_once() {
    let q = MsgQueue::new("g_once", 1).unwrap();
    let d = create_domain("g_once_dom", STACK);

    q.bind_grants(GrantTable::builder().allow(d, q.id()).seal())
        .unwrap();
    let err = q.bind_grants(GrantTable::builder().seal()).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
}

#[test]
fn fault_terminates_blocked_sibling_threads() {
    let public = Arc::new(MsgQueue::new("g_sib_pub", 16).unwrap());
    let secret = Arc::new(MsgQueue::new("g_sib_secret", 1).unwrap());
    let d = create_domain("g_siblings", STACK);

    let table = GrantTable::builder().allow(d, public.id()).seal();
    public.bind_grants(Arc::clone(&table)).unwrap();
    secret.bind_grants(table).unwrap();

    // Sibling A blocks on the granted public queue.
    let drained = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let blocked = {
        let public = Arc::clone(&public);
        let drained = Arc::clone(&drained);
        spawn_in_domain(d, "g_sib_consumer", move || {
            let _ = public.get();
            drained.store(true, Ordering::SeqCst);
        })
        .unwrap()
    };
    thread::sleep(Duration::from_millis(50));

    // Sibling B violates the grant table and faults the whole domain.
    let attacker = {
        let secret = Arc::clone(&secret);
        spawn_in_domain(d, "g_sib_attacker", move || {
            let _ = secret.try_get();
        })
        .unwrap()
    };
    assert!(attacker.join().is_err());
    assert!(domain::is_faulted(d));

    // The next publication wakes sibling A, whose access re-check now
    // kills it before it can drain the message.
    public.put(msg(1)).unwrap();
    assert!(blocked.join().is_err());
    assert!(
        !drained.load(Ordering::SeqCst),
        "faulted consumer must not drain the queue"
    );
    assert_eq!(public.try_get().map(|m| m.seq), Some(1));
}

#[test]
fn stack_margin_is_positive_and_bounded() {
    let d = create_domain("g_stack", STACK);
    let handle = spawn_in_domain(d, "g_stack_thr", || {
        domain::note_stack_use();
    })
    .unwrap();
    handle.join().unwrap();

    let margin = domain::stack_margin(d);
    assert!(margin > 0 && margin <= STACK, "margin {margin} out of range");
}
