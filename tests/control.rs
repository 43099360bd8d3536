// Administrative surface scenarios, end-to-end over a built System.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serial_test::serial;

use dmxp_securecounter::Guard::domain;
use dmxp_securecounter::Pipeline::SystemBuilder;

#[test]
#[serial]
fn boot_status_shows_defaults() {
    let system = SystemBuilder::new().build().unwrap();

    // Dispatched well before the first 100 ms tick.
    let reply = system.router().dispatch("status").unwrap();
    assert!(
        reply.starts_with("period=100 ms, seq=0, stack_free="),
        "unexpected status: {reply}"
    );

    let bytes: usize = reply
        .rsplit("stack_free=")
        .next()
        .unwrap()
        .trim_end_matches(" bytes")
        .parse()
        .unwrap();
    assert!(bytes > 0);

    system.shutdown();
}

#[test]
#[serial]
fn set_period_scenario_advances_about_twenty_ticks_per_second() {
    let system = SystemBuilder::new().build().unwrap();

    let reply = system.router().dispatch("set_period 50").unwrap();
    assert_eq!(reply, "period set to 50 ms");

    let base = system.state().seq();
    thread::sleep(Duration::from_millis(1000));
    let advanced = system.state().seq() - base;
    assert!(
        (15..=25).contains(&advanced),
        "expected ~20 ticks, saw {advanced}"
    );

    system.shutdown();
}

#[test]
#[serial]
fn set_period_rejects_bad_input_without_state_change() {
    // A long period keeps seq at 0 for the whole test, so the full status
    // line doubles as the state snapshot.
    let system = SystemBuilder::new().with_period_ms(10_000).build().unwrap();
    thread::sleep(Duration::from_millis(50)); // let the consumer settle at its block point

    let before = system.router().dispatch("status").unwrap();

    for bad in [
        "set_period",
        "set_period abc",
        "set_period 5",
        "set_period 9",
        "set_period 10001",
        "set_period 20000",
        "set_period 50x",
        "set_period 50 extra",
        "set_period -50",
    ] {
        assert!(
            system.router().dispatch(bad).is_err(),
            "{bad:?} should be rejected"
        );
    }

    let after = system.router().dispatch("status").unwrap();
    assert_eq!(before, after, "rejected commands must not change state");

    // Boundary values are accepted.
    assert_eq!(
        system.router().dispatch("set_period 10").unwrap(),
        "period set to 10 ms"
    );
    assert_eq!(
        system.router().dispatch("set_period 10000").unwrap(),
        "period set to 10000 ms"
    );

    system.shutdown();
}

#[test]
#[serial]
fn unknown_and_empty_commands_are_rejected() {
    let system = SystemBuilder::new().with_period_ms(10_000).build().unwrap();
    assert!(system.router().dispatch("reboot").is_err());
    assert!(system.router().dispatch("").is_err());
    assert!(system.router().dispatch("   ").is_err());
    system.shutdown();
}

#[test]
#[serial]
fn attack_faults_the_domain_and_silences_the_consumer() {
    let system = SystemBuilder::new().with_period_ms(50).build().unwrap();

    thread::sleep(Duration::from_millis(120)); // a tick or two of normal delivery
    assert!(system.consumer_is_running());

    // Dispatch from a disposable thread: the attack drops that thread into
    // the isolated domain and the guard kills it there.
    let router = system.router().clone();
    let attacker = thread::spawn(move || router.dispatch("attack"));
    assert!(
        attacker.join().is_err(),
        "attack must never return a value to its caller"
    );
    assert!(domain::is_faulted(system.consumer_domain()));

    // The ticks keep coming; the next one wakes the blocked consumer and
    // the guard's re-check terminates it.
    let deadline = Instant::now() + Duration::from_secs(2);
    while system.consumer_is_running() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert!(
        !system.consumer_is_running(),
        "consumer must terminate after the domain fault"
    );

    // The trusted control surface is unaffected.
    assert!(system.router().dispatch("status").is_ok());

    // Production continues; with no consumer the queue fills and the drop
    // policy takes over (seq keeps advancing).
    let seq_a = system.state().seq();
    thread::sleep(Duration::from_millis(200));
    assert!(system.state().seq() > seq_a);

    system.shutdown();
}

// Router registration is open: a collaborator can add its own commands
// next to the core's three.
#[test]
#[serial]
fn router_accepts_external_handlers() {
    use dmxp_securecounter::Control::{CommandHandler, ConsoleError};

    struct PingCmd;
    impl CommandHandler for PingCmd {
        fn name(&self) -> &'static str {
            "ping"
        }
        fn help(&self) -> &'static str {
            "reply pong"
        }
        fn run(&self, _args: &[&str]) -> Result<String, ConsoleError> {
            Ok("pong".into())
        }
    }

    let mut router = dmxp_securecounter::Control::CommandRouter::new();
    router.register(Arc::new(PingCmd));
    assert_eq!(router.dispatch("ping").unwrap(), "pong");
}
