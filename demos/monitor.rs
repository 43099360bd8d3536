// Headless run: brings the pipeline up and logs a liveness line every
// five seconds while the consumer's delivery records stream at info level.
//
// Usage: cargo run --example monitor [period_ms]

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dmxp_securecounter::Pipeline::SystemBuilder;

fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let period_ms = if args.len() > 1 {
        args[1].parse().unwrap_or(100)
    } else {
        100
    };

    let system = SystemBuilder::new().with_period_ms(period_ms).build()?;

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_secs(5));
        log::info!(
            "main alive, seq={}, period={} ms",
            system.state().seq(),
            system.state().period_ms()
        );
    }

    system.shutdown();
    Ok(())
}
