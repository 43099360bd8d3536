// Interactive administrative console over the command router.
//
// Usage: cargo run --example shell
//
//   counter> status
//   counter> set_period 50
//   counter> attack
//
// `attack` drops the console thread into the isolated domain and touches
// the secret queue; the guard terminates the domain, console included.
// That is the demonstration, not a bug.

use std::io::{self, BufRead, Write};

use dmxp_securecounter::Pipeline::SystemBuilder;

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let system = SystemBuilder::new().build()?;

    ctrlc::set_handler(|| {
        println!();
        std::process::exit(0);
    })
    .expect("Error setting Ctrl+C handler");

    println!("secure_counter (isolated consumer + guarded queues) starting...");
    println!("commands:");
    for h in system.router().handlers() {
        println!("  {:<12} {}", h.name(), h.help());
    }

    let stdin = io::stdin();
    loop {
        print!("counter> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match system.router().dispatch(line) {
            Ok(reply) => println!("{}", reply),
            Err(e) => eprintln!("error: {}", e),
        }
    }

    system.shutdown();
    Ok(())
}
