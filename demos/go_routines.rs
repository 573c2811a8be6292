//! Start one worker per message and keep `main` alive until all of them are done.
//!
//! Without the barrier `main` would return straight after spawning and take the
//! workers down with it.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::{debug, info};
use task_barrier::{Pending, TaskBarrier};

#[derive(Parser, Debug)]
#[command(about = "Run workers concurrently and wait for all of them")]
struct Args {
    /// One worker is started per message
    #[arg(default_values_t = vec!["Hello".to_string(), "World".to_string()])]
    messages: Vec<String>,

    /// How many times each worker prints its message
    #[arg(short, long, default_value_t = 3)]
    repeat: u32,

    /// Pause between prints, in milliseconds
    #[arg(short, long, default_value_t = 100)]
    delay_ms: u64,
}

fn say(message: String, repeat: u32, delay: Duration, pending: Pending<Arc<TaskBarrier>>) {
    // Signals the barrier however this function exits.
    let _pending = pending;
    for _ in 0..repeat {
        println!("{}", message);
        thread::sleep(delay);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let args = Args::parse();

    let n = u32::try_from(args.messages.len()).context("too many workers")?;
    let barrier = Arc::new(TaskBarrier::new(n));
    let delay = Duration::from_millis(args.delay_ms);
    info!("starting {} workers", n);

    for message in args.messages {
        let pending = Pending::new(Arc::clone(&barrier));
        thread::spawn(move || say(message, args.repeat, delay, pending));
    }

    println!("Waiting for workers to finish...");
    barrier.wait();
    debug!("{:?}", barrier);

    println!("All workers finished... Exiting.");
    Ok(())
}
