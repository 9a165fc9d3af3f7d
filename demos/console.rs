//! Console demo: a ticking counter gated by `pause` / `play` typed on stdin.
//!
//! Run with `cargo run --example console`, then type:
//! - `pause`  stop printing, keep counting in the background
//! - `play`   print everything missed, then continue live
//! - `stats`  print relay statistics as JSON
//! - `q`      quit
//!
//! Set `RUST_LOG=pausable_relay=debug` to watch the relay's transitions.

use crossbeam_channel::{bounded, select, tick, Receiver};
use pausable_relay::{observer, pausable, subject, Notification, Publisher};
use std::io::{self, BufRead};
use std::thread;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Demo configuration.
#[derive(Clone, Debug)]
struct DemoConfig {
    /// Interval between produced values.
    tick: Duration,
    pause_command: &'static str,
    play_command: &'static str,
    stats_command: &'static str,
    quit_command: &'static str,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            pause_command: "pause",
            play_command: "play",
            stats_command: "stats",
            quit_command: "q",
        }
    }
}

/// Emit 0, 1, 2, ... on every tick until `cancel` fires or the subject closes.
fn spawn_producer(
    items: Publisher<u64>,
    interval: Duration,
    cancel: Receiver<()>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let ticker = tick(interval);
        let mut i = 0u64;
        loop {
            select! {
                recv(cancel) -> _ => break,
                recv(ticker) -> _ => {
                    if items.next(i).is_err() {
                        break;
                    }
                    i += 1;
                }
            }
        }
        let _ = items.complete();
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = DemoConfig::default();
    let (items, source) = subject::<u64>();
    let (manager, control) = subject::<bool>();

    let printer = observer::from_fn(|n: Notification<u64>| match n {
        Notification::Next(value) => println!("received {value}"),
        Notification::Error(error) => println!("failed: {error}"),
        Notification::Completed => println!("done"),
    });
    let relay = pausable(source, control).subscribe_handle(printer);

    let (cancel_tx, cancel_rx) = bounded(1);
    let producer = spawn_producer(items, config.tick, cancel_rx);
    info!(tick_ms = config.tick.as_millis() as u64, "producer started");

    for line in io::stdin().lock().lines() {
        let line = line?;
        let command = line.trim();
        if command == config.quit_command {
            break;
        } else if command == config.pause_command {
            manager.next(true)?;
        } else if command == config.play_command {
            manager.next(false)?;
        } else if command == config.stats_command {
            println!("{}", serde_json::to_string_pretty(&relay.stats())?);
        }
    }

    let _ = cancel_tx.send(());
    let _ = producer.join();
    relay.unsubscribe();
    Ok(())
}
