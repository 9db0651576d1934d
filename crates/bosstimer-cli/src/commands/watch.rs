use std::thread;
use std::time::Duration;

use bosstimer_core::now_ms;
use bosstimer_core::storage::Config;
use clap::Args;

use super::{board::render, open_tracker_with, CliResult};

#[derive(Args)]
pub struct WatchArgs {
    /// Seconds between refreshes (defaults to tracker.refresh_secs)
    #[arg(long)]
    pub interval_secs: Option<u64>,
    /// Stop after this many refreshes
    #[arg(long)]
    pub count: Option<u32>,
}

/// Reload from the store and redraw whenever the ticker fires, so cuts made
/// by other operators show up.
pub fn run(args: WatchArgs) -> CliResult {
    let mut config = Config::load()?;
    if let Some(secs) = args.interval_secs {
        config.tracker.refresh_secs = secs;
    }

    let mut tracker = open_tracker_with(&config)?;
    let mut ticker = tracker.settings().ticker();
    let mut drawn = 0u32;

    loop {
        let now = now_ms();
        if ticker.poll(now) {
            if drawn > 0 {
                if let Err(e) = tracker.load() {
                    tracing::warn!(error = %e, "refresh failed, showing cached board");
                }
            }
            let board = tracker.board(now)?;
            println!("{}", render(&board, &tracker.mode().to_string()));
            drawn += 1;
            if args.count.is_some_and(|limit| drawn >= limit) {
                return Ok(());
            }
        }

        let wait = ticker.until_next_ms(now_ms()).unwrap_or(ticker.cadence_ms());
        thread::sleep(Duration::from_millis(wait.max(50) as u64));
    }
}
