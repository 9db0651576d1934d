use bosstimer_core::now_ms;
use chrono::Local;
use clap::Subcommand;

use super::{local_clock, log_events, open_tracker, CliResult};

#[derive(Subcommand)]
pub enum CutAction {
    /// The boss was cut just now
    Now {
        /// Boss id or name
        boss: String,
    },
    /// The boss was cut earlier today at HH MM (local time)
    At {
        /// Boss id or name
        boss: String,
        hour: String,
        minute: String,
    },
}

pub fn run(action: CutAction) -> CliResult {
    let mut tracker = open_tracker()?;

    let record = match action {
        CutAction::Now { boss } => {
            let boss_id = tracker.resolve_boss(&boss)?.id;
            tracker.cut_now(boss_id, now_ms())?
        }
        CutAction::At { boss, hour, minute } => {
            let boss_id = tracker.resolve_boss(&boss)?.id;
            tracker.cut_at(boss_id, &hour, &minute, &Local::now())?
        }
    };
    log_events(&mut tracker);

    println!(
        "{} cut at {}, next spawn {}",
        record.boss_name,
        local_clock(record.cut_ms()),
        local_clock(record.next_gen_ms())
    );
    Ok(())
}
