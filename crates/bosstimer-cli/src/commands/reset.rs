use bosstimer_core::{resolve_server_open, EventMode, ResetRequest};
use chrono::Local;
use clap::Args;

use super::{local_clock, log_events, open_tracker, CliResult};

#[derive(Args)]
pub struct ResetArgs {
    /// Event mode after the reset: normal or double
    #[arg(long)]
    pub mode: EventMode,
    /// Seed first-cycle records from this server-open time (HH:MM, local)
    #[arg(long)]
    pub server_open: Option<String>,
    /// Confirm deleting every cut record
    #[arg(long)]
    pub yes: bool,
}

pub fn run(args: ResetArgs) -> CliResult {
    if !args.yes {
        return Err("reset deletes every cut record; pass --yes to confirm".into());
    }

    let server_open_ms = match &args.server_open {
        Some(clock) => Some(resolve_server_open(clock, &Local::now())?),
        None => None,
    };

    let mut tracker = open_tracker()?;
    let result = tracker.reset_all(ResetRequest {
        mode: args.mode,
        server_open_ms,
    });
    log_events(&mut tracker);
    let summary = result?;

    println!(
        "deleted {} records, mode {}",
        summary.deleted, summary.mode
    );
    if let Some(open_ms) = server_open_ms {
        println!(
            "seeded {} first-cycle records from server open {}",
            summary.seeded,
            local_clock(open_ms)
        );
    }
    Ok(())
}
