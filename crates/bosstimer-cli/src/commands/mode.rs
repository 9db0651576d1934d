use clap::Subcommand;

use super::{open_tracker, CliResult};

#[derive(Subcommand)]
pub enum ModeAction {
    /// Print the current event mode
    Show {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: ModeAction) -> CliResult {
    let tracker = open_tracker()?;
    let mode = tracker.mode();

    match action {
        ModeAction::Show { json } => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "mode": mode,
                        "is_double_event": mode.is_double_event(),
                        "multiplier": mode.multiplier(),
                    })
                );
            } else {
                println!("{mode} (interval x{})", mode.multiplier());
            }
        }
    }
    Ok(())
}
