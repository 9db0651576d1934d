use std::path::PathBuf;

use bosstimer_core::storage::{open_store, Config, StoreBackend};
use bosstimer_core::{Boss, Database, RecordStore};
use clap::Subcommand;
use serde::Deserialize;

use super::CliResult;

#[derive(Subcommand)]
pub enum BossAction {
    /// List bosses
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add or replace a boss
    Add {
        #[arg(long)]
        name: String,
        /// Minutes between spawns
        #[arg(long)]
        respawn_minutes: u32,
        /// Minutes from server open to the first spawn
        #[arg(long, default_value = "0")]
        first_respawn_minutes: u32,
        /// Explicit id (defaults to the next free id)
        #[arg(long)]
        id: Option<i64>,
    },
    /// Remove a boss; its cut records are kept
    Remove { id: i64 },
    /// Import bosses from a TOML file with `[[boss]]` tables
    Import { file: PathBuf },
}

#[derive(Deserialize)]
struct BossFile {
    #[serde(default)]
    boss: Vec<Boss>,
}

fn local_database(config: &Config) -> Result<Database, Box<dyn std::error::Error>> {
    if config.store.backend != StoreBackend::Sqlite {
        return Err("boss maintenance needs the sqlite backend (store.backend = \"sqlite\")".into());
    }
    Ok(Database::open()?)
}

fn validate(boss: &Boss) -> Result<(), Box<dyn std::error::Error>> {
    if boss.name.trim().is_empty() {
        return Err("boss name must not be empty".into());
    }
    if boss.respawn_minutes == 0 {
        return Err(format!("{}: respawn minutes must be positive", boss.name).into());
    }
    Ok(())
}

pub fn run(action: BossAction) -> CliResult {
    let config = Config::load()?;

    match action {
        BossAction::List { json } => {
            let bosses = open_store(&config)?.list_bosses()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&bosses)?);
            } else if bosses.is_empty() {
                println!("no bosses");
            } else {
                for b in &bosses {
                    println!(
                        "{:>4}  {:<20} every {}m, first {}m after open",
                        b.id, b.name, b.respawn_minutes, b.first_respawn_minutes
                    );
                }
            }
        }
        BossAction::Add {
            name,
            respawn_minutes,
            first_respawn_minutes,
            id,
        } => {
            let db = local_database(&config)?;
            let id = match id {
                Some(id) => id,
                None => db.next_boss_id()?,
            };
            let boss = Boss {
                id,
                name: name.trim().to_string(),
                respawn_minutes,
                first_respawn_minutes,
            };
            validate(&boss)?;
            db.upsert_boss(&boss)?;
            println!("boss {} saved: {}", boss.id, boss.name);
        }
        BossAction::Remove { id } => {
            let db = local_database(&config)?;
            if db.remove_boss(id)? {
                println!("boss {id} removed");
            } else {
                return Err(format!("no boss with id {id}").into());
            }
        }
        BossAction::Import { file } => {
            let db = local_database(&config)?;
            let content = std::fs::read_to_string(&file)
                .map_err(|e| format!("cannot read {}: {e}", file.display()))?;
            let parsed: BossFile = toml::from_str(&content)?;
            for boss in &parsed.boss {
                validate(boss)?;
            }
            for boss in &parsed.boss {
                db.upsert_boss(boss)?;
            }
            tracing::info!(count = parsed.boss.len(), file = %file.display(), "imported bosses");
            println!("imported {} bosses", parsed.boss.len());
        }
    }
    Ok(())
}
