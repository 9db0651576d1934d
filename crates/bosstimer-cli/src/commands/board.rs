use bosstimer_core::{now_ms, remaining_human, BoardEntry, Readiness, RespawnBoard};

use super::{local_clock, open_tracker, CliResult};

pub fn run(json: bool) -> CliResult {
    let tracker = open_tracker()?;
    let board = tracker.board(now_ms())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&board)?);
    } else {
        print!("{}", render(&board, &tracker.mode().to_string()));
    }
    Ok(())
}

fn entry_line(entry: &BoardEntry, now_ms: i64) -> String {
    let marker = match entry.readiness {
        Readiness::Soon => "*",
        _ => " ",
    };
    let mut line = format!(
        "{marker} {:<20} {}  {}",
        entry.boss_name(),
        local_clock(entry.adjusted_next_ms),
        remaining_human(entry.adjusted_next_ms, now_ms)
    );
    if entry.skipped_cycles > 0 {
        line.push_str(&format!("  (skipped {})", entry.skipped_cycles));
    }
    line
}

/// Plain-text board: ready, then upcoming (soon marked `*`), then bosses
/// with no cut yet.
pub fn render(board: &RespawnBoard, mode: &str) -> String {
    let now = board.generated_at_ms;
    let mut out = format!("mode: {mode}   as of {}\n", local_clock(now));

    out.push_str("\nReady\n");
    let mut any = false;
    for entry in board.ready() {
        out.push_str(&entry_line(entry, now));
        out.push('\n');
        any = true;
    }
    if !any {
        out.push_str("  (none)\n");
    }

    out.push_str("\nUpcoming\n");
    any = false;
    for entry in board.upcoming() {
        out.push_str(&entry_line(entry, now));
        out.push('\n');
        any = true;
    }
    if !any {
        out.push_str("  (none)\n");
    }

    if !board.no_record.is_empty() {
        out.push_str("\nNo record\n");
        for boss in &board.no_record {
            out.push_str(&format!("  {}\n", boss.name));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bosstimer_core::{Boss, CutRecord};
    use chrono::{TimeZone, Utc};

    fn entry(name: &str, adjusted_next_ms: i64, readiness: Readiness, skipped: u64) -> BoardEntry {
        let t = Utc.timestamp_millis_opt(adjusted_next_ms).unwrap();
        BoardEntry {
            record: CutRecord {
                id: 1,
                boss_id: 1,
                boss_name: name.into(),
                cut_time: t,
                next_gen_time: t,
            },
            respawn_minutes: Some(60),
            adjusted_next_ms,
            skipped_cycles: skipped,
            readiness,
        }
    }

    #[test]
    fn render_groups_sections() {
        let now = 1_718_445_600_000;
        let board = RespawnBoard {
            generated_at_ms: now,
            entries: vec![
                entry("Kzarka", now - 60_000, Readiness::Ready, 2),
                entry("Nouver", now + 5 * 60_000, Readiness::Soon, 0),
            ],
            no_record: vec![Boss {
                id: 3,
                name: "Karanda".into(),
                respawn_minutes: 60,
                first_respawn_minutes: 0,
            }],
        };

        let text = render(&board, "normal");
        let ready = text.find("Ready").unwrap();
        let upcoming = text.find("Upcoming").unwrap();
        assert!(ready < text.find("Kzarka").unwrap());
        assert!(text.find("Kzarka").unwrap() < upcoming);
        assert!(text.contains("just respawned  (skipped 2)"));
        assert!(text.contains("* Nouver"));
        assert!(text.contains("5m left"));
        assert!(text.contains("No record\n  Karanda"));
    }

    #[test]
    fn render_empty_board() {
        let board = RespawnBoard {
            generated_at_ms: 0,
            entries: Vec::new(),
            no_record: Vec::new(),
        };
        let text = render(&board, "double");
        assert!(text.starts_with("mode: double"));
        assert_eq!(text.matches("(none)").count(), 2);
        assert!(!text.contains("No record"));
    }
}
