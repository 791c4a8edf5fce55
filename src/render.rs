// src/render.rs
//! Fixed-width server table and paced delivery to a sink.
//!
//! Output uses the game's `^N` colour codes: `^3` yellow, `^2` green,
//! `^4` blue, `^7` white.

use std::time::Duration;
use log::trace;
use crate::models::server::{PlayerRecord, ServerReport};
use crate::output::OutputSink;

const ADDRESS_WIDTH: usize = 24;
const NAME_WIDTH: usize = 38;
const MAP_WIDTH: usize = 12;
const STATE_WIDTH: usize = 11;

pub const FULL_MARKER: &str = "^3";
pub const ROOM_MARKER: &str = "^2";

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub batch_size: usize,
    pub delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            delay: DEFAULT_BATCH_DELAY,
        }
    }
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn row(address: &str, name: &str, map: &str, state: &str, players: &str) -> String {
    format!(
        "{:<aw$}|{:<nw$}|{:<mw$}|{:<sw$}|{}",
        address,
        truncate(name, NAME_WIDTH),
        truncate(map, MAP_WIDTH),
        truncate(state, STATE_WIDTH),
        players,
        aw = ADDRESS_WIDTH,
        nw = NAME_WIDTH,
        mw = MAP_WIDTH,
        sw = STATE_WIDTH,
    )
}

pub fn header() -> String {
    format!(
        "^3{}",
        row("Server Address", "Server Name", "Map", "Game State", "Players")
    )
}

pub fn players_column(report: &ServerReport) -> String {
    if report.max_players == 0 {
        return "-".to_string();
    }
    let marker = if report.players >= report.max_players as usize {
        FULL_MARKER
    } else {
        ROOM_MARKER
    };
    format!("{}{}/{}", marker, report.players, report.max_players)
}

pub fn format_player(player: &PlayerRecord) -> String {
    format!(
        "^7{} ^4(Time: {:.1}s, Score: {})",
        player.name, player.duration, player.score
    )
}

pub fn server_lines(report: &ServerReport) -> Vec<String> {
    let mut lines = vec![row(
        &report.address,
        &report.host_name,
        &report.map_name,
        &report.game_state,
        &players_column(report),
    )];

    if !report.player_list.is_empty() {
        let players: Vec<String> = report.player_list.iter().map(format_player).collect();
        lines.push(format!("^3Players: {}", players.join(", ")));
    }

    lines
}

pub fn render_report(reports: &[ServerReport]) -> Vec<String> {
    let mut lines = vec![header()];
    for report in reports {
        lines.extend(server_lines(report));
    }
    lines
}

/// Delivers `lines` one at a time, pausing after each full batch when more
/// lines follow.
pub async fn deliver_paced(sink: &dyn OutputSink, lines: &[String], pacing: Pacing) {
    let batch_size = pacing.batch_size.max(1);
    let mut batches = lines.chunks(batch_size).peekable();

    while let Some(batch) = batches.next() {
        for line in batch {
            sink.deliver(line);
        }
        if batch.len() == batch_size && batches.peek().is_some() {
            trace!("Delivered {} lines, pausing {:?}", batch_size, pacing.delay);
            tokio::time::sleep(pacing.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;

    fn report(players: usize, max_players: u32) -> ServerReport {
        ServerReport {
            address: "1.2.3.4:27960".to_string(),
            host_name: "Server".to_string(),
            map_name: "campgrounds".to_string(),
            players,
            max_players,
            game_state: "PRE_GAME".to_string(),
            player_list: Vec::new(),
            error: None,
        }
    }

    fn numbered(count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("line {}", i)).collect()
    }

    #[test]
    fn unknown_capacity_renders_dash() {
        assert_eq!(players_column(&report(0, 0)), "-");
        assert_eq!(players_column(&report(3, 0)), "-");
    }

    #[test]
    fn full_server_uses_full_marker() {
        assert_eq!(players_column(&report(16, 16)), "^316/16");
        assert_eq!(players_column(&report(17, 16)), "^317/16");
    }

    #[test]
    fn server_with_room_uses_room_marker() {
        assert_eq!(players_column(&report(3, 16)), "^23/16");
    }

    #[test]
    fn row_columns_are_fixed_width() {
        let line = server_lines(&report(3, 16)).remove(0);
        let columns: Vec<&str> = line.split('|').collect();
        assert_eq!(columns[0].len(), 24);
        assert_eq!(columns[1].len(), 38);
        assert_eq!(columns[2].len(), 12);
        assert_eq!(columns[3].len(), 11);
        assert_eq!(columns[4], "^23/16");
    }

    #[test]
    fn long_fields_are_truncated() {
        let mut long = report(0, 0);
        long.host_name = "N".repeat(50);
        long.map_name = "overkill_tournament".to_string();
        long.game_state = "COUNT_DOWN_LONG".to_string();

        let line = server_lines(&long).remove(0);
        let columns: Vec<&str> = line.split('|').collect();
        assert_eq!(columns[1], "N".repeat(38));
        assert_eq!(columns[2], "overkill_tou");
        assert_eq!(columns[3], "COUNT_DOWN_");
    }

    #[test]
    fn header_line() {
        assert!(header().starts_with("^3Server Address          |Server Name"));
        assert!(header().ends_with("|Players"));
    }

    #[test]
    fn player_line_keeps_server_order() {
        let mut full = report(2, 8);
        full.player_list = vec![
            PlayerRecord { name: "zeta".into(), score: 30, duration: 90.0 },
            PlayerRecord { name: "alpha".into(), score: -1, duration: 12.34 },
        ];

        let lines = server_lines(&full);
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "^3Players: ^7zeta ^4(Time: 90.0s, Score: 30), ^7alpha ^4(Time: 12.3s, Score: -1)"
        );
    }

    #[test]
    fn empty_server_has_no_player_line() {
        assert_eq!(server_lines(&report(0, 8)).len(), 1);
    }

    #[test]
    fn report_starts_with_header() {
        let lines = render_report(&[report(1, 8), report(0, 0)]);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], header());
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_after_every_full_batch() {
        let sink = MemorySink::new();
        let lines = numbered(25);

        let start = tokio::time::Instant::now();
        deliver_paced(&sink, &lines, Pacing::default()).await;

        assert_eq!(sink.lines(), lines);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn no_pause_after_last_batch() {
        let sink = MemorySink::new();
        let start = tokio::time::Instant::now();
        deliver_paced(&sink, &numbered(10), Pacing::default()).await;

        assert_eq!(sink.lines().len(), 10);
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
