//! Command formatting for the game harness.
//!
//! Each turn the bot prints exactly two lines: movement orders as
//! `unitCount sourceZoneId destZoneId` triples, then spawn orders as
//! `unitCount zoneId` pairs, space-joined. An empty command list is
//! the literal token `WAIT`.

use std::fmt::Write;

use dominion_core::allocator::{MoveOrder, SpawnOrder};

/// The empty-command-list token.
const WAIT: &str = "WAIT";

/// Format the movement command line.
#[must_use]
pub fn format_moves(moves: &[MoveOrder]) -> String {
    if moves.is_empty() {
        return WAIT.to_owned();
    }
    let mut line = String::new();
    for (i, order) in moves.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        let _ = write!(line, "{} {} {}", order.units, order.from, order.to);
    }
    line
}

/// Format the spawn command line.
#[must_use]
pub fn format_spawns(spawns: &[SpawnOrder]) -> String {
    if spawns.is_empty() {
        return WAIT.to_owned();
    }
    let mut line = String::new();
    for (i, order) in spawns.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        let _ = write!(line, "{} {}", order.units, order.zone);
    }
    line
}
