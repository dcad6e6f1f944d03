//! The read-decide-write turn loop.
//!
//! Reads the setup block, builds the zone graph, partitions it into
//! continents once, then loops: apply the turn snapshot, derive the
//! turn state, plan orders, print the two command lines. The harness
//! enforces the per-turn wall clock externally; we only measure and
//! log elapsed time per turn.

use std::io::{BufRead, Write};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::{debug, info};

use dominion_core::allocator::{Allocator, AllocatorConfig};
use dominion_core::continents::ContinentMap;
use dominion_core::error::EngineError;
use dominion_core::graph::ZoneGraph;
use dominion_core::turn::TurnState;

use crate::formatter::{format_moves, format_spawns};
use crate::protocol::{ProtocolError, TokenReader};

/// Fatal errors from a bot run.
#[derive(Debug, Error)]
pub enum BotError {
    /// The protocol stream was malformed or broke.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// The engine detected an invariant violation.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// Writing commands failed.
    #[error("IO error writing commands: {0}")]
    Io(#[from] std::io::Error),
}

/// Startup configuration for a bot run.
#[derive(Debug, Clone, Copy, Default)]
pub struct BotConfig {
    /// Allocation policies.
    pub allocator: AllocatorConfig,
    /// RNG seed override. When `None`, the seed mixes wall-clock time
    /// with the faction id so same-bot instances in one match diverge.
    pub seed: Option<u64>,
}

/// Drive a full match: setup, then turns until the stream ends.
pub fn run<R: BufRead, W: Write>(input: R, mut output: W, config: BotConfig) -> Result<(), BotError> {
    let mut reader = TokenReader::new(input);
    let setup = reader.read_setup()?;
    let me = setup.my_faction;

    let mut graph = ZoneGraph::new();
    for &(id, resource) in &setup.zones {
        graph.add_zone(id, resource)?;
    }
    for &(a, b) in &setup.links {
        graph.add_link(a, b)?;
    }
    let continents = ContinentMap::compute(&graph);
    info!(
        faction = me.index(),
        zones = graph.len(),
        links = setup.links.len(),
        continents = continents.len(),
        "match setup complete"
    );

    let seed = config.seed.unwrap_or_else(|| default_seed(me.index() as u64));
    let mut allocator = Allocator::new(config.allocator, seed);

    let mut turn_number = 0u64;
    while let Some(turn) = reader.read_turn(graph.len())? {
        let started = Instant::now();
        for update in &turn.updates {
            graph.apply_turn_update(update.zone, update.owner, update.garrison)?;
        }

        let mut state = TurnState::derive(&graph, me, turn.budget);
        let orders = allocator.plan_turn(&graph, &continents, &mut state)?;

        writeln!(output, "{}", format_moves(&orders.moves))?;
        writeln!(output, "{}", format_spawns(&orders.spawns))?;
        output.flush()?;

        debug!(
            turn = turn_number,
            budget = turn.budget,
            moves = orders.moves.len(),
            spawns = orders.spawns.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "turn decided"
        );
        turn_number += 1;
    }

    info!(turns = turn_number, "stream closed, match over");
    Ok(())
}

/// Wall-clock seconds mixed with the faction id, so multiple instances
/// of this bot racing in the same match draw different spawn zones.
fn default_seed(faction: u64) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    now.wrapping_mul(faction + 1)
}
