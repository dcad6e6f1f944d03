//! # Dominion Core
//!
//! Deterministic decision engine for a turn-based territory-control
//! game: zones connected by links, partitioned once into continents,
//! with per-turn ownership-biased pathfinding and a greedy allocator
//! for movement and spawn orders.
//!
//! This crate contains **only** deterministic logic:
//! - No IO
//! - No wall-clock access
//! - No system randomness (spawn selection uses a caller-seeded RNG)
//!
//! This separation keeps the engine testable turn-by-turn and leaves
//! the protocol, logging setup, and the read-decide-write loop to the
//! runner crate.
//!
//! ## Crate Structure
//!
//! - [`graph`] - Zone graph: adjacency, ownership, garrisons
//! - [`continents`] - Connected-component partition, computed once
//! - [`pathfinding`] - Ownership-biased Dijkstra per mobile stack
//! - [`turn`] - Per-turn derived views of the graph
//! - [`allocator`] - Movement and spawn decisions under a budget

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod allocator;
pub mod continents;
pub mod error;
pub mod graph;
pub mod pathfinding;
pub mod turn;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::allocator::{
        Allocator, AllocatorConfig, MoveOrder, MovementPolicy, SpawnOrder, SpawnPolicy, TurnOrders,
        SPAWN_COST,
    };
    pub use crate::continents::{Continent, ContinentId, ContinentMap};
    pub use crate::error::{EngineError, Result};
    pub use crate::graph::{FactionId, Owner, Zone, ZoneGraph, ZoneId, MAX_FACTIONS};
    pub use crate::pathfinding::{shortest_paths, PathField};
    pub use crate::turn::TurnState;
}
