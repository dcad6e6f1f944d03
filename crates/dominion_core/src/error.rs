//! Error types for the decision engine.

use thiserror::Error;

use crate::graph::ZoneId;

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Top-level error type for all engine errors.
///
/// Every variant is an invariant violation by the caller or a bug in
/// the engine itself; none is recoverable mid-turn. Expected non-fatal
/// conditions (unreachable objective, no spawnable zone) are expressed
/// as `Option`/empty results, not errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A zone id outside the graph was referenced.
    #[error("Invalid zone id {zone} (zone count {zone_count})")]
    InvalidZone {
        /// The offending zone id.
        zone: ZoneId,
        /// Number of zones in the graph.
        zone_count: usize,
    },

    /// Setup sent zone ids out of order or with gaps.
    #[error("Zone ids must be dense and ascending: got {got}, expected {expected}")]
    NonDenseZoneId {
        /// The id received.
        got: ZoneId,
        /// The id the graph expected next.
        expected: ZoneId,
    },

    /// Pathfinding was asked about a zone the partition never labelled.
    #[error("Zone {0} has no recorded continent")]
    MissingContinent(ZoneId),

    /// The allocator was asked to spend more than the remaining budget.
    #[error("Spawn request needs {required} budget, only {available} left")]
    InsufficientBudget {
        /// Budget the request needs.
        required: u32,
        /// Budget remaining this turn.
        available: u32,
    },
}
