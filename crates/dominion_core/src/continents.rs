//! Continent partition: connected components of the zone graph.
//!
//! Links are static for the game's duration, so the partition is
//! computed exactly once after setup and never again. Pathfinding and
//! reachability never cross continent boundaries.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::graph::{ZoneGraph, ZoneId};

/// Identifier of a continent. Ids are dense: `0..continent_count`.
pub type ContinentId = usize;

/// A maximal set of zones mutually reachable via links.
///
/// Holds member zone ids only; zones themselves stay in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continent {
    /// Stable identifier, equal to this continent's index in the map.
    pub id: ContinentId,
    /// Member zone ids, ascending.
    pub zones: Vec<ZoneId>,
    /// The subset of members with a positive resource value, ascending.
    pub resource_zones: Vec<ZoneId>,
}

impl Continent {
    /// Number of member zones.
    #[must_use]
    pub fn size(&self) -> usize {
        self.zones.len()
    }
}

/// The complete partition of the graph into continents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinentMap {
    continents: Vec<Continent>,
    zone_continent: Vec<ContinentId>,
}

impl ContinentMap {
    /// Partition `graph` into connected components.
    ///
    /// Zones are visited in ascending id order and each unvisited zone
    /// seeds a breadth-first traversal over an explicit worklist, so
    /// continent ids are a deterministic function of the graph and the
    /// id ordering, and arbitrarily long chains cannot grow the call
    /// stack.
    #[must_use]
    pub fn compute(graph: &ZoneGraph) -> Self {
        let zone_count = graph.len();
        let mut zone_continent = vec![usize::MAX; zone_count];
        let mut continents = Vec::new();
        let mut worklist = VecDeque::new();

        for seed in 0..zone_count {
            if zone_continent[seed] != usize::MAX {
                continue;
            }
            let id = continents.len();
            let mut members = Vec::new();

            zone_continent[seed] = id;
            worklist.push_back(seed);
            while let Some(current) = worklist.pop_front() {
                members.push(current);
                for &neighbor in graph.zones()[current].neighbors() {
                    if zone_continent[neighbor] == usize::MAX {
                        zone_continent[neighbor] = id;
                        worklist.push_back(neighbor);
                    }
                }
            }

            members.sort_unstable();
            let resource_zones = members
                .iter()
                .copied()
                .filter(|&z| graph.zones()[z].resource_value > 0)
                .collect();
            continents.push(Continent {
                id,
                zones: members,
                resource_zones,
            });
        }

        Self {
            continents,
            zone_continent,
        }
    }

    /// Number of continents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.continents.len()
    }

    /// True if the map covers no zones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.continents.is_empty()
    }

    /// The continent `zone` belongs to.
    pub fn continent_of(&self, zone: ZoneId) -> Result<ContinentId> {
        self.zone_continent
            .get(zone)
            .copied()
            .filter(|&c| c != usize::MAX)
            .ok_or(EngineError::MissingContinent(zone))
    }

    /// All continents in id order.
    #[must_use]
    pub fn continents(&self) -> &[Continent] {
        &self.continents
    }

    /// Look up a continent by id.
    #[must_use]
    pub fn continent(&self, id: ContinentId) -> Option<&Continent> {
        self.continents.get(id)
    }
}
