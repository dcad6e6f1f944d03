//! Ownership-biased shortest paths within one continent.
//!
//! Edge cost depends on the *destination* zone's owner relative to the
//! source zone's owner: hostile territory is cheapest to route through,
//! then unclaimed, then friendly. This models "advance through
//! contested ground, don't loop back through your own territory".
//!
//! Ownership and garrisons change every turn, so fields are recomputed
//! from scratch each turn; results live in a caller-owned [`PathField`]
//! rather than scratch state on the zones.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::continents::ContinentMap;
use crate::error::Result;
use crate::graph::{Owner, ZoneGraph, ZoneId};

/// Cost of stepping into a zone held by another faction.
const COST_HOSTILE: u32 = 1;
/// Cost of stepping into an unclaimed zone.
const COST_NEUTRAL: u32 = 2;
/// Cost of stepping into a zone with the same owner as the source.
const COST_FRIENDLY: u32 = 3;

/// Cost of one hop into `dest`, as seen from a source owned by `source_owner`.
fn step_cost(source_owner: Owner, dest: Owner) -> u32 {
    if dest == source_owner {
        COST_FRIENDLY
    } else if dest == Owner::Neutral {
        COST_NEUTRAL
    } else {
        COST_HOSTILE
    }
}

/// A node in the Dijkstra frontier priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct FrontierNode {
    zone: ZoneId,
    cost: u32,
}

impl Ord for FrontierNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so we reverse the comparison for
        // min-heap behavior. Equal costs break to the lower zone id,
        // keeping results reproducible across runs.
        match other.cost.cmp(&self.cost) {
            Ordering::Equal => other.zone.cmp(&self.zone),
            ord => ord,
        }
    }
}

impl PartialOrd for FrontierNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest-path field from one source zone, valid for one turn.
///
/// Covers exactly the source's continent: zones elsewhere report no
/// distance and an empty path.
#[derive(Debug, Clone)]
pub struct PathField {
    source: ZoneId,
    distance: HashMap<ZoneId, u32>,
    predecessor: HashMap<ZoneId, ZoneId>,
}

impl PathField {
    /// The zone this field was computed from.
    #[must_use]
    pub fn source(&self) -> ZoneId {
        self.source
    }

    /// Minimum path cost from the source to `zone`.
    ///
    /// `None` means `zone` is on another continent.
    #[must_use]
    pub fn distance(&self, zone: ZoneId) -> Option<u32> {
        self.distance.get(&zone).copied()
    }

    /// The shortest path to `zone` as hops *after* the source, ending
    /// at `zone`. Empty if `zone` is the source or unreachable.
    #[must_use]
    pub fn path_to(&self, zone: ZoneId) -> Vec<ZoneId> {
        if zone == self.source || !self.distance.contains_key(&zone) {
            return Vec::new();
        }
        let mut path = vec![zone];
        let mut current = zone;
        while let Some(&prev) = self.predecessor.get(&current) {
            if prev == self.source {
                break;
            }
            path.push(prev);
            current = prev;
        }
        path.reverse();
        path
    }

    /// Among `candidates`, the one with the smallest path cost from the
    /// source, with ties broken to the lower zone id.
    ///
    /// Unreachable candidates are skipped; `None` if none is reachable.
    pub fn nearest<I>(&self, candidates: I) -> Option<(ZoneId, u32)>
    where
        I: IntoIterator<Item = ZoneId>,
    {
        let mut best: Option<(ZoneId, u32)> = None;
        for zone in candidates {
            let Some(dist) = self.distance(zone) else {
                continue;
            };
            let better = match best {
                None => true,
                Some((best_zone, best_dist)) => {
                    dist < best_dist || (dist == best_dist && zone < best_zone)
                }
            };
            if better {
                best = Some((zone, dist));
            }
        }
        best
    }
}

/// Compute minimum-cost paths from `source` to every zone in its
/// continent.
///
/// Dijkstra over the static adjacency, restricted to the source's
/// continent by construction (links never cross continents). Distance
/// and predecessor update only on strict improvement, so ties keep the
/// first-discovered route; together with the heap's lowest-id
/// tie-break the result is deterministic.
///
/// # Errors
///
/// Returns an error if `source` is not a valid zone or the partition
/// has no continent recorded for it - both programming errors, since
/// the partition is computed once at startup over the whole graph.
pub fn shortest_paths(
    graph: &ZoneGraph,
    continents: &ContinentMap,
    source: ZoneId,
) -> Result<PathField> {
    let source_owner = graph.zone(source)?.owner;
    continents.continent_of(source)?;

    let mut distance = HashMap::new();
    let mut predecessor = HashMap::new();
    let mut frontier = BinaryHeap::new();

    distance.insert(source, 0);
    frontier.push(FrontierNode {
        zone: source,
        cost: 0,
    });

    while let Some(FrontierNode { zone, cost }) = frontier.pop() {
        // Stale entry superseded by a cheaper relaxation.
        if distance.get(&zone).is_some_and(|&d| cost > d) {
            continue;
        }

        for &neighbor in graph.zones()[zone].neighbors() {
            let step = step_cost(source_owner, graph.zones()[neighbor].owner);
            let alt = cost + step;
            if distance.get(&neighbor).map_or(true, |&d| alt < d) {
                distance.insert(neighbor, alt);
                predecessor.insert(neighbor, zone);
                frontier.push(FrontierNode {
                    zone: neighbor,
                    cost: alt,
                });
            }
        }
    }

    Ok(PathField {
        source,
        distance,
        predecessor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FactionId, MAX_FACTIONS};
    use proptest::prelude::*;

    fn graph(zones: usize, links: &[(ZoneId, ZoneId)]) -> ZoneGraph {
        let mut g = ZoneGraph::new();
        for id in 0..zones {
            g.add_zone(id, 0).unwrap();
        }
        for &(a, b) in links {
            g.add_link(a, b).unwrap();
        }
        g
    }

    fn own(g: &mut ZoneGraph, zone: ZoneId, faction: u8) {
        g.apply_turn_update(zone, Owner::Faction(FactionId(faction)), [0; MAX_FACTIONS])
            .unwrap();
    }

    #[test]
    fn test_line_scenario_all_unclaimed() {
        // 0-1-2-3, source owned by faction 0, rest unclaimed.
        let mut g = graph(4, &[(0, 1), (1, 2), (2, 3)]);
        own(&mut g, 0, 0);
        let map = ContinentMap::compute(&g);

        let field = shortest_paths(&g, &map, 0).unwrap();
        assert_eq!(field.distance(3), Some(6)); // 2 + 2 + 2
        assert_eq!(field.path_to(3), vec![1, 2, 3]);
    }

    #[test]
    fn test_step_cost_rule() {
        let me = Owner::Faction(FactionId(0));
        let enemy = Owner::Faction(FactionId(2));
        assert_eq!(step_cost(me, enemy), 1);
        assert_eq!(step_cost(me, Owner::Neutral), 2);
        assert_eq!(step_cost(me, me), 3);
        // A neutral source treats neutral zones as "own" ground.
        assert_eq!(step_cost(Owner::Neutral, Owner::Neutral), 3);
    }

    #[test]
    fn test_prefers_hostile_route_over_friendly() {
        // Two routes from 0 to 3: through enemy-held 1 (cost 1+?) or
        // through friendly 2 (cost 3+?). Destination 3 is neutral.
        let mut g = graph(4, &[(0, 1), (1, 3), (0, 2), (2, 3)]);
        own(&mut g, 0, 0);
        own(&mut g, 1, 1);
        own(&mut g, 2, 0);
        let map = ContinentMap::compute(&g);

        let field = shortest_paths(&g, &map, 0).unwrap();
        assert_eq!(field.distance(3), Some(3)); // 1 (enemy) + 2 (neutral)
        assert_eq!(field.path_to(3), vec![1, 3]);
    }

    #[test]
    fn test_tie_breaks_to_lower_zone_id() {
        // Diamond with identical costs both ways: 0-1-3 and 0-2-3, all
        // neutral except the source. The route through 1 must win.
        let mut g = graph(4, &[(0, 2), (0, 1), (2, 3), (1, 3)]);
        own(&mut g, 0, 0);
        let map = ContinentMap::compute(&g);

        let field = shortest_paths(&g, &map, 0).unwrap();
        assert_eq!(field.path_to(3), vec![1, 3]);
    }

    #[test]
    fn test_other_continent_unreachable() {
        let g = graph(4, &[(0, 1), (2, 3)]);
        let map = ContinentMap::compute(&g);

        let field = shortest_paths(&g, &map, 0).unwrap();
        assert_eq!(field.distance(2), None);
        assert_eq!(field.distance(3), None);
        assert!(field.path_to(2).is_empty());
    }

    #[test]
    fn test_source_path_is_empty() {
        let g = graph(2, &[(0, 1)]);
        let map = ContinentMap::compute(&g);

        let field = shortest_paths(&g, &map, 0).unwrap();
        assert_eq!(field.distance(0), Some(0));
        assert!(field.path_to(0).is_empty());
    }

    #[test]
    fn test_invalid_source_fails_fast() {
        let g = graph(2, &[(0, 1)]);
        let map = ContinentMap::compute(&g);
        assert!(shortest_paths(&g, &map, 9).is_err());
    }

    #[test]
    fn test_nearest_prefers_distance_then_id() {
        let mut g = graph(5, &[(0, 1), (0, 2), (1, 3), (2, 4)]);
        own(&mut g, 0, 0);
        let map = ContinentMap::compute(&g);
        let field = shortest_paths(&g, &map, 0).unwrap();

        // 1 and 2 are both one neutral hop away; lower id wins.
        assert_eq!(field.nearest([2, 1]), Some((1, 2)));
        // Unreachable candidates are skipped entirely.
        assert_eq!(field.nearest([99]), None);
    }

    proptest! {
        #[test]
        fn prop_distances_monotone_and_chains_terminate(
            zones in 2usize..24,
            raw_links in prop::collection::vec((0usize..24, 0usize..24), 1..60),
            owners in prop::collection::vec(0i32..5, 24),
            source in 0usize..24,
        ) {
            let source = source % zones;
            let links: Vec<_> = raw_links
                .into_iter()
                .map(|(a, b)| (a % zones, b % zones))
                .collect();
            let mut g = graph(zones, &links);
            for z in 0..zones {
                let owner = match owners[z] {
                    0 => Owner::Neutral,
                    n => Owner::Faction(FactionId((n - 1) as u8)),
                };
                g.apply_turn_update(z, owner, [0; MAX_FACTIONS]).unwrap();
            }
            let map = ContinentMap::compute(&g);
            let field = shortest_paths(&g, &map, source).unwrap();

            let source_owner = g.zone(source).unwrap().owner;
            prop_assert_eq!(field.distance(source), Some(0));
            for z in 0..zones {
                let Some(dist) = field.distance(z) else { continue };
                let path = field.path_to(z);
                if z == source {
                    prop_assert!(path.is_empty());
                    continue;
                }

                // The predecessor chain is acyclic (no repeated zones,
                // bounded by the zone count) and ends at z.
                prop_assert!(path.len() <= zones);
                let mut sorted = path.clone();
                sorted.sort_unstable();
                sorted.dedup();
                prop_assert_eq!(sorted.len(), path.len());
                prop_assert_eq!(*path.last().unwrap(), z);

                // Each hop is adjacent to the previous zone, hop costs
                // reproduce the 1/2/3 rule, and the recorded distances
                // are the non-decreasing running sums.
                let mut prev = source;
                let mut running = 0;
                for &hop in &path {
                    prop_assert!(g.neighbors(prev).unwrap().contains(&hop));
                    running += step_cost(source_owner, g.zone(hop).unwrap().owner);
                    prop_assert_eq!(field.distance(hop), Some(running));
                    prev = hop;
                }
                prop_assert_eq!(running, dist);
            }
        }
    }
}
