//! Greedy allocation of movement and spawn orders under a turn budget.
//!
//! Movement is decided first, then spawning, both against the same
//! budget pool. The allocator is a heuristic, not a solver: resource
//! zones are served nearest-stack-first, leftovers expand toward the
//! closest non-friendly zone, and spawns follow one of a few placement
//! policies selected at startup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::continents::{Continent, ContinentId, ContinentMap};
use crate::error::{EngineError, Result};
use crate::graph::{ZoneGraph, ZoneId};
use crate::pathfinding::{shortest_paths, PathField};
use crate::turn::TurnState;

/// Budget units consumed by each spawned unit.
pub const SPAWN_COST: u32 = 20;

/// Send `units` from `from` one hop to the adjacent zone `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOrder {
    /// Units to move.
    pub units: u32,
    /// Zone the units leave.
    pub from: ZoneId,
    /// Adjacent zone the units enter.
    pub to: ZoneId,
}

/// Place `units` new units in `zone`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnOrder {
    /// Units to place.
    pub units: u32,
    /// Zone receiving the units (unclaimed or already friendly).
    pub zone: ZoneId,
}

/// The complete decision set for one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOrders {
    /// Movement orders, in decision order.
    pub moves: Vec<MoveOrder>,
    /// Spawn orders, in decision order.
    pub spawns: Vec<SpawnOrder>,
}

/// How mobile stacks are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementPolicy {
    /// Serve resource targets first, then send every still-uncommitted
    /// stack toward its nearest non-friendly zone.
    #[default]
    ResourceThenExpand,
    /// Serve resource targets only; uncommitted stacks hold position.
    ResourceOnly,
}

/// Where new units are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpawnPolicy {
    /// Uniform-random over all spawnable zones.
    #[default]
    Uniform,
    /// Uniform-random over unclaimed zones until each has been used
    /// once this turn, then fall back to friendly zones.
    UnclaimedFirst,
    /// Prefer continents where enemy garrisons outnumber friendly ones,
    /// smallest continent first, to normalize contested fronts.
    ContinentBalanced,
}

/// Allocation policies fixed at startup.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Movement dispatch policy.
    pub movement: MovementPolicy,
    /// Spawn placement policy.
    pub spawn: SpawnPolicy,
}

/// Simple deterministic RNG for spawn-zone selection.
///
/// Seeded once at startup by the caller; decorrelating instances of
/// the same bot is the seed's job, not this generator's.
#[derive(Debug, Clone)]
struct SpawnRng {
    state: u64,
}

impl SpawnRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(0x5_DEEC_E66D).wrapping_add(11);
        self.state
    }

    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some((self.next() % len as u64) as usize)
        }
    }

    fn pick(&mut self, items: &[ZoneId]) -> Option<ZoneId> {
        self.pick_index(items.len()).map(|i| items[i])
    }
}

/// Turns pathfinding results and the turn budget into orders.
#[derive(Debug, Clone)]
pub struct Allocator {
    config: AllocatorConfig,
    rng: SpawnRng,
}

impl Allocator {
    /// Create an allocator with the given policies and RNG seed.
    #[must_use]
    pub fn new(config: AllocatorConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SpawnRng::new(seed),
        }
    }

    /// Decide this turn's movement and spawn orders.
    ///
    /// Movement first, then spawning; both read and update `state`
    /// (reservations and budget).
    pub fn plan_turn(
        &mut self,
        graph: &ZoneGraph,
        continents: &ContinentMap,
        state: &mut TurnState,
    ) -> Result<TurnOrders> {
        let mut orders = TurnOrders::default();
        self.plan_movement(graph, continents, state, &mut orders)?;
        self.plan_spawns(graph, continents, state, &mut orders)?;
        Ok(orders)
    }

    fn plan_movement(
        &mut self,
        graph: &ZoneGraph,
        continents: &ContinentMap,
        state: &mut TurnState,
        orders: &mut TurnOrders,
    ) -> Result<()> {
        // One field per mobile stack per turn; ownership changed since
        // last turn so nothing older is reusable.
        let mut fields: HashMap<ZoneId, PathField> = HashMap::new();
        for &stack in &state.mobile {
            fields.insert(stack, shortest_paths(graph, continents, stack)?);
        }

        // Resource zones not already ours, ascending id.
        let me = state.faction();
        let targets: Vec<ZoneId> = graph
            .zones()
            .iter()
            .filter(|z| z.resource_value > 0 && !z.owner.is_faction(me))
            .map(|z| z.id)
            .collect();

        for target in targets {
            let continent = continents.continent_of(target)?;
            let Some(stack) = nearest_stack(graph, continents, state, &fields, target, continent)?
            else {
                continue;
            };
            dispatch(graph, state, orders, &fields[&stack], stack, target);
        }

        if self.config.movement == MovementPolicy::ResourceThenExpand {
            // Leftover stacks push toward the closest zone we don't
            // hold, enemy or unclaimed alike.
            let frontier: Vec<ZoneId> = state
                .enemy
                .iter()
                .chain(state.unclaimed.iter())
                .copied()
                .collect();
            let stacks = state.mobile.clone();
            for &stack in &stacks {
                if state.remaining(graph, stack) == 0 {
                    continue;
                }
                let field = &fields[&stack];
                let Some((target, _)) =
                    field.nearest(frontier.iter().copied().filter(|&z| z != stack))
                else {
                    continue;
                };
                dispatch(graph, state, orders, field, stack, target);
            }
        }
        Ok(())
    }

    fn plan_spawns(
        &mut self,
        graph: &ZoneGraph,
        continents: &ContinentMap,
        state: &mut TurnState,
        orders: &mut TurnOrders,
    ) -> Result<()> {
        match self.config.spawn {
            SpawnPolicy::Uniform => self.spawn_uniform(graph, state, orders),
            SpawnPolicy::UnclaimedFirst => self.spawn_unclaimed_first(state, orders),
            SpawnPolicy::ContinentBalanced => {
                self.spawn_continent_balanced(graph, continents, state, orders)
            }
        }
    }

    fn spawn_uniform(
        &mut self,
        graph: &ZoneGraph,
        state: &mut TurnState,
        orders: &mut TurnOrders,
    ) -> Result<()> {
        let candidates = spawnable_zones(graph, state);
        while state.budget >= SPAWN_COST {
            let Some(zone) = self.rng.pick(&candidates) else {
                break;
            };
            spawn_one(state, orders, zone)?;
        }
        Ok(())
    }

    fn spawn_unclaimed_first(
        &mut self,
        state: &mut TurnState,
        orders: &mut TurnOrders,
    ) -> Result<()> {
        let mut unclaimed = state.unclaimed.clone();
        let friendly = state.friendly.clone();
        while state.budget >= SPAWN_COST {
            if let Some(i) = self.rng.pick_index(unclaimed.len()) {
                // Each unclaimed zone is used at most once per turn so
                // the whole frontier gets seeded before doubling up.
                let zone = unclaimed.swap_remove(i);
                spawn_one(state, orders, zone)?;
            } else if let Some(zone) = self.rng.pick(&friendly) {
                spawn_one(state, orders, zone)?;
            } else {
                break;
            }
        }
        Ok(())
    }

    fn spawn_continent_balanced(
        &mut self,
        graph: &ZoneGraph,
        continents: &ContinentMap,
        state: &mut TurnState,
        orders: &mut TurnOrders,
    ) -> Result<()> {
        let me = state.faction();
        let count = continents.len();

        let mut friendly_units = vec![0u64; count];
        let mut hostile_units = vec![0u64; count];
        let mut spawnable: Vec<Vec<ZoneId>> = vec![Vec::new(); count];
        for zone in graph.zones() {
            let c = continents.continent_of(zone.id)?;
            friendly_units[c] += u64::from(zone.garrison_of(me));
            hostile_units[c] += u64::from(zone.hostile_garrison(me));
            if zone.is_spawnable_by(me) {
                spawnable[c].push(zone.id);
            }
        }

        let everywhere = spawnable_zones(graph, state);
        while state.budget >= SPAWN_COST {
            // Smallest contested continent that can still take units;
            // placements count toward our tally so fronts equalize.
            let contested = (0..count)
                .filter(|&c| hostile_units[c] > friendly_units[c] && !spawnable[c].is_empty())
                .min_by_key(|&c| (continents.continent(c).map_or(0, Continent::size), c));

            let zone = match contested {
                Some(c) => {
                    let zone = self.rng.pick(&spawnable[c]);
                    friendly_units[c] += 1;
                    zone
                }
                None => self.rng.pick(&everywhere),
            };
            let Some(zone) = zone else {
                break;
            };
            spawn_one(state, orders, zone)?;
        }
        Ok(())
    }
}

/// All zones the acting faction may place units into.
fn spawnable_zones(graph: &ZoneGraph, state: &TurnState) -> Vec<ZoneId> {
    let me = state.faction();
    graph
        .zones()
        .iter()
        .filter(|z| z.is_spawnable_by(me))
        .map(|z| z.id)
        .collect()
}

/// The mobile stack on `continent` with un-reserved units closest to
/// `target`; ties break to the lower stack zone id.
fn nearest_stack(
    graph: &ZoneGraph,
    continents: &ContinentMap,
    state: &TurnState,
    fields: &HashMap<ZoneId, PathField>,
    target: ZoneId,
    continent: ContinentId,
) -> Result<Option<ZoneId>> {
    let mut best: Option<(u32, ZoneId)> = None;
    for &stack in &state.mobile {
        if state.remaining(graph, stack) == 0 || continents.continent_of(stack)? != continent {
            continue;
        }
        let Some(dist) = fields[&stack].distance(target) else {
            continue;
        };
        if best.map_or(true, |b| (dist, stack) < b) {
            best = Some((dist, stack));
        }
    }
    Ok(best.map(|(_, stack)| stack))
}

/// Commit `stack`'s full remaining garrison one hop toward `target`.
///
/// A stack with no path (or already standing on the target) is left
/// alone; that is an expected condition, not an error.
fn dispatch(
    graph: &ZoneGraph,
    state: &mut TurnState,
    orders: &mut TurnOrders,
    field: &PathField,
    stack: ZoneId,
    target: ZoneId,
) {
    let path = field.path_to(target);
    let Some(&next_hop) = path.first() else {
        return;
    };
    let units = state.remaining(graph, stack);
    if units == 0 {
        return;
    }
    trace!(stack, target, next_hop, units, "movement order");
    orders.moves.push(MoveOrder {
        units,
        from: stack,
        to: next_hop,
    });
    state.reserve(stack, units);
}

/// Place one unit in `zone`, paying [`SPAWN_COST`] from the budget.
fn spawn_one(state: &mut TurnState, orders: &mut TurnOrders, zone: ZoneId) -> Result<()> {
    if state.budget < SPAWN_COST {
        return Err(EngineError::InsufficientBudget {
            required: SPAWN_COST,
            available: state.budget,
        });
    }
    trace!(zone, "spawn order");
    orders.spawns.push(SpawnOrder { units: 1, zone });
    state.budget -= SPAWN_COST;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FactionId, Owner, MAX_FACTIONS};

    const ME: FactionId = FactionId(0);

    fn graph(zones: &[u32], links: &[(ZoneId, ZoneId)]) -> ZoneGraph {
        let mut g = ZoneGraph::new();
        for (id, &value) in zones.iter().enumerate() {
            g.add_zone(id, value).unwrap();
        }
        for &(a, b) in links {
            g.add_link(a, b).unwrap();
        }
        g
    }

    fn allocator(config: AllocatorConfig) -> Allocator {
        Allocator::new(config, 42)
    }

    fn plan(g: &ZoneGraph, budget: u32, config: AllocatorConfig) -> (TurnOrders, TurnState) {
        let continents = ContinentMap::compute(g);
        let mut state = TurnState::derive(g, ME, budget);
        let orders = allocator(config)
            .plan_turn(g, &continents, &mut state)
            .unwrap();
        (orders, state)
    }

    #[test]
    fn test_line_scenario_moves_toward_resource() {
        // 0-1-2-3 with a resource at 3; we own 0 with 3 units.
        let mut g = graph(&[0, 0, 0, 5], &[(0, 1), (1, 2), (2, 3)]);
        g.apply_turn_update(0, Owner::Faction(ME), [3, 0, 0, 0])
            .unwrap();

        let (orders, _) = plan(&g, 0, AllocatorConfig::default());
        assert_eq!(
            orders.moves,
            vec![MoveOrder {
                units: 3,
                from: 0,
                to: 1
            }]
        );
    }

    #[test]
    fn test_stack_moves_at_most_once() {
        // Two resource targets, one stack: the second target finds the
        // stack fully reserved and is skipped.
        let mut g = graph(&[0, 4, 4], &[(0, 1), (0, 2)]);
        g.apply_turn_update(0, Owner::Faction(ME), [2, 0, 0, 0])
            .unwrap();

        let (orders, state) = plan(&g, 0, AllocatorConfig::default());
        assert_eq!(orders.moves.len(), 1);
        assert_eq!(orders.moves[0].units, 2);
        assert_eq!(state.remaining(&g, 0), 0);
    }

    #[test]
    fn test_stack_standing_on_target_is_skipped() {
        // Our units sit on the enemy resource zone itself: the path is
        // empty, so no order for that target.
        let mut g = graph(&[5, 0], &[(0, 1)]);
        g.apply_turn_update(0, Owner::Faction(FactionId(1)), [2, 0, 0, 0])
            .unwrap();
        let (orders, _) = plan(
            &g,
            0,
            AllocatorConfig {
                movement: MovementPolicy::ResourceOnly,
                ..AllocatorConfig::default()
            },
        );
        assert!(orders.moves.is_empty());
    }

    #[test]
    fn test_leftover_stack_expands_to_nearest_frontier() {
        // No resource zones; the stack still pushes into the closest
        // non-friendly zone under ResourceThenExpand.
        let mut g = graph(&[0, 0, 0], &[(0, 1), (1, 2)]);
        g.apply_turn_update(0, Owner::Faction(ME), [4, 0, 0, 0])
            .unwrap();
        g.apply_turn_update(1, Owner::Faction(ME), [0; MAX_FACTIONS])
            .unwrap();

        let (orders, _) = plan(&g, 0, AllocatorConfig::default());
        assert_eq!(
            orders.moves,
            vec![MoveOrder {
                units: 4,
                from: 0,
                to: 1
            }]
        );

        let (orders, _) = plan(
            &g,
            0,
            AllocatorConfig {
                movement: MovementPolicy::ResourceOnly,
                ..AllocatorConfig::default()
            },
        );
        assert!(orders.moves.is_empty());
    }

    #[test]
    fn test_moves_never_exceed_unreserved_garrison() {
        let mut g = graph(&[0, 3, 3, 0], &[(0, 1), (0, 2), (0, 3)]);
        g.apply_turn_update(0, Owner::Faction(ME), [5, 0, 0, 0])
            .unwrap();

        let (orders, _) = plan(&g, 0, AllocatorConfig::default());
        let from_zone_0: u32 = orders
            .moves
            .iter()
            .filter(|m| m.from == 0)
            .map(|m| m.units)
            .sum();
        assert!(from_zone_0 <= 5);
    }

    #[test]
    fn test_spawns_consume_exactly_twenty_each() {
        // Budget 45 over three unclaimed zones: two spawns, 5 left.
        let g = graph(&[0, 0, 0], &[(0, 1), (1, 2)]);
        let (orders, state) = plan(&g, 45, AllocatorConfig::default());

        assert_eq!(orders.spawns.len(), 2);
        assert_eq!(state.budget, 5);
        assert!(orders.spawns.iter().all(|s| s.units == 1));
    }

    #[test]
    fn test_no_spawn_below_cost() {
        let g = graph(&[0, 0], &[(0, 1)]);
        let (orders, state) = plan(&g, 19, AllocatorConfig::default());
        assert!(orders.spawns.is_empty());
        assert_eq!(state.budget, 19);
    }

    #[test]
    fn test_no_spawnable_zone_forfeits_budget() {
        let mut g = graph(&[0, 0], &[(0, 1)]);
        for z in 0..2 {
            g.apply_turn_update(z, Owner::Faction(FactionId(1)), [0; MAX_FACTIONS])
                .unwrap();
        }
        let (orders, state) = plan(&g, 100, AllocatorConfig::default());
        assert!(orders.spawns.is_empty());
        assert_eq!(state.budget, 100);
    }

    #[test]
    fn test_unclaimed_first_seeds_frontier_before_doubling_up() {
        let mut g = graph(&[0, 0, 0], &[(0, 1), (1, 2)]);
        g.apply_turn_update(0, Owner::Faction(ME), [0; MAX_FACTIONS])
            .unwrap();

        let config = AllocatorConfig {
            spawn: SpawnPolicy::UnclaimedFirst,
            ..AllocatorConfig::default()
        };
        let (orders, _) = plan(&g, 80, config);

        assert_eq!(orders.spawns.len(), 4);
        let mut first_two: Vec<ZoneId> = orders.spawns[..2].iter().map(|s| s.zone).collect();
        first_two.sort_unstable();
        assert_eq!(first_two, vec![1, 2]); // both unclaimed zones, once each
        assert!(orders.spawns[2..].iter().all(|s| s.zone == 0)); // then friendly
    }

    #[test]
    fn test_continent_balanced_reinforces_contested_front() {
        // Continent {0,1} is safely ours; continent {2,3} has an enemy
        // stack outnumbering us and an unclaimed zone to spawn into.
        let mut g = graph(&[0, 0, 0, 0], &[(0, 1), (2, 3)]);
        g.apply_turn_update(0, Owner::Faction(ME), [6, 0, 0, 0])
            .unwrap();
        g.apply_turn_update(1, Owner::Faction(ME), [0; MAX_FACTIONS])
            .unwrap();
        g.apply_turn_update(2, Owner::Faction(FactionId(1)), [0, 5, 0, 0])
            .unwrap();

        let config = AllocatorConfig {
            movement: MovementPolicy::ResourceOnly,
            spawn: SpawnPolicy::ContinentBalanced,
        };
        let (orders, _) = plan(&g, 40, config);

        assert_eq!(orders.spawns.len(), 2);
        assert!(orders.spawns.iter().all(|s| s.zone == 3));
    }

    #[test]
    fn test_same_seed_same_orders() {
        let g = graph(&[0, 0, 0, 0], &[(0, 1), (1, 2), (2, 3)]);
        let continents = ContinentMap::compute(&g);

        let mut a = Allocator::new(AllocatorConfig::default(), 7);
        let mut b = Allocator::new(AllocatorConfig::default(), 7);
        let mut state_a = TurnState::derive(&g, ME, 100);
        let mut state_b = TurnState::derive(&g, ME, 100);

        assert_eq!(
            a.plan_turn(&g, &continents, &mut state_a).unwrap(),
            b.plan_turn(&g, &continents, &mut state_b).unwrap()
        );
    }
}
