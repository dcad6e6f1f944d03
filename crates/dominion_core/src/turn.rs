//! Per-turn derived views of the zone graph.
//!
//! Rebuilt in full at the start of every turn from the authoritative
//! owner/garrison fields - never incrementally patched, so stale-state
//! bugs cannot carry across turns. Discarded when the turn's orders
//! have been emitted.

use crate::graph::{FactionId, Owner, ZoneGraph, ZoneId};

/// The acting faction's view of one turn.
#[derive(Debug, Clone)]
pub struct TurnState {
    faction: FactionId,
    /// Spendable resource pool for this turn.
    pub budget: u32,
    /// Zones owned by the acting faction, ascending.
    pub friendly: Vec<ZoneId>,
    /// Zones owned by any other faction, ascending.
    pub enemy: Vec<ZoneId>,
    /// Zones owned by nobody, ascending.
    pub unclaimed: Vec<ZoneId>,
    /// Zones holding a friendly mobile stack, ascending.
    pub mobile: Vec<ZoneId>,
    /// Zones holding any non-friendly units, ascending.
    pub hostile_mobile: Vec<ZoneId>,
    /// Units per zone already committed to move out this turn.
    reserved: Vec<u32>,
}

impl TurnState {
    /// Classify every zone for `faction` with this turn's `budget`.
    #[must_use]
    pub fn derive(graph: &ZoneGraph, faction: FactionId, budget: u32) -> Self {
        let mut state = Self {
            faction,
            budget,
            friendly: Vec::new(),
            enemy: Vec::new(),
            unclaimed: Vec::new(),
            mobile: Vec::new(),
            hostile_mobile: Vec::new(),
            reserved: vec![0; graph.len()],
        };

        for zone in graph.zones() {
            match zone.owner {
                Owner::Neutral => state.unclaimed.push(zone.id),
                Owner::Faction(f) if f == faction => state.friendly.push(zone.id),
                Owner::Faction(_) => state.enemy.push(zone.id),
            }
            if zone.garrison_of(faction) > 0 {
                state.mobile.push(zone.id);
            }
            if zone.hostile_garrison(faction) > 0 {
                state.hostile_mobile.push(zone.id);
            }
        }
        state
    }

    /// The acting faction.
    #[must_use]
    pub fn faction(&self) -> FactionId {
        self.faction
    }

    /// Friendly units in `zone` not yet committed to a move this turn.
    #[must_use]
    pub fn remaining(&self, graph: &ZoneGraph, zone: ZoneId) -> u32 {
        graph.zones()[zone]
            .garrison_of(self.faction)
            .saturating_sub(self.reserved[zone])
    }

    /// Commit `units` in `zone` to a move order.
    pub fn reserve(&mut self, zone: ZoneId, units: u32) {
        self.reserved[zone] += units;
    }
}
