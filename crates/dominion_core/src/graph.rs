//! Zone graph: the game map as an undirected graph of zones.
//!
//! Topology (zones and links) is fixed at setup and never mutated
//! afterwards. Ownership and garrisons are refreshed every turn from
//! the full snapshot the protocol sends.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Identifier of a zone. Ids are dense: `0..zone_count`.
pub type ZoneId = usize;

/// Maximum number of competing factions in a match.
pub const MAX_FACTIONS: usize = 4;

/// Identifier of a faction (`0..MAX_FACTIONS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactionId(pub u8);

impl FactionId {
    /// Index into per-faction arrays such as [`Zone::garrison`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Who holds a zone right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Owner {
    /// Nobody has claimed the zone yet (protocol sentinel `-1`).
    #[default]
    Neutral,
    /// The zone is held by a faction.
    Faction(FactionId),
}

impl Owner {
    /// Returns true if the zone is held by `faction`.
    #[must_use]
    pub fn is_faction(self, faction: FactionId) -> bool {
        self == Self::Faction(faction)
    }

    /// Returns true if the zone is held by some faction other than `faction`.
    #[must_use]
    pub fn is_hostile_to(self, faction: FactionId) -> bool {
        matches!(self, Self::Faction(f) if f != faction)
    }
}

/// A node in the map graph: the unit of ownership and garrisoning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Stable identifier, equal to this zone's index in the graph.
    pub id: ZoneId,
    /// Current holder, refreshed every turn.
    pub owner: Owner,
    /// Unit counts stationed here, one slot per faction.
    pub garrison: [u32; MAX_FACTIONS],
    /// Static resource yield (0 = no resource).
    pub resource_value: u32,
    /// Adjacent zone ids. Symmetric, set once at load.
    neighbors: Vec<ZoneId>,
}

impl Zone {
    fn new(id: ZoneId, resource_value: u32) -> Self {
        Self {
            id,
            owner: Owner::Neutral,
            garrison: [0; MAX_FACTIONS],
            resource_value,
            neighbors: Vec::new(),
        }
    }

    /// Adjacent zone ids.
    #[must_use]
    pub fn neighbors(&self) -> &[ZoneId] {
        &self.neighbors
    }

    /// Units `faction` has stationed here.
    #[must_use]
    pub fn garrison_of(&self, faction: FactionId) -> u32 {
        self.garrison[faction.index()]
    }

    /// Units stationed here by anyone other than `faction`.
    #[must_use]
    pub fn hostile_garrison(&self, faction: FactionId) -> u32 {
        self.garrison
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != faction.index())
            .map(|(_, &n)| n)
            .sum()
    }

    /// True if `faction` may place new units here (neutral or own zone).
    #[must_use]
    pub fn is_spawnable_by(&self, faction: FactionId) -> bool {
        matches!(self.owner, Owner::Neutral) || self.owner.is_faction(faction)
    }
}

/// The full map. Zone count is fixed for the game's duration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneGraph {
    zones: Vec<Zone>,
}

impl ZoneGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self { zones: Vec::new() }
    }

    /// Number of zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// True if the graph has no zones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Register a zone during setup.
    ///
    /// Ids must arrive dense and ascending; the protocol guarantees
    /// this and anything else is a fatal setup error.
    pub fn add_zone(&mut self, id: ZoneId, resource_value: u32) -> Result<()> {
        if id != self.zones.len() {
            return Err(EngineError::NonDenseZoneId {
                got: id,
                expected: self.zones.len(),
            });
        }
        self.zones.push(Zone::new(id, resource_value));
        Ok(())
    }

    /// Register an undirected link during setup.
    pub fn add_link(&mut self, a: ZoneId, b: ZoneId) -> Result<()> {
        self.check(a)?;
        self.check(b)?;
        self.zones[a].neighbors.push(b);
        self.zones[b].neighbors.push(a);
        Ok(())
    }

    /// Refresh one zone's owner and garrison from the turn snapshot.
    ///
    /// The protocol sends a full snapshot every turn; a zone the caller
    /// skips keeps stale state, which is the caller's contract to keep.
    pub fn apply_turn_update(
        &mut self,
        id: ZoneId,
        owner: Owner,
        garrison: [u32; MAX_FACTIONS],
    ) -> Result<()> {
        self.check(id)?;
        let zone = &mut self.zones[id];
        zone.owner = owner;
        zone.garrison = garrison;
        Ok(())
    }

    /// Look up a zone.
    pub fn zone(&self, id: ZoneId) -> Result<&Zone> {
        self.check(id)?;
        Ok(&self.zones[id])
    }

    /// All zones in id order.
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Adjacent zone ids of `id`.
    pub fn neighbors(&self, id: ZoneId) -> Result<&[ZoneId]> {
        self.check(id)?;
        Ok(&self.zones[id].neighbors)
    }

    fn check(&self, id: ZoneId) -> Result<()> {
        if id < self.zones.len() {
            Ok(())
        } else {
            Err(EngineError::InvalidZone {
                zone: id,
                zone_count: self.zones.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_of(n: usize) -> ZoneGraph {
        let mut g = ZoneGraph::new();
        for id in 0..n {
            g.add_zone(id, 0).unwrap();
        }
        g
    }

    #[test]
    fn test_add_zone_dense_ids() {
        let mut g = ZoneGraph::new();
        g.add_zone(0, 3).unwrap();
        g.add_zone(1, 0).unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g.zone(0).unwrap().resource_value, 3);

        // Gap in the id sequence is a setup error.
        assert!(matches!(
            g.add_zone(5, 0),
            Err(EngineError::NonDenseZoneId { got: 5, expected: 2 })
        ));
    }

    #[test]
    fn test_links_are_symmetric() {
        let mut g = graph_of(3);
        g.add_link(0, 1).unwrap();
        g.add_link(1, 2).unwrap();

        assert_eq!(g.neighbors(0).unwrap(), &[1]);
        assert_eq!(g.neighbors(1).unwrap(), &[0, 2]);
        assert_eq!(g.neighbors(2).unwrap(), &[1]);
    }

    #[test]
    fn test_link_out_of_range() {
        let mut g = graph_of(2);
        assert!(g.add_link(0, 7).is_err());
        // Failed link must not leave a dangling half-edge.
        assert!(g.neighbors(0).unwrap().is_empty());
    }

    #[test]
    fn test_turn_update_refreshes_state() {
        let mut g = graph_of(1);
        let me = FactionId(1);
        g.apply_turn_update(0, Owner::Faction(me), [0, 4, 2, 0])
            .unwrap();

        let zone = g.zone(0).unwrap();
        assert!(zone.owner.is_faction(me));
        assert_eq!(zone.garrison_of(me), 4);
        assert_eq!(zone.hostile_garrison(me), 2);
    }

    #[test]
    fn test_spawnable() {
        let mut g = graph_of(2);
        let me = FactionId(0);
        g.apply_turn_update(0, Owner::Faction(FactionId(2)), [0; 4])
            .unwrap();

        assert!(!g.zone(0).unwrap().is_spawnable_by(me));
        assert!(g.zone(1).unwrap().is_spawnable_by(me)); // still neutral
    }

    #[test]
    fn test_owner_relations() {
        let me = FactionId(0);
        assert!(!Owner::Neutral.is_hostile_to(me));
        assert!(!Owner::Faction(me).is_hostile_to(me));
        assert!(Owner::Faction(FactionId(3)).is_hostile_to(me));
    }
}
