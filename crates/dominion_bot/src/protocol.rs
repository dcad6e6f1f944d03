//! Line-oriented turn protocol reader.
//!
//! The game harness speaks whitespace-separated integer tokens:
//!
//! **Setup:** `factionCount playerFactionId zoneCount linkCount`, then
//! `zoneCount` lines of `zoneId resourceValue`, then `linkCount` lines
//! of `zoneIdA zoneIdB`.
//!
//! **Per turn:** `budget`, then `zoneCount` lines of
//! `zoneId owner g0 g1 g2 g3` (owner `-1` = unclaimed).
//!
//! A clean end-of-stream before a turn's budget token means the game
//! is over; anywhere else it is a fatal protocol error. There is no
//! partial-turn recovery - a corrupt turn cannot be decided safely.

use std::collections::VecDeque;
use std::io::BufRead;

use thiserror::Error;

use dominion_core::graph::{FactionId, Owner, ZoneId, MAX_FACTIONS};

/// Errors from the protocol stream. All are fatal to the process.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The underlying stream failed.
    #[error("IO error on protocol stream: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended mid-record.
    #[error("Unexpected end of input while reading {0}")]
    Truncated(&'static str),

    /// A token failed to parse or was out of range.
    #[error("Malformed token {token:?} while reading {context}")]
    Malformed {
        /// The offending token.
        token: String,
        /// What was being parsed.
        context: &'static str,
    },
}

/// The one-time match setup block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setup {
    /// Number of factions in the match.
    pub faction_count: u32,
    /// The faction this bot plays.
    pub my_faction: FactionId,
    /// `(zone id, resource value)` pairs, in protocol order.
    pub zones: Vec<(ZoneId, u32)>,
    /// Undirected links between zone ids.
    pub links: Vec<(ZoneId, ZoneId)>,
}

/// One zone's line of the per-turn snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneUpdate {
    /// The zone being updated.
    pub zone: ZoneId,
    /// Current holder.
    pub owner: Owner,
    /// Per-faction unit counts.
    pub garrison: [u32; MAX_FACTIONS],
}

/// One turn's full input snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnInput {
    /// Spendable budget this turn.
    pub budget: u32,
    /// One update per zone; the harness always sends all of them.
    pub updates: Vec<ZoneUpdate>,
}

/// Whitespace-token reader over any buffered stream.
#[derive(Debug)]
pub struct TokenReader<R> {
    input: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> TokenReader<R> {
    /// Wrap a buffered stream.
    pub fn new(input: R) -> Self {
        Self {
            input,
            pending: VecDeque::new(),
        }
    }

    /// Next token, or `None` at end of stream.
    fn try_token(&mut self) -> Result<Option<String>, ProtocolError> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_owned));
        }
        Ok(self.pending.pop_front())
    }

    fn token(&mut self, context: &'static str) -> Result<String, ProtocolError> {
        self.try_token()?.ok_or(ProtocolError::Truncated(context))
    }

    fn int<T: std::str::FromStr>(&mut self, context: &'static str) -> Result<T, ProtocolError> {
        let token = self.token(context)?;
        token.parse().map_err(|_| ProtocolError::Malformed {
            token,
            context,
        })
    }

    /// Read the setup block that opens a match.
    pub fn read_setup(&mut self) -> Result<Setup, ProtocolError> {
        let faction_count: u32 = self.int("faction count")?;
        let my_faction = self.faction("player faction id")?;
        let zone_count: usize = self.int("zone count")?;
        let link_count: usize = self.int("link count")?;

        let mut zones = Vec::with_capacity(zone_count);
        for _ in 0..zone_count {
            let id: ZoneId = self.int("zone id")?;
            let resource: u32 = self.int("zone resource value")?;
            zones.push((id, resource));
        }

        let mut links = Vec::with_capacity(link_count);
        for _ in 0..link_count {
            let a: ZoneId = self.int("link endpoint")?;
            let b: ZoneId = self.int("link endpoint")?;
            links.push((a, b));
        }

        Ok(Setup {
            faction_count,
            my_faction,
            zones,
            links,
        })
    }

    /// Read one turn's snapshot, or `None` on clean end-of-stream.
    pub fn read_turn(&mut self, zone_count: usize) -> Result<Option<TurnInput>, ProtocolError> {
        let Some(budget_token) = self.try_token()? else {
            return Ok(None);
        };
        let budget: u32 = budget_token.parse().map_err(|_| ProtocolError::Malformed {
            token: budget_token,
            context: "turn budget",
        })?;

        let mut updates = Vec::with_capacity(zone_count);
        for _ in 0..zone_count {
            let zone: ZoneId = self.int("zone id")?;
            let owner = self.owner("zone owner")?;
            let mut garrison = [0u32; MAX_FACTIONS];
            for slot in &mut garrison {
                *slot = self.int("garrison count")?;
            }
            updates.push(ZoneUpdate {
                zone,
                owner,
                garrison,
            });
        }

        Ok(Some(TurnInput { budget, updates }))
    }

    fn faction(&mut self, context: &'static str) -> Result<FactionId, ProtocolError> {
        let token = self.token(context)?;
        match token.parse::<usize>() {
            Ok(id) if id < MAX_FACTIONS => Ok(FactionId(id as u8)),
            _ => Err(ProtocolError::Malformed { token, context }),
        }
    }

    fn owner(&mut self, context: &'static str) -> Result<Owner, ProtocolError> {
        let token = self.token(context)?;
        match token.parse::<i32>() {
            Ok(-1) => Ok(Owner::Neutral),
            Ok(id) if (0..MAX_FACTIONS as i32).contains(&id) => {
                Ok(Owner::Faction(FactionId(id as u8)))
            }
            _ => Err(ProtocolError::Malformed { token, context }),
        }
    }
}
