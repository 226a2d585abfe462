//! Team state.
//!
//! One team per agent. `version` increases on every write and is what the store's
//! compare-and-swap checks against, so a plan built from a stale read never lands.

use crate::types::{AgentId, PlayerId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub agent_id: AgentId,
    pub players: Vec<PlayerId>,
    pub active: bool,
    pub transfer_used: bool,
    pub version: u64,
    pub updated_at: Timestamp,
}

impl Team {
    pub fn new(agent_id: AgentId, players: Vec<PlayerId>, timestamp: Timestamp) -> Self {
        Self {
            agent_id,
            players,
            active: true,
            transfer_used: false,
            version: 1,
            updated_at: timestamp,
        }
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.players.contains(&player_id)
    }

    pub fn transfer_available(&self) -> bool {
        !self.transfer_used
    }

    /// Swaps one slot in place, keeping every other slot where it was.
    /// Returns false when `out` is not on the roster.
    pub fn replace_player(&mut self, out: PlayerId, incoming: PlayerId) -> bool {
        match self.players.iter().position(|id| *id == out) {
            Some(slot) => {
                self.players[slot] = incoming;
                true
            }
            None => false,
        }
    }

    pub fn kept_players(&self, out: PlayerId) -> Vec<PlayerId> {
        self.players.iter().copied().filter(|id| *id != out).collect()
    }

    // every mutation goes through here
    pub(crate) fn touch(&mut self, timestamp: Timestamp) {
        self.version += 1;
        self.updated_at = timestamp;
    }
}
