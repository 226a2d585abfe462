//! Rejections produced by the squad validator and the transfer engine.
//!
//! Every variant carries enough detail for the caller to fix the request without
//! a second query: the offending ids, required vs actual counts, exact overage.
//! `title()` is the short error string, `hint()` the remediation text that goes
//! out in the error envelope.

use crate::formation::{Formation, PositionMismatch};
use crate::types::{AgentId, Money, PlayerId, Position, Price};
use serde::{Deserialize, Serialize};

/// Coarse classification of a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MalformedInput,
    NotFound,
    FormationViolation,
    BudgetExceeded,
    AllowanceExhausted,
    PositionMismatch,
    ConcurrentModification,
}

// names and prices of both sides of a rejected swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPricing {
    pub out_name: String,
    pub out_price: Price,
    pub in_name: String,
    pub in_price: Price,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid team size: expected {expected}, got {actual}")]
    WrongSquadSize { expected: usize, actual: usize },

    #[error("Duplicate players: {}", .ids.join(", "))]
    DuplicatePlayers { ids: Vec<String> },

    #[error("Invalid player IDs: {}", .ids.join(", "))]
    InvalidPlayerIds { ids: Vec<String> },

    #[error("Same player on both sides of the transfer")]
    SamePlayer,

    #[error("Player {0} already in squad")]
    AlreadyInSquad(PlayerId),

    #[error("Players not found: {}", .ids.join(", "))]
    PlayersNotFound { ids: Vec<String> },

    #[error("No active team for agent {0}")]
    NoActiveTeam(AgentId),

    #[error("Player {0} not in squad")]
    NotInSquad(PlayerId),

    #[error("Invalid formation: {}", format_mismatches(.mismatches))]
    FormationViolation {
        required: Formation,
        mismatches: Vec<PositionMismatch>,
    },

    #[error("Over budget: total {total} exceeds {ceiling} by {overage}")]
    BudgetExceeded {
        total: Money,
        ceiling: Money,
        overage: Money,
        swap: Option<Box<SwapPricing>>,
    },

    #[error("Transfer already used this period")]
    AllowanceExhausted,

    #[error("Position mismatch: {out_position} {out_name} for {in_position} {in_name}")]
    PositionMismatch {
        out_name: String,
        out_position: Position,
        in_name: String,
        in_position: Position,
    },

    #[error("Team for agent {agent_id} changed (expected version {expected}, found {found})")]
    ConcurrentModification {
        agent_id: AgentId,
        expected: u64,
        found: u64,
    },
}

fn format_mismatches(mismatches: &[PositionMismatch]) -> String {
    mismatches
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::WrongSquadSize { .. }
            | Self::DuplicatePlayers { .. }
            | Self::InvalidPlayerIds { .. }
            | Self::SamePlayer
            | Self::AlreadyInSquad(_) => ErrorKind::MalformedInput,
            Self::PlayersNotFound { .. } | Self::NoActiveTeam(_) | Self::NotInSquad(_) => {
                ErrorKind::NotFound
            }
            Self::FormationViolation { .. } => ErrorKind::FormationViolation,
            Self::BudgetExceeded { .. } => ErrorKind::BudgetExceeded,
            Self::AllowanceExhausted => ErrorKind::AllowanceExhausted,
            Self::PositionMismatch { .. } => ErrorKind::PositionMismatch,
            Self::ConcurrentModification { .. } => ErrorKind::ConcurrentModification,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::WrongSquadSize { .. } => "Invalid team size",
            Self::DuplicatePlayers { .. } => "Duplicate players",
            Self::InvalidPlayerIds { .. } => "Invalid player IDs",
            Self::SamePlayer => "Same player",
            Self::AlreadyInSquad(_) => "Player already in squad",
            Self::PlayersNotFound { .. } => "Players not found",
            Self::NoActiveTeam(_) => "No team found",
            Self::NotInSquad(_) => "Player not in squad",
            Self::FormationViolation { .. } => "Invalid formation",
            Self::BudgetExceeded { .. } => "Over budget",
            Self::AllowanceExhausted => "Transfer already used",
            Self::PositionMismatch { .. } => "Position mismatch",
            Self::ConcurrentModification { .. } => "Concurrent modification",
        }
    }

    pub fn hint(&self) -> String {
        match self {
            Self::WrongSquadSize { expected, actual } => format!(
                "Provide exactly {expected} player IDs in the \"playerIds\" array. You sent {actual}."
            ),
            Self::DuplicatePlayers { ids } => format!(
                "All players must be unique. Repeated: {}.",
                ids.join(", ")
            ),
            Self::InvalidPlayerIds { ids } => format!(
                "Player IDs are positive integers. These are not valid: {}",
                ids.join(", ")
            ),
            Self::SamePlayer => {
                "playerOutId and playerInId cannot be the same player.".to_string()
            }
            Self::AlreadyInSquad(id) => format!(
                "Player \"{id}\" is already in your team. Pick a different player to bring in."
            ),
            Self::PlayersNotFound { ids } => format!(
                "These player IDs do not exist in the catalog: {}",
                ids.join(", ")
            ),
            Self::NoActiveTeam(_) => {
                "You must submit a full squad before making transfers.".to_string()
            }
            Self::NotInSquad(id) => format!(
                "Player \"{id}\" is not in your current team. Check your squad before transferring."
            ),
            Self::FormationViolation {
                required,
                mismatches,
            } => format!(
                "Required formation is {required}. Problems: {}.",
                format_mismatches(mismatches)
            ),
            Self::BudgetExceeded {
                total,
                ceiling,
                overage,
                swap,
            } => match swap {
                Some(swap) => format!(
                    "Swapping {} ({}) for {} ({}) would bring your squad total to {total}, which is {overage} over the {ceiling} limit.",
                    swap.out_name, swap.out_price, swap.in_name, swap.in_price
                ),
                None => format!(
                    "Total cost is {total}, which is {overage} over the {ceiling} limit. Drop a premium player or find cheaper alternatives."
                ),
            },
            Self::AllowanceExhausted => "You have already used your free transfer this game week. Wait for the next simulation to reset it.".to_string(),
            Self::PositionMismatch {
                out_name,
                out_position,
                in_name,
                in_position,
            } => format!(
                "Cannot swap a {out_position} ({out_name}) for a {in_position} ({in_name}). Transfers must be like-for-like positions."
            ),
            Self::ConcurrentModification { .. } => {
                "Your team changed while this request was processed. Re-read your team and retry.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn kinds_group_variants() {
        assert_eq!(ValidationError::SamePlayer.kind(), ErrorKind::MalformedInput);
        assert_eq!(
            ValidationError::NotInSquad(PlayerId(3)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ValidationError::AllowanceExhausted.kind(),
            ErrorKind::AllowanceExhausted
        );
    }

    #[test]
    fn budget_hint_reports_overage() {
        let err = ValidationError::BudgetExceeded {
            total: Money::new(dec!(51.2)),
            ceiling: Money::new(dec!(50.0)),
            overage: Money::new(dec!(1.2)),
            swap: None,
        };
        let hint = err.hint();
        assert!(hint.contains("£51.2M"));
        assert!(hint.contains("£1.2M over"));
        assert!(hint.contains("£50.0M limit"));
    }

    #[test]
    fn formation_hint_lists_problems() {
        let err = ValidationError::FormationViolation {
            required: Formation::new(1, 2, 2, 1),
            mismatches: vec![
                PositionMismatch {
                    position: Position::Defender,
                    required: 2,
                    actual: 1,
                },
                PositionMismatch {
                    position: Position::Forward,
                    required: 1,
                    actual: 2,
                },
            ],
        };
        assert_eq!(
            err.hint(),
            "Required formation is 1 GK, 2 DEF, 2 MID, 1 FWD. Problems: DEF: need 2, got 1; FWD: need 1, got 2."
        );
    }
}
