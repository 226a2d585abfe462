// 5.0 transfer.rs: transfer engine. swaps exactly one roster slot, like-for-like.
// planning is pure: it reads a team snapshot + catalog snapshot and returns a plan
// that the store commits only if the team version is unchanged.

use crate::formation::{total_cost, Ruleset};
use crate::player::{Player, PlayerCatalog};
use crate::team::Team;
use crate::types::{AgentId, Money, PlayerId, Position, Price};
use crate::validation::{SwapPricing, ValidationError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerBrief {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub price: Price,
}

impl From<&Player> for PlayerBrief {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            position: player.position,
            price: player.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapSummary {
    pub out: PlayerBrief,
    #[serde(rename = "in")]
    pub incoming: PlayerBrief,
}

/** 5.1: a validated swap, not yet applied */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pub agent_id: AgentId,
    // team version the plan was built from
    pub expected_version: u64,
    pub player_out: PlayerId,
    pub player_in: PlayerId,
    pub summary: SwapSummary,
    pub total_cost: Money,
    pub remaining_budget: Money,
}

/// Checks every precondition in order and returns the first violation.
///
/// 1. active team, 2. ids differ, 3. ids well formed, 4. allowance left,
/// 5. outgoing on roster, 6. incoming not on roster, 7. everyone resolves,
/// 8. same position, 9. new total within the ceiling.
pub fn plan_transfer(
    agent_id: AgentId,
    team: Option<&Team>,
    out_raw: &str,
    in_raw: &str,
    ruleset: &Ruleset,
    catalog: &PlayerCatalog,
) -> Result<TransferPlan, ValidationError> {
    let team = match team {
        Some(team) if team.active => team,
        _ => return Err(ValidationError::NoActiveTeam(agent_id)),
    };

    let (out_raw, in_raw) = (out_raw.trim(), in_raw.trim());
    if out_raw == in_raw {
        return Err(ValidationError::SamePlayer);
    }

    let (player_out, player_in) = match (PlayerId::parse(out_raw), PlayerId::parse(in_raw)) {
        (Some(out), Some(incoming)) => (out, incoming),
        (out, incoming) => {
            let mut ids = Vec::new();
            if out.is_none() {
                ids.push(out_raw.to_string());
            }
            if incoming.is_none() {
                ids.push(in_raw.to_string());
            }
            return Err(ValidationError::InvalidPlayerIds { ids });
        }
    };
    if player_out == player_in {
        return Err(ValidationError::SamePlayer);
    }

    if !team.transfer_available() {
        return Err(ValidationError::AllowanceExhausted);
    }

    if !team.contains(player_out) {
        return Err(ValidationError::NotInSquad(player_out));
    }
    if team.contains(player_in) {
        return Err(ValidationError::AlreadyInSquad(player_in));
    }

    let outgoing = catalog.find_by_id(player_out);
    let incoming = catalog.find_by_id(player_in);
    let kept_ids = team.kept_players(player_out);
    let kept = catalog.find_many(&kept_ids);

    let (outgoing, incoming) = match (outgoing, incoming) {
        (Some(o), Some(i)) if kept.len() == kept_ids.len() => (o, i),
        (o, i) => {
            let mut missing: Vec<String> = Vec::new();
            if o.is_none() {
                missing.push(player_out.to_string());
            }
            if i.is_none() {
                missing.push(player_in.to_string());
            }
            missing.extend(
                kept_ids
                    .iter()
                    .filter(|id| catalog.find_by_id(**id).is_none())
                    .map(|id| id.to_string()),
            );
            return Err(ValidationError::PlayersNotFound { ids: missing });
        }
    };

    if outgoing.position != incoming.position {
        return Err(ValidationError::PositionMismatch {
            out_name: outgoing.name.clone(),
            out_position: outgoing.position,
            in_name: incoming.name.clone(),
            in_position: incoming.position,
        });
    }

    let new_total = total_cost(kept.iter().copied()).add(incoming.price.as_money());
    if let Some(overage) = ruleset.overage(new_total) {
        return Err(ValidationError::BudgetExceeded {
            total: new_total,
            ceiling: ruleset.budget_ceiling,
            overage,
            swap: Some(Box::new(SwapPricing {
                out_name: outgoing.name.clone(),
                out_price: outgoing.price,
                in_name: incoming.name.clone(),
                in_price: incoming.price,
            })),
        });
    }

    Ok(TransferPlan {
        agent_id,
        expected_version: team.version,
        player_out,
        player_in,
        summary: SwapSummary {
            out: outgoing.into(),
            incoming: incoming.into(),
        },
        total_cost: new_total,
        remaining_budget: ruleset.remaining_budget(new_total),
    })
}
