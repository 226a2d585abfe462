// 4.0 squad.rs: squad validator. pure function over a catalog snapshot.
// check order: size, duplicates, id format, existence, formation, budget. first failure wins.

use crate::formation::{total_cost, Ruleset};
use crate::player::PlayerCatalog;
use crate::types::{Money, PlayerId};
use crate::validation::ValidationError;
use serde::Serialize;
use std::collections::HashSet;

/** 4.1: an accepted roster. players keep submission order */
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedSquad {
    pub players: Vec<PlayerId>,
    pub total_cost: Money,
    pub remaining_budget: Money,
}

pub fn validate_squad<S: AsRef<str>>(
    candidate: &[S],
    ruleset: &Ruleset,
    catalog: &PlayerCatalog,
) -> Result<ValidatedSquad, ValidationError> {
    let expected = ruleset.squad_size();
    if candidate.len() != expected {
        return Err(ValidationError::WrongSquadSize {
            expected,
            actual: candidate.len(),
        });
    }

    let raw: Vec<&str> = candidate.iter().map(|s| s.as_ref().trim()).collect();
    let duplicates = find_duplicates(&raw);
    if !duplicates.is_empty() {
        return Err(ValidationError::DuplicatePlayers { ids: duplicates });
    }

    let player_ids = parse_player_ids(&raw)?;

    // "7" and "07" are distinct strings but the same player
    let canonical: Vec<String> = player_ids.iter().map(|id| id.to_string()).collect();
    let canonical_refs: Vec<&str> = canonical.iter().map(String::as_str).collect();
    let duplicates = find_duplicates(&canonical_refs);
    if !duplicates.is_empty() {
        return Err(ValidationError::DuplicatePlayers { ids: duplicates });
    }

    let players = catalog.find_many(&player_ids);
    if players.len() != player_ids.len() {
        let missing = player_ids
            .iter()
            .filter(|id| catalog.find_by_id(**id).is_none())
            .map(|id| id.to_string())
            .collect();
        return Err(ValidationError::PlayersNotFound { ids: missing });
    }

    let mismatches = ruleset
        .formation
        .mismatches(players.iter().map(|p| p.position));
    if !mismatches.is_empty() {
        return Err(ValidationError::FormationViolation {
            required: ruleset.formation.clone(),
            mismatches,
        });
    }

    let total = total_cost(players.iter().copied());
    if let Some(overage) = ruleset.overage(total) {
        return Err(ValidationError::BudgetExceeded {
            total,
            ceiling: ruleset.budget_ceiling,
            overage,
            swap: None,
        });
    }

    Ok(ValidatedSquad {
        players: player_ids,
        total_cost: total,
        remaining_budget: ruleset.remaining_budget(total),
    })
}

/// Parses every id, reporting all malformed ones at once.
pub fn parse_player_ids(raw: &[&str]) -> Result<Vec<PlayerId>, ValidationError> {
    let mut ids = Vec::with_capacity(raw.len());
    let mut invalid = Vec::new();
    for s in raw {
        match PlayerId::parse(s) {
            Some(id) => ids.push(id),
            None => invalid.push((*s).to_string()),
        }
    }
    if invalid.is_empty() {
        Ok(ids)
    } else {
        Err(ValidationError::InvalidPlayerIds { ids: invalid })
    }
}

// each repeated value once, in first-repeat order
fn find_duplicates(values: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for v in values {
        if !seen.insert(*v) && reported.insert(*v) {
            duplicates.push((*v).to_string());
        }
    }
    duplicates
}
