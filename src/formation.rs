// 3.0 formation.rs: rules shared by the squad validator and the transfer engine.
// a ruleset is a formation (position -> required count) plus a budget ceiling.

use crate::player::Player;
use crate::types::{Money, Position};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/** 3.1: required count per position. positions absent from the map require zero */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formation {
    counts: BTreeMap<Position, usize>,
}

impl Formation {
    pub fn new(gk: usize, def: usize, mid: usize, fwd: usize) -> Self {
        let counts = [
            (Position::Goalkeeper, gk),
            (Position::Defender, def),
            (Position::Midfielder, mid),
            (Position::Forward, fwd),
        ]
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .collect();
        Self { counts }
    }

    pub fn required(&self, position: Position) -> usize {
        self.counts.get(&position).copied().unwrap_or(0)
    }

    pub fn squad_size(&self) -> usize {
        self.counts.values().sum()
    }

    /// Every position whose actual count differs from the requirement,
    /// including positions the formation does not ask for at all.
    pub fn mismatches<I>(&self, positions: I) -> Vec<PositionMismatch>
    where
        I: IntoIterator<Item = Position>,
    {
        let actual = count_positions(positions);
        Position::ALL
            .iter()
            .filter_map(|pos| {
                let required = self.required(*pos);
                let got = actual.get(pos).copied().unwrap_or(0);
                (required != got).then_some(PositionMismatch {
                    position: *pos,
                    required,
                    actual: got,
                })
            })
            .collect()
    }
}

impl fmt::Display for Formation {
    // "1 GK, 2 DEF, 2 MID, 1 FWD"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .counts
            .iter()
            .map(|(pos, n)| format!("{n} {pos}"))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

pub fn count_positions<I>(positions: I) -> BTreeMap<Position, usize>
where
    I: IntoIterator<Item = Position>,
{
    let mut counts = BTreeMap::new();
    for pos in positions {
        *counts.entry(pos).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionMismatch {
    pub position: Position,
    pub required: usize,
    pub actual: usize,
}

impl fmt::Display for PositionMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: need {}, got {}", self.position, self.required, self.actual)
    }
}

/** 3.2: formation + ceiling. the only knobs the validators take */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    pub formation: Formation,
    pub budget_ceiling: Money,
}

impl Ruleset {
    pub fn new(formation: Formation, budget_ceiling: Money) -> Self {
        Self {
            formation,
            budget_ceiling,
        }
    }

    // canonical ruleset: 6-a-side, 1-2-2-1, 50.0 ceiling
    pub fn six_a_side() -> Self {
        Self::new(Formation::new(1, 2, 2, 1), Money::new(dec!(50.0)))
    }

    pub fn five_a_side() -> Self {
        Self::new(Formation::new(1, 1, 2, 1), Money::new(dec!(50.0)))
    }

    pub fn squad_size(&self) -> usize {
        self.formation.squad_size()
    }

    /// Over-budget amount if `total` exceeds the ceiling.
    pub fn overage(&self, total: Money) -> Option<Money> {
        (total > self.budget_ceiling).then(|| total.sub(self.budget_ceiling))
    }

    pub fn remaining_budget(&self, total: Money) -> Money {
        self.budget_ceiling.sub(total)
    }
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::six_a_side()
    }
}

pub fn total_cost<'a, I>(players: I) -> Money
where
    I: IntoIterator<Item = &'a Player>,
{
    players.into_iter().map(|p| p.price.as_money()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_a_side_shape() {
        let rules = Ruleset::six_a_side();
        assert_eq!(rules.squad_size(), 6);
        assert_eq!(rules.formation.required(Position::Defender), 2);
        assert_eq!(rules.formation.to_string(), "1 GK, 2 DEF, 2 MID, 1 FWD");
        assert_eq!(Ruleset::five_a_side().squad_size(), 5);
    }

    #[test]
    fn mismatches_report_every_position() {
        let formation = Formation::new(1, 2, 2, 1);
        let positions = [
            Position::Goalkeeper,
            Position::Goalkeeper,
            Position::Defender,
            Position::Midfielder,
            Position::Midfielder,
            Position::Forward,
        ];
        let mismatches = formation.mismatches(positions);
        assert_eq!(mismatches.len(), 2);
        assert_eq!(mismatches[0].to_string(), "GK: need 1, got 2");
        assert_eq!(mismatches[1].to_string(), "DEF: need 2, got 1");
    }

    #[test]
    fn exact_formation_has_no_mismatch() {
        let formation = Formation::new(1, 1, 2, 1);
        let positions = [
            Position::Midfielder,
            Position::Forward,
            Position::Goalkeeper,
            Position::Midfielder,
            Position::Defender,
        ];
        assert!(formation.mismatches(positions).is_empty());
    }

    #[test]
    fn overage_only_when_strictly_above() {
        let rules = Ruleset::six_a_side();
        assert_eq!(rules.overage(Money::new(dec!(50.0))), None);
        assert_eq!(rules.overage(Money::new(dec!(51.2))), Some(Money::new(dec!(1.2))));
        assert_eq!(rules.remaining_budget(Money::new(dec!(42.5))).value(), dec!(7.5));
    }
}
