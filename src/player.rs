//! Player catalog.
//!
//! Read-mostly reference data. Prices and accumulated points only change through
//! admin updates and the gameweek trigger; validators read a whole snapshot under
//! one guard so multi-player lookups never straddle an update.

use crate::types::{PlayerId, Position, Price};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub club: String,
    pub position: Position,
    pub price: Price,
    pub total_points: u32,
}

// Catalog entry before an id is assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    pub club: String,
    pub position: Position,
    pub price: Price,
}

impl NewPlayer {
    pub fn new(name: impl Into<String>, club: impl Into<String>, position: Position, price: Price) -> Self {
        Self {
            name: name.into(),
            club: club.into(),
            position,
            price,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlayerCatalog {
    players: BTreeMap<PlayerId, Player>,
    next_id: u32,
}

impl PlayerCatalog {
    pub fn new() -> Self {
        Self {
            players: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn insert(&mut self, player: NewPlayer) -> PlayerId {
        let id = PlayerId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        self.players.insert(
            id,
            Player {
                id,
                name: player.name,
                club: player.club,
                position: player.position,
                price: player.price,
                total_points: 0,
            },
        );
        id
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn find_by_id(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Resolves every id it can. Missing ids are simply absent from the result,
    /// callers diff against their input to report them.
    pub fn find_many(&self, ids: &[PlayerId]) -> Vec<&Player> {
        ids.iter().filter_map(|id| self.players.get(id)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Listing order: GK, DEF, MID, FWD, most expensive first within a position.
    pub fn sorted_for_listing(&self) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.players.values().collect();
        players.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then_with(|| b.price.cmp(&a.price))
                .then_with(|| a.id.cmp(&b.id))
        });
        players
    }

    pub fn set_price(&mut self, id: PlayerId, price: Price) -> Result<(), CatalogError> {
        let player = self
            .players
            .get_mut(&id)
            .ok_or(CatalogError::PlayerNotFound(id))?;
        player.price = price;
        Ok(())
    }

    // points only accumulate
    pub fn award_points(&mut self, id: PlayerId, points: u32) -> Result<u32, CatalogError> {
        let player = self
            .players
            .get_mut(&id)
            .ok_or(CatalogError::PlayerNotFound(id))?;
        player.total_points = player.total_points.saturating_add(points);
        Ok(player.total_points)
    }

    /// Highest accumulated points first, ties broken by id.
    pub fn top_scorers(&self, count: usize) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.players.values().collect();
        players.sort_by(|a, b| b.total_points.cmp(&a.total_points).then_with(|| a.id.cmp(&b.id)));
        players.truncate(count);
        players
    }

    pub fn position_breakdown(&self) -> BTreeMap<Position, usize> {
        let mut breakdown = BTreeMap::new();
        for player in self.players.values() {
            *breakdown.entry(player.position).or_insert(0) += 1;
        }
        breakdown
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Player {0} not found")]
    PlayerNotFound(PlayerId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn catalog() -> PlayerCatalog {
        let mut catalog = PlayerCatalog::new();
        catalog.insert(NewPlayer::new("Salah", "LIV", Position::Midfielder, Price::new_unchecked(dec!(12.5))));
        catalog.insert(NewPlayer::new("Raya", "ARS", Position::Goalkeeper, Price::new_unchecked(dec!(5.5))));
        catalog.insert(NewPlayer::new("Palmer", "CHE", Position::Midfielder, Price::new_unchecked(dec!(10.5))));
        catalog.insert(NewPlayer::new("Gabriel", "ARS", Position::Defender, Price::new_unchecked(dec!(6.0))));
        catalog
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.find_by_id(PlayerId(1)).unwrap().name, "Salah");
        assert_eq!(catalog.find_by_id(PlayerId(4)).unwrap().name, "Gabriel");
        assert!(catalog.find_by_id(PlayerId(5)).is_none());
    }

    #[test]
    fn find_many_returns_partial_results() {
        let catalog = catalog();
        let found = catalog.find_many(&[PlayerId(1), PlayerId(42), PlayerId(3)]);
        let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Salah", "Palmer"]);
    }

    #[test]
    fn listing_sorted_by_position_then_price_desc() {
        let catalog = catalog();
        let names: Vec<&str> = catalog
            .sorted_for_listing()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Raya", "Gabriel", "Salah", "Palmer"]);
    }

    #[test]
    fn points_accumulate() {
        let mut catalog = catalog();
        assert_eq!(catalog.award_points(PlayerId(1), 7).unwrap(), 7);
        assert_eq!(catalog.award_points(PlayerId(1), 3).unwrap(), 10);
        assert_eq!(
            catalog.award_points(PlayerId(99), 1),
            Err(CatalogError::PlayerNotFound(PlayerId(99)))
        );
        assert_eq!(catalog.top_scorers(1)[0].name, "Salah");
    }

    #[test]
    fn breakdown_counts_positions() {
        let breakdown = catalog().position_breakdown();
        assert_eq!(breakdown[&Position::Midfielder], 2);
        assert_eq!(breakdown.get(&Position::Forward), None);
    }
}
