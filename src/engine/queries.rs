// 10.7 engine/queries.rs: read-only views.

use super::core::Engine;
use super::results::{EngineError, LeaderboardEntry, TeamView};
use crate::formation::total_cost;
use crate::player::Player;
use crate::store::team_score;
use crate::types::AgentId;
use crate::validation::ValidationError;

impl Engine {
    /// Whole catalog, GK to FWD, most expensive first within a position.
    pub fn list_players(&self) -> Result<Vec<Player>, EngineError> {
        let catalog = self.store.players()?;
        Ok(catalog.sorted_for_listing().into_iter().cloned().collect())
    }

    pub fn team_view(&self, agent_id: AgentId) -> Result<TeamView, EngineError> {
        let catalog = self.store.players()?;
        let teams = self.store.teams()?;
        let agents = self.store.agents()?;

        let team = teams
            .get(&agent_id)
            .filter(|t| t.active)
            .ok_or(ValidationError::NoActiveTeam(agent_id))?;
        let remaining_budget = agents
            .get(agent_id)
            .map(|a| a.remaining_budget)
            .unwrap_or_else(|| self.game.ruleset.budget_ceiling);

        let players: Vec<Player> = catalog.find_many(&team.players).into_iter().cloned().collect();
        Ok(TeamView {
            agent_id,
            total_cost: total_cost(players.iter()),
            remaining_budget,
            transfer_available: team.transfer_available(),
            score: team_score(&catalog, &team.players),
            players,
        })
    }

    pub fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, EngineError> {
        let agents = self.store.agents()?;
        Ok(agents
            .leaderboard()
            .into_iter()
            .map(|a| LeaderboardEntry {
                agent_id: a.id,
                name: a.name.clone(),
                score: a.score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GameConfig;
    use crate::engine::{Engine, EngineConfig};
    use crate::player::NewPlayer;
    use crate::scoring::FixedPoints;
    use crate::types::{PeriodId, PlayerId, Position, Price};
    use rust_decimal_macros::dec;

    fn engine() -> Engine {
        let engine = Engine::new(GameConfig::default(), EngineConfig::default()).unwrap();
        let players = [
            ("Haaland", Position::Forward, dec!(12.0)),
            ("Raya", Position::Goalkeeper, dec!(4.0)),
            ("Saka", Position::Midfielder, dec!(8.0)),
            ("Gabriel", Position::Defender, dec!(5.0)),
            ("Palmer", Position::Midfielder, dec!(8.5)),
            ("Saliba", Position::Defender, dec!(5.5)),
        ];
        for (name, position, price) in players {
            engine
                .add_player(NewPlayer::new(name, "XXX", position, Price::new_unchecked(price)))
                .unwrap();
        }
        engine
    }

    #[test]
    fn players_listed_by_position_then_price() {
        let names: Vec<String> = engine().list_players().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Raya", "Saliba", "Gabriel", "Palmer", "Saka", "Haaland"]);
    }

    #[test]
    fn team_view_reflects_roster_and_score() {
        let engine = engine();
        let agent = engine.register_agent("Scout", "d").unwrap().agent_id;
        assert!(engine.team_view(agent).is_err());

        engine.submit_squad(agent, &["1", "2", "3", "4", "5", "6"]).unwrap();
        let mut source = FixedPoints::new();
        source.set(PeriodId(1), PlayerId(1), 9);
        engine.run_gameweek(PeriodId(1), &mut source).unwrap();

        let view = engine.team_view(agent).unwrap();
        assert_eq!(view.players.len(), 6);
        assert_eq!(view.total_cost.value(), dec!(43.0));
        assert_eq!(view.remaining_budget.value(), dec!(7.0));
        assert!(view.transfer_available);
        assert_eq!(view.score, 9);
    }

    #[test]
    fn leaderboard_includes_agents_without_teams() {
        let engine = engine();
        engine.register_agent("Zed", "d").unwrap();
        engine.register_agent("Amy", "d").unwrap();
        let board = engine.leaderboard().unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].name, "Amy");
    }
}
