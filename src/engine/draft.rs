// 10.2 engine/draft.rs: squad submission. plan against a snapshot, commit conditionally.

use super::core::Engine;
use super::results::{EngineError, SquadResult};
use crate::events::{EventPayload, RejectedRequest, RequestRejectedEvent, SquadSubmittedEvent};
use crate::player::Player;
use crate::squad::{validate_squad, ValidatedSquad};
use crate::types::AgentId;
use tracing::{info, instrument, warn};

/** 10.2.1: a validated roster waiting to be written */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquadPlan {
    pub agent_id: AgentId,
    // team version at planning time, NO_TEAM_VERSION for a first draft
    pub expected_version: u64,
    pub squad: ValidatedSquad,
}

impl Engine {
    /// Validates a candidate roster without writing anything.
    pub fn plan_squad<S: AsRef<str>>(&self, agent_id: AgentId, player_ids: &[S]) -> Result<SquadPlan, EngineError> {
        let catalog = self.store.players()?;
        let expected_version = self.store.team_version(agent_id)?;
        let squad = validate_squad(player_ids, &self.game.ruleset, &catalog)?;
        Ok(SquadPlan {
            agent_id,
            expected_version,
            squad,
        })
    }

    /// Writes a planned roster if the team has not changed since the plan was made.
    pub fn commit_squad(&self, plan: SquadPlan) -> Result<SquadResult, EngineError> {
        let SquadPlan {
            agent_id,
            expected_version,
            squad,
        } = plan;

        let team = self.store.commit_roster(
            agent_id,
            expected_version,
            squad.players.clone(),
            squad.remaining_budget,
            self.time(),
        )?;

        let players: Vec<Player> = {
            let catalog = self.store.players()?;
            catalog.find_many(&team.players).into_iter().cloned().collect()
        };

        self.emit_event(EventPayload::SquadSubmitted(SquadSubmittedEvent {
            agent_id,
            players: team.players.clone(),
            total_cost: squad.total_cost,
            remaining_budget: squad.remaining_budget,
            team_version: team.version,
        }));

        Ok(SquadResult {
            players,
            total_cost: squad.total_cost,
            remaining_budget: squad.remaining_budget,
            team_version: team.version,
        })
    }

    #[instrument(skip(self, player_ids), fields(count = player_ids.len()))]
    pub fn submit_squad<S: AsRef<str>>(&self, agent_id: AgentId, player_ids: &[S]) -> Result<SquadResult, EngineError> {
        let outcome = self
            .plan_squad(agent_id, player_ids)
            .and_then(|plan| self.commit_squad(plan));

        match &outcome {
            Ok(result) => info!(
                total = %result.total_cost,
                remaining = %result.remaining_budget,
                version = result.team_version,
                "squad accepted"
            ),
            Err(err) => {
                warn!(error = %err, "squad rejected");
                self.emit_event(EventPayload::RequestRejected(RequestRejectedEvent {
                    agent_id,
                    request: RejectedRequest::Squad,
                    reason: err.to_string(),
                }));
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GameConfig;
    use crate::engine::{Engine, EngineConfig, EngineError};
    use crate::events::EventPayload;
    use crate::player::NewPlayer;
    use crate::types::{AgentId, Position, Price};
    use crate::validation::ValidationError;
    use rust_decimal_macros::dec;

    fn engine() -> (Engine, AgentId) {
        let engine = Engine::new(GameConfig::default(), EngineConfig::default()).unwrap();
        let roster = [
            ("Raya", Position::Goalkeeper, dec!(4.0)),
            ("Gabriel", Position::Defender, dec!(5.0)),
            ("Saliba", Position::Defender, dec!(5.0)),
            ("Saka", Position::Midfielder, dec!(8.0)),
            ("Palmer", Position::Midfielder, dec!(8.5)),
            ("Haaland", Position::Forward, dec!(12.0)),
            ("Salah", Position::Midfielder, dec!(13.0)),
        ];
        for (name, position, price) in roster {
            engine
                .add_player(NewPlayer::new(name, "XXX", position, Price::new_unchecked(price)))
                .unwrap();
        }
        let reg = engine.register_agent("Scout", "drafts things").unwrap();
        (engine, reg.agent_id)
    }

    #[test]
    fn submit_then_resubmit_is_idempotent() {
        let (engine, agent) = engine();
        let ids = ["1", "2", "3", "4", "5", "6"];
        let first = engine.submit_squad(agent, &ids).unwrap();
        assert_eq!(first.total_cost.value(), dec!(42.5));
        assert_eq!(first.remaining_budget.value(), dec!(7.5));

        let second = engine.submit_squad(agent, &ids).unwrap();
        assert_eq!(second.total_cost, first.total_cost);
        assert_eq!(second.remaining_budget, first.remaining_budget);
        let team = engine.store().team(agent).unwrap().unwrap();
        assert_eq!(team.players.len(), 6);
    }

    #[test]
    fn stale_plan_is_rejected() {
        let (engine, agent) = engine();
        let stale = engine.plan_squad(agent, &["1", "2", "3", "4", "5", "6"]).unwrap();
        engine.submit_squad(agent, &["1", "2", "3", "4", "7", "6"]).unwrap();

        let err = engine.commit_squad(stale).unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::ConcurrentModification { expected: 0, found: 1, .. })
        ));
        // the later roster survives
        let team = engine.store().team(agent).unwrap().unwrap();
        assert!(team.players.contains(&crate::types::PlayerId(7)));
    }

    #[test]
    fn rejection_leaves_state_and_is_logged() {
        let (engine, agent) = engine();
        let err = engine.submit_squad(agent, &["1", "2", "3", "4", "5"]).unwrap_err();
        assert!(matches!(err, EngineError::Validation(ValidationError::WrongSquadSize { .. })));
        assert!(engine.store().team(agent).unwrap().is_none());
        let budget = engine.store().agents().unwrap().get(agent).unwrap().remaining_budget;
        assert_eq!(budget.value(), dec!(50.0));
        assert!(matches!(
            engine.recent_events(1)[0].payload,
            EventPayload::RequestRejected(_)
        ));
    }
}
