// 10.3 engine/transfers.rs: weekly one-for-one swaps.

use super::core::Engine;
use super::results::{EngineError, TransferResult};
use crate::events::{EventPayload, RejectedRequest, RequestRejectedEvent, TransferCompletedEvent};
use crate::player::Player;
use crate::transfer::{self, TransferPlan};
use crate::types::AgentId;
use tracing::{info, instrument, warn};

impl Engine {
    pub fn plan_transfer(&self, agent_id: AgentId, player_out: &str, player_in: &str) -> Result<TransferPlan, EngineError> {
        // catalog and team read under guards held together: one snapshot
        let catalog = self.store.players()?;
        let teams = self.store.teams()?;
        let plan = transfer::plan_transfer(
            agent_id,
            teams.get(&agent_id),
            player_out,
            player_in,
            &self.game.ruleset,
            &catalog,
        )?;
        Ok(plan)
    }

    pub fn commit_transfer(&self, plan: TransferPlan) -> Result<TransferResult, EngineError> {
        let team = self.store.commit_transfer(&plan, self.time())?;

        let players: Vec<Player> = {
            let catalog = self.store.players()?;
            catalog.find_many(&team.players).into_iter().cloned().collect()
        };

        self.emit_event(EventPayload::TransferCompleted(TransferCompletedEvent {
            agent_id: plan.agent_id,
            player_out: plan.player_out,
            player_in: plan.player_in,
            total_cost: plan.total_cost,
            remaining_budget: plan.remaining_budget,
            team_version: team.version,
        }));

        Ok(TransferResult {
            transfer: plan.summary,
            players,
            total_cost: plan.total_cost,
            remaining_budget: plan.remaining_budget,
            team_version: team.version,
        })
    }

    #[instrument(skip(self))]
    pub fn request_transfer(&self, agent_id: AgentId, player_out: &str, player_in: &str) -> Result<TransferResult, EngineError> {
        let outcome = self
            .plan_transfer(agent_id, player_out, player_in)
            .and_then(|plan| self.commit_transfer(plan));

        match &outcome {
            Ok(result) => info!(
                out = %result.transfer.out.name,
                incoming = %result.transfer.incoming.name,
                remaining = %result.remaining_budget,
                "transfer completed"
            ),
            Err(err) => {
                warn!(error = %err, "transfer rejected");
                self.emit_event(EventPayload::RequestRejected(RequestRejectedEvent {
                    agent_id,
                    request: RejectedRequest::Transfer,
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
    use crate::engine::{Engine, EngineConfig};
    use crate::player::NewPlayer;
    use crate::types::{AgentId, PeriodId, PlayerId, Position, Price};
    use crate::validation::{ErrorKind, ValidationError};
    use rust_decimal_macros::dec;

    // 1..=6 drafted (42.5, MID 5 at 7.0); 7: MID 10.5; 8: FWD 6.0
    fn drafted() -> (Engine, AgentId) {
        let engine = Engine::new(GameConfig::default(), EngineConfig::default()).unwrap();
        let players = [
            ("Raya", Position::Goalkeeper, dec!(5.0)),
            ("Gabriel", Position::Defender, dec!(5.0)),
            ("Gvardiol", Position::Defender, dec!(5.5)),
            ("Saka", Position::Midfielder, dec!(8.0)),
            ("Mbeumo", Position::Midfielder, dec!(7.0)),
            ("Haaland", Position::Forward, dec!(12.0)),
            ("Palmer", Position::Midfielder, dec!(10.5)),
            ("Wissa", Position::Forward, dec!(6.0)),
        ];
        for (name, position, price) in players {
            engine
                .add_player(NewPlayer::new(name, "XXX", position, Price::new_unchecked(price)))
                .unwrap();
        }
        let agent = engine.register_agent("Scout", "swaps things").unwrap().agent_id;
        engine.submit_squad(agent, &["1", "2", "3", "4", "5", "6"]).unwrap();
        (engine, agent)
    }

    #[test]
    fn transfer_updates_roster_and_budget() {
        let (engine, agent) = drafted();
        let result = engine.request_transfer(agent, "5", "7").unwrap();
        assert_eq!(result.total_cost.value(), dec!(46.0));
        assert_eq!(result.remaining_budget.value(), dec!(4.0));
        assert_eq!(result.transfer.out.name, "Mbeumo");
        assert_eq!(result.transfer.incoming.name, "Palmer");

        let team = engine.store().team(agent).unwrap().unwrap();
        assert!(team.contains(PlayerId(7)));
        assert!(!team.contains(PlayerId(5)));
        assert!(team.transfer_used);
        let budget = engine.store().agents().unwrap().get(agent).unwrap().remaining_budget;
        assert_eq!(budget.value(), dec!(4.0));
    }

    #[test]
    fn second_transfer_needs_a_new_period() {
        let (engine, agent) = drafted();
        engine.request_transfer(agent, "5", "7").unwrap();
        let err = engine.request_transfer(agent, "6", "8").unwrap_err();
        assert_eq!(err.as_validation().map(|e| e.kind()), Some(ErrorKind::AllowanceExhausted));

        engine.on_simulation_complete(PeriodId(1)).unwrap();
        assert!(engine.request_transfer(agent, "6", "8").is_ok());
    }

    #[test]
    fn plan_from_before_simulation_cannot_commit() {
        let (engine, agent) = drafted();
        let plan = engine.plan_transfer(agent, "5", "7").unwrap();
        engine.on_simulation_complete(PeriodId(1)).unwrap();
        let err = engine.commit_transfer(plan).unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::ConcurrentModification { .. })
        ));
    }

    #[test]
    fn transfer_without_team() {
        let (engine, _) = drafted();
        let other = engine.register_agent("Idle", "never drafted").unwrap().agent_id;
        let err = engine.request_transfer(other, "5", "7").unwrap_err();
        assert_eq!(err.as_validation(), Some(&ValidationError::NoActiveTeam(other)));
    }
}
