// 10.0.1 engine/core.rs: main engine. owns the shared store handle and the audit log.

use super::config::EngineConfig;
use super::results::EngineError;
use crate::config::GameConfig;
use crate::events::{Event, EventLog, EventPayload};
use crate::player::NewPlayer;
use crate::store::Store;
use crate::types::{PlayerId, Price, Timestamp};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/** 10.1: main engine struct. game state lives in the store, shared with whoever hosts it */
#[derive(Debug)]
pub struct Engine {
    pub(super) game: GameConfig,
    pub(super) config: EngineConfig,
    pub(super) store: Arc<Store>,
    events: Mutex<EventLog>,
    // None follows the wall clock
    clock: Mutex<Option<Timestamp>>,
}

impl Engine {
    pub fn new(game: GameConfig, config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_store(game, config, Arc::new(Store::new()))
    }

    pub fn with_store(game: GameConfig, config: EngineConfig, store: Arc<Store>) -> Result<Self, EngineError> {
        game.validate()?;
        let events = Mutex::new(EventLog::new(config.max_events));
        Ok(Self {
            game,
            config,
            store,
            events,
            clock: Mutex::new(None),
        })
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn game_config(&self) -> &GameConfig {
        &self.game
    }

    /// Pins the engine clock, e.g. for reproducible runs.
    pub fn set_time(&self, timestamp: Timestamp) {
        *lock(&self.clock) = Some(timestamp);
    }

    pub fn advance_time(&self, millis: i64) {
        let mut clock = lock(&self.clock);
        let current = (*clock).unwrap_or_else(Timestamp::now);
        *clock = Some(Timestamp::from_millis(current.as_millis() + millis));
    }

    pub fn time(&self) -> Timestamp {
        let pinned = *lock(&self.clock);
        pinned.unwrap_or_else(Timestamp::now)
    }

    pub fn add_player(&self, player: NewPlayer) -> Result<PlayerId, EngineError> {
        let id = self.store.players_mut()?.insert(player);
        debug!(player_id = %id, "player added to catalog");
        Ok(id)
    }

    /// Admin price change. Budgets of teams holding the player follow the new
    /// price; rosters are not revalidated against the ceiling.
    pub fn set_player_price(&self, player_id: PlayerId, price: Price) -> Result<(), EngineError> {
        let repriced = self
            .store
            .reprice_player(player_id, price, &self.game.ruleset, self.time())?;
        debug!(%player_id, %price, teams = repriced.len(), "player repriced");
        Ok(())
    }

    pub fn recent_events(&self, count: usize) -> Vec<Event> {
        lock(&self.events).recent(count)
    }

    pub fn event_count(&self) -> usize {
        lock(&self.events).len()
    }

    pub(super) fn emit_event(&self, payload: EventPayload) {
        let timestamp = self.time();
        if self.config.verbose {
            info!(?payload, "event");
        } else {
            debug!(?payload, "event");
        }
        lock(&self.events).push(timestamp, payload);
    }
}

// the log and clock stay usable even if a writer panicked mid-push
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;
    use crate::validation::ValidationError;
    use rust_decimal_macros::dec;

    fn engine() -> Engine {
        Engine::new(GameConfig::default(), EngineConfig::default()).unwrap()
    }

    #[test]
    fn invalid_game_config_refused() {
        let game = GameConfig {
            max_post_len: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            Engine::new(game, EngineConfig::default()),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn pinned_clock_advances() {
        let engine = engine();
        engine.set_time(Timestamp::from_millis(1_000));
        engine.advance_time(250);
        assert_eq!(engine.time(), Timestamp::from_millis(1_250));
    }

    #[test]
    fn price_change_for_unknown_player() {
        let engine = engine();
        let id = engine
            .add_player(NewPlayer::new("Saka", "ARS", Position::Midfielder, Price::new_unchecked(dec!(8.0))))
            .unwrap();
        engine.set_player_price(id, Price::new_unchecked(dec!(8.5))).unwrap();
        assert_eq!(engine.list_players().unwrap()[0].price.value(), dec!(8.5));

        let err = engine
            .set_player_price(PlayerId(99), Price::new_unchecked(dec!(1.0)))
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(ValidationError::PlayersNotFound { .. })));
    }

    #[test]
    fn price_change_keeps_budget_in_step_with_roster() {
        let engine = engine();
        let players = [
            ("Raya", Position::Goalkeeper, dec!(4.0)),
            ("Gabriel", Position::Defender, dec!(5.0)),
            ("Saliba", Position::Defender, dec!(5.0)),
            ("Saka", Position::Midfielder, dec!(8.0)),
            ("Palmer", Position::Midfielder, dec!(8.5)),
            ("Haaland", Position::Forward, dec!(12.0)),
        ];
        for (name, position, price) in players {
            engine
                .add_player(NewPlayer::new(name, "XXX", position, Price::new_unchecked(price)))
                .unwrap();
        }
        let agent = engine.register_agent("Scout", "d").unwrap().agent_id;
        engine.submit_squad(agent, &["1", "2", "3", "4", "5", "6"]).unwrap();

        engine.set_player_price(PlayerId(6), Price::new_unchecked(dec!(20.0))).unwrap();
        let view = engine.team_view(agent).unwrap();
        let ceiling = engine.game_config().ruleset.budget_ceiling;
        assert_eq!(view.total_cost.value(), dec!(50.5));
        assert_eq!(view.remaining_budget, ceiling.sub(view.total_cost));
        assert_eq!(engine.agent(agent).unwrap().remaining_budget.value(), dec!(-0.5));
    }

    #[test]
    fn event_log_bounded_by_config() {
        let config = EngineConfig {
            max_events: 2,
            ..EngineConfig::default()
        };
        let engine = Engine::new(GameConfig::default(), config).unwrap();
        for name in ["A", "B", "C"] {
            engine.register_agent(name, "d").unwrap();
        }
        assert_eq!(engine.event_count(), 2);
    }
}
