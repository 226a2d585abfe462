// 10.4 engine/simulation.rs: weekly trigger. points in, scores recomputed, allowances reset.

use super::core::Engine;
use super::results::{EngineError, LeaderboardEntry, ScorerLine, SimulationResult};
use crate::events::{EventPayload, GameweekSimulatedEvent};
use crate::player::Player;
use crate::scoring::{GameweekPoints, PointsSource};
use crate::store::PeriodOutcome;
use crate::types::PeriodId;
use tracing::{info, instrument, warn};

impl Engine {
    /// Draws this period's points from `source` and closes the period.
    #[instrument(skip(self, source), fields(source = source.name()))]
    pub fn run_gameweek(&self, period: PeriodId, source: &mut dyn PointsSource) -> Result<SimulationResult, EngineError> {
        self.ensure_period_open(period)?;

        let points: GameweekPoints = {
            let catalog = self.store.players()?;
            let players: Vec<&Player> = catalog.iter().collect();
            source.points_for(period, &players)
        };

        // the store repeats the period check under its own lock, so a racing
        // trigger for the same period still loses here
        let outcome = self.close_period(period, Some(&points))?;
        self.summarize(outcome, source.name())
    }

    /// Recomputes every active team's score from current player points and
    /// restores the weekly transfer allowance.
    #[instrument(skip(self))]
    pub fn on_simulation_complete(&self, period: PeriodId) -> Result<SimulationResult, EngineError> {
        let outcome = self.close_period(period, None)?;
        self.summarize(outcome, "none")
    }

    pub fn last_period(&self) -> Result<Option<PeriodId>, EngineError> {
        Ok(self.store.last_period()?)
    }

    fn ensure_period_open(&self, period: PeriodId) -> Result<(), EngineError> {
        match self.store.last_period()? {
            Some(last) if period <= last => Err(EngineError::PeriodAlreadyProcessed { requested: period, last }),
            _ => Ok(()),
        }
    }

    fn close_period(&self, period: PeriodId, points: Option<&GameweekPoints>) -> Result<PeriodOutcome, EngineError> {
        self.store
            .complete_period(period, points, self.time())
            .map_err(|err| {
                warn!(%period, error = %err, "period not closed");
                EngineError::from(err)
            })
    }

    fn summarize(&self, outcome: PeriodOutcome, source: &str) -> Result<SimulationResult, EngineError> {
        let top_scorers: Vec<ScorerLine> = {
            let catalog = self.store.players()?;
            catalog
                .top_scorers(self.config.top_scorers)
                .into_iter()
                .map(|p| ScorerLine {
                    player_id: p.id,
                    name: p.name.clone(),
                    club: p.club.clone(),
                    total_points: p.total_points,
                })
                .collect()
        };

        let leaderboard: Vec<LeaderboardEntry> = self.leaderboard()?;

        self.emit_event(EventPayload::GameweekSimulated(GameweekSimulatedEvent {
            period: outcome.period,
            source: source.to_string(),
            players_awarded: outcome.players_awarded,
            teams_scored: outcome.scores.len(),
        }));
        info!(
            period = %outcome.period,
            players = outcome.players_awarded,
            teams = outcome.scores.len(),
            "gameweek closed"
        );

        Ok(SimulationResult {
            period: outcome.period,
            source: source.to_string(),
            players_awarded: outcome.players_awarded,
            top_scorers,
            leaderboard,
        })
    }
}
