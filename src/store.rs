//! In-memory agent/team store.
//!
//! The hosting process builds one `Store`, wraps it in an `Arc` and hands it to
//! the engine; dropping the last handle tears it down. Every collection sits
//! behind its own `RwLock` and locks are always taken in the same order:
//!
//!   period -> players -> teams -> agents -> forum
//!
//! Roster writes are conditional on the team version the caller read, and the
//! agent's cached budget is written under the same guards as the roster, so no
//! reader ever sees a roster and budget that disagree.

use crate::agent::AgentRegistry;
use crate::formation::{total_cost, Ruleset};
use crate::forum::Forum;
use crate::player::PlayerCatalog;
use crate::scoring::GameweekPoints;
use crate::team::Team;
use crate::transfer::TransferPlan;
use crate::types::{AgentId, Money, PeriodId, PlayerId, Price, Timestamp};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

// version reported for an agent that has no team yet
pub const NO_TEAM_VERSION: u64 = 0;

#[derive(Debug, Default)]
pub struct Store {
    last_period: Mutex<Option<PeriodId>>,
    players: RwLock<PlayerCatalog>,
    teams: RwLock<HashMap<AgentId, Team>>,
    agents: RwLock<AgentRegistry>,
    forum: RwLock<Forum>,
}

/// Per-team outcome of closing a period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamScore {
    pub agent_id: AgentId,
    pub score: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodOutcome {
    pub period: PeriodId,
    pub players_awarded: usize,
    pub scores: Vec<TeamScore>,
}

fn read<'a, T>(lock: &'a RwLock<T>, name: &'static str) -> Result<RwLockReadGuard<'a, T>, StoreError> {
    lock.read().map_err(|_| StoreError::LockPoisoned(name))
}

fn write<'a, T>(lock: &'a RwLock<T>, name: &'static str) -> Result<RwLockWriteGuard<'a, T>, StoreError> {
    lock.write().map_err(|_| StoreError::LockPoisoned(name))
}

impl Store {
    pub fn new() -> Self {
        Self::with_catalog(PlayerCatalog::new())
    }

    pub fn with_catalog(catalog: PlayerCatalog) -> Self {
        Self {
            last_period: Mutex::new(None),
            players: RwLock::new(catalog),
            teams: RwLock::new(HashMap::new()),
            agents: RwLock::new(AgentRegistry::new()),
            forum: RwLock::new(Forum::new()),
        }
    }

    pub fn players(&self) -> Result<RwLockReadGuard<'_, PlayerCatalog>, StoreError> {
        read(&self.players, "players")
    }

    pub fn players_mut(&self) -> Result<RwLockWriteGuard<'_, PlayerCatalog>, StoreError> {
        write(&self.players, "players")
    }

    pub fn teams(&self) -> Result<RwLockReadGuard<'_, HashMap<AgentId, Team>>, StoreError> {
        read(&self.teams, "teams")
    }

    pub fn agents(&self) -> Result<RwLockReadGuard<'_, AgentRegistry>, StoreError> {
        read(&self.agents, "agents")
    }

    pub fn agents_mut(&self) -> Result<RwLockWriteGuard<'_, AgentRegistry>, StoreError> {
        write(&self.agents, "agents")
    }

    pub fn forum(&self) -> Result<RwLockReadGuard<'_, Forum>, StoreError> {
        read(&self.forum, "forum")
    }

    pub fn forum_mut(&self) -> Result<RwLockWriteGuard<'_, Forum>, StoreError> {
        write(&self.forum, "forum")
    }

    fn period(&self) -> Result<MutexGuard<'_, Option<PeriodId>>, StoreError> {
        self.last_period
            .lock()
            .map_err(|_| StoreError::LockPoisoned("period"))
    }

    pub fn last_period(&self) -> Result<Option<PeriodId>, StoreError> {
        Ok(*self.period()?)
    }

    pub fn team(&self, agent_id: AgentId) -> Result<Option<Team>, StoreError> {
        Ok(self.teams()?.get(&agent_id).cloned())
    }

    pub fn team_version(&self, agent_id: AgentId) -> Result<u64, StoreError> {
        Ok(self
            .teams()?
            .get(&agent_id)
            .map_or(NO_TEAM_VERSION, |t| t.version))
    }

    /// Replaces (or creates) the agent's roster in one conditional write.
    /// `expected_version` is what the caller read, `NO_TEAM_VERSION` if there was no team.
    pub fn commit_roster(
        &self,
        agent_id: AgentId,
        expected_version: u64,
        players: Vec<PlayerId>,
        remaining_budget: Money,
        now: Timestamp,
    ) -> Result<Team, StoreError> {
        let mut teams = write(&self.teams, "teams")?;
        let mut agents = write(&self.agents, "agents")?;

        if agents.get(agent_id).is_none() {
            return Err(StoreError::AgentNotFound(agent_id));
        }
        let found = teams.get(&agent_id).map_or(NO_TEAM_VERSION, |t| t.version);
        if found != expected_version {
            return Err(StoreError::Conflict {
                agent_id,
                expected: expected_version,
                found,
            });
        }

        let team = match teams.get_mut(&agent_id) {
            Some(team) => {
                team.players = players;
                team.active = true;
                team.touch(now);
                team.clone()
            }
            None => {
                let team = Team::new(agent_id, players, now);
                teams.insert(agent_id, team.clone());
                team
            }
        };
        agents
            .update_budget(agent_id, remaining_budget)
            .map_err(|_| StoreError::AgentNotFound(agent_id))?;
        Ok(team)
    }

    /// Applies a planned swap if the team is still at the version the plan read.
    pub fn commit_transfer(&self, plan: &TransferPlan, now: Timestamp) -> Result<Team, StoreError> {
        let mut teams = write(&self.teams, "teams")?;
        let mut agents = write(&self.agents, "agents")?;

        if agents.get(plan.agent_id).is_none() {
            return Err(StoreError::AgentNotFound(plan.agent_id));
        }
        let team = teams
            .get_mut(&plan.agent_id)
            .ok_or(StoreError::TeamMissing(plan.agent_id))?;
        if team.version != plan.expected_version {
            return Err(StoreError::Conflict {
                agent_id: plan.agent_id,
                expected: plan.expected_version,
                found: team.version,
            });
        }
        if !team.replace_player(plan.player_out, plan.player_in) {
            // same version means same roster, so this only trips on a corrupt plan
            return Err(StoreError::Conflict {
                agent_id: plan.agent_id,
                expected: plan.expected_version,
                found: team.version,
            });
        }
        team.transfer_used = true;
        team.touch(now);
        let team = team.clone();

        agents
            .update_budget(plan.agent_id, plan.remaining_budget)
            .map_err(|_| StoreError::AgentNotFound(plan.agent_id))?;
        Ok(team)
    }

    /// Changes a player's price and re-derives the cached budget of every active
    /// team holding them, under the same guards. Those teams get a new version,
    /// so a plan priced before the change cannot commit after it.
    /// Rosters pushed over the ceiling are kept; their budget goes negative.
    pub fn reprice_player(
        &self,
        player_id: PlayerId,
        price: Price,
        ruleset: &Ruleset,
        now: Timestamp,
    ) -> Result<Vec<AgentId>, StoreError> {
        let mut players = write(&self.players, "players")?;
        let mut teams = write(&self.teams, "teams")?;
        let mut agents = write(&self.agents, "agents")?;

        players
            .set_price(player_id, price)
            .map_err(|_| StoreError::PlayerNotFound(player_id))?;

        let mut repriced = Vec::new();
        for team in teams.values_mut().filter(|t| t.active && t.contains(player_id)) {
            let remaining = ruleset.remaining_budget(total_cost(players.find_many(&team.players)));
            if agents.update_budget(team.agent_id, remaining).is_ok() {
                repriced.push(team.agent_id);
            }
            team.touch(now);
        }
        repriced.sort();
        Ok(repriced)
    }

    /// Closes a period: optionally awards points, then recomputes every active
    /// team's score from current player points and resets transfer allowances.
    /// All of it happens under one set of guards. A period at or before the last
    /// completed one is refused, so nothing is counted twice.
    pub fn complete_period(
        &self,
        period: PeriodId,
        points: Option<&GameweekPoints>,
        now: Timestamp,
    ) -> Result<PeriodOutcome, StoreError> {
        let mut last = self.period()?;
        if let Some(last_period) = *last {
            if period <= last_period {
                return Err(StoreError::PeriodAlreadyProcessed {
                    requested: period,
                    last: last_period,
                });
            }
        }

        let mut players = write(&self.players, "players")?;
        let mut teams = write(&self.teams, "teams")?;
        let mut agents = write(&self.agents, "agents")?;

        let mut players_awarded = 0;
        if let Some(points) = points {
            for (player_id, pts) in points {
                // points for players no longer in the catalog are dropped
                if players.award_points(*player_id, *pts).is_ok() {
                    players_awarded += 1;
                }
            }
        }

        let mut scores = Vec::new();
        for team in teams.values_mut().filter(|t| t.active) {
            let score = team_score(&players, &team.players);
            // teams whose agent vanished keep their state but get no score
            if agents.update_score(team.agent_id, score).is_ok() {
                scores.push(TeamScore {
                    agent_id: team.agent_id,
                    score,
                });
            }
            team.transfer_used = false;
            team.touch(now);
        }
        scores.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.agent_id.cmp(&b.agent_id)));

        *last = Some(period);
        Ok(PeriodOutcome {
            period,
            players_awarded,
            scores,
        })
    }
}

/// A team's score is the sum of its players' accumulated points, nothing carried over.
pub fn team_score(catalog: &PlayerCatalog, players: &[PlayerId]) -> u64 {
    catalog
        .find_many(players)
        .iter()
        .map(|p| u64::from(p.total_points))
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Store lock '{0}' poisoned")]
    LockPoisoned(&'static str),

    #[error("Team for agent {agent_id} is at version {found}, expected {expected}")]
    Conflict { agent_id: AgentId, expected: u64, found: u64 },

    #[error("Agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("Agent {0} has no team")]
    TeamMissing(AgentId),

    #[error("Player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("Period {requested} already processed (last completed {last})")]
    PeriodAlreadyProcessed { requested: PeriodId, last: PeriodId },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::NewPlayer;
    use crate::types::{Position, Price};
    use rust_decimal_macros::dec;

    fn store_with_agent() -> (Store, AgentId) {
        let mut catalog = PlayerCatalog::new();
        for i in 0..4 {
            catalog.insert(NewPlayer::new(
                format!("P{i}"),
                "XXX",
                Position::Midfielder,
                Price::new_unchecked(dec!(5.0)),
            ));
        }
        let store = Store::with_catalog(catalog);
        let agent_id = store
            .agents_mut()
            .unwrap()
            .register("Scout", "d", Money::new(dec!(50.0)), Timestamp::from_millis(0))
            .unwrap()
            .id;
        (store, agent_id)
    }

    #[test]
    fn roster_commit_creates_then_replaces() {
        let (store, agent) = store_with_agent();
        let t0 = Timestamp::from_millis(1);
        let team = store
            .commit_roster(agent, NO_TEAM_VERSION, vec![PlayerId(1), PlayerId(2)], Money::new(dec!(40.0)), t0)
            .unwrap();
        assert_eq!(team.version, 1);

        let team = store
            .commit_roster(agent, 1, vec![PlayerId(3), PlayerId(4)], Money::new(dec!(40.0)), t0)
            .unwrap();
        assert_eq!(team.version, 2);
        assert_eq!(team.players, vec![PlayerId(3), PlayerId(4)]);
        assert_eq!(store.agents().unwrap().get(agent).unwrap().remaining_budget.value(), dec!(40.0));
    }

    #[test]
    fn stale_roster_commit_conflicts() {
        let (store, agent) = store_with_agent();
        let t0 = Timestamp::from_millis(1);
        store
            .commit_roster(agent, NO_TEAM_VERSION, vec![PlayerId(1)], Money::new(dec!(45.0)), t0)
            .unwrap();
        let err = store
            .commit_roster(agent, NO_TEAM_VERSION, vec![PlayerId(2)], Money::new(dec!(45.0)), t0)
            .unwrap_err();
        assert_eq!(err, StoreError::Conflict { agent_id: agent, expected: 0, found: 1 });
        assert_eq!(store.team(agent).unwrap().unwrap().players, vec![PlayerId(1)]);
    }

    #[test]
    fn roster_commit_for_unknown_agent() {
        let (store, _) = store_with_agent();
        let err = store
            .commit_roster(AgentId(99), NO_TEAM_VERSION, vec![], Money::zero(), Timestamp::from_millis(0))
            .unwrap_err();
        assert_eq!(err, StoreError::AgentNotFound(AgentId(99)));
    }

    #[test]
    fn period_scores_are_recomputed_not_accumulated() {
        let (store, agent) = store_with_agent();
        store
            .commit_roster(agent, NO_TEAM_VERSION, vec![PlayerId(1), PlayerId(2)], Money::new(dec!(40.0)), Timestamp::from_millis(0))
            .unwrap();

        let mut points = GameweekPoints::new();
        points.insert(PlayerId(1), 6);
        points.insert(PlayerId(2), 4);
        points.insert(PlayerId(3), 10); // not on the team
        let outcome = store
            .complete_period(PeriodId(1), Some(&points), Timestamp::from_millis(1))
            .unwrap();
        assert_eq!(outcome.scores, vec![TeamScore { agent_id: agent, score: 10 }]);
        assert_eq!(outcome.players_awarded, 3);

        // no new points: score stays at the sum, not doubled
        let outcome = store.complete_period(PeriodId(2), None, Timestamp::from_millis(2)).unwrap();
        assert_eq!(outcome.scores[0].score, 10);
        assert_eq!(store.agents().unwrap().get(agent).unwrap().score, 10);
    }

    #[test]
    fn reprice_rederives_budget_of_holding_teams() {
        let (store, agent) = store_with_agent();
        let other = store
            .agents_mut()
            .unwrap()
            .register("Other", "d", Money::new(dec!(50.0)), Timestamp::from_millis(0))
            .unwrap()
            .id;
        let ruleset = Ruleset::six_a_side();
        let t0 = Timestamp::from_millis(0);
        store
            .commit_roster(agent, NO_TEAM_VERSION, vec![PlayerId(1), PlayerId(2)], Money::new(dec!(40.0)), t0)
            .unwrap();
        store
            .commit_roster(other, NO_TEAM_VERSION, vec![PlayerId(3), PlayerId(4)], Money::new(dec!(40.0)), t0)
            .unwrap();

        let repriced = store
            .reprice_player(PlayerId(2), Price::new_unchecked(dec!(7.5)), &ruleset, t0)
            .unwrap();
        assert_eq!(repriced, vec![agent]);

        let agents = store.agents().unwrap();
        assert_eq!(agents.get(agent).unwrap().remaining_budget.value(), dec!(37.5));
        assert_eq!(agents.get(other).unwrap().remaining_budget.value(), dec!(40.0));
        drop(agents);
        assert_eq!(store.team_version(agent).unwrap(), 2);
        assert_eq!(store.team_version(other).unwrap(), 1);

        assert_eq!(
            store
                .reprice_player(PlayerId(99), Price::new_unchecked(dec!(1.0)), &ruleset, t0)
                .unwrap_err(),
            StoreError::PlayerNotFound(PlayerId(99))
        );
    }

    #[test]
    fn repeated_period_refused() {
        let (store, _) = store_with_agent();
        store.complete_period(PeriodId(3), None, Timestamp::from_millis(0)).unwrap();
        assert_eq!(
            store.complete_period(PeriodId(3), None, Timestamp::from_millis(0)).unwrap_err(),
            StoreError::PeriodAlreadyProcessed { requested: PeriodId(3), last: PeriodId(3) }
        );
        assert!(store.complete_period(PeriodId(2), None, Timestamp::from_millis(0)).is_err());
        assert_eq!(store.last_period().unwrap(), Some(PeriodId(3)));
    }
}
