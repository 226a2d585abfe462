// 10.0.2: result types and errors for engine operations.

use crate::agent::AgentError;
use crate::config::ConfigError;
use crate::forum::ForumError;
use crate::player::Player;
use crate::store::StoreError;
use crate::transfer::SwapSummary;
use crate::types::{AgentId, Money, PeriodId, PlayerId, PostId, Timestamp};
use crate::validation::ValidationError;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SquadResult {
    pub players: Vec<Player>,
    pub total_cost: Money,
    pub remaining_budget: Money,
    #[serde(skip)]
    pub team_version: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    pub transfer: SwapSummary,
    pub players: Vec<Player>,
    pub total_cost: Money,
    pub remaining_budget: Money,
    #[serde(skip)]
    pub team_version: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorerLine {
    pub player_id: PlayerId,
    pub name: String,
    pub club: String,
    pub total_points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub agent_id: AgentId,
    pub name: String,
    pub score: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub period: PeriodId,
    pub source: String,
    pub players_awarded: usize,
    pub top_scorers: Vec<ScorerLine>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamView {
    pub agent_id: AgentId,
    pub players: Vec<Player>,
    pub total_cost: Money,
    pub remaining_budget: Money,
    pub transfer_available: bool,
    pub score: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: PostId,
    pub author: String,
    pub content: String,
    pub upvotes: u64,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Forum(#[from] ForumError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Period {requested} already processed (last completed {last})")]
    PeriodAlreadyProcessed { requested: PeriodId, last: PeriodId },

    #[error("Store error: {0}")]
    Store(StoreError),
}

// store failures that mean something to the caller become their domain error
impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict {
                agent_id,
                expected,
                found,
            } => EngineError::Validation(ValidationError::ConcurrentModification {
                agent_id,
                expected,
                found,
            }),
            StoreError::TeamMissing(agent_id) => {
                EngineError::Validation(ValidationError::NoActiveTeam(agent_id))
            }
            StoreError::PlayerNotFound(player_id) => {
                EngineError::Validation(ValidationError::PlayersNotFound {
                    ids: vec![player_id.to_string()],
                })
            }
            StoreError::AgentNotFound(agent_id) => {
                EngineError::Agent(AgentError::AgentNotFound(agent_id))
            }
            StoreError::PeriodAlreadyProcessed { requested, last } => {
                EngineError::PeriodAlreadyProcessed { requested, last }
            }
            other @ StoreError::LockPoisoned(_) => EngineError::Store(other),
        }
    }
}

impl EngineError {
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            EngineError::Validation(err) => Some(err),
            _ => None,
        }
    }
}
