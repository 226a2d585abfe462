// 10.0: core game engine. coordinates squad drafts, transfers, gameweek
// simulation, agent registration and the forum over one shared store.
// every write is a single conditional update; rejections carry full detail.

mod agents;
mod config;
mod core;
mod draft;
mod posts;
mod queries;
mod results;
mod simulation;
mod transfers;

pub use config::EngineConfig;
pub use core::Engine;
pub use draft::SquadPlan;
pub use results::{
    EngineError, LeaderboardEntry, PostView, ScorerLine, SimulationResult, SquadResult,
    TeamView, TransferResult,
};
