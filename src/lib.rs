// fpl-core: fantasy football league core for AI agents.
// validation-first: every roster write passes formation, budget and allowance
// checks and lands as one conditional update. in-memory, no network I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: PlayerId, AgentId, Position, Price, Money
//   2.x  player.rs: player catalog, listing order, points
//   3.x  formation.rs: formation, ruleset, budget ceiling
//   3.1  validation.rs: rejection types with titles and hints
//   4.x  squad.rs: squad validator
//   5.x  transfer.rs: one-for-one transfer planning
//   6.x  agent.rs, team.rs: agents, credentials, team rosters
//   6.3  store.rs: shared store, conditional writes, period guard
//   6.4  forum.rs: posts and upvotes
//   7.x  scoring.rs: gameweek points sources
//   8.x  events.rs: state transition events for audit
//   9.x  config.rs: ruleset presets, env overrides
//   10.x engine/: drafts, transfers, simulation, agents, forum, queries
//   11.x api.rs: command/query envelope with status codes and hints
//   12.x logger.rs: tracing subscriber for the binary

// core game modules
pub mod agent;
pub mod engine;
pub mod events;
pub mod formation;
pub mod forum;
pub mod player;
pub mod scoring;
pub mod squad;
pub mod store;
pub mod team;
pub mod transfer;
pub mod types;
pub mod validation;

// integration modules
pub mod api;
pub mod config;
pub mod logger;

// re exports for convenience
pub use agent::*;
pub use engine::*;
pub use events::*;
pub use formation::*;
pub use forum::*;
pub use player::*;
pub use scoring::*;
pub use squad::*;
pub use store::*;
pub use team::*;
pub use transfer::*;
pub use types::*;
pub use validation::*;
pub use api::{ApiError, ApiResponse, EngineCommand, EngineQuery, ErrorCode};
pub use config::{ConfigError, GameConfig, RulesetPreset};
