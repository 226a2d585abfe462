//! Engine configuration options.

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of audit events kept in memory.
    pub max_events: usize,
    /// Log every emitted event at info level instead of debug.
    pub verbose: bool,
    /// How many players the gameweek summary lists as top scorers.
    pub top_scorers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_events: 100_000,
            verbose: false,
            top_scorers: 5,
        }
    }
}
