//! Tracing setup for the simulator binary. The library itself only emits events.

use time::format_description;
use time::UtcOffset;
use tracing::{subscriber::set_global_default, Level};
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("Invalid time format: {0}")]
    Format(#[from] time::error::InvalidFormatDescription),

    #[error("Could not set global default tracing subscriber: {0}")]
    AlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Installs a stdout subscriber with local timestamps. Falls back to UTC when
/// the local offset can't be determined (e.g. multi-threaded on some unixes).
pub fn init_logger(level: Level) -> Result<(), LoggerError> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let format = format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]")?;
    let timer = OffsetTime::new(offset, format);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_timer(timer)
        .finish();

    set_global_default(subscriber)?;
    Ok(())
}

/// `RUST_LOG`-style level names; anything unrecognised means info.
pub fn level_from_str(name: &str) -> Level {
    name.trim().parse().unwrap_or(Level::INFO)
}
