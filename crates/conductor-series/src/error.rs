//! Error types for the series layer.

use conductor_protocol::GameId;

/// Why a series event was not applied.
///
/// None of these are user mistakes. They are races between reports,
/// deadlines and advances, and callers drop them after logging.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeriesError {
    /// No game is in flight (between games, or before the first one).
    #[error("no game in flight")]
    NoGameInFlight,

    /// The event names a game that is no longer current.
    #[error("game {0} is not the current game")]
    NotCurrent(GameId),

    /// A report already closed this game.
    #[error("game {0} already completed")]
    AlreadyCompleted(GameId),

    /// The deadline already closed this game.
    #[error("game {0} already timed out")]
    AlreadyTimedOut(GameId),

    /// Every game of the series has been played.
    #[error("series already played all {0} games")]
    Exhausted(usize),
}
