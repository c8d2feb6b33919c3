//! Series configuration.

use std::time::Duration;

use conductor_protocol::GameType;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How a series is played and scored.
///
/// Every room uses the same config; it is fixed for the lifetime of the
/// arcade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Mini-games per series. Never more than the catalog holds, so a
    /// series never repeats a game.
    pub total_games: usize,

    /// How long each mini-game runs before the deadline closes it.
    pub game_duration: Duration,

    /// Pause between one game completing and the next one starting.
    pub advance_delay: Duration,

    /// Points added to a game's winner on top of their game score.
    pub winner_bonus: u64,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            total_games: 5,
            game_duration: Duration::from_secs(30),
            advance_delay: Duration::from_secs(1),
            winner_bonus: 100,
        }
    }
}

impl SeriesConfig {
    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// - `total_games` is kept within `1..=GameType::CATALOG.len()`.
    /// - A zero `game_duration` becomes one second.
    pub fn validated(mut self) -> Self {
        let max = GameType::CATALOG.len();
        if self.total_games == 0 || self.total_games > max {
            warn!(
                requested = self.total_games,
                max, "total_games out of range, clamping"
            );
            self.total_games = self.total_games.clamp(1, max);
        }
        if self.game_duration.is_zero() {
            warn!("game_duration is zero, using one second");
            self.game_duration = Duration::from_secs(1);
        }
        self
    }
}
