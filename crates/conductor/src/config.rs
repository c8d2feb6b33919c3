//! Arcade configuration.

use conductor_room::LobbyConfig;
use conductor_series::SeriesConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Everything the arcade needs to know up front.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArcadeConfig {
    pub lobby: LobbyConfig,
    pub series: SeriesConfig,
    pub chat: ChatConfig,
}

/// Chat relay limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// How many recent messages are remembered for duplicate suppression.
    pub dedup_window: usize,
    /// Longer messages are cut to this many characters.
    pub max_len: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            dedup_window: 100,
            max_len: 280,
        }
    }
}

impl ArcadeConfig {
    /// Validates every section. See each section's `validated`.
    pub fn validated(self) -> Self {
        Self {
            lobby: self.lobby.validated(),
            series: self.series.validated(),
            chat: self.chat.validated(),
        }
    }
}

impl ChatConfig {
    /// Both limits are at least 1.
    pub fn validated(mut self) -> Self {
        if self.dedup_window == 0 {
            warn!("chat dedup_window is 0, using 1");
            self.dedup_window = 1;
        }
        self.max_len = self.max_len.max(1);
        self
    }
}
