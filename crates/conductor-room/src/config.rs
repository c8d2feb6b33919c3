//! Lobby configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Limits for connections, names and rooms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbyConfig {
    /// Connected players the server accepts at once.
    pub max_connections: usize,

    /// Display names are cut to this many characters.
    pub max_name_len: usize,

    /// Room names longer than this are rejected.
    pub max_room_name_len: usize,

    /// Smallest `max_players` a room may be created with. Also the
    /// number of members needed to start a series.
    pub min_room_players: usize,

    /// Largest `max_players` a room may be created with.
    pub max_room_players: usize,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            max_connections: 8,
            max_name_len: 15,
            max_room_name_len: 20,
            min_room_players: 2,
            max_room_players: 8,
        }
    }
}

impl LobbyConfig {
    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// - `max_connections` is at least 1.
    /// - `min_room_players` is at least 2.
    /// - `max_room_players` is at least `min_room_players`.
    /// - Name caps are at least 1.
    pub fn validated(mut self) -> Self {
        if self.max_connections == 0 {
            warn!("max_connections is 0, using 1");
            self.max_connections = 1;
        }
        if self.min_room_players < 2 {
            warn!(
                requested = self.min_room_players,
                "min_room_players below 2, clamping"
            );
            self.min_room_players = 2;
        }
        if self.max_room_players < self.min_room_players {
            warn!(
                max = self.max_room_players,
                min = self.min_room_players,
                "max_room_players below min_room_players, clamping"
            );
            self.max_room_players = self.min_room_players;
        }
        self.max_name_len = self.max_name_len.max(1);
        self.max_room_name_len = self.max_room_name_len.max(1);
        self
    }

    /// Clamps a requested room size into the allowed range.
    pub fn clamp_room_size(&self, requested: usize) -> usize {
        requested.clamp(self.min_room_players, self.max_room_players)
    }
}
