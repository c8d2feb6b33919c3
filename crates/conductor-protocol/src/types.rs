//! Identity types and delivery targets.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A connected participant, as assigned by the server on accept.
///
/// Serialized as a plain number (`#[serde(transparent)]`), which also lets
/// it be a JSON object key in per-player score maps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A room: one named group of players playing one series.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// Identifies one in-flight mini-game.
///
/// Built from the room, the 1-based game index and the start timestamp,
/// so a game from an earlier series can never be mistaken for the
/// current one. Completion reports and deadline timers both carry it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub String);

impl GameId {
    /// Builds the id for game `index` (1-based) of `room` started at
    /// `start_time` (ms).
    pub fn new(room: RoomId, index: usize, start_time: u64) -> Self {
        Self(format!("{room}/game-{index}-{start_time}"))
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who should receive a server message.
///
/// The arcade resolves room membership itself, so a room-wide event is a
/// [`Recipient::Group`] holding the member list as it was when the event
/// happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every connected player.
    All,

    /// One specific player.
    Player(PlayerId),

    /// An explicit set of players, usually one room's members.
    Group(Vec<PlayerId>),
}

impl Recipient {
    /// Returns `true` if `player` is addressed by this recipient.
    pub fn includes(&self, player: PlayerId) -> bool {
        match self {
            Self::All => true,
            Self::Player(p) => *p == player,
            Self::Group(ps) => ps.contains(&player),
        }
    }
}
