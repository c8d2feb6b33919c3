//! Snapshot payloads carried inside [`ServerMessage`](crate::ServerMessage)s.
//!
//! These are read-only copies of arcade state. Clients render them; they
//! never send them back. The server builds fresh ones for every
//! broadcast, so a client can't mutate shared state through a snapshot.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{GameId, PlayerId, RoomId};

// ---------------------------------------------------------------------------
// Game catalog
// ---------------------------------------------------------------------------

/// One of the fixed mini-games a series draws from.
///
/// The server only knows the name; rendering and rules live in the
/// browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameType {
    TetrisBlocks,
    SnakeClassic,
    PacManDots,
    SpaceInvaders,
    BubbleShooter,
}

impl GameType {
    /// Every mini-game the browser client ships.
    pub const CATALOG: [GameType; 5] = [
        GameType::TetrisBlocks,
        GameType::SnakeClassic,
        GameType::PacManDots,
        GameType::SpaceInvaders,
        GameType::BubbleShooter,
    ];

    /// The wire name (`"pac-man-dots"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TetrisBlocks => "tetris-blocks",
            Self::SnakeClassic => "snake-classic",
            Self::PacManDots => "pac-man-dots",
            Self::SpaceInvaders => "space-invaders",
            Self::BubbleShooter => "bubble-shooter",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Room status
// ---------------------------------------------------------------------------

/// Where a room is in its life.
///
/// ```text
/// Waiting → Playing → Finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    #[default]
    Waiting,
    Playing,
    Finished,
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Playing => write!(f, "playing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Series payloads
// ---------------------------------------------------------------------------

/// Sent to every room member when a mini-game begins. Every member gets
/// the same descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStart {
    pub id: GameId,
    #[serde(rename = "type")]
    pub game_type: GameType,
    /// 1-based position in the series.
    pub index: usize,
    pub total_games: usize,
    /// How long the browser should run the game, in ms.
    pub duration: u64,
    /// Server time (ms) the game started.
    pub start_time: u64,
    pub room_id: RoomId,
    /// Who is expected to report.
    pub players: Vec<PlayerId>,
}

/// The immutable record of one finished (or timed-out) mini-game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// 1-based position in the series.
    pub game_index: usize,
    pub game_type: GameType,
    /// `None` when nobody claimed the win or the game timed out.
    pub winner: Option<PlayerId>,
    pub results: BTreeMap<PlayerId, u64>,
    pub completed_at: u64,
    /// Milliseconds between start and completion.
    pub duration: u64,
}

/// One player's standing once a series is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalRanking {
    pub player_id: PlayerId,
    pub player_name: String,
    /// Sum of per-game scores plus winner bonuses.
    pub score: u64,
    /// 1-based.
    pub rank: usize,
    /// 5, 2, 1.5 or 1.
    pub multiplier: f64,
    pub games_won: usize,
    /// `score × multiplier`, rounded down.
    pub claimable: u64,
}

/// Everything a client needs to show the end-of-series screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub room_id: RoomId,
    pub final_rankings: Vec<FinalRanking>,
    pub game_results: Vec<GameResult>,
    pub total_games: usize,
}

// ---------------------------------------------------------------------------
// Lobby snapshots
// ---------------------------------------------------------------------------

/// A player as other players see them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    /// `None` until the client sets a name.
    pub name: Option<String>,
    pub wallet: Option<String>,
    pub ready: bool,
    pub current_room: Option<RoomId>,
}

/// A room as it appears in room listings.
///
/// Display names are resolved at snapshot time, so a rename shows up in
/// the next broadcast. The password itself never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub name: String,
    pub creator: PlayerId,
    pub creator_name: String,
    pub players: Vec<PlayerId>,
    pub player_names: Vec<String>,
    pub max_players: usize,
    pub has_password: bool,
    pub status: RoomStatus,
    pub current_game_index: usize,
    pub total_games: usize,
    pub game_results: Vec<GameResult>,
    pub game_sequence: Vec<GameType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub final_rankings: Vec<FinalRanking>,
    pub created_at: u64,
}
