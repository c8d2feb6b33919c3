//! Error types for the lobby layer.

use conductor_protocol::{PlayerId, RoomId};

/// Why a lobby or series request was refused.
///
/// These go back to the requesting player only, as a
/// [`ServerMessage::Rejected`](conductor_protocol::ServerMessage::Rejected)
/// carrying [`reason`](Self::reason). A refused request changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// Room name is blank or too long.
    #[error("room name must be 1 to {max} characters")]
    InvalidRoomName { max: usize },

    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    #[error("wrong password for room {0}")]
    WrongPassword(RoomId),

    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The connection cap is reached.
    #[error("server is full ({current}/{max} players)")]
    ServerFull { current: usize, max: usize },

    /// Display name is blank or a placeholder like `"undefined"`.
    #[error("invalid player name")]
    InvalidName,

    /// Only the room creator may do this.
    #[error("only the creator of room {0} can do that")]
    NotCreator(RoomId),

    #[error("room {room} needs at least {need} players, has {have}")]
    InsufficientPlayers { room: RoomId, have: usize, need: usize },

    /// A series has already started in this room (or finished).
    #[error("room {0} has already started")]
    AlreadyRunning(RoomId),

    /// The player is not connected. Usually a request racing a
    /// disconnect.
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),
}

impl RoomError {
    /// Stable code sent to clients.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRoomName { .. } => "invalid_room_name",
            Self::RoomNotFound(_) => "room_not_found",
            Self::WrongPassword(_) => "wrong_password",
            Self::RoomFull(_) => "room_full",
            Self::ServerFull { .. } => "server_full",
            Self::InvalidName => "invalid_name",
            Self::NotCreator(_) => "not_creator",
            Self::InsufficientPlayers { .. } => "insufficient_players",
            Self::AlreadyRunning(_) => "already_running",
            Self::PlayerNotFound(_) => "player_not_found",
        }
    }
}
