//! Client and server messages.
//!
//! Both directions are internally tagged (`#[serde(tag = "type")]`), so a
//! frame looks like `{ "type": "JoinRoom", "room_id": 3 }`. Every
//! operation the arcade supports has exactly one variant; the arcade
//! matches them exhaustively.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    GameId, GameResult, GameStart, PlayerId, PlayerSnapshot, RoomId, RoomSnapshot,
    SeriesSummary,
};

/// Why a player is no longer in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveReason {
    /// The creator left, so the room was deleted.
    CreatorLeft,
    /// A non-creator left on their own.
    NormalLeave,
}

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Everything a browser may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    // -- Connection --
    /// First frame on every connection.
    Hello {
        version: u32,
        #[serde(default)]
        wallet: Option<String>,
    },

    /// Keep-alive. Sent every few seconds.
    Heartbeat { client_time: u64 },

    /// The client is going away on purpose.
    Disconnect { reason: String },

    // -- Players --
    SetName { name: String },

    // -- Rooms --
    CreateRoom {
        name: String,
        max_players: usize,
        #[serde(default)]
        password: Option<String>,
    },

    JoinRoom {
        room_id: RoomId,
        #[serde(default)]
        password: Option<String>,
    },

    LeaveRoom,

    ListRooms,

    // -- Series --
    /// Creator only.
    StartSeries { room_id: RoomId },

    /// The browser finished (or gave up on) a mini-game.
    GameComplete {
        room_id: RoomId,
        game_id: GameId,
        #[serde(default)]
        winner: Option<PlayerId>,
        #[serde(default)]
        results: BTreeMap<PlayerId, u64>,
    },

    /// Ask the server to submit this player's reward claim for a
    /// finished room.
    ClaimReward { room_id: RoomId },

    // -- Chat --
    /// `timestamp` is the client's send time; with the sender and text it
    /// identifies the message for duplicate suppression.
    Chat { text: String, timestamp: u64 },
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Everything the server may push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    // -- Connection --
    Welcome {
        player_id: PlayerId,
        server_time: u64,
        max_players: usize,
    },

    /// The server is at capacity; the connection will be closed.
    ConnectionRefused {
        reason: String,
        max_players: usize,
        current_players: usize,
    },

    HeartbeatAck { client_time: u64, server_time: u64 },

    // -- Players --
    PlayersUpdate {
        players: Vec<PlayerSnapshot>,
        player_count: usize,
    },

    PlayerNameSet { name: String },

    // -- Rooms --
    RoomList {
        rooms: Vec<RoomSnapshot>,
        timestamp: u64,
    },

    /// Reply to `CreateRoom` (with `auto_joined`) and `JoinRoom`.
    RoomJoined {
        room_id: RoomId,
        room: RoomSnapshot,
        auto_joined: bool,
    },

    /// To the other members when someone joins.
    PlayerJoinedRoom {
        room_id: RoomId,
        player_id: PlayerId,
        player_name: Option<String>,
    },

    /// To the remaining members when a non-creator leaves.
    PlayerLeftRoom {
        room_id: RoomId,
        player_id: PlayerId,
        player_name: Option<String>,
        remaining_players: usize,
    },

    /// To the player who left.
    RoomLeft { room_id: RoomId, reason: LeaveReason },

    /// To every displaced member when the creator leaves.
    RoomDeleted { room_id: RoomId, reason: LeaveReason },

    // -- Series --
    /// The descriptor stays nested: its own `type` key names the game and
    /// would collide with the message tag.
    GameStarted { game: GameStart },

    GameCompleted {
        result: GameResult,
        /// Games finished so far.
        current_game_index: usize,
        total_games: usize,
    },

    SeriesCompleted(SeriesSummary),

    // -- Rewards --
    /// Ask the player's wallet to record their result on chain.
    /// `multiplier` is in contract format (150 = 1.5×).
    RecordResult {
        room_id: RoomId,
        score: u64,
        multiplier: u32,
        won: bool,
        rank: usize,
    },

    RewardClaimed { room_id: RoomId, amount: u64 },

    RewardClaimFailed { room_id: RoomId, reason: String },

    // -- Chat --
    ChatUpdate {
        player_id: PlayerId,
        player_name: String,
        text: String,
        timestamp: u64,
    },

    // -- Errors --
    /// An operation was refused. Only ever sent to the player who asked.
    /// `reason` is a stable code (`room_full`, `not_creator`, ...).
    Rejected { reason: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FinalRanking, GameType};

    #[test]
    fn test_client_leave_room_is_unit_variant() {
        let json = serde_json::to_value(&ClientMessage::LeaveRoom).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "LeaveRoom" }));
    }

    #[test]
    fn test_game_complete_defaults_missing_fields() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"GameComplete","room_id":2,"game_id":"R-2/game-1-9"}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::GameComplete { winner, results, .. } => {
                assert!(winner.is_none());
                assert!(results.is_empty());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_game_complete_reads_results_map() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"GameComplete","room_id":2,"game_id":"g","winner":5,"results":{"5":40}}"#,
        )
        .unwrap();
        let ClientMessage::GameComplete { winner, results, .. } = msg else {
            panic!("expected GameComplete");
        };
        assert_eq!(winner, Some(PlayerId(5)));
        assert_eq!(results[&PlayerId(5)], 40);
    }

    fn game_start() -> GameStart {
        GameStart {
            id: GameId("R-1/game-1-0".into()),
            game_type: GameType::TetrisBlocks,
            index: 1,
            total_games: 5,
            duration: 30_000,
            start_time: 0,
            room_id: RoomId(1),
            players: vec![PlayerId(1), PlayerId(2)],
        }
    }

    #[test]
    fn test_game_started_keeps_game_type_nested() {
        let msg = ServerMessage::GameStarted { game: game_start() };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "GameStarted");
        assert_eq!(json["game"]["type"], "tetris-blocks");
        assert_eq!(json["game"]["index"], 1);
        assert_eq!(json["game"]["duration"], 30_000);

        let text = serde_json::to_string(&msg).unwrap();
        let back: ServerMessage = serde_json::from_str(&text).unwrap();
        assert_eq!(back, msg);
    }

    /// Every server message must survive a trip through JSON; a key that
    /// collides with the `type` tag would fail here.
    #[test]
    fn test_every_server_message_decodes_after_encoding() {
        let room = RoomSnapshot {
            id: RoomId(1),
            name: "Alpha".into(),
            creator: PlayerId(1),
            creator_name: "ada".into(),
            players: vec![PlayerId(1)],
            player_names: vec!["ada".into()],
            max_players: 4,
            has_password: false,
            status: crate::RoomStatus::Waiting,
            current_game_index: 0,
            total_games: 5,
            game_results: vec![],
            game_sequence: vec![GameType::TetrisBlocks],
            final_rankings: vec![],
            created_at: 7,
        };
        let result = GameResult {
            game_index: 1,
            game_type: GameType::TetrisBlocks,
            winner: Some(PlayerId(1)),
            results: BTreeMap::from([(PlayerId(1), 40)]),
            completed_at: 10,
            duration: 10,
        };
        let messages = vec![
            ServerMessage::Welcome {
                player_id: PlayerId(1),
                server_time: 1,
                max_players: 8,
            },
            ServerMessage::ConnectionRefused {
                reason: "server_full".into(),
                max_players: 8,
                current_players: 8,
            },
            ServerMessage::HeartbeatAck {
                client_time: 1,
                server_time: 2,
            },
            ServerMessage::PlayersUpdate {
                players: vec![PlayerSnapshot {
                    id: PlayerId(1),
                    name: Some("ada".into()),
                    wallet: None,
                    ready: false,
                    current_room: None,
                }],
                player_count: 1,
            },
            ServerMessage::PlayerNameSet { name: "ada".into() },
            ServerMessage::RoomList {
                rooms: vec![room.clone()],
                timestamp: 7,
            },
            ServerMessage::RoomJoined {
                room_id: RoomId(1),
                room,
                auto_joined: true,
            },
            ServerMessage::PlayerJoinedRoom {
                room_id: RoomId(1),
                player_id: PlayerId(2),
                player_name: None,
            },
            ServerMessage::PlayerLeftRoom {
                room_id: RoomId(1),
                player_id: PlayerId(2),
                player_name: None,
                remaining_players: 1,
            },
            ServerMessage::RoomLeft {
                room_id: RoomId(1),
                reason: LeaveReason::NormalLeave,
            },
            ServerMessage::RoomDeleted {
                room_id: RoomId(1),
                reason: LeaveReason::CreatorLeft,
            },
            ServerMessage::GameStarted { game: game_start() },
            ServerMessage::GameCompleted {
                result: result.clone(),
                current_game_index: 1,
                total_games: 5,
            },
            ServerMessage::SeriesCompleted(SeriesSummary {
                room_id: RoomId(1),
                final_rankings: vec![FinalRanking {
                    player_id: PlayerId(1),
                    player_name: "ada".into(),
                    score: 140,
                    rank: 1,
                    multiplier: 5.0,
                    games_won: 1,
                    claimable: 700,
                }],
                game_results: vec![result],
                total_games: 5,
            }),
            ServerMessage::RecordResult {
                room_id: RoomId(1),
                score: 500,
                multiplier: 500,
                won: true,
                rank: 1,
            },
            ServerMessage::RewardClaimed {
                room_id: RoomId(1),
                amount: 2_500,
            },
            ServerMessage::RewardClaimFailed {
                room_id: RoomId(1),
                reason: "already_claimed".into(),
            },
            ServerMessage::ChatUpdate {
                player_id: PlayerId(1),
                player_name: "ada".into(),
                text: "hi".into(),
                timestamp: 3,
            },
            ServerMessage::Rejected {
                reason: "room_full".into(),
                message: "room R-1 is full".into(),
            },
        ];

        for msg in messages {
            let text = serde_json::to_string(&msg).unwrap();
            let back: ServerMessage = serde_json::from_str(&text)
                .unwrap_or_else(|e| panic!("{text} did not decode: {e}"));
            assert_eq!(back, msg);
        }
    }

    #[test]
    fn test_room_deleted_reason_is_creator_left() {
        let json = serde_json::to_value(&ServerMessage::RoomDeleted {
            room_id: RoomId(1),
            reason: LeaveReason::CreatorLeft,
        })
        .unwrap();
        assert_eq!(json["reason"], "creator_left");
    }

    #[test]
    fn test_series_completed_shape() {
        let msg = ServerMessage::SeriesCompleted(SeriesSummary {
            room_id: RoomId(1),
            final_rankings: vec![FinalRanking {
                player_id: PlayerId(1),
                player_name: "ada".into(),
                score: 200,
                rank: 3,
                multiplier: 1.5,
                games_won: 0,
                claimable: 300,
            }],
            game_results: vec![],
            total_games: 5,
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "SeriesCompleted");
        assert_eq!(json["final_rankings"][0]["multiplier"], 1.5);
        assert_eq!(json["final_rankings"][0]["claimable"], 300);
        assert_eq!(json["total_games"], 5);
    }
}
