//! A single room and its series.

use conductor_protocol::{PlayerId, RoomId, RoomSnapshot, RoomStatus};
use conductor_series::SeriesState;

/// Shown for players with no name, or who are gone.
const UNKNOWN_NAME: &str = "Unknown";

/// One named group of players.
///
/// The creator is `members[0]` for as long as the room exists; when they
/// leave, the room goes with them.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub creator: PlayerId,
    pub max_players: usize,
    pub password: Option<String>,
    pub status: RoomStatus,
    pub members: Vec<PlayerId>,
    /// Server time (ms).
    pub created_at: u64,
    pub series: SeriesState,
}

impl Room {
    /// A waiting room with only the creator in it.
    ///
    /// An empty password counts as no password.
    pub fn new(
        id: RoomId,
        name: String,
        creator: PlayerId,
        max_players: usize,
        password: Option<String>,
        created_at: u64,
        total_games: usize,
    ) -> Self {
        Self {
            id,
            name,
            creator,
            max_players,
            password: password.filter(|p| !p.is_empty()),
            status: RoomStatus::Waiting,
            members: vec![creator],
            created_at,
            series: SeriesState::new(total_games),
        }
    }

    pub fn is_member(&self, player_id: PlayerId) -> bool {
        self.members.contains(&player_id)
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_players
    }

    /// Returns `true` if `supplied` opens this room.
    pub fn accepts_password(&self, supplied: Option<&str>) -> bool {
        match &self.password {
            None => true,
            Some(expected) => supplied == Some(expected.as_str()),
        }
    }

    /// Removes `player_id` from the member list. Returns `false` if they
    /// were not a member.
    pub fn remove_member(&mut self, player_id: PlayerId) -> bool {
        let before = self.members.len();
        self.members.retain(|p| *p != player_id);
        self.members.len() != before
    }

    /// A read-only copy for room listings, with display names resolved
    /// through `name_of`.
    pub fn snapshot<'a, F>(&self, name_of: F) -> RoomSnapshot
    where
        F: Fn(PlayerId) -> Option<&'a str>,
    {
        let resolve = |p: PlayerId| name_of(p).unwrap_or(UNKNOWN_NAME).to_string();
        RoomSnapshot {
            id: self.id,
            name: self.name.clone(),
            creator: self.creator,
            creator_name: resolve(self.creator),
            players: self.members.clone(),
            player_names: self.members.iter().map(|&p| resolve(p)).collect(),
            max_players: self.max_players,
            has_password: self.password.is_some(),
            status: self.status,
            current_game_index: self.series.current_index(),
            total_games: self.series.total_games(),
            game_results: self.series.results().to_vec(),
            game_sequence: self.series.sequence().to_vec(),
            final_rankings: self.series.rankings().to_vec(),
            created_at: self.created_at,
        }
    }
}
