//! The room registry: every room, keyed by id.

use std::collections::BTreeMap;

use conductor_protocol::{PlayerId, RoomId, RoomSnapshot};

use crate::{LobbyConfig, Room, RoomError};

/// What a successful join did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The player was added to the member list.
    Joined,
    /// The player was already a member; nothing changed.
    AlreadyMember,
}

/// What happened to a room when a member left it.
#[derive(Debug)]
pub enum Departure {
    /// The creator left. The room is removed and `displaced` are the
    /// other members it held.
    Deleted { room: Room, displaced: Vec<PlayerId> },
    /// The last member left. The room is removed.
    Emptied { room: Room },
    /// Someone else left. The room stays with `remaining` members.
    Left { remaining: Vec<PlayerId> },
}

/// Owns every room. Room ids come from a counter and are never reused.
///
/// The registry enforces room rules (names, capacity, passwords,
/// cascade delete) but leaves the player side, `current_room` and
/// notifications, to the caller.
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: BTreeMap<RoomId, Room>,
    next_id: u64,
    config: LobbyConfig,
}

impl RoomRegistry {
    pub fn new(config: LobbyConfig) -> Self {
        Self {
            rooms: BTreeMap::new(),
            next_id: 1,
            config,
        }
    }

    /// Creates a waiting room with `creator` as its first member.
    ///
    /// The name is trimmed; `max_players` is clamped into the configured
    /// range.
    ///
    /// # Errors
    /// [`RoomError::InvalidRoomName`] for a blank or overlong name.
    pub fn create(
        &mut self,
        creator: PlayerId,
        name: &str,
        max_players: usize,
        password: Option<String>,
        now: u64,
        total_games: usize,
    ) -> Result<RoomId, RoomError> {
        let name = self.check_room_name(name)?;

        let room_id = RoomId(self.next_id);
        self.next_id += 1;
        let max_players = self.config.clamp_room_size(max_players);

        let room = Room::new(
            room_id,
            name.to_string(),
            creator,
            max_players,
            password,
            now,
            total_games,
        );
        self.rooms.insert(room_id, room);
        tracing::info!(%room_id, %creator, max_players, "room created");
        Ok(room_id)
    }

    /// Trims `name` and checks it is usable as a room name.
    ///
    /// # Errors
    /// [`RoomError::InvalidRoomName`] for a blank or overlong name.
    pub fn check_room_name<'n>(&self, name: &'n str) -> Result<&'n str, RoomError> {
        let name = name.trim();
        let max = self.config.max_room_name_len;
        if name.is_empty() || name.chars().count() > max {
            return Err(RoomError::InvalidRoomName { max });
        }
        Ok(name)
    }

    /// Adds `player_id` to a room.
    ///
    /// # Errors
    /// [`RoomError::RoomNotFound`], [`RoomError::WrongPassword`] or
    /// [`RoomError::RoomFull`].
    pub fn join(
        &mut self,
        room_id: RoomId,
        player_id: PlayerId,
        password: Option<&str>,
    ) -> Result<JoinOutcome, RoomError> {
        let room = self
            .rooms
            .get_mut(&room_id)
            .ok_or(RoomError::RoomNotFound(room_id))?;

        if room.is_member(player_id) {
            return Ok(JoinOutcome::AlreadyMember);
        }
        if !room.accepts_password(password) {
            return Err(RoomError::WrongPassword(room_id));
        }
        if room.is_full() {
            return Err(RoomError::RoomFull(room_id));
        }

        room.members.push(player_id);
        tracing::info!(%room_id, %player_id, members = room.members.len(), "player joined room");
        Ok(JoinOutcome::Joined)
    }

    /// Removes `player_id` from a room, deleting the room if the creator
    /// or the last member left.
    ///
    /// Returns `None` if the room does not exist or the player was not in
    /// it.
    pub fn leave(&mut self, room_id: RoomId, player_id: PlayerId) -> Option<Departure> {
        let room = self.rooms.get_mut(&room_id)?;
        if !room.remove_member(player_id) {
            return None;
        }

        if room.creator == player_id {
            let mut room = self.rooms.remove(&room_id)?;
            room.series.abandon();
            let displaced = std::mem::take(&mut room.members);
            tracing::info!(%room_id, displaced = displaced.len(), "creator left, room deleted");
            return Some(Departure::Deleted { room, displaced });
        }

        if room.members.is_empty() {
            let mut room = self.rooms.remove(&room_id)?;
            room.series.abandon();
            tracing::info!(%room_id, "last member left, room deleted");
            return Some(Departure::Emptied { room });
        }

        tracing::info!(%room_id, %player_id, members = room.members.len(), "player left room");
        Some(Departure::Left {
            remaining: room.members.clone(),
        })
    }

    pub fn get(&self, room_id: RoomId) -> Option<&Room> {
        self.rooms.get(&room_id)
    }

    pub fn get_mut(&mut self, room_id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(&room_id)
    }

    pub fn contains(&self, room_id: RoomId) -> bool {
        self.rooms.contains_key(&room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    /// Every room, oldest first.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Snapshots of every room, oldest first.
    pub fn snapshots<'a, F>(&self, name_of: F) -> Vec<RoomSnapshot>
    where
        F: Fn(PlayerId) -> Option<&'a str> + Copy,
    {
        self.rooms.values().map(|r| r.snapshot(name_of)).collect()
    }
}
