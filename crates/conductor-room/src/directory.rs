//! The player directory: everyone currently connected.
//!
//! A player is registered on connect with no name and no room, gets a
//! name later, and is removed on disconnect. The directory tracks
//! `current_room` but does not enforce room rules; the registry does.

use std::collections::BTreeMap;

use conductor_protocol::{PlayerId, PlayerSnapshot, RoomId};

use crate::{LobbyConfig, RoomError};

/// One connected participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: Option<String>,
    pub wallet: Option<String>,
    pub ready: bool,
    /// At most one room at a time.
    pub current_room: Option<RoomId>,
}

impl Player {
    fn new(id: PlayerId, wallet: Option<String>) -> Self {
        Self {
            id,
            name: None,
            wallet,
            ready: false,
            current_room: None,
        }
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            name: self.name.clone(),
            wallet: self.wallet.clone(),
            ready: self.ready,
            current_room: self.current_room,
        }
    }
}

/// Checks and normalizes a display name.
///
/// Blank names and the placeholders `"undefined"` / `"null"` (what a
/// browser sends when a field was never filled in) are rejected. The rest
/// is trimmed and cut to `max_len` characters.
///
/// ```
/// use conductor_room::validate_name;
///
/// assert_eq!(validate_name("  ada  ", 15).unwrap(), "ada");
/// assert!(validate_name("undefined", 15).is_err());
/// ```
pub fn validate_name(raw: &str, max_len: usize) -> Result<String, RoomError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "undefined" || trimmed == "null" {
        return Err(RoomError::InvalidName);
    }
    Ok(trimmed.chars().take(max_len).collect::<String>().trim_end().to_string())
}

/// Every connected player, keyed by id.
///
/// Ordered by id so player-list broadcasts are stable.
#[derive(Debug)]
pub struct PlayerDirectory {
    players: BTreeMap<PlayerId, Player>,
    max_connections: usize,
    max_name_len: usize,
}

impl PlayerDirectory {
    pub fn new(config: &LobbyConfig) -> Self {
        Self {
            players: BTreeMap::new(),
            max_connections: config.max_connections,
            max_name_len: config.max_name_len,
        }
    }

    /// Registers a newly connected player.
    ///
    /// # Errors
    /// [`RoomError::ServerFull`] if the connection cap is reached.
    pub fn connect(
        &mut self,
        player_id: PlayerId,
        wallet: Option<String>,
    ) -> Result<&Player, RoomError> {
        if self.players.len() >= self.max_connections && !self.players.contains_key(&player_id) {
            return Err(RoomError::ServerFull {
                current: self.players.len(),
                max: self.max_connections,
            });
        }
        let player = self
            .players
            .entry(player_id)
            .or_insert_with(|| Player::new(player_id, wallet));
        tracing::info!(%player_id, "player connected");
        Ok(player)
    }

    /// Removes a player. Returns the record so the caller can clean up
    /// their room.
    pub fn remove(&mut self, player_id: PlayerId) -> Option<Player> {
        let removed = self.players.remove(&player_id);
        if removed.is_some() {
            tracing::info!(%player_id, "player removed");
        }
        removed
    }

    /// Validates and stores a display name. Returns the stored form.
    ///
    /// # Errors
    /// [`RoomError::PlayerNotFound`] or [`RoomError::InvalidName`].
    pub fn set_name(&mut self, player_id: PlayerId, raw: &str) -> Result<String, RoomError> {
        let max_len = self.max_name_len;
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or(RoomError::PlayerNotFound(player_id))?;
        let name = validate_name(raw, max_len)?;
        player.name = Some(name.clone());
        tracing::debug!(%player_id, %name, "player renamed");
        Ok(name)
    }

    /// Records which room the player is in (or `None`).
    pub fn set_room(&mut self, player_id: PlayerId, room: Option<RoomId>) {
        match self.players.get_mut(&player_id) {
            Some(player) => player.current_room = room,
            None => tracing::warn!(%player_id, "set_room for unknown player"),
        }
    }

    pub fn get(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.get(&player_id)
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.players.contains_key(&player_id)
    }

    pub fn current_room(&self, player_id: PlayerId) -> Option<RoomId> {
        self.players.get(&player_id).and_then(|p| p.current_room)
    }

    /// The player's display name, if they are connected and named.
    pub fn name_of(&self, player_id: PlayerId) -> Option<&str> {
        self.players.get(&player_id).and_then(|p| p.name.as_deref())
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    pub fn ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.keys().copied()
    }

    pub fn snapshots(&self) -> Vec<PlayerSnapshot> {
        self.players.values().map(Player::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory(max: usize) -> PlayerDirectory {
        PlayerDirectory::new(&LobbyConfig {
            max_connections: max,
            ..LobbyConfig::default()
        })
    }

    #[test]
    fn test_connect_registers_blank_player() {
        let mut dir = directory(8);
        let player = dir.connect(PlayerId(1), Some("0xabc".into())).unwrap();
        assert_eq!(player.name, None);
        assert!(!player.ready);
        assert_eq!(player.current_room, None);
        assert_eq!(player.wallet.as_deref(), Some("0xabc"));
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_connect_refuses_over_cap() {
        let mut dir = directory(2);
        dir.connect(PlayerId(1), None).unwrap();
        dir.connect(PlayerId(2), None).unwrap();
        let err = dir.connect(PlayerId(3), None).unwrap_err();
        assert_eq!(err, RoomError::ServerFull { current: 2, max: 2 });
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn test_freed_slot_can_be_reused() {
        let mut dir = directory(1);
        dir.connect(PlayerId(1), None).unwrap();
        dir.remove(PlayerId(1));
        assert!(dir.connect(PlayerId(2), None).is_ok());
    }

    #[test]
    fn test_validate_name_rejects_placeholders() {
        for bad in ["", "   ", "undefined", "null", " null "] {
            assert_eq!(validate_name(bad, 15), Err(RoomError::InvalidName), "{bad:?}");
        }
    }

    #[test]
    fn test_validate_name_trims_and_caps() {
        assert_eq!(validate_name("  grace  ", 15).unwrap(), "grace");
        assert_eq!(
            validate_name("abcdefghijklmnopqrst", 15).unwrap(),
            "abcdefghijklmno"
        );
        // Counted in characters, not bytes.
        assert_eq!(validate_name("ééééé", 3).unwrap(), "ééé");
    }

    #[test]
    fn test_set_name_on_unknown_player() {
        let mut dir = directory(8);
        assert_eq!(
            dir.set_name(PlayerId(9), "ada"),
            Err(RoomError::PlayerNotFound(PlayerId(9)))
        );
    }

    #[test]
    fn test_set_name_is_visible_in_snapshots() {
        let mut dir = directory(8);
        dir.connect(PlayerId(2), None).unwrap();
        dir.connect(PlayerId(1), None).unwrap();
        dir.set_name(PlayerId(1), " ada ").unwrap();

        let snaps = dir.snapshots();
        assert_eq!(snaps[0].id, PlayerId(1));
        assert_eq!(snaps[0].name.as_deref(), Some("ada"));
        assert_eq!(snaps[1].name, None);
        assert_eq!(dir.name_of(PlayerId(1)), Some("ada"));
    }
}
