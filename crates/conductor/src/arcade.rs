//! The arcade: every player and room, and every rule about them.
//!
//! [`Arcade`] is a plain synchronous state machine. Each operation takes
//! the current time, mutates state, and returns an [`Outbox`] saying who
//! should be told what, which timers to arm, and which ledger calls to
//! make. It never sleeps, spawns or sends anything itself; the
//! [coordinator](crate::coordinator) does that, one event at a time.
//!
//! ```text
//! ClientMessage ─┐
//! Timer ─────────┼─→ Arcade ─→ Outbox { deliveries, timers, ledger, closed_rooms }
//! ClaimSettled ──┘
//! ```
//!
//! Refused requests come back as `Err(RoomError)` from the typed
//! operations; [`Arcade::handle`] turns them into a `Rejected` message for
//! the requester. Stale series events (late deadlines, duplicate reports)
//! are dropped with a debug log.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use conductor_protocol::{
    ClientMessage, GameId, LeaveReason, PlayerId, Recipient, RoomId, RoomSnapshot, RoomStatus,
    ServerMessage, SeriesSummary,
};
use conductor_room::{Departure, PlayerDirectory, RoomError, RoomRegistry};
use conductor_series::{Report, multiplier_bps, rank_players, shuffled_sequence};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::dedup::{ChatKey, RecentSet};
use crate::ledger::{ClaimRequest, LedgerEntry, LedgerError};
use crate::ArcadeConfig;

/// Chat name for players who never set one.
const ANONYMOUS: &str = "Anonymous";

// ---------------------------------------------------------------------------
// Outbox
// ---------------------------------------------------------------------------

/// A timer the arcade wants armed.
///
/// Both kinds carry the game they belong to. When one fires after the
/// game has moved on, the arcade sees the mismatch and ignores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timer {
    /// The game's time is up.
    GameDeadline { room_id: RoomId, game_id: GameId },
    /// Start the game after `after`.
    AdvanceSeries { room_id: RoomId, after: GameId },
}

impl Timer {
    pub fn room_id(&self) -> RoomId {
        match self {
            Self::GameDeadline { room_id, .. } | Self::AdvanceSeries { room_id, .. } => *room_id,
        }
    }
}

/// A call the coordinator should make on the reward ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCall {
    Record(LedgerEntry),
    Claim(ClaimRequest),
}

/// Everything one arcade operation wants done.
#[derive(Debug, Default)]
pub struct Outbox {
    pub deliveries: Vec<(Recipient, ServerMessage)>,
    pub timers: Vec<(Duration, Timer)>,
    pub ledger: Vec<LedgerCall>,
    /// Rooms deleted by this operation. Their pending timers can go.
    pub closed_rooms: Vec<RoomId>,
}

impl Outbox {
    fn send(&mut self, to: Recipient, msg: ServerMessage) {
        self.deliveries.push((to, msg));
    }

    fn to_player(&mut self, player_id: PlayerId, msg: ServerMessage) {
        self.send(Recipient::Player(player_id), msg);
    }

    fn rejection(player_id: PlayerId, err: &RoomError) -> Self {
        let mut out = Self::default();
        out.to_player(
            player_id,
            ServerMessage::Rejected {
                reason: err.reason().to_string(),
                message: err.to_string(),
            },
        );
        out
    }

    /// Every message `player_id` would receive, in order.
    pub fn messages_for(&self, player_id: PlayerId) -> impl Iterator<Item = &ServerMessage> {
        self.deliveries
            .iter()
            .filter(move |(to, _)| to.includes(player_id))
            .map(|(_, msg)| msg)
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
            && self.timers.is_empty()
            && self.ledger.is_empty()
            && self.closed_rooms.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Arcade
// ---------------------------------------------------------------------------

/// All shared session state, owned by one coordinator.
pub struct Arcade {
    config: ArcadeConfig,
    players: PlayerDirectory,
    rooms: RoomRegistry,
    chat: RecentSet<ChatKey>,
    /// `(room, player)` pairs with a claim submitted or paid.
    claims: HashSet<(RoomId, PlayerId)>,
    rng: StdRng,
}

impl Arcade {
    pub fn new(config: ArcadeConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// An arcade whose game sequences are reproducible.
    pub fn with_seed(config: ArcadeConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ArcadeConfig, rng: StdRng) -> Self {
        let config = config.validated();
        Self {
            players: PlayerDirectory::new(&config.lobby),
            rooms: RoomRegistry::new(config.lobby.clone()),
            chat: RecentSet::new(config.chat.dedup_window),
            claims: HashSet::new(),
            rng,
            config,
        }
    }

    pub fn config(&self) -> &ArcadeConfig {
        &self.config
    }

    pub fn players(&self) -> &PlayerDirectory {
        &self.players
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    /// Snapshot of one room, names resolved.
    pub fn room_snapshot(&self, room_id: RoomId) -> Option<RoomSnapshot> {
        self.rooms
            .get(room_id)
            .map(|r| r.snapshot(|p| self.players.name_of(p)))
    }

    /// Snapshots of every room, names resolved.
    pub fn room_snapshots(&self) -> Vec<RoomSnapshot> {
        self.rooms.snapshots(|p| self.players.name_of(p))
    }

    /// Dispatches one client message. Refusals become a `Rejected` for
    /// the sender.
    pub fn handle(&mut self, player_id: PlayerId, msg: ClientMessage, now: u64) -> Outbox {
        let result = match msg {
            ClientMessage::SetName { name } => self.set_name(player_id, &name, now),
            ClientMessage::CreateRoom {
                name,
                max_players,
                password,
            } => self.create_room(player_id, &name, max_players, password, now),
            ClientMessage::JoinRoom { room_id, password } => {
                self.join_room(player_id, room_id, password.as_deref(), now)
            }
            ClientMessage::LeaveRoom => Ok(self.leave_room(player_id, now)),
            ClientMessage::ListRooms => Ok(self.list_rooms(player_id, now)),
            ClientMessage::StartSeries { room_id } => self.start_series(player_id, room_id, now),
            ClientMessage::GameComplete {
                room_id,
                game_id,
                winner,
                results,
            } => Ok(self.game_complete(player_id, room_id, &game_id, winner, results, now)),
            ClientMessage::ClaimReward { room_id } => Ok(self.claim_reward(player_id, room_id)),
            ClientMessage::Chat { text, timestamp } => Ok(self.chat(player_id, &text, timestamp)),
            ClientMessage::Hello { .. }
            | ClientMessage::Heartbeat { .. }
            | ClientMessage::Disconnect { .. } => {
                debug!(%player_id, "connection message reached the arcade, ignoring");
                Ok(Outbox::default())
            }
        };

        result.unwrap_or_else(|e| {
            warn!(%player_id, reason = e.reason(), error = %e, "request rejected");
            Outbox::rejection(player_id, &e)
        })
    }

    // -- Players ------------------------------------------------------------

    /// Registers a new connection.
    ///
    /// # Errors
    /// [`RoomError::ServerFull`] at the connection cap.
    pub fn connect(
        &mut self,
        player_id: PlayerId,
        wallet: Option<String>,
        now: u64,
    ) -> Result<Outbox, RoomError> {
        self.players.connect(player_id, wallet)?;

        let mut out = Outbox::default();
        out.to_player(
            player_id,
            ServerMessage::Welcome {
                player_id,
                server_time: now,
                max_players: self.players.max_connections(),
            },
        );
        out.send(Recipient::All, self.players_update());
        out.to_player(player_id, self.room_list(now));
        Ok(out)
    }

    /// Removes a player, leaving their room first exactly as
    /// [`leave_room`](Self::leave_room) would.
    pub fn disconnect(&mut self, player_id: PlayerId, now: u64) -> Outbox {
        let mut out = Outbox::default();
        if !self.players.contains(player_id) {
            return out;
        }
        let left_room = self.depart(player_id, now, &mut out);
        self.players.remove(player_id);

        if left_room {
            out.send(Recipient::All, self.room_list(now));
        }
        out.send(Recipient::All, self.players_update());
        out
    }

    /// # Errors
    /// [`RoomError::PlayerNotFound`] or [`RoomError::InvalidName`].
    pub fn set_name(&mut self, player_id: PlayerId, raw: &str, now: u64) -> Result<Outbox, RoomError> {
        let name = self.players.set_name(player_id, raw)?;

        let mut out = Outbox::default();
        out.send(Recipient::All, self.players_update());
        out.send(Recipient::All, self.room_list(now));
        out.to_player(player_id, ServerMessage::PlayerNameSet { name });
        Ok(out)
    }

    // -- Rooms --------------------------------------------------------------

    /// Creates a room with the requester as creator and only member. A
    /// player already in a room leaves it first.
    ///
    /// # Errors
    /// [`RoomError::PlayerNotFound`] or [`RoomError::InvalidRoomName`].
    pub fn create_room(
        &mut self,
        player_id: PlayerId,
        name: &str,
        max_players: usize,
        password: Option<String>,
        now: u64,
    ) -> Result<Outbox, RoomError> {
        self.require_player(player_id)?;
        self.rooms.check_room_name(name)?;

        let mut out = Outbox::default();
        self.depart(player_id, now, &mut out);

        let total_games = self.config.series.total_games;
        let room_id = self
            .rooms
            .create(player_id, name, max_players, password, now, total_games)?;
        self.players.set_room(player_id, Some(room_id));

        if let Some(room) = self.room_snapshot(room_id) {
            out.to_player(
                player_id,
                ServerMessage::RoomJoined {
                    room_id,
                    room,
                    auto_joined: true,
                },
            );
        }
        self.broadcast_lobby(now, &mut out);
        Ok(out)
    }

    /// Adds the requester to a room. Joining a room you are already in
    /// just repeats the `RoomJoined` reply.
    ///
    /// # Errors
    /// [`RoomError::PlayerNotFound`], [`RoomError::RoomNotFound`],
    /// [`RoomError::WrongPassword`] or [`RoomError::RoomFull`].
    pub fn join_room(
        &mut self,
        player_id: PlayerId,
        room_id: RoomId,
        password: Option<&str>,
        now: u64,
    ) -> Result<Outbox, RoomError> {
        self.require_player(player_id)?;
        let room = self
            .rooms
            .get(room_id)
            .ok_or(RoomError::RoomNotFound(room_id))?;

        let mut out = Outbox::default();
        if room.is_member(player_id) {
            if let Some(room) = self.room_snapshot(room_id) {
                out.to_player(
                    player_id,
                    ServerMessage::RoomJoined {
                        room_id,
                        room,
                        auto_joined: false,
                    },
                );
            }
            return Ok(out);
        }
        // Checked up front so a refused join does not cost the player
        // their current room.
        if !room.accepts_password(password) {
            return Err(RoomError::WrongPassword(room_id));
        }
        if room.is_full() {
            return Err(RoomError::RoomFull(room_id));
        }

        self.depart(player_id, now, &mut out);
        self.rooms.join(room_id, player_id, password)?;
        self.players.set_room(player_id, Some(room_id));

        if let Some(room) = self.room_snapshot(room_id) {
            let others: Vec<PlayerId> = room
                .players
                .iter()
                .copied()
                .filter(|p| *p != player_id)
                .collect();
            out.to_player(
                player_id,
                ServerMessage::RoomJoined {
                    room_id,
                    room,
                    auto_joined: false,
                },
            );
            out.send(
                Recipient::Group(others),
                ServerMessage::PlayerJoinedRoom {
                    room_id,
                    player_id,
                    player_name: self.players.name_of(player_id).map(str::to_owned),
                },
            );
        }
        self.broadcast_lobby(now, &mut out);
        Ok(out)
    }

    /// Takes the requester out of their room. A no-op if they are not in
    /// one.
    pub fn leave_room(&mut self, player_id: PlayerId, now: u64) -> Outbox {
        let mut out = Outbox::default();
        if self.depart(player_id, now, &mut out) {
            self.broadcast_lobby(now, &mut out);
        }
        out
    }

    /// The room list, for the requester only.
    pub fn list_rooms(&self, player_id: PlayerId, now: u64) -> Outbox {
        let mut out = Outbox::default();
        out.to_player(player_id, self.room_list(now));
        out
    }

    /// Forgets per-room bookkeeping once the registry has dropped a room.
    fn close_room(&mut self, room_id: RoomId, out: &mut Outbox) {
        self.claims.retain(|(r, _)| *r != room_id);
        out.closed_rooms.push(room_id);
    }

    /// Removes `player_id` from their current room and handles the
    /// fallout. Returns `false` if they were not in a room.
    fn depart(&mut self, player_id: PlayerId, now: u64, out: &mut Outbox) -> bool {
        let Some(room_id) = self.players.current_room(player_id) else {
            return false;
        };
        self.players.set_room(player_id, None);

        match self.rooms.leave(room_id, player_id) {
            Some(Departure::Deleted { displaced, .. }) => {
                for &p in &displaced {
                    self.players.set_room(p, None);
                }
                self.close_room(room_id, out);
                if !displaced.is_empty() {
                    out.send(
                        Recipient::Group(displaced),
                        ServerMessage::RoomDeleted {
                            room_id,
                            reason: LeaveReason::CreatorLeft,
                        },
                    );
                }
                out.to_player(
                    player_id,
                    ServerMessage::RoomLeft {
                        room_id,
                        reason: LeaveReason::CreatorLeft,
                    },
                );
            }
            Some(Departure::Emptied { .. }) => {
                self.close_room(room_id, out);
                out.to_player(
                    player_id,
                    ServerMessage::RoomLeft {
                        room_id,
                        reason: LeaveReason::NormalLeave,
                    },
                );
            }
            Some(Departure::Left { remaining }) => {
                out.send(
                    Recipient::Group(remaining.clone()),
                    ServerMessage::PlayerLeftRoom {
                        room_id,
                        player_id,
                        player_name: self.players.name_of(player_id).map(str::to_owned),
                        remaining_players: remaining.len(),
                    },
                );
                out.to_player(
                    player_id,
                    ServerMessage::RoomLeft {
                        room_id,
                        reason: LeaveReason::NormalLeave,
                    },
                );

                let stalled = self.rooms.get(room_id).is_some_and(|r| {
                    r.status == RoomStatus::Playing && r.series.ready_to_complete(&remaining)
                });
                if stalled {
                    info!(%room_id, %player_id, "last outstanding player left, closing game");
                    self.finish_game(room_id, now, out);
                }
            }
            None => {
                warn!(%room_id, %player_id, "room did not list departing player");
            }
        }
        true
    }

    // -- Series -------------------------------------------------------------

    /// Starts a series. Creator only, at least two members, and only
    /// from a waiting room.
    ///
    /// # Errors
    /// [`RoomError::RoomNotFound`], [`RoomError::NotCreator`],
    /// [`RoomError::InsufficientPlayers`] or [`RoomError::AlreadyRunning`].
    pub fn start_series(
        &mut self,
        player_id: PlayerId,
        room_id: RoomId,
        now: u64,
    ) -> Result<Outbox, RoomError> {
        let need = self.config.lobby.min_room_players;
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or(RoomError::RoomNotFound(room_id))?;
        if room.creator != player_id {
            return Err(RoomError::NotCreator(room_id));
        }
        if room.members.len() < need {
            return Err(RoomError::InsufficientPlayers {
                room: room_id,
                have: room.members.len(),
                need,
            });
        }
        if room.status != RoomStatus::Waiting {
            return Err(RoomError::AlreadyRunning(room_id));
        }

        let sequence = shuffled_sequence(self.config.series.total_games, &mut self.rng);
        info!(%room_id, players = room.members.len(), ?sequence, "series started");
        room.status = RoomStatus::Playing;
        room.series.begin(sequence);

        let mut out = Outbox::default();
        self.start_next_game(room_id, now, &mut out);
        out.send(Recipient::All, self.room_list(now));
        Ok(out)
    }

    /// Merges one player's completion report into the current game.
    /// Reports for any other game are dropped.
    pub fn game_complete(
        &mut self,
        player_id: PlayerId,
        room_id: RoomId,
        game_id: &GameId,
        winner: Option<PlayerId>,
        results: BTreeMap<PlayerId, u64>,
        now: u64,
    ) -> Outbox {
        let mut out = Outbox::default();
        let Some(room) = self.rooms.get_mut(room_id) else {
            debug!(%room_id, %player_id, %game_id, "report for unknown room ignored");
            return out;
        };
        if !room.is_member(player_id) {
            warn!(%room_id, %player_id, %game_id, "report from non-member ignored");
            return out;
        }

        match room.series.report(game_id, winner, results, &room.members) {
            Ok(Report::Complete) => self.finish_game(room_id, now, &mut out),
            Ok(Report::Pending) => {
                debug!(%room_id, %player_id, %game_id, "report merged, waiting on others");
            }
            Err(e) => {
                debug!(%room_id, %player_id, %game_id, error = %e, "stale report ignored");
            }
        }
        out
    }

    /// Handles a timer from the queue. Timers for games that have moved
    /// on do nothing.
    pub fn timer_fired(&mut self, timer: Timer, now: u64) -> Outbox {
        let mut out = Outbox::default();
        match timer {
            Timer::GameDeadline { room_id, game_id } => {
                let Some(room) = self.rooms.get_mut(room_id) else {
                    debug!(%room_id, %game_id, "deadline for deleted room ignored");
                    return out;
                };
                match room.series.time_out(&game_id) {
                    Ok(()) => {
                        info!(%room_id, %game_id, "game deadline reached");
                        self.finish_game(room_id, now, &mut out);
                    }
                    Err(e) => debug!(%room_id, %game_id, error = %e, "stale deadline ignored"),
                }
            }
            Timer::AdvanceSeries { room_id, after } => {
                let due = self.rooms.get(room_id).is_some_and(|r| {
                    r.status == RoomStatus::Playing && r.series.just_completed(&after)
                });
                if due {
                    self.start_next_game(room_id, now, &mut out);
                } else {
                    debug!(%room_id, game_id = %after, "stale advance ignored");
                }
            }
        }
        out
    }

    fn start_next_game(&mut self, room_id: RoomId, now: u64, out: &mut Outbox) {
        let duration = self.config.series.game_duration;
        let Some(room) = self.rooms.get_mut(room_id) else {
            return;
        };
        if room.series.is_exhausted() {
            self.finalize_series(room_id, now, out);
            return;
        }

        let members = room.members.clone();
        match room.series.start_next(room_id, members.clone(), now, duration) {
            Ok(game) => {
                info!(
                    %room_id,
                    game_id = %game.id,
                    game_type = %game.game_type,
                    index = game.index,
                    "game started"
                );
                out.timers.push((
                    duration,
                    Timer::GameDeadline {
                        room_id,
                        game_id: game.id.clone(),
                    },
                ));
                out.send(
                    Recipient::Group(members),
                    ServerMessage::GameStarted {
                        game: game.start_payload(),
                    },
                );
            }
            Err(e) => warn!(%room_id, error = %e, "could not start next game"),
        }
    }

    /// Records the current game and either schedules the next one or
    /// ends the series.
    fn finish_game(&mut self, room_id: RoomId, now: u64, out: &mut Outbox) {
        let advance_delay = self.config.series.advance_delay;
        let Some(room) = self.rooms.get_mut(room_id) else {
            return;
        };
        let result = match room.series.complete(now) {
            Ok(result) => result,
            Err(e) => {
                debug!(%room_id, error = %e, "nothing to complete");
                return;
            }
        };
        let finished_id = room.series.current_game().map(|g| g.id.clone());
        info!(
            %room_id,
            game_index = result.game_index,
            winner = ?result.winner,
            reports = result.results.len(),
            "game completed"
        );

        out.send(
            Recipient::Group(room.members.clone()),
            ServerMessage::GameCompleted {
                result,
                current_game_index: room.series.current_index(),
                total_games: room.series.total_games(),
            },
        );

        if room.series.is_exhausted() {
            self.finalize_series(room_id, now, out);
        } else if let Some(after) = finished_id {
            out.timers
                .push((advance_delay, Timer::AdvanceSeries { room_id, after }));
        }
    }

    fn finalize_series(&mut self, room_id: RoomId, now: u64, out: &mut Outbox) {
        let winner_bonus = self.config.series.winner_bonus;
        let players = &self.players;
        let Some(room) = self.rooms.get_mut(room_id) else {
            return;
        };

        let rankings = rank_players(&room.members, room.series.results(), winner_bonus, |p| {
            players.name_of(p).map(str::to_owned)
        });
        room.status = RoomStatus::Finished;
        room.series.set_rankings(rankings.clone());
        info!(
            %room_id,
            games = room.series.results().len(),
            leader = ?rankings.first().map(|r| r.player_id),
            "series completed"
        );

        for ranking in &rankings {
            let multiplier = multiplier_bps(ranking.rank);
            let won = ranking.rank == 1;
            out.ledger.push(LedgerCall::Record(LedgerEntry {
                player_id: ranking.player_id,
                wallet: players.get(ranking.player_id).and_then(|p| p.wallet.clone()),
                room_id,
                score: ranking.score,
                multiplier_bps: multiplier,
                won,
                rank: ranking.rank,
            }));
            out.to_player(
                ranking.player_id,
                ServerMessage::RecordResult {
                    room_id,
                    score: ranking.score,
                    multiplier,
                    won,
                    rank: ranking.rank,
                },
            );
        }

        out.send(
            Recipient::Group(room.members.clone()),
            ServerMessage::SeriesCompleted(SeriesSummary {
                room_id,
                final_rankings: rankings,
                game_results: room.series.results().to_vec(),
                total_games: room.series.total_games(),
            }),
        );
        out.send(Recipient::All, self.room_list(now));
    }

    // -- Rewards ------------------------------------------------------------

    /// Submits the requester's reward for a finished room. Each player
    /// may claim once per room; a failed claim can be retried.
    pub fn claim_reward(&mut self, player_id: PlayerId, room_id: RoomId) -> Outbox {
        let mut out = Outbox::default();
        let fail = |out: &mut Outbox, reason: &str| {
            out.to_player(
                player_id,
                ServerMessage::RewardClaimFailed {
                    room_id,
                    reason: reason.to_string(),
                },
            );
        };

        let Some(room) = self.rooms.get(room_id) else {
            fail(&mut out, "room_not_found");
            return out;
        };
        if room.status != RoomStatus::Finished {
            fail(&mut out, "series_not_finished");
            return out;
        }
        let Some(ranking) = room.series.rankings().iter().find(|r| r.player_id == player_id) else {
            fail(&mut out, "not_ranked");
            return out;
        };
        if ranking.claimable == 0 {
            fail(&mut out, "nothing_to_claim");
            return out;
        }
        if !self.claims.insert((room_id, player_id)) {
            fail(&mut out, "already_claimed");
            return out;
        }

        info!(%room_id, %player_id, amount = ranking.claimable, "reward claim submitted");
        out.ledger.push(LedgerCall::Claim(ClaimRequest {
            player_id,
            wallet: self.players.get(player_id).and_then(|p| p.wallet.clone()),
            room_id,
            amount: ranking.claimable,
        }));
        out
    }

    /// Whether a claim for this room is submitted or settled.
    pub fn has_claimed(&self, player_id: PlayerId, room_id: RoomId) -> bool {
        self.claims.contains(&(room_id, player_id))
    }

    /// Reports the ledger's answer to a claim back to the player.
    pub fn claim_settled(
        &mut self,
        player_id: PlayerId,
        room_id: RoomId,
        outcome: Result<u64, LedgerError>,
    ) -> Outbox {
        let mut out = Outbox::default();
        match outcome {
            Ok(amount) => {
                out.to_player(player_id, ServerMessage::RewardClaimed { room_id, amount });
            }
            Err(e) => {
                warn!(%room_id, %player_id, error = %e, "reward claim failed");
                self.claims.remove(&(room_id, player_id));
                out.to_player(
                    player_id,
                    ServerMessage::RewardClaimFailed {
                        room_id,
                        reason: e.to_string(),
                    },
                );
            }
        }
        out
    }

    // -- Chat ---------------------------------------------------------------

    /// Relays a chat line to everyone, unless it is a repeat of one seen
    /// recently.
    pub fn chat(&mut self, player_id: PlayerId, text: &str, timestamp: u64) -> Outbox {
        let mut out = Outbox::default();
        let Some(player) = self.players.get(player_id) else {
            return out;
        };
        let player_name = player.name.clone().unwrap_or_else(|| ANONYMOUS.to_string());

        let text: String = text.trim().chars().take(self.config.chat.max_len).collect();
        if text.is_empty() {
            return out;
        }
        let key = ChatKey {
            sender: player_id,
            text: text.clone(),
            timestamp,
        };
        if !self.chat.insert(key) {
            debug!(%player_id, timestamp, "duplicate chat dropped");
            return out;
        }

        out.send(
            Recipient::All,
            ServerMessage::ChatUpdate {
                player_id,
                player_name,
                text,
                timestamp,
            },
        );
        out
    }

    // -- Snapshots ----------------------------------------------------------

    fn require_player(&self, player_id: PlayerId) -> Result<(), RoomError> {
        if self.players.contains(player_id) {
            Ok(())
        } else {
            Err(RoomError::PlayerNotFound(player_id))
        }
    }

    fn room_list(&self, now: u64) -> ServerMessage {
        ServerMessage::RoomList {
            rooms: self.room_snapshots(),
            timestamp: now,
        }
    }

    fn players_update(&self) -> ServerMessage {
        ServerMessage::PlayersUpdate {
            players: self.players.snapshots(),
            player_count: self.players.len(),
        }
    }

    fn broadcast_lobby(&self, now: u64, out: &mut Outbox) {
        out.send(Recipient::All, self.room_list(now));
        out.send(Recipient::All, self.players_update());
    }
}
