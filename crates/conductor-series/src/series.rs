//! Per-room series state: the ordered games, the one in flight, and the
//! results so far.
//!
//! ```text
//! begin() ──→ start_next() ──→ report()* ──→ complete() ──→ start_next() ...
//!                   │                            ↑
//!                   └──── time_out() ────────────┘
//! ```
//!
//! Every mutating call checks the game id and the `completed` /
//! `timed_out` guards first. A report or deadline for a game that is no
//! longer current comes back as a [`SeriesError`] and changes nothing,
//! which is what makes late timers and duplicate reports harmless.

use std::collections::BTreeMap;
use std::time::Duration;

use conductor_protocol::{
    FinalRanking, GameId, GameResult, GameStart, GameType, PlayerId, RoomId,
};

use crate::SeriesError;

// ---------------------------------------------------------------------------
// GameDescriptor
// ---------------------------------------------------------------------------

/// The live, in-progress mini-game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameDescriptor {
    pub id: GameId,
    pub game_type: GameType,
    /// 1-based.
    pub index: usize,
    pub total_games: usize,
    pub duration: Duration,
    /// Server time (ms).
    pub start_time: u64,
    pub room_id: RoomId,
    /// Room members when the game started. Only they are expected to
    /// report.
    pub participants: Vec<PlayerId>,
    /// Scores reported so far. A second report from the same player
    /// overwrites the first.
    pub scores: BTreeMap<PlayerId, u64>,
    /// The first winner claimed by a report.
    pub winner: Option<PlayerId>,
    pub completed: bool,
    pub timed_out: bool,
}

impl GameDescriptor {
    /// Returns `true` once a report or the deadline has closed the game.
    pub fn is_closed(&self) -> bool {
        self.completed || self.timed_out
    }

    /// Returns `true` if every participant still in `active` has a score.
    ///
    /// Participants who left the room are not waited for. If none are
    /// left, there is nobody to wait for.
    pub fn all_reported(&self, active: &[PlayerId]) -> bool {
        self.participants
            .iter()
            .filter(|p| active.contains(p))
            .all(|p| self.scores.contains_key(p))
    }

    /// The payload broadcast to every member at game start.
    pub fn start_payload(&self) -> GameStart {
        GameStart {
            id: self.id.clone(),
            game_type: self.game_type,
            index: self.index,
            total_games: self.total_games,
            duration: self.duration.as_millis() as u64,
            start_time: self.start_time,
            room_id: self.room_id,
            players: self.participants.clone(),
        }
    }
}

/// What a completion report did to the current game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// Scores merged; still waiting on other participants.
    Pending,
    /// Every remaining participant has reported. Call
    /// [`SeriesState::complete`].
    Complete,
}

// ---------------------------------------------------------------------------
// SeriesState
// ---------------------------------------------------------------------------

/// Everything a room knows about its series.
#[derive(Debug, Clone, Default)]
pub struct SeriesState {
    total_games: usize,
    /// 0-based index of the next game to start; equals the number of
    /// completed games.
    current_index: usize,
    sequence: Vec<GameType>,
    results: Vec<GameResult>,
    current: Option<GameDescriptor>,
    rankings: Vec<FinalRanking>,
}

impl SeriesState {
    /// An idle series that will play `total_games` once started.
    pub fn new(total_games: usize) -> Self {
        Self {
            total_games,
            ..Self::default()
        }
    }

    /// Resets the series to play `sequence` from the top.
    ///
    /// Prior results, rankings and any in-flight game are discarded.
    pub fn begin(&mut self, sequence: Vec<GameType>) {
        self.total_games = sequence.len();
        self.sequence = sequence;
        self.current_index = 0;
        self.results.clear();
        self.rankings.clear();
        self.current = None;
    }

    /// Starts the game at `current_index`, replacing the previous
    /// descriptor.
    ///
    /// # Errors
    /// [`SeriesError::Exhausted`] if every game has been played.
    pub fn start_next(
        &mut self,
        room_id: RoomId,
        participants: Vec<PlayerId>,
        now: u64,
        duration: Duration,
    ) -> Result<&GameDescriptor, SeriesError> {
        let game_type = match self.sequence.get(self.current_index) {
            Some(g) if self.current_index < self.total_games => *g,
            _ => return Err(SeriesError::Exhausted(self.total_games)),
        };
        let index = self.current_index + 1;

        let descriptor = GameDescriptor {
            id: GameId::new(room_id, index, now),
            game_type,
            index,
            total_games: self.total_games,
            duration,
            start_time: now,
            room_id,
            participants,
            scores: BTreeMap::new(),
            winner: None,
            completed: false,
            timed_out: false,
        };
        Ok(self.current.insert(descriptor))
    }

    /// Merges a completion report into the current game.
    ///
    /// Only scores of participants are kept, and a winner claim only
    /// counts if the claimed player is a participant. `active` is the
    /// room's current member list, used to decide whether anyone is still
    /// outstanding.
    ///
    /// # Errors
    /// Any [`SeriesError`] guard failure; the state is left untouched.
    pub fn report(
        &mut self,
        game_id: &GameId,
        winner: Option<PlayerId>,
        results: BTreeMap<PlayerId, u64>,
        active: &[PlayerId],
    ) -> Result<Report, SeriesError> {
        let game = self.open_game_mut(game_id)?;

        for (player, score) in results {
            if game.participants.contains(&player) {
                game.scores.insert(player, score);
            }
        }
        if game.winner.is_none() {
            game.winner = winner.filter(|w| game.participants.contains(w));
        }

        if game.all_reported(active) {
            Ok(Report::Complete)
        } else {
            Ok(Report::Pending)
        }
    }

    /// Marks the current game as timed out. Follow with
    /// [`complete`](Self::complete) to record it.
    ///
    /// # Errors
    /// Any [`SeriesError`] guard failure.
    pub fn time_out(&mut self, game_id: &GameId) -> Result<(), SeriesError> {
        let game = self.open_game_mut(game_id)?;
        game.timed_out = true;
        Ok(())
    }

    /// Returns `true` if the open game has nobody left to wait for.
    ///
    /// Used after a participant leaves mid-game.
    pub fn ready_to_complete(&self, active: &[PlayerId]) -> bool {
        match &self.current {
            Some(game) if !game.completed => game.all_reported(active),
            _ => false,
        }
    }

    /// Closes the current game, appends its [`GameResult`] and advances
    /// the index.
    ///
    /// A timed-out game never has a winner; its results are whatever
    /// scores arrived before the deadline.
    ///
    /// # Errors
    /// [`SeriesError::NoGameInFlight`] or
    /// [`SeriesError::AlreadyCompleted`].
    pub fn complete(&mut self, now: u64) -> Result<GameResult, SeriesError> {
        let game = self.current.as_mut().ok_or(SeriesError::NoGameInFlight)?;
        if game.completed {
            return Err(SeriesError::AlreadyCompleted(game.id.clone()));
        }
        game.completed = true;

        let result = GameResult {
            game_index: game.index,
            game_type: game.game_type,
            winner: if game.timed_out { None } else { game.winner },
            results: game.scores.clone(),
            completed_at: now,
            duration: now.saturating_sub(game.start_time),
        };
        self.current_index += 1;
        self.results.push(result.clone());
        Ok(result)
    }

    /// Drops the in-flight game. Later events for it no longer match.
    pub fn abandon(&mut self) {
        self.current = None;
    }

    /// Returns `true` once every game has completed.
    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.total_games
    }

    /// Returns `true` if `game_id` is the current game and still open.
    pub fn is_open(&self, game_id: &GameId) -> bool {
        matches!(&self.current, Some(g) if g.id == *game_id && !g.is_closed())
    }

    /// Returns `true` if `game_id` is the current game and has completed.
    pub fn just_completed(&self, game_id: &GameId) -> bool {
        matches!(&self.current, Some(g) if g.id == *game_id && g.completed)
    }

    pub fn current_game(&self) -> Option<&GameDescriptor> {
        self.current.as_ref()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_games(&self) -> usize {
        self.total_games
    }

    pub fn sequence(&self) -> &[GameType] {
        &self.sequence
    }

    pub fn results(&self) -> &[GameResult] {
        &self.results
    }

    pub fn rankings(&self) -> &[FinalRanking] {
        &self.rankings
    }

    /// Stores the final standings once the series is over.
    pub fn set_rankings(&mut self, rankings: Vec<FinalRanking>) {
        self.rankings = rankings;
    }

    fn open_game_mut(&mut self, game_id: &GameId) -> Result<&mut GameDescriptor, SeriesError> {
        let game = self.current.as_mut().ok_or(SeriesError::NoGameInFlight)?;
        if game.id != *game_id {
            return Err(SeriesError::NotCurrent(game_id.clone()));
        }
        if game.completed {
            return Err(SeriesError::AlreadyCompleted(game_id.clone()));
        }
        if game.timed_out {
            return Err(SeriesError::AlreadyTimedOut(game_id.clone()));
        }
        Ok(game)
    }
}
