//! End-to-end rules of the arcade, driven synchronously.

use std::collections::BTreeMap;
use std::time::Duration;

use conductor::protocol::{
    ClientMessage, GameId, GameType, LeaveReason, PlayerId, Recipient, RoomId, RoomStatus,
    ServerMessage,
};
use conductor::{Arcade, ArcadeConfig, LedgerCall, LedgerError, Outbox, RoomError, Timer};

const A: PlayerId = PlayerId(1);
const B: PlayerId = PlayerId(2);
const C: PlayerId = PlayerId(3);

fn connected(players: &[PlayerId]) -> Arcade {
    connected_with(ArcadeConfig::default(), players)
}

fn connected_with(config: ArcadeConfig, players: &[PlayerId]) -> Arcade {
    let mut arcade = Arcade::with_seed(config, 7);
    for &p in players {
        arcade.connect(p, Some(format!("0x{:04}", p.0)), 0).unwrap();
    }
    arcade
}

/// A creates "Alpha" and everyone else joins it.
fn alpha_with(arcade: &mut Arcade, others: &[PlayerId]) -> RoomId {
    arcade.create_room(A, "Alpha", 4, None, 10).unwrap();
    let room_id = arcade.players().current_room(A).unwrap();
    for &p in others {
        arcade.join_room(p, room_id, None, 20).unwrap();
    }
    room_id
}

fn current_game(arcade: &Arcade, room_id: RoomId) -> GameId {
    arcade
        .rooms()
        .get(room_id)
        .and_then(|r| r.series.current_game())
        .map(|g| g.id.clone())
        .expect("a game is in flight")
}

fn report(
    arcade: &mut Arcade,
    player: PlayerId,
    room_id: RoomId,
    game: &GameId,
    scores: &[(PlayerId, u64)],
    winner: Option<PlayerId>,
) -> Outbox {
    let results: BTreeMap<PlayerId, u64> = scores.iter().copied().collect();
    arcade.game_complete(player, room_id, game, winner, results, 1_000)
}

fn advance_timer(out: &Outbox) -> Option<Timer> {
    out.timers
        .iter()
        .find(|(_, t)| matches!(t, Timer::AdvanceSeries { .. }))
        .map(|(_, t)| t.clone())
}

/// A and B both report, then the advance timer fires. Returns the last
/// outbox: the next game's start, or the series summary.
fn play_round(arcade: &mut Arcade, room_id: RoomId, a: u64, b: u64, winner: Option<PlayerId>) -> Outbox {
    let game = current_game(arcade, room_id);
    report(arcade, A, room_id, &game, &[(A, a)], winner);
    let out = report(arcade, B, room_id, &game, &[(B, b)], winner);
    match advance_timer(&out) {
        Some(timer) => arcade.timer_fired(timer, 2_000),
        None => out,
    }
}

fn rejection_reason(out: &Outbox, player: PlayerId) -> Option<String> {
    out.messages_for(player).find_map(|m| match m {
        ServerMessage::Rejected { reason, .. } => Some(reason.clone()),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Rooms
// ---------------------------------------------------------------------------

#[test]
fn test_create_room_lists_waiting_room_with_creator() {
    let mut arcade = connected(&[A]);
    let out = arcade.create_room(A, "Alpha", 4, None, 10).unwrap();

    let room_id = arcade.players().current_room(A).expect("creator is placed in the room");
    let room = arcade.rooms().get(room_id).unwrap();
    assert_eq!(room.status, RoomStatus::Waiting);
    assert_eq!(room.members, vec![A]);

    assert!(out.messages_for(A).any(|m| matches!(
        m,
        ServerMessage::RoomJoined { auto_joined: true, room, .. } if room.id == room_id
    )));
    let listed = out.deliveries.iter().any(|(to, m)| {
        *to == Recipient::All
            && matches!(m, ServerMessage::RoomList { rooms, .. }
                if rooms.iter().any(|r| r.id == room_id && r.status == RoomStatus::Waiting))
    });
    assert!(listed, "room list broadcast should include the new room");
}

#[test]
fn test_join_then_rejoin_is_noop() {
    let mut arcade = connected(&[A, B]);
    let room_id = alpha_with(&mut arcade, &[]);

    let out = arcade.join_room(B, room_id, None, 20).unwrap();
    assert_eq!(arcade.rooms().get(room_id).unwrap().members, vec![A, B]);
    assert!(out.messages_for(A).any(|m| matches!(
        m,
        ServerMessage::PlayerJoinedRoom { player_id, .. } if *player_id == B
    )));

    let again = arcade.join_room(B, room_id, None, 30).unwrap();
    assert_eq!(arcade.rooms().get(room_id).unwrap().members, vec![A, B]);
    assert_eq!(again.deliveries.len(), 1, "only the RoomJoined reply");
    assert!(matches!(
        again.deliveries[0],
        (Recipient::Player(B), ServerMessage::RoomJoined { .. })
    ));
}

#[test]
fn test_refused_join_keeps_current_room() {
    let mut arcade = connected(&[A, B, C]);
    arcade.create_room(A, "locked", 4, Some("pw".into()), 0).unwrap();
    let locked = arcade.players().current_room(A).unwrap();
    arcade.create_room(B, "mine", 4, None, 0).unwrap();
    let mine = arcade.players().current_room(B).unwrap();

    let out = arcade.handle(
        B,
        ClientMessage::JoinRoom {
            room_id: locked,
            password: Some("nope".into()),
        },
        5,
    );
    assert_eq!(rejection_reason(&out, B).as_deref(), Some("wrong_password"));
    assert_eq!(arcade.players().current_room(B), Some(mine));
    assert!(arcade.rooms().contains(mine));

    let out = arcade.handle(
        C,
        ClientMessage::JoinRoom {
            room_id: RoomId(99),
            password: None,
        },
        5,
    );
    assert_eq!(rejection_reason(&out, C).as_deref(), Some("room_not_found"));
}

#[test]
fn test_join_moves_player_out_of_previous_room() {
    let mut arcade = connected(&[A, B, C]);
    let alpha = alpha_with(&mut arcade, &[C]);
    arcade.create_room(B, "Beta", 4, None, 0).unwrap();
    let beta = arcade.players().current_room(B).unwrap();

    let out = arcade.join_room(C, beta, None, 50).unwrap();
    assert!(out.messages_for(C).any(|m| matches!(
        m,
        ServerMessage::RoomLeft { room_id, reason: LeaveReason::NormalLeave } if *room_id == alpha
    )));
    assert_eq!(arcade.rooms().get(alpha).unwrap().members, vec![A]);
    assert_eq!(arcade.rooms().get(beta).unwrap().members, vec![B, C]);

    // At most one room per player, and current_room agrees with it.
    for player in [A, B, C] {
        let rooms: Vec<RoomId> = arcade
            .rooms()
            .rooms()
            .filter(|r| r.is_member(player))
            .map(|r| r.id)
            .collect();
        assert_eq!(rooms.len(), 1);
        assert_eq!(arcade.players().current_room(player), Some(rooms[0]));
    }
}

#[test]
fn test_full_room_rejects_join() {
    let mut arcade = connected(&[A, B, C]);
    arcade.create_room(A, "pair", 2, None, 0).unwrap();
    let room_id = arcade.players().current_room(A).unwrap();
    arcade.join_room(B, room_id, None, 0).unwrap();

    assert_eq!(
        arcade.join_room(C, room_id, None, 0).unwrap_err(),
        RoomError::RoomFull(room_id)
    );
}

#[test]
fn test_member_leaving_notifies_the_rest() {
    let mut arcade = connected(&[A, B]);
    let room_id = alpha_with(&mut arcade, &[B]);

    let out = arcade.leave_room(B, 40);
    assert!(out.messages_for(A).any(|m| matches!(
        m,
        ServerMessage::PlayerLeftRoom { player_id, remaining_players: 1, .. } if *player_id == B
    )));
    assert!(out.messages_for(B).any(|m| matches!(m, ServerMessage::RoomLeft { .. })));
    assert_eq!(arcade.players().current_room(B), None);
    assert!(arcade.leave_room(B, 41).is_empty(), "second leave does nothing");
}

#[test]
fn test_creator_leaving_deletes_room_and_frees_members() {
    let mut arcade = connected(&[A, B, C]);
    let room_id = alpha_with(&mut arcade, &[B, C]);

    let out = arcade.leave_room(A, 50);
    assert!(!arcade.rooms().contains(room_id));
    assert_eq!(out.closed_rooms, vec![room_id]);
    for p in [B, C] {
        assert_eq!(arcade.players().current_room(p), None);
        assert!(out.messages_for(p).any(|m| matches!(
            m,
            ServerMessage::RoomDeleted { reason: LeaveReason::CreatorLeft, .. }
        )));
    }
    assert!(out.messages_for(A).any(|m| matches!(
        m,
        ServerMessage::RoomLeft { reason: LeaveReason::CreatorLeft, .. }
    )));
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

#[test]
fn test_connect_welcomes_and_broadcasts_player_list() {
    let mut arcade = connected(&[A]);
    let out = arcade.connect(B, None, 99).unwrap();

    assert!(matches!(
        out.messages_for(B).next(),
        Some(ServerMessage::Welcome { player_id, server_time: 99, max_players: 8 }) if *player_id == B
    ));
    assert!(out.messages_for(A).any(|m| matches!(
        m,
        ServerMessage::PlayersUpdate { player_count: 2, .. }
    )));
}

#[test]
fn test_server_full_refuses_connection() {
    let mut config = ArcadeConfig::default();
    config.lobby.max_connections = 2;
    let mut arcade = connected_with(config, &[A, B]);

    assert_eq!(
        arcade.connect(C, None, 0).unwrap_err(),
        RoomError::ServerFull { current: 2, max: 2 }
    );
    assert_eq!(arcade.players().len(), 2);
}

#[test]
fn test_set_name_validates() {
    let mut arcade = connected(&[A]);

    let out = arcade.handle(A, ClientMessage::SetName { name: "  ada  ".into() }, 0);
    assert!(out.messages_for(A).any(|m| matches!(
        m,
        ServerMessage::PlayerNameSet { name } if name == "ada"
    )));

    let out = arcade.handle(A, ClientMessage::SetName { name: "undefined".into() }, 0);
    assert_eq!(rejection_reason(&out, A).as_deref(), Some("invalid_name"));
    assert_eq!(arcade.players().name_of(A), Some("ada"));
}

#[test]
fn test_disconnect_of_unknown_player_is_noop() {
    let mut arcade = connected(&[A]);
    assert!(arcade.disconnect(B, 0).is_empty());
    assert_eq!(arcade.players().len(), 1);
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

#[test]
fn test_start_series_and_complete_first_game() {
    let mut arcade = connected(&[A, B]);
    let room_id = alpha_with(&mut arcade, &[B]);

    let out = arcade.start_series(A, room_id, 100).unwrap();
    let room = arcade.rooms().get(room_id).unwrap();
    assert_eq!(room.status, RoomStatus::Playing);
    assert_eq!(room.series.current_index(), 0);

    let mut distinct = room.series.sequence().to_vec();
    distinct.sort_by_key(|g| g.as_str());
    distinct.dedup();
    assert_eq!(distinct.len(), 5);

    let started: Vec<GameType> = out
        .messages_for(B)
        .filter_map(|m| match m {
            ServerMessage::GameStarted { game: start } => Some(start.game_type),
            _ => None,
        })
        .collect();
    assert_eq!(started.len(), 1);
    assert!(GameType::CATALOG.contains(&started[0]));
    assert!(out.timers.iter().any(|(after, t)| {
        *after == Duration::from_secs(30) && matches!(t, Timer::GameDeadline { .. })
    }));

    let game = current_game(&arcade, room_id);
    let first = report(&mut arcade, A, room_id, &game, &[(A, 10)], None);
    assert!(first.deliveries.is_empty(), "still waiting on B");
    let second = report(&mut arcade, B, room_id, &game, &[(B, 20)], None);

    let room = arcade.rooms().get(room_id).unwrap();
    assert_eq!(room.series.current_index(), 1);
    assert_eq!(room.series.results().len(), 1);
    let result = &room.series.results()[0];
    assert_eq!(result.results, BTreeMap::from([(A, 10), (B, 20)]));
    assert_eq!(result.winner, None);

    assert!(second.messages_for(A).any(|m| matches!(
        m,
        ServerMessage::GameCompleted { current_game_index: 1, total_games: 5, .. }
    )));
    assert!(second.timers.iter().any(|(after, t)| {
        *after == Duration::from_secs(1) && matches!(t, Timer::AdvanceSeries { .. })
    }));
}

#[test]
fn test_start_series_guards() {
    let mut arcade = connected(&[A, B]);
    let room_id = alpha_with(&mut arcade, &[]);

    assert_eq!(
        arcade.start_series(A, room_id, 0).unwrap_err(),
        RoomError::InsufficientPlayers {
            room: room_id,
            have: 1,
            need: 2
        }
    );

    arcade.join_room(B, room_id, None, 0).unwrap();
    let out = arcade.handle(B, ClientMessage::StartSeries { room_id }, 0);
    assert_eq!(rejection_reason(&out, B).as_deref(), Some("not_creator"));

    arcade.start_series(A, room_id, 0).unwrap();
    assert_eq!(
        arcade.start_series(A, room_id, 0).unwrap_err(),
        RoomError::AlreadyRunning(room_id)
    );
}

#[test]
fn test_full_series_ranks_and_records_results() {
    let mut arcade = connected(&[A, B]);
    let room_id = alpha_with(&mut arcade, &[B]);
    arcade.start_series(A, room_id, 100).unwrap();

    let mut last = Outbox::default();
    for _ in 0..5 {
        last = play_round(&mut arcade, room_id, 100, 50, Some(A));
    }

    let room = arcade.rooms().get(room_id).unwrap();
    assert_eq!(room.status, RoomStatus::Finished);
    assert_eq!(room.series.results().len(), 5);

    let summary = last
        .messages_for(B)
        .find_map(|m| match m {
            ServerMessage::SeriesCompleted(summary) => Some(summary.clone()),
            _ => None,
        })
        .expect("series summary sent to members");
    let rankings = &summary.final_rankings;
    assert_eq!(rankings[0].player_id, A);
    assert!(rankings.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(rankings[0].score, 5 * (100 + 100));
    assert_eq!(rankings[0].claimable, rankings[0].score * 5);
    assert_eq!(rankings[1].score, 250);
    assert_eq!(rankings[1].claimable, 500);

    assert!(last.messages_for(A).any(|m| matches!(
        m,
        ServerMessage::RecordResult { multiplier: 500, won: true, rank: 1, .. }
    )));
    let recorded: Vec<PlayerId> = last
        .ledger
        .iter()
        .filter_map(|c| match c {
            LedgerCall::Record(entry) => Some(entry.player_id),
            LedgerCall::Claim(_) => None,
        })
        .collect();
    assert_eq!(recorded, vec![A, B]);
    assert_eq!(arcade.room_snapshot(room_id).unwrap().final_rankings.len(), 2);
}

#[test]
fn test_creator_disconnect_mid_series_deletes_room() {
    let mut arcade = connected(&[A, B]);
    let room_id = alpha_with(&mut arcade, &[B]);
    arcade.start_series(A, room_id, 0).unwrap();
    let game = current_game(&arcade, room_id);

    let out = arcade.disconnect(A, 500);
    assert!(!arcade.rooms().contains(room_id));
    assert_eq!(arcade.players().current_room(B), None);
    assert!(out.messages_for(B).any(|m| matches!(
        m,
        ServerMessage::RoomDeleted { reason: LeaveReason::CreatorLeft, room_id: r } if *r == room_id
    )));
    assert_eq!(out.closed_rooms, vec![room_id]);

    // Timers still in flight for the room do nothing.
    let late = arcade.timer_fired(
        Timer::GameDeadline {
            room_id,
            game_id: game.clone(),
        },
        40_000,
    );
    assert!(late.is_empty());
    let late = arcade.timer_fired(Timer::AdvanceSeries { room_id, after: game }, 40_000);
    assert!(late.is_empty());
}

#[test]
fn test_stale_deadline_changes_nothing() {
    let mut arcade = connected(&[A, B]);
    let room_id = alpha_with(&mut arcade, &[B]);
    arcade.start_series(A, room_id, 0).unwrap();
    let first = current_game(&arcade, room_id);

    play_round(&mut arcade, room_id, 1, 2, None);
    assert_ne!(current_game(&arcade, room_id), first);

    let out = arcade.timer_fired(
        Timer::GameDeadline {
            room_id,
            game_id: first,
        },
        31_000,
    );
    assert!(out.is_empty());
    assert_eq!(arcade.rooms().get(room_id).unwrap().series.results().len(), 1);
}

#[test]
fn test_deadline_completes_with_partial_results() {
    let mut arcade = connected(&[A, B]);
    let room_id = alpha_with(&mut arcade, &[B]);
    arcade.start_series(A, room_id, 0).unwrap();
    let game = current_game(&arcade, room_id);

    report(&mut arcade, A, room_id, &game, &[(A, 42)], Some(A));
    let out = arcade.timer_fired(
        Timer::GameDeadline {
            room_id,
            game_id: game.clone(),
        },
        30_000,
    );

    let result = &arcade.rooms().get(room_id).unwrap().series.results()[0];
    assert_eq!(result.results, BTreeMap::from([(A, 42)]));
    assert_eq!(result.winner, None, "timed-out games have no winner");
    assert!(advance_timer(&out).is_some());

    // B's report arrives too late.
    let late = report(&mut arcade, B, room_id, &game, &[(B, 99)], None);
    assert!(late.is_empty());
    assert_eq!(arcade.rooms().get(room_id).unwrap().series.results().len(), 1);
}

#[test]
fn test_duplicate_report_does_not_complete_twice() {
    let mut arcade = connected(&[A, B]);
    let room_id = alpha_with(&mut arcade, &[B]);
    arcade.start_series(A, room_id, 0).unwrap();
    let game = current_game(&arcade, room_id);

    report(&mut arcade, A, room_id, &game, &[(A, 5)], None);
    report(&mut arcade, A, room_id, &game, &[(A, 6)], None);
    report(&mut arcade, B, room_id, &game, &[(B, 7)], None);
    let again = report(&mut arcade, B, room_id, &game, &[(B, 8)], None);

    assert!(again.is_empty());
    let results = arcade.rooms().get(room_id).unwrap().series.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].results, BTreeMap::from([(A, 6), (B, 7)]));
}

#[test]
fn test_report_from_outsider_is_ignored() {
    let mut arcade = connected(&[A, B, C]);
    let room_id = alpha_with(&mut arcade, &[B]);
    arcade.start_series(A, room_id, 0).unwrap();
    let game = current_game(&arcade, room_id);

    let out = report(&mut arcade, C, room_id, &game, &[(A, 1), (B, 1)], Some(C));
    assert!(out.is_empty());
    let game = arcade.rooms().get(room_id).unwrap().series.current_game().unwrap();
    assert!(game.scores.is_empty());
}

#[test]
fn test_leaver_no_longer_holds_up_the_game() {
    let mut arcade = connected(&[A, B, C]);
    let room_id = alpha_with(&mut arcade, &[B, C]);
    arcade.start_series(A, room_id, 0).unwrap();
    let game = current_game(&arcade, room_id);

    report(&mut arcade, A, room_id, &game, &[(A, 3)], None);
    report(&mut arcade, B, room_id, &game, &[(B, 4)], None);
    let out = arcade.leave_room(C, 2_000);

    let room = arcade.rooms().get(room_id).unwrap();
    assert_eq!(room.series.results().len(), 1);
    assert!(out.messages_for(A).any(|m| matches!(m, ServerMessage::GameCompleted { .. })));
    assert!(advance_timer(&out).is_some());
}

#[test]
fn test_advance_starts_next_game_once() {
    let mut arcade = connected(&[A, B]);
    let room_id = alpha_with(&mut arcade, &[B]);
    arcade.start_series(A, room_id, 0).unwrap();
    let game = current_game(&arcade, room_id);

    report(&mut arcade, A, room_id, &game, &[(A, 1)], None);
    let out = report(&mut arcade, B, room_id, &game, &[(B, 1)], None);
    let timer = advance_timer(&out).unwrap();

    let next = arcade.timer_fired(timer.clone(), 2_000);
    assert!(next.messages_for(A).any(|m| matches!(m, ServerMessage::GameStarted { .. })));
    assert!(arcade.timer_fired(timer, 2_001).is_empty(), "second firing is stale");
}

// ---------------------------------------------------------------------------
// Rewards
// ---------------------------------------------------------------------------

fn finished_room(arcade: &mut Arcade) -> RoomId {
    let room_id = alpha_with(arcade, &[B]);
    arcade.start_series(A, room_id, 0).unwrap();
    for _ in 0..5 {
        play_round(arcade, room_id, 100, 0, Some(A));
    }
    room_id
}

#[test]
fn test_claim_once_per_player() {
    let mut arcade = connected(&[A, B]);
    let room_id = finished_room(&mut arcade);

    let out = arcade.claim_reward(A, room_id);
    assert!(matches!(
        out.ledger.as_slice(),
        [LedgerCall::Claim(claim)] if claim.amount == 5_000 && claim.player_id == A
    ));

    let again = arcade.claim_reward(A, room_id);
    assert!(again.ledger.is_empty());
    assert!(again.messages_for(A).any(|m| matches!(
        m,
        ServerMessage::RewardClaimFailed { reason, .. } if reason == "already_claimed"
    )));

    let settled = arcade.claim_settled(A, room_id, Ok(5_000));
    assert!(settled.messages_for(A).any(|m| matches!(
        m,
        ServerMessage::RewardClaimed { amount: 5_000, .. }
    )));
}

#[test]
fn test_failed_claim_can_be_retried() {
    let mut arcade = connected(&[A, B]);
    let room_id = finished_room(&mut arcade);

    arcade.claim_reward(A, room_id);
    let out = arcade.claim_settled(A, room_id, Err(LedgerError::Rejected("busy".into())));
    assert!(out.messages_for(A).any(|m| matches!(m, ServerMessage::RewardClaimFailed { .. })));

    let retry = arcade.claim_reward(A, room_id);
    assert_eq!(retry.ledger.len(), 1);
}

#[test]
fn test_closing_room_forgets_its_claims() {
    let mut arcade = connected(&[A, B]);
    let room_id = finished_room(&mut arcade);

    arcade.claim_reward(A, room_id);
    assert!(arcade.has_claimed(A, room_id));

    let out = arcade.leave_room(A, 3_000);
    assert_eq!(out.closed_rooms, vec![room_id]);
    assert!(!arcade.has_claimed(A, room_id));
    assert!(arcade.rooms().is_empty());
}

#[test]
fn test_claim_refusals() {
    let mut arcade = connected(&[A, B, C]);
    let reason = |out: &Outbox, p: PlayerId| {
        out.messages_for(p).find_map(|m| match m {
            ServerMessage::RewardClaimFailed { reason, .. } => Some(reason.clone()),
            _ => None,
        })
    };

    assert_eq!(reason(&arcade.claim_reward(A, RoomId(9)), A).as_deref(), Some("room_not_found"));

    let room_id = alpha_with(&mut arcade, &[B]);
    assert_eq!(
        reason(&arcade.claim_reward(A, room_id), A).as_deref(),
        Some("series_not_finished")
    );

    arcade.start_series(A, room_id, 0).unwrap();
    for _ in 0..5 {
        play_round(&mut arcade, room_id, 100, 0, Some(A));
    }
    assert_eq!(reason(&arcade.claim_reward(C, room_id), C).as_deref(), Some("not_ranked"));
    assert_eq!(reason(&arcade.claim_reward(B, room_id), B).as_deref(), Some("nothing_to_claim"));
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[test]
fn test_chat_is_relayed_once() {
    let mut arcade = connected(&[A, B]);

    let out = arcade.chat(A, "  gg  ", 10);
    assert!(out.messages_for(B).any(|m| matches!(
        m,
        ServerMessage::ChatUpdate { text, player_name, .. } if text == "gg" && player_name == "Anonymous"
    )));

    assert!(arcade.chat(A, "gg", 10).is_empty(), "same message twice");
    assert!(!arcade.chat(A, "gg", 11).is_empty(), "new timestamp is a new message");
    assert!(arcade.chat(A, "   ", 12).is_empty(), "blank text dropped");
}

#[test]
fn test_chat_is_cut_to_length() {
    let mut arcade = connected(&[A]);
    let long = "x".repeat(1_000);
    let out = arcade.chat(A, &long, 1);
    let sent = out
        .messages_for(A)
        .find_map(|m| match m {
            ServerMessage::ChatUpdate { text, .. } => Some(text.len()),
            _ => None,
        })
        .unwrap();
    assert_eq!(sent, 280);
}
