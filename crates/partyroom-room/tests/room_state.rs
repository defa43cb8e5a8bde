//! Room state machine tests, driven directly without an actor.

use std::time::Duration;

use partyroom_protocol::{
    ClientEvent, CreateRoom, ErrorKind, ExpiryHours, GameType, JoinRoom, RequestRoll, RoomCode,
    ServerEvent, TrackLength, WinMode,
};
use partyroom_race::winners;
use partyroom_room::{Joiner, Outbox, Room, RoomConfig, RoomError, RoomState, roll_die};
use partyroom_transport::ConnectionId;
use tokio::time::Instant;

// =========================================================================
// Helpers
// =========================================================================

fn conn(id: u64) -> ConnectionId {
    ConnectionId::new(id)
}

fn joiner(id: u64) -> Joiner {
    Joiner {
        conn: conn(id),
        ip: format!("10.0.0.{id}").parse().unwrap(),
    }
}

fn create_req(game_type: GameType) -> CreateRoom {
    CreateRoom {
        user_name: "host".into(),
        room_name: "테스트".into(),
        is_private: false,
        password: None,
        game_type,
        expiry_hours: ExpiryHours::One,
        block_ip_per_user: false,
        device_id: None,
    }
}

fn join_req(name: &str) -> JoinRoom {
    JoinRoom {
        room_id: RoomCode::new("ABC234"),
        user_name: name.into(),
        password: None,
        device_id: None,
        is_host: false,
    }
}

fn room_with(game_type: GameType, config: RoomConfig) -> Room {
    let mut room = Room::create(
        RoomCode::new("ABC234"),
        joiner(1),
        create_req(game_type),
        config,
    )
    .unwrap();
    room.seed_rng(7);
    room.take_outbox();
    room
}

fn room(game_type: GameType) -> Room {
    room_with(game_type, RoomConfig::default())
}

/// Joins `name` on connection `id` and clears the outbox.
fn join(room: &mut Room, id: u64, name: &str) -> String {
    let assigned = room.join(joiner(id), join_req(name)).unwrap();
    room.take_outbox();
    assigned
}

fn events_for(out: &Outbox, id: u64) -> Vec<ServerEvent> {
    out.for_conn(conn(id)).cloned().collect()
}

fn roll(room: &mut Room, id: u64, name: &str, seed: u64) -> Result<(), RoomError> {
    room.request_roll(
        conn(id),
        RequestRoll {
            user_name: name.into(),
            seed,
            min: None,
            max: None,
        },
    )
}

fn host_count(room: &Room) -> usize {
    room.members()
        .user_infos(|_| false)
        .iter()
        .filter(|u| u.is_host)
        .count()
}

fn game_ended(events: &[ServerEvent]) -> Option<(usize, Option<String>, bool)> {
    events.iter().find_map(|e| match e {
        ServerEvent::GameEnded {
            history,
            winner,
            forced,
            ..
        } => Some((history.len(), winner.clone(), *forced)),
        _ => None,
    })
}

// =========================================================================
// Create and join
// =========================================================================

#[test]
fn test_create_room_creator_is_ready_host() {
    let mut room = Room::create(
        RoomCode::new("abc234"),
        joiner(1),
        create_req(GameType::Dice),
        RoomConfig::default(),
    )
    .unwrap();
    assert_eq!(room.code().as_str(), "ABC234");
    assert_eq!(room.host(), Some("host"));
    assert_eq!(room.ready_users(), vec!["host"]);

    let out = room.take_outbox();
    let events = events_for(&out, 1);
    let [ServerEvent::RoomCreated(snapshot)] = events.as_slice() else {
        panic!("expected roomCreated, got {events:?}");
    };
    assert!(snapshot.is_host);
    assert_eq!(snapshot.room_name, "테스트");
    assert_eq!(snapshot.your_name, "host");
}

#[test]
fn test_create_room_rejects_invalid_input() {
    let bad = [
        CreateRoom {
            user_name: "   ".into(),
            ..create_req(GameType::Dice)
        },
        CreateRoom {
            room_name: "x".repeat(31),
            ..create_req(GameType::Dice)
        },
        CreateRoom {
            is_private: true,
            password: None,
            ..create_req(GameType::Dice)
        },
        CreateRoom {
            is_private: true,
            password: Some("p".repeat(21)),
            ..create_req(GameType::Dice)
        },
    ];
    for req in bad {
        let result = Room::create(RoomCode::new("A"), joiner(1), req, RoomConfig::default());
        assert!(matches!(result, Err(RoomError::Validation(_))));
    }
}

#[test]
fn test_join_duplicate_name_is_suffixed() {
    let mut room = room(GameType::Dice);
    assert_eq!(join(&mut room, 2, "host"), "host_1");
    assert_eq!(join(&mut room, 3, "host"), "host_2");
    assert_eq!(join(&mut room, 4, "host_1"), "host_3");
    assert_eq!(room.members().len(), 4);
}

#[test]
fn test_join_sends_snapshot_and_updates_others() {
    let mut room = room(GameType::Dice);
    room.join(joiner(2), join_req("guest")).unwrap();
    let out = room.take_outbox();

    let guest = events_for(&out, 2);
    assert_eq!(guest.len(), 1);
    let ServerEvent::RoomJoined(snapshot) = &guest[0] else {
        panic!("expected roomJoined");
    };
    assert!(!snapshot.is_host);
    assert_eq!(snapshot.ready_users, vec!["host", "guest"]);
    assert_eq!(snapshot.users.len(), 2);

    let host = events_for(&out, 1);
    assert!(matches!(host[0], ServerEvent::UpdateUsers { .. }));
    assert!(matches!(host[1], ServerEvent::ReadyUsersUpdated { .. }));
}

#[test]
fn test_join_private_room_needs_password() {
    let mut room = Room::create(
        RoomCode::new("ABC234"),
        joiner(1),
        CreateRoom {
            is_private: true,
            password: Some("sesame".into()),
            ..create_req(GameType::Dice)
        },
        RoomConfig::default(),
    )
    .unwrap();

    let err = room.join(joiner(2), join_req("guest")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Permission);
    let ok = room.join(
        joiner(2),
        JoinRoom {
            password: Some("sesame".into()),
            ..join_req("guest")
        },
    );
    assert_eq!(ok.unwrap(), "guest");
}

#[test]
fn test_join_second_host_request_conflicts() {
    let mut room = room(GameType::Dice);
    let err = room
        .join(
            joiner(2),
            JoinRoom {
                is_host: true,
                ..join_req("guest")
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(room.members().len(), 1, "nothing applied");
}

#[test]
fn test_join_block_ip_per_user() {
    let mut room = Room::create(
        RoomCode::new("ABC234"),
        joiner(1),
        CreateRoom {
            block_ip_per_user: true,
            ..create_req(GameType::Dice)
        },
        RoomConfig::default(),
    )
    .unwrap();
    let same_ip = Joiner {
        conn: conn(2),
        ip: joiner(1).ip,
    };
    let err = room.join(same_ip, join_req("twin")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(room.join(joiner(3), join_req("other")).is_ok());
}

#[test]
fn test_join_full_room_conflicts() {
    let config = RoomConfig {
        max_members: 2,
        ..RoomConfig::default()
    };
    let mut room = room_with(GameType::Dice, config);
    join(&mut room, 2, "b");
    let err = room.join(joiner(3), join_req("c")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_join_same_connection_twice_conflicts() {
    let mut room = room(GameType::Dice);
    let err = room.join(joiner(1), join_req("again")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

// =========================================================================
// Host authority
// =========================================================================

#[test]
fn test_host_exactly_one_across_join_leave_sequence() {
    let mut room = room(GameType::Dice);
    let steps: &[(bool, u64)] = &[
        (true, 2),
        (true, 3),
        (false, 1),
        (true, 4),
        (false, 3),
        (false, 2),
        (true, 5),
        (false, 4),
    ];
    for &(is_join, id) in steps {
        if is_join {
            join(&mut room, id, &format!("p{id}"));
        } else {
            room.leave(conn(id)).unwrap();
            room.take_outbox();
        }
        assert_eq!(host_count(&room), 1, "after {is_join} {id}");
    }
    assert_eq!(room.host(), Some("p5"));

    room.leave(conn(5)).unwrap();
    assert!(room.is_empty());
    assert_eq!(room.host(), None);
}

#[test]
fn test_leave_host_promotes_earliest_and_announces_first() {
    let mut room = room(GameType::Dice);
    join(&mut room, 2, "bob");
    join(&mut room, 3, "cat");
    room.leave(conn(1)).unwrap();
    let out = room.take_outbox();

    assert!(matches!(
        events_for(&out, 1).as_slice(),
        [ServerEvent::RoomLeft { .. }]
    ));
    let bob = events_for(&out, 2);
    assert_eq!(bob[0], ServerEvent::HostChanged { host: "bob".into() });
    assert!(matches!(bob[1], ServerEvent::UpdateUsers { .. }));
    assert_eq!(room.host(), Some("bob"));
}

#[test]
fn test_leave_unknown_connection_not_found() {
    let mut room = room(GameType::Dice);
    assert_eq!(room.leave(conn(9)).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn test_transfer_host_and_kick() {
    let mut room = room(GameType::Dice);
    join(&mut room, 2, "bob");
    join(&mut room, 3, "cat");

    let err = room.kick(conn(2), "cat").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Permission);
    assert_eq!(room.kick(conn(1), "host").unwrap_err().kind(), ErrorKind::Validation);
    assert_eq!(room.kick(conn(1), "zed").unwrap_err().kind(), ErrorKind::NotFound);

    room.kick(conn(1), "cat").unwrap();
    let out = room.take_outbox();
    assert_eq!(
        events_for(&out, 3),
        vec![ServerEvent::Kicked { by: "host".into() }]
    );
    assert!(room.members().by_name("cat").is_none());

    room.transfer_host(conn(1), "bob").unwrap();
    let out = room.take_outbox();
    assert_eq!(room.host(), Some("bob"));
    assert_eq!(
        events_for(&out, 1)[0],
        ServerEvent::HostChanged { host: "bob".into() }
    );
    assert_eq!(
        room.start_game(conn(1), Instant::now()).unwrap_err().kind(),
        ErrorKind::Permission
    );
}

// =========================================================================
// Readiness
// =========================================================================

#[test]
fn test_toggle_ready_twice_is_idempotent() {
    let mut room = room(GameType::Dice);
    join(&mut room, 2, "guest");
    let before = room.ready_users();

    room.toggle_ready(conn(2)).unwrap();
    let out = room.take_outbox();
    assert_eq!(
        events_for(&out, 2)[0],
        ServerEvent::ReadyStateChanged { is_ready: false }
    );
    assert_eq!(room.ready_users(), vec!["host"]);

    room.toggle_ready(conn(2)).unwrap();
    let out = room.take_outbox();
    assert_eq!(room.ready_users(), before);
    assert_eq!(
        events_for(&out, 1),
        vec![ServerEvent::ReadyUsersUpdated {
            ready_users: before.clone()
        }]
    );
}

#[test]
fn test_toggle_ready_rejected_during_round() {
    let mut room = room(GameType::Dice);
    room.start_game(conn(1), Instant::now()).unwrap();
    let err = room.toggle_ready(conn(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

// =========================================================================
// Dice
// =========================================================================

#[test]
fn test_dice_round_end_to_end() {
    let mut room = room(GameType::Dice);
    assert_eq!(join(&mut room, 2, "guest"), "guest");
    assert_eq!(room.ready_users(), vec!["host", "guest"]);

    room.start_game(conn(1), Instant::now()).unwrap();
    room.take_outbox();
    assert_eq!(room.state(), RoomState::Active);
    assert_eq!(room.game_players(), ["host", "guest"]);

    roll(&mut room, 1, "host", 11).unwrap();
    let out = room.take_outbox();
    assert!(game_ended(&events_for(&out, 1)).is_none());

    roll(&mut room, 2, "guest", 22).unwrap();
    let out = room.take_outbox();
    let events = events_for(&out, 1);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, ServerEvent::AllPlayersRolled { results } if results.len() == 2))
    );
    let (history, winner, forced) = game_ended(&events).unwrap();
    assert_eq!(history, 2);
    assert!(!forced);

    let host_roll = roll_die(11, 1, 100);
    let guest_roll = roll_die(22, 1, 100);
    let expected = if guest_roll > host_roll { "guest" } else { "host" };
    assert_eq!(winner.as_deref(), Some(expected));

    assert_eq!(room.state(), RoomState::Waiting);
    assert!(room.ready_users().is_empty());
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].dice.len(), 2);
}

#[test]
fn test_request_roll_rules() {
    let mut room = room(GameType::Dice);
    join(&mut room, 2, "guest");
    room.start_game(conn(1), Instant::now()).unwrap();
    join(&mut room, 3, "late");

    assert_eq!(
        roll(&mut room, 1, "guest", 1).unwrap_err().kind(),
        ErrorKind::Validation
    );
    assert_eq!(
        roll(&mut room, 3, "late", 1).unwrap_err().kind(),
        ErrorKind::Conflict,
        "late joiners sit the round out"
    );
    let bad_range = room.request_roll(
        conn(1),
        RequestRoll {
            user_name: "host".into(),
            seed: 1,
            min: Some(10),
            max: Some(10),
        },
    );
    assert_eq!(bad_range.unwrap_err().kind(), ErrorKind::Validation);

    roll(&mut room, 1, "host", 1).unwrap();
    assert_eq!(
        roll(&mut room, 1, "host", 2).unwrap_err().kind(),
        ErrorKind::Conflict
    );
    assert_eq!(room.dice_history().len(), 1);
}

#[test]
fn test_request_roll_uses_saved_range() {
    let mut room = room(GameType::Dice);
    room.update_dice_range(conn(1), 500, 600).unwrap();
    let out = room.take_outbox();
    assert_eq!(
        events_for(&out, 1),
        vec![ServerEvent::DiceRangeUpdated {
            user_name: "host".into(),
            min: 500,
            max: 600
        }]
    );
    assert!(room.update_dice_range(conn(1), 1, 1_000_001).is_err());

    room.start_game(conn(1), Instant::now()).unwrap();
    roll(&mut room, 1, "host", 99).unwrap();
    let out = room.take_outbox();
    let roll = out
        .messages
        .iter()
        .find_map(|(_, e)| match e {
            ServerEvent::DiceRolled(r) => Some(r.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!((roll.min, roll.max), (500, 600));
    assert_eq!(roll.result, roll_die(99, 500, 600));
}

#[test]
fn test_roll_die_is_deterministic_and_in_range() {
    for seed in 0..200 {
        let r = roll_die(seed, 3, 9);
        assert!((3..=9).contains(&r));
        assert_eq!(r, roll_die(seed, 3, 9));
    }
}

#[test]
fn test_round_completes_when_last_player_departs() {
    let config = RoomConfig {
        reconnect_grace: Duration::ZERO,
        ..RoomConfig::default()
    };

    // C rolls.
    let mut by_turn = room_with(GameType::Dice, config.clone());
    join(&mut by_turn, 2, "b");
    join(&mut by_turn, 3, "c");
    by_turn.start_game(conn(1), Instant::now()).unwrap();
    roll(&mut by_turn, 1, "host", 1).unwrap();
    roll(&mut by_turn, 2, "b", 2).unwrap();
    by_turn.take_outbox();
    roll(&mut by_turn, 3, "c", 3).unwrap();
    let turn_events = events_for(&by_turn.take_outbox(), 1);

    // C disconnects instead.
    let mut by_leave = room_with(GameType::Dice, config);
    join(&mut by_leave, 2, "b");
    join(&mut by_leave, 3, "c");
    by_leave.start_game(conn(1), Instant::now()).unwrap();
    roll(&mut by_leave, 1, "host", 1).unwrap();
    roll(&mut by_leave, 2, "b", 2).unwrap();
    by_leave.take_outbox();
    by_leave.disconnect(conn(3), Instant::now());
    let leave_events = events_for(&by_leave.take_outbox(), 1);

    for events in [&turn_events, &leave_events] {
        assert!(
            events
                .iter()
                .any(|e| matches!(e, ServerEvent::AllPlayersRolled { .. }))
        );
        let (_, _, forced) = game_ended(events).unwrap();
        assert!(!forced);
    }
    assert_eq!(by_turn.state(), RoomState::Waiting);
    assert_eq!(by_leave.state(), RoomState::Waiting);
}

#[test]
fn test_round_completes_when_last_player_disconnects_with_grace() {
    let mut room = room(GameType::Dice);
    join(&mut room, 2, "b");
    join(&mut room, 3, "c");
    room.start_game(conn(1), Instant::now()).unwrap();
    roll(&mut room, 1, "host", 1).unwrap();
    roll(&mut room, 2, "b", 2).unwrap();
    room.take_outbox();

    room.disconnect(conn(3), Instant::now());
    let events = events_for(&room.take_outbox(), 1);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, ServerEvent::AllPlayersRolled { .. }))
    );
    let (history, _, forced) = game_ended(&events).unwrap();
    assert_eq!(history, 2);
    assert!(!forced);
    assert_eq!(room.state(), RoomState::Waiting);
    assert!(
        !room.members().by_name("c").unwrap().connected,
        "stale record kept for the grace"
    );
}

#[test]
fn test_disconnect_of_rolled_player_keeps_round_open() {
    let mut room = room(GameType::Dice);
    join(&mut room, 2, "b");
    room.start_game(conn(1), Instant::now()).unwrap();
    roll(&mut room, 2, "b", 2).unwrap();
    room.take_outbox();

    room.disconnect(conn(2), Instant::now());
    assert!(game_ended(&events_for(&room.take_outbox(), 1)).is_none());
    assert_eq!(room.state(), RoomState::Active);

    roll(&mut room, 1, "host", 1).unwrap();
    let (history, _, forced) = game_ended(&events_for(&room.take_outbox(), 1)).unwrap();
    assert_eq!(history, 2);
    assert!(!forced);
}

#[test]
fn test_end_game_forces_dice_round() {
    let mut room = room(GameType::Dice);
    join(&mut room, 2, "guest");
    assert_eq!(room.end_game(conn(1)).unwrap_err().kind(), ErrorKind::Conflict);
    room.start_game(conn(1), Instant::now()).unwrap();
    roll(&mut room, 2, "guest", 5).unwrap();
    room.take_outbox();

    room.end_game(conn(1)).unwrap();
    let (history, winner, forced) = game_ended(&events_for(&room.take_outbox(), 1)).unwrap();
    assert_eq!(history, 1);
    assert_eq!(winner.as_deref(), Some("guest"));
    assert!(forced);
}

#[test]
fn test_start_game_requires_ready_players() {
    let mut room = room(GameType::Dice);
    room.toggle_ready(conn(1)).unwrap();
    let err = room.start_game(conn(1), Instant::now()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

// =========================================================================
// Reconnection
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_reconnect_within_grace_keeps_turn_state() {
    let mut room = room(GameType::Dice);
    join(&mut room, 2, "guest");
    room.start_game(conn(1), Instant::now()).unwrap();
    roll(&mut room, 2, "guest", 4).unwrap();

    let t0 = Instant::now();
    room.disconnect(conn(2), t0);
    assert!(!room.members().by_name("guest").unwrap().connected);
    assert_eq!(room.next_deadline(), Some(t0 + Duration::from_secs(30)));

    let name = room.join(joiner(7), join_req("guest")).unwrap();
    assert_eq!(name, "guest", "reclaims the stale record");
    assert_eq!(room.members().len(), 2);
    assert_eq!(room.next_deadline(), None);
    assert_eq!(
        roll(&mut room, 7, "guest", 5).unwrap_err().kind(),
        ErrorKind::Conflict,
        "already rolled before dropping"
    );
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_grace_expiry_removes_member() {
    let mut room = room(GameType::Dice);
    join(&mut room, 2, "guest");
    room.start_game(conn(1), Instant::now()).unwrap();
    roll(&mut room, 1, "host", 4).unwrap();

    let t0 = Instant::now();
    room.disconnect(conn(2), t0);
    let out = room.take_outbox();
    assert!(game_ended(&events_for(&out, 1)).is_some(), "pending roller no longer blocks");
    room.on_timer(t0 + Duration::from_secs(29));
    assert_eq!(room.members().len(), 2);

    room.on_timer(t0 + Duration::from_secs(30));
    assert_eq!(room.members().len(), 1);
    let out = room.take_outbox();
    assert!(game_ended(&events_for(&out, 1)).is_none());
    assert_eq!(room.state(), RoomState::Waiting);
}

#[test]
fn test_reconnect_with_shortened_unique_name() {
    let long = "abcdefghijklmnopqrst";
    let mut room = Room::create(
        RoomCode::new("ABC234"),
        joiner(1),
        CreateRoom {
            user_name: long.into(),
            ..create_req(GameType::Dice)
        },
        RoomConfig::default(),
    )
    .unwrap();
    room.take_outbox();

    let assigned = join(&mut room, 2, long);
    assert_eq!(assigned, "abcdefghijklmnopqr_1");
    assert!(assigned.chars().count() <= RoomConfig::default().max_name_len);

    room.disconnect(conn(2), Instant::now());
    let reclaimed = room.join(joiner(3), join_req(&assigned)).unwrap();
    assert_eq!(reclaimed, assigned);
    assert_eq!(room.members().len(), 2);
    assert!(room.members().by_name(&assigned).unwrap().connected);
}

#[test]
fn test_disconnected_host_hands_over_to_connected_member() {
    let mut room = room(GameType::Dice);
    join(&mut room, 2, "guest");
    room.disconnect(conn(1), Instant::now());
    let out = room.take_outbox();
    assert_eq!(room.host(), Some("guest"));
    assert_eq!(
        events_for(&out, 2)[0],
        ServerEvent::HostChanged {
            host: "guest".into()
        }
    );
    assert_eq!(host_count(&room), 1);
}

// =========================================================================
// Roulette
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_roulette_round_ends_after_spin() {
    let mut room = room(GameType::Roulette);
    let t0 = Instant::now();
    assert_eq!(
        room.start_game(conn(1), t0).unwrap_err().kind(),
        ErrorKind::Validation,
        "needs two players"
    );

    join(&mut room, 2, "guest");
    room.start_game(conn(1), t0).unwrap();
    let out = room.take_outbox();
    let winner = out
        .for_conn(conn(1))
        .find_map(|e| match e {
            ServerEvent::RouletteStarted { winner, spin_ms, .. } => {
                assert_eq!(*spin_ms, 5000);
                Some(winner.clone())
            }
            _ => None,
        })
        .unwrap();
    assert!(["host", "guest"].contains(&winner.as_str()));

    room.on_timer(t0 + Duration::from_secs(5));
    let events = events_for(&room.take_outbox(), 2);
    assert!(events.contains(&ServerEvent::RouletteEnded {
        winner: winner.clone()
    }));
    let (_, ended_winner, forced) = game_ended(&events).unwrap();
    assert_eq!(ended_winner, Some(winner));
    assert!(!forced);
    assert_eq!(room.state(), RoomState::Waiting);
}

#[tokio::test(start_paused = true)]
async fn test_roulette_winner_redrawn_when_winner_leaves() {
    let mut room = room(GameType::Roulette);
    join(&mut room, 2, "b");
    join(&mut room, 3, "c");
    let t0 = Instant::now();
    room.start_game(conn(1), t0).unwrap();
    let drawn = room
        .take_outbox()
        .for_conn(conn(1))
        .find_map(|e| match e {
            ServerEvent::RouletteStarted { winner, .. } => Some(winner.clone()),
            _ => None,
        })
        .unwrap();

    let ids = [(1, "host"), (2, "b"), (3, "c")];
    let (winner_id, _) = ids.iter().find(|(_, n)| *n == drawn).unwrap();
    let (watcher, _) = ids.iter().find(|(_, n)| *n != drawn).unwrap();
    room.leave(conn(*winner_id)).unwrap();

    let events = events_for(&room.take_outbox(), *watcher);
    let redrawn = events
        .iter()
        .find_map(|e| match e {
            ServerEvent::RouletteWinnerChanged { players, winner } => {
                assert_eq!(players.len(), 2);
                assert!(!players.contains(&drawn));
                Some(winner.clone())
            }
            _ => None,
        })
        .unwrap();
    assert_ne!(redrawn, drawn);
    assert_eq!(room.state(), RoomState::Active);

    room.on_timer(t0 + Duration::from_secs(5));
    let events = events_for(&room.take_outbox(), *watcher);
    assert!(events.contains(&ServerEvent::RouletteEnded {
        winner: redrawn.clone()
    }));
    let (_, ended_winner, forced) = game_ended(&events).unwrap();
    assert_eq!(ended_winner, Some(redrawn));
    assert!(!forced);
}

// =========================================================================
// Horse race
// =========================================================================

fn horse_room_in_selection() -> Room {
    let mut room = room(GameType::HorseRace);
    join(&mut room, 2, "guest");
    room.start_game(conn(1), Instant::now()).unwrap();
    room
}

#[tokio::test(start_paused = true)]
async fn test_horse_race_full_flow() {
    let mut room = horse_room_in_selection();
    let out = room.take_outbox();
    let horses = out
        .for_conn(conn(2))
        .find_map(|e| match e {
            ServerEvent::HorseSelectionStarted { horses, vehicles, .. } => {
                assert_eq!(horses.len(), vehicles.len());
                Some(horses.len())
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(horses, 4, "two players still field four horses");
    assert_eq!(room.state(), RoomState::Selecting);

    room.select_horse(conn(1), Some(0)).unwrap();
    let t0 = Instant::now();
    assert_eq!(
        room.start_horse_race(conn(1), t0).unwrap_err().kind(),
        ErrorKind::Conflict,
        "guest has not picked"
    );
    assert_eq!(
        room.select_horse(conn(2), Some(4)).unwrap_err().kind(),
        ErrorKind::Validation
    );
    room.select_horse(conn(2), None).unwrap();
    room.take_outbox();

    room.start_horse_race(conn(1), t0).unwrap();
    assert_eq!(room.state(), RoomState::Countdown);
    let out = room.take_outbox();
    assert!(matches!(
        events_for(&out, 2).as_slice(),
        [ServerEvent::HorseRaceCountdown { seconds: 3, bets }] if bets.len() == 2
    ));

    room.on_timer(t0 + Duration::from_secs(2));
    assert_eq!(room.state(), RoomState::Countdown);
    let t_start = t0 + Duration::from_secs(3);
    room.on_timer(t_start);
    assert_eq!(room.state(), RoomState::Active);
    let out = room.take_outbox();
    let (started_rankings, bets, duration) = out
        .for_conn(conn(1))
        .find_map(|e| match e {
            ServerEvent::HorseRaceStarted {
                params,
                rankings,
                bets,
                duration,
            } => {
                assert_eq!(params.horses.len(), 4);
                assert_eq!(params.track, TrackLength::Medium);
                Some((rankings.clone(), bets.clone(), *duration))
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(started_rankings.len(), 4);
    assert!(duration > 0.0);

    room.race_animation_complete(conn(2), t_start).unwrap();
    assert_eq!(room.state(), RoomState::Result);
    let out = room.take_outbox();
    let ended = events_for(&out, 1);
    let [
        ServerEvent::HorseRaceEnded {
            rankings,
            winners: won,
            mode,
            forced,
        },
    ] = ended.as_slice()
    else {
        panic!("expected horseRaceEnded, got {ended:?}");
    };
    assert_eq!(*rankings, started_rankings);
    assert_eq!(*won, winners(&started_rankings, WinMode::First, &bets));
    assert_eq!(*mode, WinMode::First);
    assert!(!forced);
    assert_eq!(out.records.len(), 1);
    assert_eq!(room.race_history().len(), 1);

    // A second report is late and ignored.
    room.race_animation_complete(conn(1), t_start).unwrap();
    assert!(room.take_outbox().is_empty());

    room.on_timer(t_start + Duration::from_secs(10));
    assert_eq!(room.state(), RoomState::Waiting);
    let events = events_for(&room.take_outbox(), 2);
    assert_eq!(events[0], ServerEvent::HorseRaceReset);
}

#[tokio::test(start_paused = true)]
async fn test_horse_race_safety_timer_ends_run() {
    let mut room = horse_room_in_selection();
    room.select_horse(conn(1), Some(1)).unwrap();
    room.select_horse(conn(2), Some(2)).unwrap();
    let t0 = Instant::now();
    room.start_horse_race(conn(1), t0).unwrap();
    room.on_timer(t0 + Duration::from_secs(3));
    assert_eq!(room.state(), RoomState::Active);

    let deadline = room.next_deadline().unwrap();
    room.on_timer(deadline - Duration::from_millis(1));
    assert_eq!(room.state(), RoomState::Active);
    room.on_timer(deadline);
    assert_eq!(room.state(), RoomState::Result);
}

#[tokio::test(start_paused = true)]
async fn test_end_horse_race_by_phase() {
    let mut room = horse_room_in_selection();
    let t0 = Instant::now();

    // Selecting: cancel.
    room.end_horse_race(conn(1), t0).unwrap();
    assert_eq!(room.state(), RoomState::Waiting);
    assert_eq!(
        room.end_horse_race(conn(1), t0).unwrap_err().kind(),
        ErrorKind::Conflict
    );

    // Active: force finish, then dismiss the result.
    room.toggle_ready(conn(1)).unwrap();
    room.toggle_ready(conn(2)).unwrap();
    room.start_game(conn(1), t0).unwrap();
    room.select_horse(conn(1), Some(0)).unwrap();
    room.select_horse(conn(2), Some(0)).unwrap();
    room.start_horse_race(conn(1), t0).unwrap();
    room.on_timer(t0 + Duration::from_secs(3));
    room.take_outbox();

    room.end_horse_race(conn(1), t0 + Duration::from_secs(4)).unwrap();
    assert_eq!(room.state(), RoomState::Result);
    let out = room.take_outbox();
    assert!(out.for_conn(conn(2)).any(|e| matches!(
        e,
        ServerEvent::HorseRaceEnded { forced: true, .. }
    )));

    room.end_horse_race(conn(1), t0 + Duration::from_secs(5)).unwrap();
    assert_eq!(room.state(), RoomState::Waiting);
}

#[tokio::test(start_paused = true)]
async fn test_horse_race_settings() {
    let mut room = horse_room_in_selection();
    let t0 = Instant::now();
    room.set_track_length(conn(1), TrackLength::Long).unwrap();
    assert_eq!(
        room.set_track_length(conn(2), TrackLength::Short).unwrap_err().kind(),
        ErrorKind::Permission
    );
    room.set_win_mode(conn(1), WinMode::Last).unwrap();
    assert_eq!(
        room.set_auto_restart(conn(1), 61).unwrap_err().kind(),
        ErrorKind::Validation
    );
    room.set_auto_restart(conn(1), 0).unwrap();

    room.select_horse(conn(1), Some(0)).unwrap();
    room.select_horse(conn(2), Some(1)).unwrap();
    room.start_horse_race(conn(1), t0).unwrap();
    assert_eq!(
        room.set_track_length(conn(1), TrackLength::Short).unwrap_err().kind(),
        ErrorKind::Conflict
    );
    assert_eq!(
        room.set_win_mode(conn(1), WinMode::First).unwrap_err().kind(),
        ErrorKind::Conflict
    );

    room.on_timer(t0 + Duration::from_secs(3));
    room.race_animation_complete(conn(1), t0 + Duration::from_secs(40)).unwrap();
    assert_eq!(room.state(), RoomState::Result);
    assert_eq!(room.next_deadline(), None, "auto restart disabled");
    assert_eq!(room.race_history()[0].game_type, GameType::HorseRace);

    room.reset_horse_race(conn(1)).unwrap();
    assert_eq!(room.state(), RoomState::Waiting);
    assert!(room.race_history().is_empty());
}

#[test]
fn test_horse_events_rejected_in_dice_room() {
    let mut room = room(GameType::Dice);
    let err = room.select_horse(conn(1), Some(0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_horse_room_cancels_when_players_leave() {
    let config = RoomConfig {
        reconnect_grace: Duration::ZERO,
        ..RoomConfig::default()
    };
    let mut room = room_with(GameType::HorseRace, config);
    join(&mut room, 2, "guest");
    room.toggle_ready(conn(1)).unwrap();
    room.start_game(conn(1), Instant::now()).unwrap();
    assert_eq!(room.game_players(), ["guest"]);

    room.disconnect(conn(2), Instant::now());
    assert_eq!(room.state(), RoomState::Waiting);
}

// =========================================================================
// Chat and dispatch
// =========================================================================

#[test]
fn test_chat_ring_and_reactions() {
    let config = RoomConfig {
        chat_history: 3,
        ..RoomConfig::default()
    };
    let mut room = room_with(GameType::Dice, config);
    join(&mut room, 2, "guest");
    for i in 0..5 {
        room.send_message(conn(1), &format!("  hi {i} ")).unwrap();
    }
    let ids: Vec<u64> = room.chat().map(|m| m.id).collect();
    assert_eq!(ids, vec![3, 4, 5]);
    assert_eq!(room.chat().last().unwrap().message, "hi 4");
    assert_eq!(
        room.send_message(conn(1), "   ").unwrap_err().kind(),
        ErrorKind::Validation
    );
    assert!(room.send_message(conn(1), &"x".repeat(201)).is_err());
    room.take_outbox();

    room.toggle_reaction(conn(2), 5, "🎉").unwrap();
    room.toggle_reaction(conn(1), 5, "🎉").unwrap();
    let msg = room.chat().last().unwrap();
    assert_eq!(msg.reactions["🎉"], vec!["guest", "host"]);

    room.toggle_reaction(conn(2), 5, "🎉").unwrap();
    room.toggle_reaction(conn(1), 5, "🎉").unwrap();
    assert!(room.chat().last().unwrap().reactions.is_empty());
    assert_eq!(
        room.toggle_reaction(conn(1), 1, "🎉").unwrap_err().kind(),
        ErrorKind::NotFound,
        "evicted from the ring"
    );
}

#[test]
fn test_handle_event_dispatch() {
    let mut room = room(GameType::Dice);
    let now = Instant::now();
    assert_eq!(
        room.handle_event(conn(1), ClientEvent::ListRooms, now)
            .unwrap_err()
            .kind(),
        ErrorKind::Validation
    );
    assert_eq!(
        room.handle_event(conn(9), ClientEvent::ToggleReady, now)
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
    room.handle_event(
        conn(1),
        ClientEvent::SendMessage {
            message: "hello".into(),
        },
        now,
    )
    .unwrap();
    assert_eq!(room.chat().count(), 1);
}

#[test]
fn test_summary_reflects_room() {
    let mut room = room(GameType::Roulette);
    join(&mut room, 2, "guest");
    let summary = room.summary();
    assert_eq!(summary.room_name, "테스트");
    assert_eq!(summary.members, 2);
    assert!(!summary.game_active);
    assert!(!summary.is_private);
    assert_eq!(summary.game_type, GameType::Roulette);
}
