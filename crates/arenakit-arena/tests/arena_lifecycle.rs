//! Integration tests for the arena lifecycle, driven synchronously.
//!
//! The arena is used directly (no task): countdown ticks go through
//! `tick_countdown` and the game over delay through `complete_game_over`.

mod common;

use std::sync::Arc;

use arenakit_arena::{
    ArenaData, ArenaEvent, ArenaOptions, JoinOutcome, LobbyAction, Location, PhaseId, Recipient,
    Rejection, TickOutcome, hook, observer,
};
use common::{HostCall, arena_with, p, record_events};
use parking_lot::Mutex;

fn no_delay() -> ArenaOptions {
    ArenaOptions {
        end_game_delay: false,
        ..ArenaOptions::default()
    }
}

// =========================================================================
// Joining and the lobby countdown
// =========================================================================

#[test]
fn test_reaching_minimum_starts_countdown() {
    let (mut arena, host) = arena_with(ArenaOptions::default());
    let events = record_events(&mut arena);

    assert_eq!(arena.join(p("alice")), JoinOutcome::Joined);
    assert_eq!(arena.phase(), &PhaseId::LOBBY_WAITING);
    assert!(!arena.is_counting_down());

    assert_eq!(arena.join(p("bob")), JoinOutcome::Joined);
    assert_eq!(arena.phase(), &PhaseId::LOBBY_COUNTDOWN);
    assert!(arena.is_counting_down());
    assert_eq!(arena.remaining(), 30);

    assert_eq!(
        host.messages_to("alice"),
        vec![
            "alice has joined the game!",
            "bob has joined the game!",
            "30 seconds until the game begins!",
        ]
    );
    assert_eq!(
        *events.lock(),
        vec![
            ArenaEvent::ParticipantJoined(p("alice")),
            ArenaEvent::ParticipantJoined(p("bob")),
            ArenaEvent::PhaseChanged {
                from: PhaseId::LOBBY_WAITING,
                to: PhaseId::LOBBY_COUNTDOWN,
            },
            ArenaEvent::CountdownStarted { seconds: 30 },
        ]
    );
}

#[test]
fn test_duplicate_join_is_silent() {
    let (mut arena, host) = arena_with(ArenaOptions::default());
    arena.join(p("alice"));
    host.clear();

    assert_eq!(
        arena.join(p("alice")),
        JoinOutcome::Rejected(Rejection::AlreadyJoined)
    );
    assert_eq!(arena.roster().len(), 1);
    assert!(host.calls().is_empty());
}

#[test]
fn test_join_sends_to_lobby_spawn() {
    let (mut arena, host) = arena_with(ArenaOptions::default());
    let lobby = Location::new("lobby", 0.0, 70.0, 0.0);
    arena.data_mut().set_lobby_spawn(Some(lobby.clone()));

    arena.join(p("alice"));
    assert!(host.calls().contains(&HostCall::Relocate(p("alice"), lobby)));
}

#[test]
fn test_countdown_ticks_into_game_playing() {
    let (mut arena, host) = arena_with(ArenaOptions::default().with_countdown(3));
    let events = record_events(&mut arena);
    arena.join(p("alice"));
    arena.join(p("bob"));
    host.clear();

    for expected in [3, 2, 1] {
        assert_eq!(
            arena.tick_countdown(),
            TickOutcome::Progress {
                seconds: expected,
                announce: true,
            }
        );
        assert_eq!(arena.phase(), &PhaseId::LOBBY_COUNTDOWN);
    }
    assert_eq!(arena.tick_countdown(), TickOutcome::Finished);
    assert_eq!(arena.phase(), &PhaseId::GAME_PLAYING);
    assert!(!arena.is_counting_down());
    assert_eq!(arena.roster().len(), 2);
    assert_eq!(arena.tick_countdown(), TickOutcome::Stale);

    assert_eq!(
        host.messages_to("bob"),
        vec![
            "3 seconds until the game begins!",
            "2 seconds until the game begins!",
            "1 seconds until the game begins!",
        ]
    );

    let phases: Vec<PhaseId> = events
        .lock()
        .iter()
        .filter_map(|event| match event {
            ArenaEvent::PhaseChanged { to, .. } => Some(to.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            PhaseId::LOBBY_COUNTDOWN,
            PhaseId::GAME_COUNTDOWN,
            PhaseId::GAME_PLAYING,
        ]
    );
    assert!(events.lock().contains(&ArenaEvent::CountdownFinished));
}

#[test]
fn test_progress_only_announced_at_checkpoints() {
    let (mut arena, host) = arena_with(ArenaOptions::default().with_countdown(30));
    arena.join(p("alice"));
    arena.join(p("bob"));
    host.clear();

    while arena.tick_countdown() != TickOutcome::Finished {}

    let announced: Vec<String> = host.messages_to("alice");
    let mut expected = vec!["15 seconds until the game begins!".to_string()];
    expected.extend((1..=10).rev().map(|s| format!("{s} seconds until the game begins!")));
    assert_eq!(announced, expected);
}

// =========================================================================
// Leaving and cancellation
// =========================================================================

#[test]
fn test_leave_below_minimum_cancels_countdown() {
    let (mut arena, host) = arena_with(ArenaOptions::default());
    arena.join(p("alice"));
    arena.join(p("bob"));
    arena.tick_countdown();
    arena.tick_countdown();
    assert_eq!(arena.remaining(), 28);

    let events = record_events(&mut arena);
    host.clear();

    assert!(arena.leave(&p("bob")));
    assert_eq!(arena.phase(), &PhaseId::LOBBY_WAITING);
    assert!(!arena.is_counting_down());
    assert_eq!(arena.remaining(), 30);
    assert_eq!(
        host.messages_to("alice"),
        vec!["bob has left the game!", "Countdown cancelled!"]
    );
    assert!(host.messages_to("bob").is_empty());
    assert_eq!(
        *events.lock(),
        vec![
            ArenaEvent::ParticipantLeft(p("bob")),
            ArenaEvent::PhaseChanged {
                from: PhaseId::LOBBY_COUNTDOWN,
                to: PhaseId::COUNTDOWN_CANCELLED,
            },
            ArenaEvent::CountdownCancelled,
            ArenaEvent::PhaseChanged {
                from: PhaseId::COUNTDOWN_CANCELLED,
                to: PhaseId::LOBBY_WAITING,
            },
        ]
    );
}

#[test]
fn test_cancelled_countdown_does_not_tick() {
    let (mut arena, _host) = arena_with(ArenaOptions::default());
    arena.join(p("alice"));
    arena.join(p("bob"));
    arena.leave(&p("bob"));

    assert_eq!(arena.tick_countdown(), TickOutcome::Stale);
    assert_eq!(arena.phase(), &PhaseId::LOBBY_WAITING);
}

#[test]
fn test_cancellation_is_idempotent() {
    let (mut arena, host) = arena_with(ArenaOptions::default());
    arena.join(p("alice"));
    arena.join(p("bob"));
    arena.leave(&p("bob"));
    let events = record_events(&mut arena);
    host.clear();

    assert!(arena.transition(PhaseId::COUNTDOWN_CANCELLED));
    assert_eq!(arena.phase(), &PhaseId::LOBBY_WAITING);
    assert_eq!(arena.remaining(), 30);
    assert!(!events.lock().contains(&ArenaEvent::CountdownCancelled));
    assert!(host.messages_to("alice").is_empty());
}

#[test]
fn test_countdown_restarts_from_full_duration() {
    let (mut arena, _host) = arena_with(ArenaOptions::default().with_countdown(10));
    arena.join(p("alice"));
    arena.join(p("bob"));
    for _ in 0..4 {
        arena.tick_countdown();
    }
    arena.leave(&p("bob"));
    arena.join(p("bob"));

    assert!(arena.is_counting_down());
    assert_eq!(arena.remaining(), 10);
}

#[test]
fn test_reentering_countdown_resets_remaining() {
    let (mut arena, _host) = arena_with(ArenaOptions::default());
    let events = record_events(&mut arena);
    arena.join(p("alice"));
    arena.join(p("bob"));
    for _ in 0..5 {
        arena.tick_countdown();
    }
    assert_eq!(arena.remaining(), 25);

    assert!(arena.transition(PhaseId::LOBBY_COUNTDOWN));
    assert!(arena.is_counting_down());
    assert_eq!(arena.remaining(), 30);
    assert_eq!(
        arena.tick_countdown(),
        TickOutcome::Progress {
            seconds: 30,
            announce: false
        }
    );

    let starts = events
        .lock()
        .iter()
        .filter(|event| matches!(event, ArenaEvent::CountdownStarted { .. }))
        .count();
    assert_eq!(starts, 2);
}

#[test]
fn test_leave_absent_participant_has_no_effect() {
    let (mut arena, host) = arena_with(ArenaOptions::default());
    let events = record_events(&mut arena);

    assert!(!arena.leave(&p("ghost")));
    assert!(host.calls().is_empty());
    assert!(events.lock().is_empty());
}

#[test]
fn test_leave_during_game_keeps_phase() {
    let (mut arena, _host) = arena_with(ArenaOptions::default());
    arena.join(p("alice"));
    arena.join(p("bob"));
    arena.transition(PhaseId::GAME_PLAYING);

    assert!(arena.leave(&p("bob")));
    assert_eq!(arena.phase(), &PhaseId::GAME_PLAYING);
}

// =========================================================================
// Rejections
// =========================================================================

#[test]
fn test_full_lobby_disconnects_in_dedicated_mode() {
    let (mut arena, host) = arena_with(ArenaOptions::default().with_limits(1, 1));
    arena.join(p("alice"));
    assert_eq!(arena.phase(), &PhaseId::LOBBY_COUNTDOWN);

    assert_eq!(
        arena.join(p("bob")),
        JoinOutcome::Rejected(Rejection::LobbyFull)
    );
    assert_eq!(arena.roster().len(), 1);
    assert!(
        host.calls()
            .contains(&HostCall::Disconnect(p("bob"), "The lobby is full!".into()))
    );
}

#[test]
fn test_game_in_progress_sends_to_fallback() {
    let options = ArenaOptions {
        dedicated_mode: false,
        ..ArenaOptions::default()
    };
    let (mut arena, host) = arena_with(options);
    let fallback = Location::new("hub", 0.0, 64.0, 0.0);
    arena.data_mut().set_fallback(Some(fallback.clone()));
    arena.transition(PhaseId::GAME_PLAYING);

    assert_eq!(
        arena.join(p("carol")),
        JoinOutcome::Rejected(Rejection::GameInProgress)
    );
    assert_eq!(
        host.calls(),
        vec![
            HostCall::Message(p("carol"), "The game is currently in progress!".into()),
            HostCall::Relocate(p("carol"), fallback),
        ]
    );
    assert!(arena.roster().is_empty());
}

#[test]
fn test_rejection_without_fallback_disconnects() {
    let options = ArenaOptions {
        dedicated_mode: false,
        ..ArenaOptions::default()
    };
    let (mut arena, host) = arena_with(options);
    arena.transition(PhaseId::GAME_OVER);

    arena.join(p("carol"));
    assert_eq!(host.disconnected(), vec![p("carol")]);
}

// =========================================================================
// Participant events disabled
// =========================================================================

#[test]
fn test_disabled_participant_events_only_track_roster() {
    let options = ArenaOptions {
        trigger_participant_events: false,
        ..ArenaOptions::default().with_limits(2, 2)
    };
    let (mut arena, host) = arena_with(options);

    assert!(arena.join(p("alice")).is_joined());
    assert!(arena.join(p("bob")).is_joined());
    assert_eq!(arena.phase(), &PhaseId::LOBBY_WAITING);
    assert_eq!(
        arena.join(p("alice")),
        JoinOutcome::Rejected(Rejection::AlreadyJoined)
    );
    assert_eq!(
        arena.join(p("carol")),
        JoinOutcome::Rejected(Rejection::LobbyFull)
    );

    arena.transition(PhaseId::GAME_PLAYING);
    assert!(arena.join(p("carol")).is_joined());
    assert!(arena.leave(&p("alice")));
    assert_eq!(arena.roster().len(), 2);
    assert!(host.calls().is_empty());
}

#[test]
fn test_disabled_phase_actions_skip_countdown() {
    let options = ArenaOptions {
        default_phase_actions: false,
        ..ArenaOptions::default()
    };
    let (mut arena, _host) = arena_with(options);
    arena.join(p("alice"));
    arena.join(p("bob"));

    assert_eq!(arena.phase(), &PhaseId::LOBBY_COUNTDOWN);
    assert!(!arena.is_counting_down());
}

// =========================================================================
// Transitions and hooks
// =========================================================================

#[test]
fn test_transition_to_unknown_phase_is_refused() {
    let (mut arena, _host) = arena_with(ArenaOptions::default());
    let events = record_events(&mut arena);

    assert!(!arena.transition(PhaseId::new("NOWHERE")));
    assert_eq!(arena.phase(), &PhaseId::LOBBY_WAITING);
    assert!(events.lock().is_empty());
}

#[test]
fn test_custom_phase_with_hook() {
    let (mut arena, _host) = arena_with(ArenaOptions::default());
    let sudden_death = PhaseId::new("SUDDEN_DEATH");
    assert!(arena.register_state(sudden_death.clone()));
    assert!(!arena.register_state(sudden_death.clone()));
    assert_eq!(arena.default_states(), PhaseId::DEFAULTS.to_vec());
    assert_eq!(arena.states().last(), Some(&sudden_death));

    let entered = Arc::new(Mutex::new(0));
    let counter = entered.clone();
    assert!(arena.register_hook(
        sudden_death.clone(),
        hook(move |ctx| {
            *counter.lock() += 1;
            ctx.set_variable("sudden_death", true);
        }),
    ));

    assert!(arena.transition(sudden_death.clone()));
    assert!(arena.transition(sudden_death.clone()));
    assert_eq!(*entered.lock(), 2);
    assert_eq!(arena.get::<bool>("sudden_death"), Some(true));

    assert!(!arena.remove_state(&sudden_death));
    arena.transition(PhaseId::GAME_PLAYING);
    assert!(arena.remove_state(&sudden_death));
    assert!(!arena.has_hook(&sudden_death));
    assert!(!arena.remove_state(&PhaseId::GAME_OVER));
}

#[test]
fn test_hook_transition_is_queued() {
    let (mut arena, host) = arena_with(no_delay());
    arena.join(p("alice"));
    arena.join(p("bob"));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    arena.register_hook(
        PhaseId::GAME_PLAYING,
        hook(move |ctx| {
            assert!(ctx.transition(PhaseId::GAME_OVER));
            log.lock().push(ctx.phase().clone());
        }),
    );
    let events = record_events(&mut arena);

    assert!(arena.transition(PhaseId::GAME_PLAYING));

    assert_eq!(*seen.lock(), vec![PhaseId::GAME_PLAYING]);
    assert_eq!(arena.phase(), &PhaseId::LOBBY_WAITING);
    assert!(arena.roster().is_empty());
    assert_eq!(host.disconnected(), vec![p("alice"), p("bob")]);

    let changes: Vec<(PhaseId, PhaseId)> = events
        .lock()
        .iter()
        .filter_map(|event| match event {
            ArenaEvent::PhaseChanged { from, to } => Some((from.clone(), to.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![
            (PhaseId::LOBBY_COUNTDOWN, PhaseId::GAME_PLAYING),
            (PhaseId::GAME_PLAYING, PhaseId::GAME_OVER),
            (PhaseId::GAME_OVER, PhaseId::LOBBY_WAITING),
        ]
    );
}

#[test]
fn test_hook_runs_after_observers() {
    let (mut arena, _host) = arena_with(ArenaOptions::default());
    let order = Arc::new(Mutex::new(Vec::new()));

    let from_observer = order.clone();
    arena.subscribe(observer(move |_view, event| {
        if matches!(event, ArenaEvent::PhaseChanged { .. }) {
            from_observer.lock().push("observer");
        }
    }));
    let from_hook = order.clone();
    arena.register_hook(
        PhaseId::GAME_PLAYING,
        hook(move |_ctx| from_hook.lock().push("hook")),
    );

    arena.transition(PhaseId::GAME_PLAYING);
    assert_eq!(*order.lock(), vec!["observer", "hook"]);
}

#[test]
fn test_hook_can_message_participants() {
    let (mut arena, host) = arena_with(ArenaOptions::default());
    arena.join(p("alice"));
    arena.register_hook(
        PhaseId::GAME_PLAYING,
        hook(|ctx| {
            ctx.send(&Recipient::Participant(p("alice")), "fight!");
        }),
    );
    host.clear();

    arena.transition(PhaseId::GAME_PLAYING);
    assert_eq!(host.messages_to("alice"), vec!["fight!"]);
}

#[test]
fn test_unsubscribed_observer_is_silent() {
    let (mut arena, _host) = arena_with(ArenaOptions::default());
    let count = Arc::new(Mutex::new(0));
    let sink = count.clone();
    let id = arena.subscribe(observer(move |_view, _event| *sink.lock() += 1));

    arena.join(p("alice"));
    assert!(arena.unsubscribe(id));
    assert!(!arena.unsubscribe(id));
    arena.join(p("bob"));

    assert_eq!(*count.lock(), 1);
}

// =========================================================================
// Game over
// =========================================================================

#[test]
fn test_game_over_delay_uses_spectator_mode() {
    let (mut arena, host) = arena_with(ArenaOptions::default());
    arena.join(p("alice"));
    arena.join(p("bob"));
    host.clear();

    arena.transition(PhaseId::GAME_OVER);
    assert_eq!(arena.phase(), &PhaseId::GAME_OVER);
    assert_eq!(arena.roster().len(), 2);
    assert!(host.calls().contains(&HostCall::Spectator(p("alice"), true)));
    assert_eq!(host.messages_to("bob"), vec!["The game is over!"]);

    assert!(arena.complete_game_over());
    assert_eq!(arena.phase(), &PhaseId::LOBBY_WAITING);
    assert!(arena.roster().is_empty());
    assert!(host.calls().contains(&HostCall::Spectator(p("alice"), false)));
    assert_eq!(host.disconnected(), vec![p("alice"), p("bob")]);

    assert!(!arena.complete_game_over());
}

#[test]
fn test_leaving_during_game_over_delay_ends_spectating() {
    let (mut arena, host) = arena_with(ArenaOptions::default());
    arena.join(p("alice"));
    arena.join(p("bob"));
    arena.transition(PhaseId::GAME_PLAYING);
    arena.transition(PhaseId::GAME_OVER);

    assert!(arena.leave(&p("bob")));
    assert!(arena.complete_game_over());

    let spectating = |who: &str| -> Vec<HostCall> {
        host.calls()
            .into_iter()
            .filter(|call| matches!(call, HostCall::Spectator(id, _) if id.as_str() == who))
            .collect()
    };
    assert_eq!(
        spectating("bob"),
        vec![
            HostCall::Spectator(p("bob"), true),
            HostCall::Spectator(p("bob"), false),
        ]
    );
    assert_eq!(
        spectating("alice"),
        vec![
            HostCall::Spectator(p("alice"), true),
            HostCall::Spectator(p("alice"), false),
        ]
    );
}

#[test]
fn test_leaving_game_over_drops_cleanup() {
    let (mut arena, host) = arena_with(ArenaOptions::default());
    arena.join(p("alice"));
    arena.join(p("bob"));
    arena.transition(PhaseId::GAME_OVER);

    arena.transition(PhaseId::GAME_PLAYING);
    assert!(!arena.complete_game_over());
    assert_eq!(arena.phase(), &PhaseId::GAME_PLAYING);
    assert_eq!(arena.roster().len(), 2);
    assert!(host.disconnected().is_empty());
}

#[test]
fn test_game_over_relocates_outside_dedicated_mode() {
    let options = ArenaOptions {
        dedicated_mode: false,
        ..no_delay()
    };
    let (mut arena, host) = arena_with(options);
    let lobby = Location::new("lobby", 0.0, 70.0, 0.0);
    arena.data_mut().set_lobby_spawn(Some(lobby.clone()));
    arena.join(p("alice"));
    host.clear();

    arena.transition(PhaseId::GAME_OVER);
    assert_eq!(arena.phase(), &PhaseId::LOBBY_WAITING);
    assert!(host.disconnected().is_empty());
    assert!(host.calls().contains(&HostCall::Relocate(p("alice"), lobby)));
}

#[test]
fn test_game_over_interrupts_countdown() {
    let (mut arena, _host) = arena_with(no_delay());
    let events = record_events(&mut arena);
    arena.join(p("alice"));
    arena.join(p("bob"));

    arena.transition(PhaseId::GAME_OVER);
    assert!(!arena.is_counting_down());
    assert!(events.lock().contains(&ArenaEvent::CountdownCancelled));
    assert_eq!(arena.tick_countdown(), TickOutcome::Stale);
}

// =========================================================================
// Lobby protection
// =========================================================================

#[test]
fn test_lobby_forbids_world_actions_by_default() {
    let (mut arena, _host) = arena_with(no_delay());
    for action in [LobbyAction::ModifyWorld, LobbyAction::Damage, LobbyAction::Hunger] {
        assert!(!arena.permits(action));
    }

    arena.join(p("alice"));
    arena.join(p("bob"));
    assert_eq!(arena.phase(), &PhaseId::LOBBY_COUNTDOWN);
    assert!(!arena.permits(LobbyAction::Damage));

    arena.transition(PhaseId::GAME_PLAYING);
    for action in [LobbyAction::ModifyWorld, LobbyAction::Damage, LobbyAction::Hunger] {
        assert!(arena.permits(action));
    }
}

#[test]
fn test_lobby_allows_flagged_actions() {
    let options = ArenaOptions {
        allow_lobby_world_changes: true,
        allow_lobby_hunger: true,
        ..ArenaOptions::default()
    };
    let (arena, _host) = arena_with(options);

    assert_eq!(arena.phase(), &PhaseId::LOBBY_WAITING);
    assert!(arena.permits(LobbyAction::ModifyWorld));
    assert!(arena.permits(LobbyAction::Hunger));
    assert!(!arena.permits(LobbyAction::Damage));
}

// =========================================================================
// Data and spawns
// =========================================================================

#[test]
fn test_disperse_round_robin() {
    let (mut arena, host) = arena_with(ArenaOptions::default().with_limits(10, 10));
    let red = Location::new("world", 10.0, 64.0, 0.0);
    let blue = Location::new("world", -10.0, 64.0, 0.0);
    arena.data_mut().add_spawn("red", red.clone());
    arena.data_mut().add_spawn("blue", blue.clone());
    for id in ["a", "b", "c", "d"] {
        arena.join(p(id));
    }
    host.clear();

    assert_eq!(arena.disperse(), 4);
    let targets: Vec<Location> = host
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            HostCall::Relocate(_, location) => Some(location),
            _ => None,
        })
        .collect();
    assert_eq!(targets.len(), 4);
    assert_eq!(targets.iter().filter(|l| **l == red).count(), 2);
    assert_ne!(targets[0], targets[1]);
}

#[test]
fn test_disperse_without_spawns() {
    let (mut arena, host) = arena_with(ArenaOptions::default());
    arena.join(p("alice"));
    host.clear();
    assert_eq!(arena.disperse(), 0);
    assert!(host.calls().is_empty());
}

#[test]
fn test_override_data_keeps_name() {
    let (mut arena, _host) = arena_with(ArenaOptions::default());
    let mut other = ArenaData::with_options("other", ArenaOptions::default().with_countdown(12));
    other.set_variable("rounds", 3);

    arena.override_data(other);
    assert_eq!(arena.name(), "duel");
    assert_eq!(arena.get::<i32>("rounds"), Some(3));
    assert_eq!(arena.remaining(), 12);
}

#[test]
fn test_set_options_validates() {
    let (arena, _host) = arena_with(ArenaOptions::default().with_limits(5, 1).with_countdown(90_000));
    assert_eq!(arena.options().max_participants, 5);
    assert_eq!(arena.options().countdown_secs, ArenaOptions::MAX_COUNTDOWN_SECS);
    assert_eq!(arena.info().remaining, ArenaOptions::MAX_COUNTDOWN_SECS);
}
