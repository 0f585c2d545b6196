//! The arena: state machine, roster, countdown and data tied together.
//!
//! [`Arena`] is plain synchronous state. Every lifecycle rule lives here:
//! join/leave gating, the built-in phase actions, countdown ticks and the
//! game over cleanup. [`ArenaHandle`](crate::ArenaHandle) runs an arena on
//! its own Tokio task and drives its timers; tests and hosts with their own
//! clock can also drive one directly through
//! [`tick_countdown`](Arena::tick_countdown) and
//! [`complete_game_over`](Arena::complete_game_over).

use std::collections::VecDeque;
use std::sync::Arc;

use arenakit_countdown::{CountdownScheduler, CountdownTick, Deadline, TickOutcome};
use arenakit_types::{Location, ParticipantId, PhaseId, Recipient, Value, ValueKind, VariableType};
use rand::Rng;
use tracing::{debug, info};

use crate::config::{with_name, with_time};
use crate::events::ObserverList;
use crate::{
    ArenaData, ArenaEvent, ArenaOptions, ArenaStateMachine, ArenaView, Hook, Host, JoinOutcome,
    LobbyAction, Observer, ObserverId, Rejection, Roster,
};

/// A snapshot of arena metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaInfo {
    pub name: String,
    pub phase: PhaseId,
    /// Participants in join order.
    pub participants: Vec<ParticipantId>,
    /// Seconds left on the lobby countdown.
    pub remaining: u32,
    pub counting_down: bool,
    pub min_participants: usize,
    pub max_participants: usize,
}

/// One arena.
///
/// Transitions requested while another transition is being processed (from
/// a hook, an observer-triggered call, or a built-in action) are queued and
/// applied in order once the current one completes, so every transition
/// runs its hook and actions against a consistent phase.
pub struct Arena {
    data: ArenaData,
    machine: ArenaStateMachine,
    roster: Roster,
    pub(crate) countdown: CountdownScheduler,
    /// Fires the delayed game over cleanup.
    pub(crate) cleanup: Deadline,
    observers: ObserverList,
    host: Arc<dyn Host>,
    pending: VecDeque<PhaseId>,
    transitioning: bool,
}

impl Arena {
    /// A new arena with default options, in `LOBBY_WAITING`.
    pub fn new(name: impl Into<String>, host: Arc<dyn Host>) -> Self {
        Self::from_data(ArenaData::new(name), host)
    }

    /// An arena built from stored data. Options are validated first.
    pub fn from_data(mut data: ArenaData, host: Arc<dyn Host>) -> Self {
        data.options = std::mem::take(&mut data.options).validated();
        let countdown = CountdownScheduler::with_duration(data.options.countdown_secs);
        debug!(arena = %data.name(), "arena created");
        Self {
            data,
            machine: ArenaStateMachine::new(),
            roster: Roster::new(),
            countdown,
            cleanup: Deadline::new(),
            observers: ObserverList::default(),
            host,
            pending: VecDeque::new(),
            transitioning: false,
        }
    }

    pub fn name(&self) -> &str {
        self.data.name()
    }

    /// The current phase.
    pub fn phase(&self) -> &PhaseId {
        self.machine.phase()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Seconds left on the lobby countdown; the full length when idle.
    pub fn remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn is_counting_down(&self) -> bool {
        self.countdown.is_active()
    }

    pub fn machine(&self) -> &ArenaStateMachine {
        &self.machine
    }

    pub fn data(&self) -> &ArenaData {
        &self.data
    }

    /// Mutable access to variables, locations and spawns.
    ///
    /// Option changes made through here take effect on the next join or
    /// countdown start; prefer [`set_options`](Self::set_options).
    pub fn data_mut(&mut self) -> &mut ArenaData {
        &mut self.data
    }

    pub fn options(&self) -> &ArenaOptions {
        &self.data.options
    }

    /// Validates and installs new options.
    pub fn set_options(&mut self, options: ArenaOptions) {
        self.data.options = options.validated();
        self.countdown.set_duration(self.data.options.countdown_secs);
    }

    /// Replaces options, variables and locations with `data`'s, keeping this
    /// arena's name. Runtime state (phase, roster, countdown) is untouched.
    pub fn override_data(&mut self, data: ArenaData) {
        self.data.replace_keeping_name(data);
        let options = self.data.options.clone();
        self.set_options(options);
        info!(arena = %self.data.name(), "arena data overridden");
    }

    pub fn info(&self) -> ArenaInfo {
        ArenaInfo {
            name: self.data.name().to_string(),
            phase: self.machine.phase().clone(),
            participants: self.roster.to_vec(),
            remaining: self.countdown.remaining(),
            counting_down: self.countdown.is_active(),
            min_participants: self.data.options.min_participants,
            max_participants: self.data.options.max_participants,
        }
    }

    // ------------------------------------------------------------------------
    // Variables and locations
    // ------------------------------------------------------------------------

    pub fn set_variable(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.set_variable(key, value);
    }

    pub fn get_variable(&self, key: &str, kind: ValueKind) -> Option<&Value> {
        self.data.get_variable(key, kind)
    }

    pub fn get<T: VariableType>(&self, key: &str) -> Option<T> {
        self.data.get(key)
    }

    pub fn set_location(&mut self, key: impl Into<String>, location: Location) {
        self.data.set_location(key, location);
    }

    pub fn get_location(&self, key: &str) -> Option<&Location> {
        self.data.get_location(key)
    }

    // ------------------------------------------------------------------------
    // Phases and hooks
    // ------------------------------------------------------------------------

    pub fn register_state(&mut self, id: PhaseId) -> bool {
        let added = self.machine.register_state(id.clone());
        if added {
            debug!(arena = %self.data.name(), phase = %id, "phase registered");
        }
        added
    }

    pub fn remove_state(&mut self, id: &PhaseId) -> bool {
        let removed = self.machine.remove_state(id);
        if removed {
            debug!(arena = %self.data.name(), phase = %id, "phase removed");
        }
        removed
    }

    pub fn has_state(&self, id: &PhaseId) -> bool {
        self.machine.has_state(id)
    }

    /// Registered phases, built-ins first.
    pub fn states(&self) -> Vec<PhaseId> {
        self.machine.states().iter().cloned().collect()
    }

    /// The built-in phases.
    pub fn default_states(&self) -> Vec<PhaseId> {
        self.machine.states().defaults().cloned().collect()
    }

    pub fn register_hook(&mut self, id: PhaseId, hook: Hook) -> bool {
        self.machine.register_hook(id, hook)
    }

    pub fn remove_hook(&mut self, id: &PhaseId) -> bool {
        self.machine.remove_hook(id)
    }

    pub fn has_hook(&self, id: &PhaseId) -> bool {
        self.machine.has_hook(id)
    }

    // ------------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------------

    pub fn subscribe(&mut self, observer: Observer) -> ObserverId {
        let id = self.observers.subscribe(observer);
        debug!(
            arena = %self.data.name(),
            observer = %id,
            observers = self.observers.len(),
            "observer subscribed"
        );
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn notify(&self, event: &ArenaEvent) {
        let view = ArenaView {
            name: self.data.name(),
            phase: self.machine.phase(),
            roster: &self.roster,
            remaining: self.countdown.remaining(),
        };
        self.observers.notify(&view, event);
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Requests a move to `target`.
    ///
    /// Returns `false`, changing nothing, if `target` is not a registered
    /// phase. Otherwise the transition is applied before this returns:
    /// observers get [`ArenaEvent::PhaseChanged`], then the phase's hook
    /// runs, then the built-in action for the phase (if enabled). Requests
    /// made during that sequence are queued behind it.
    pub fn transition(&mut self, target: PhaseId) -> bool {
        if !self.machine.has_state(&target) {
            debug!(arena = %self.data.name(), phase = %target, "transition to unknown phase ignored");
            return false;
        }
        self.pending.push_back(target);
        if self.transitioning {
            return true;
        }

        self.transitioning = true;
        while let Some(next) = self.pending.pop_front() {
            self.apply_transition(next);
        }
        self.transitioning = false;
        true
    }

    fn apply_transition(&mut self, target: PhaseId) {
        // Re-checked: a hook may have removed a queued custom phase.
        let Some(previous) = self.machine.enter(target.clone()) else {
            debug!(arena = %self.data.name(), phase = %target, "queued transition dropped");
            return;
        };
        info!(arena = %self.data.name(), from = %previous, to = %target, "phase changed");

        let interrupted = previous == PhaseId::LOBBY_COUNTDOWN
            && target != PhaseId::LOBBY_COUNTDOWN
            && self.countdown.cancel();
        if previous == PhaseId::GAME_OVER && target != PhaseId::GAME_OVER && self.cleanup.disarm() {
            debug!(arena = %self.data.name(), "pending game over cleanup dropped");
        }

        self.notify(&ArenaEvent::PhaseChanged {
            from: previous,
            to: target.clone(),
        });
        if interrupted {
            self.notify(&ArenaEvent::CountdownCancelled);
        }

        if let Some(mut hook) = self.machine.hooks.take(&target) {
            let mut ctx = PhaseContext { arena: &mut *self };
            hook(&mut ctx);
            self.machine.hooks.restore(target.clone(), hook);
        }

        if self.data.options.default_phase_actions {
            self.run_phase_action(&target, interrupted);
        }
    }

    fn run_phase_action(&mut self, phase: &PhaseId, interrupted: bool) {
        if *phase == PhaseId::LOBBY_COUNTDOWN {
            // Re-entry restarts from the full duration.
            if self.countdown.cancel() {
                debug!(arena = %self.data.name(), "lobby countdown restarted");
            }
            self.countdown.set_duration(self.data.options.countdown_secs);
            if self.countdown.start() {
                let seconds = self.countdown.duration();
                info!(arena = %self.data.name(), seconds, "lobby countdown started");
                let text = with_time(&self.data.options.messages.countdown_started, seconds);
                self.broadcast(&text);
                self.notify(&ArenaEvent::CountdownStarted { seconds });
            }
        } else if *phase == PhaseId::COUNTDOWN_CANCELLED {
            if self.countdown.cancel() {
                self.notify(&ArenaEvent::CountdownCancelled);
                self.announce_cancelled();
            } else if interrupted {
                self.announce_cancelled();
            }
            self.transition(PhaseId::LOBBY_WAITING);
        } else if *phase == PhaseId::GAME_COUNTDOWN {
            self.countdown.cancel();
            self.transition(PhaseId::GAME_PLAYING);
        } else if *phase == PhaseId::GAME_OVER {
            self.begin_game_over();
        }
    }

    fn announce_cancelled(&self) {
        info!(arena = %self.data.name(), "lobby countdown cancelled");
        self.broadcast(&self.data.options.messages.countdown_cancelled);
    }

    // ------------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------------

    /// Adds a participant.
    ///
    /// With participant events enabled: duplicates are refused silently;
    /// outside the lobby phases, or with the lobby full, the participant is
    /// rejected (disconnected in dedicated mode, otherwise messaged and sent
    /// to the fallback location). On success everyone is told, the newcomer
    /// is sent to the lobby spawn, and reaching `min_participants` in
    /// `LOBBY_WAITING` starts the countdown.
    ///
    /// With participant events disabled only the roster changes, still
    /// refusing duplicates and honoring capacity in lobby phases.
    pub fn join(&mut self, participant: ParticipantId) -> JoinOutcome {
        let in_lobby = self.machine.phase().is_lobby();
        let capacity = in_lobby.then_some(self.data.options.max_participants);

        if !self.data.options.trigger_participant_events {
            return match self.roster.try_insert(participant.clone(), capacity) {
                Ok(()) => {
                    debug!(arena = %self.data.name(), %participant, "participant added");
                    self.notify(&ArenaEvent::ParticipantJoined(participant));
                    JoinOutcome::Joined
                }
                Err(rejection) => JoinOutcome::Rejected(rejection),
            };
        }

        if self.roster.contains(&participant) {
            return JoinOutcome::Rejected(Rejection::AlreadyJoined);
        }
        if !in_lobby {
            return self.reject(&participant, Rejection::GameInProgress);
        }
        if let Err(rejection) = self.roster.try_insert(participant.clone(), capacity) {
            return self.reject(&participant, rejection);
        }

        info!(
            arena = %self.data.name(),
            %participant,
            participants = self.roster.len(),
            "participant joined"
        );
        let text = with_name(&self.data.options.messages.participant_joined, participant.as_str());
        self.broadcast(&text);
        if let Some(lobby) = self.data.lobby_spawn() {
            self.host.relocate(&participant, lobby);
        }
        self.notify(&ArenaEvent::ParticipantJoined(participant));

        if *self.machine.phase() == PhaseId::LOBBY_WAITING
            && self.roster.len() >= self.data.options.min_participants
        {
            self.transition(PhaseId::LOBBY_COUNTDOWN);
        }
        JoinOutcome::Joined
    }

    fn reject(&self, participant: &ParticipantId, rejection: Rejection) -> JoinOutcome {
        let messages = &self.data.options.messages;
        let reason = match rejection {
            Rejection::LobbyFull => &messages.lobby_full,
            Rejection::GameInProgress => &messages.game_in_progress,
            Rejection::AlreadyJoined => return JoinOutcome::Rejected(rejection),
        };

        match self.data.fallback() {
            Some(fallback) if !self.data.options.dedicated_mode => {
                self.host.send_message(participant, reason);
                self.host.relocate(participant, fallback);
            }
            _ => self.host.disconnect(participant, reason),
        }
        debug!(
            arena = %self.data.name(),
            %participant,
            ?rejection,
            "join rejected"
        );
        JoinOutcome::Rejected(rejection)
    }

    /// Removes a participant. `false`, with no side effects, if they were
    /// not on the roster.
    ///
    /// With participant events enabled everyone left is told, and dropping
    /// below `min_participants` during `LOBBY_COUNTDOWN` cancels the
    /// countdown. Leaving during the game over delay ends spectator mode
    /// right away.
    pub fn leave(&mut self, participant: &ParticipantId) -> bool {
        if !self.roster.remove(participant) {
            debug!(arena = %self.data.name(), %participant, "leave for absent participant ignored");
            return false;
        }
        info!(
            arena = %self.data.name(),
            %participant,
            participants = self.roster.len(),
            "participant left"
        );
        self.notify(&ArenaEvent::ParticipantLeft(participant.clone()));

        // The game over cleanup only resets whoever is still on the roster.
        let options = &self.data.options;
        if self.cleanup.is_armed() && options.end_game_delay && options.end_game_spectator {
            self.host.set_spectator(participant, false);
        }

        if !self.data.options.trigger_participant_events {
            return true;
        }

        let text = with_name(&self.data.options.messages.participant_left, participant.as_str());
        self.broadcast(&text);
        if *self.machine.phase() == PhaseId::LOBBY_COUNTDOWN
            && self.roster.len() < self.data.options.min_participants
        {
            self.transition(PhaseId::COUNTDOWN_CANCELLED);
        }
        true
    }

    // ------------------------------------------------------------------------
    // Messaging
    // ------------------------------------------------------------------------

    /// Sends `text` to every participant.
    pub fn broadcast(&self, text: &str) {
        self.send(&Recipient::All, text);
    }

    /// Sends `text` to the participants `recipient` selects. Participants
    /// not on the roster are skipped.
    pub fn send(&self, recipient: &Recipient, text: &str) {
        for participant in self.roster.iter().filter(|p| recipient.includes(p)) {
            self.host.send_message(participant, text);
        }
    }

    /// Sends every participant to a spawn point, round-robin from a random
    /// starting spawn. Returns how many were moved; zero without spawns.
    pub fn disperse(&self) -> usize {
        let spawns: Vec<&Location> = self.data.spawns().values().collect();
        if spawns.is_empty() {
            debug!(arena = %self.data.name(), "no spawn points, nobody dispersed");
            return 0;
        }
        let offset = rand::rng().random_range(0..spawns.len());
        for (i, participant) in self.roster.iter().enumerate() {
            self.host.relocate(participant, spawns[(offset + i) % spawns.len()]);
        }
        self.roster.len()
    }

    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    /// Whether a participant may do `action` right now.
    ///
    /// Lobby phases forbid it unless the matching `allow_lobby_*` option is
    /// set. Every other phase leaves it to the game.
    pub fn permits(&self, action: LobbyAction) -> bool {
        !self.machine.phase().is_lobby() || self.data.options.allows_in_lobby(action)
    }

    // ------------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------------

    /// Applies one countdown tick now. For hosts driving the countdown from
    /// their own clock; arenas on a task tick themselves.
    pub fn tick_countdown(&mut self) -> TickOutcome {
        let outcome = self.countdown.tick();
        self.handle_tick(outcome);
        outcome
    }

    pub(crate) fn on_countdown_tick(&mut self, tick: CountdownTick) {
        let outcome = self.countdown.apply(tick);
        self.handle_tick(outcome);
    }

    fn handle_tick(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Progress { seconds, announce } => {
                if announce {
                    let text = with_time(&self.data.options.messages.countdown_progress, seconds);
                    self.broadcast(&text);
                }
                self.notify(&ArenaEvent::CountdownProgress { remaining: seconds });
            }
            TickOutcome::Finished => {
                info!(arena = %self.data.name(), "lobby countdown finished");
                self.notify(&ArenaEvent::CountdownFinished);
                self.transition(PhaseId::GAME_COUNTDOWN);
            }
            TickOutcome::Stale => {}
        }
    }

    fn begin_game_over(&mut self) {
        self.broadcast(&self.data.options.messages.game_over);

        if !self.data.options.end_game_delay {
            self.finish_game();
            return;
        }
        if self.data.options.end_game_spectator {
            for participant in self.roster.iter() {
                self.host.set_spectator(participant, true);
            }
        }
        self.cleanup.arm(ArenaOptions::END_GAME_DELAY);
        debug!(
            arena = %self.data.name(),
            delay_secs = ArenaOptions::END_GAME_DELAY.as_secs(),
            "game over cleanup scheduled"
        );
    }

    /// Runs a scheduled game over cleanup immediately. `false` if none was
    /// pending.
    pub fn complete_game_over(&mut self) -> bool {
        if !self.cleanup.disarm() {
            return false;
        }
        self.on_cleanup_due();
        true
    }

    pub(crate) fn on_cleanup_due(&mut self) {
        if *self.machine.phase() != PhaseId::GAME_OVER {
            debug!(arena = %self.data.name(), "stale game over cleanup ignored");
            return;
        }
        self.finish_game();
    }

    /// Clears the roster after a game and returns to `LOBBY_WAITING`.
    fn finish_game(&mut self) {
        let options = &self.data.options;
        let unspectate = options.end_game_delay && options.end_game_spectator;
        let participants = self.roster.drain();

        for participant in &participants {
            if unspectate {
                self.host.set_spectator(participant, false);
            }
            if self.data.options.dedicated_mode {
                self.host.disconnect(participant, &self.data.options.messages.game_over);
            } else if let Some(lobby) = self.data.lobby_spawn() {
                self.host.relocate(participant, lobby);
            }
            self.notify(&ArenaEvent::ParticipantLeft(participant.clone()));
        }
        info!(
            arena = %self.data.name(),
            participants = participants.len(),
            "game over cleanup complete"
        );
        self.transition(PhaseId::LOBBY_WAITING);
    }
}

// ---------------------------------------------------------------------------
// PhaseContext
// ---------------------------------------------------------------------------

/// What a [`Hook`] can see and do while its phase is being entered.
pub struct PhaseContext<'a> {
    arena: &'a mut Arena,
}

impl PhaseContext<'_> {
    /// The phase being entered.
    pub fn phase(&self) -> &PhaseId {
        self.arena.phase()
    }

    pub fn name(&self) -> &str {
        self.arena.name()
    }

    pub fn roster(&self) -> &Roster {
        self.arena.roster()
    }

    pub fn remaining(&self) -> u32 {
        self.arena.remaining()
    }

    pub fn data(&self) -> &ArenaData {
        self.arena.data()
    }

    pub fn data_mut(&mut self) -> &mut ArenaData {
        self.arena.data_mut()
    }

    pub fn set_variable(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.arena.set_variable(key, value);
    }

    /// Queues a transition to run after the current one. `false` if
    /// `target` is not registered.
    pub fn transition(&mut self, target: PhaseId) -> bool {
        self.arena.transition(target)
    }

    pub fn broadcast(&self, text: &str) {
        self.arena.broadcast(text);
    }

    pub fn send(&self, recipient: &Recipient, text: &str) {
        self.arena.send(recipient, text);
    }

    pub fn disperse(&self) -> usize {
        self.arena.disperse()
    }

    pub fn host(&self) -> &dyn Host {
        self.arena.host()
    }
}
