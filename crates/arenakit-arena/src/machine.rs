//! The phase state machine.
//!
//! Owns the current phase, the set of valid phases and the hook table.
//! It only answers "may this happen" and records that it did; running
//! hooks, notifying observers and the built-in phase actions are the
//! arena's job (see [`Arena::transition`](crate::Arena::transition)), since
//! they need the roster, the countdown and the host.

use arenakit_types::PhaseId;

use crate::{Hook, PhaseHookTable, StateSet};

/// Current phase plus the registered phases and hooks of one arena.
///
/// Invariant: `current` is always a member of `states`. Built-in phases
/// cannot be removed and `current` starts at `LOBBY_WAITING`, so removing a
/// custom phase while it is current is refused.
#[derive(Debug)]
pub struct ArenaStateMachine {
    current: PhaseId,
    states: StateSet,
    pub(crate) hooks: PhaseHookTable,
}

impl ArenaStateMachine {
    /// A machine in `LOBBY_WAITING` with only the built-in phases.
    pub fn new() -> Self {
        Self {
            current: PhaseId::LOBBY_WAITING,
            states: StateSet::new(),
            hooks: PhaseHookTable::new(),
        }
    }

    /// The current phase.
    pub fn phase(&self) -> &PhaseId {
        &self.current
    }

    /// Adds a custom phase. `false` if it already exists.
    pub fn register_state(&mut self, id: PhaseId) -> bool {
        self.states.register(id)
    }

    /// Removes a custom phase and its hook.
    ///
    /// `false` for a built-in phase, an unknown phase, or the phase the
    /// machine is currently in.
    pub fn remove_state(&mut self, id: &PhaseId) -> bool {
        if *id == self.current || !self.states.remove(id) {
            return false;
        }
        self.hooks.remove(id);
        true
    }

    pub fn has_state(&self, id: &PhaseId) -> bool {
        self.states.contains(id)
    }

    pub fn states(&self) -> &StateSet {
        &self.states
    }

    /// Binds `hook` to `id`. `false` if `id` is unknown or already has one.
    pub fn register_hook(&mut self, id: PhaseId, hook: Hook) -> bool {
        if !self.states.contains(&id) {
            return false;
        }
        self.hooks.register(id, hook)
    }

    /// Unbinds the hook of `id`. `false` if `id` is unknown or has none.
    pub fn remove_hook(&mut self, id: &PhaseId) -> bool {
        self.states.contains(id) && self.hooks.remove(id)
    }

    pub fn has_hook(&self, id: &PhaseId) -> bool {
        self.hooks.contains(id)
    }

    /// Switches to `target` if it is registered.
    ///
    /// Returns the phase that was left, or `None` (and changes nothing) if
    /// `target` is not a registered phase. Entering the current phase again
    /// is a real transition.
    pub fn enter(&mut self, target: PhaseId) -> Option<PhaseId> {
        if !self.states.contains(&target) {
            return None;
        }
        Some(std::mem::replace(&mut self.current, target))
    }
}

impl Default for ArenaStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
