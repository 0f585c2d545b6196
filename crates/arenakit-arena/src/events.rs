//! Arena notifications and observer registration.
//!
//! Observers let unrelated subsystems (a scoreboard, metrics, a lobby
//! sign) follow an arena without the arena knowing about them. They are
//! plain callbacks, invoked synchronously on the arena's task in
//! registration order.

use std::fmt;

use arenakit_types::{ParticipantId, PhaseId};

use crate::Roster;

/// Something that happened in an arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArenaEvent {
    /// The arena entered `to`. Fired before the phase's hook runs.
    PhaseChanged { from: PhaseId, to: PhaseId },
    ParticipantJoined(ParticipantId),
    ParticipantLeft(ParticipantId),
    /// The lobby countdown started from `seconds`.
    CountdownStarted { seconds: u32 },
    /// One countdown tick; `remaining` is the value shown on that tick.
    CountdownProgress { remaining: u32 },
    /// A running countdown was stopped before reaching zero.
    CountdownCancelled,
    /// The countdown reached zero.
    CountdownFinished,
}

/// Read-only view of the arena handed to observers with each event.
#[derive(Debug, Clone, Copy)]
pub struct ArenaView<'a> {
    pub name: &'a str,
    pub phase: &'a PhaseId,
    pub roster: &'a Roster,
    /// Seconds left on the lobby countdown.
    pub remaining: u32,
}

/// A callback notified of every [`ArenaEvent`].
pub type Observer = Box<dyn Fn(&ArenaView<'_>, &ArenaEvent) + Send>;

/// Boxes a closure as an [`Observer`].
pub fn observer<F>(f: F) -> Observer
where
    F: Fn(&ArenaView<'_>, &ArenaEvent) + Send + 'static,
{
    Box::new(f)
}

/// Token returned by subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "O-{}", self.0)
    }
}

/// Registered observers in subscription order.
#[derive(Default)]
pub(crate) struct ObserverList {
    next_id: u64,
    observers: Vec<(ObserverId, Observer)>,
}

impl ObserverList {
    pub(crate) fn subscribe(&mut self, observer: Observer) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.observers.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub(crate) fn notify(&self, view: &ArenaView<'_>, event: &ArenaEvent) {
        for (_, observer) in &self.observers {
            observer(view, event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }
}

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.observers.iter().map(|(id, _)| id))
            .finish()
    }
}
