//! Shared test fixtures: a host that records every call and an event log.

#![allow(dead_code)]

use std::sync::Arc;

use arenakit_arena::{
    Arena, ArenaEvent, ArenaOptions, Host, Location, ParticipantId, observer,
};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Message(ParticipantId, String),
    Disconnect(ParticipantId, String),
    Relocate(ParticipantId, Location),
    Spectator(ParticipantId, bool),
}

/// Records every request the engine makes.
#[derive(Debug, Default)]
pub struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    /// Messages delivered to `participant`, in order.
    pub fn messages_to(&self, participant: &str) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                HostCall::Message(p, text) if p.as_str() == participant => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn disconnected(&self) -> Vec<ParticipantId> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                HostCall::Disconnect(p, _) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Host for RecordingHost {
    fn send_message(&self, participant: &ParticipantId, text: &str) {
        self.calls
            .lock()
            .push(HostCall::Message(participant.clone(), text.to_string()));
    }

    fn disconnect(&self, participant: &ParticipantId, reason: &str) {
        self.calls
            .lock()
            .push(HostCall::Disconnect(participant.clone(), reason.to_string()));
    }

    fn relocate(&self, participant: &ParticipantId, location: &Location) {
        self.calls
            .lock()
            .push(HostCall::Relocate(participant.clone(), location.clone()));
    }

    fn set_spectator(&self, participant: &ParticipantId, spectating: bool) {
        self.calls
            .lock()
            .push(HostCall::Spectator(participant.clone(), spectating));
    }
}

/// Collected observer events.
pub type EventLog = Arc<Mutex<Vec<ArenaEvent>>>;

/// Subscribes a recorder to `arena`.
pub fn record_events(arena: &mut Arena) -> EventLog {
    let log = EventLog::default();
    let sink = log.clone();
    arena.subscribe(observer(move |_view, event| sink.lock().push(event.clone())));
    log
}

/// An arena with `options` reporting to a fresh recording host.
pub fn arena_with(options: ArenaOptions) -> (Arena, Arc<RecordingHost>) {
    let host = RecordingHost::new();
    let mut arena = Arena::new("duel", host.clone());
    arena.set_options(options);
    (arena, host)
}

pub fn p(id: &str) -> ParticipantId {
    ParticipantId::from(id)
}
