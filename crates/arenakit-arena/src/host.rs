//! The host environment an arena talks to.

use arenakit_types::{Location, ParticipantId};

/// Side effects the engine asks the host to perform on participants.
///
/// The host owns connections, worlds and UI; the engine only decides
/// *when* a participant should be told something, moved or dropped.
/// Calls happen on the arena's task and must return promptly: queue the
/// work (e.g. onto a connection's outbound channel) rather than doing
/// network I/O inline.
///
/// An arena holds its host as `Arc<dyn Host>`, handed in at construction,
/// so several arenas can share one.
pub trait Host: Send + Sync + 'static {
    /// Deliver a chat/system message to one participant.
    fn send_message(&self, participant: &ParticipantId, text: &str);

    /// Drop a participant from the host entirely, showing `reason`.
    fn disconnect(&self, participant: &ParticipantId, reason: &str);

    /// Move a participant to `location`.
    fn relocate(&self, participant: &ParticipantId, location: &Location);

    /// Toggle the spectator look used during the end game delay.
    /// Default: no-op, for hosts without such a mode.
    fn set_spectator(&self, _participant: &ParticipantId, _spectating: bool) {}
}

/// A host that ignores every request. Useful for headless simulations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl Host for NullHost {
    fn send_message(&self, _participant: &ParticipantId, _text: &str) {}

    fn disconnect(&self, _participant: &ParticipantId, _reason: &str) {}

    fn relocate(&self, _participant: &ParticipantId, _location: &Location) {}
}
