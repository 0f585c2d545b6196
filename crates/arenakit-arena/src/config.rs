//! Arena options and message templates.

use serde::{Deserialize, Serialize};
use tracing::warn;

// ---------------------------------------------------------------------------
// ArenaOptions
// ---------------------------------------------------------------------------

/// Configuration for one arena.
///
/// Stored inside [`ArenaData`](crate::ArenaData) so it is persisted with the
/// arena. `#[serde(default)]` lets older stored data load after new fields
/// are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaOptions {
    /// Participants required before the lobby countdown starts.
    pub min_participants: usize,

    /// Roster capacity while the arena is in a lobby phase.
    pub max_participants: usize,

    /// Length of the lobby countdown in seconds.
    pub countdown_secs: u32,

    /// Rejected participants are disconnected instead of being sent to the
    /// fallback location.
    pub dedicated_mode: bool,

    /// Run the built-in join/leave behavior: capacity and phase gating,
    /// join/leave messages, lobby relocation, countdown start and cancel.
    /// When off, `join`/`leave` only maintain the roster.
    pub trigger_participant_events: bool,

    /// Host-level connect/disconnect events routed through the registry are
    /// turned into `join`/`leave` for this arena.
    pub auto_trigger_on_membership: bool,

    /// Run the built-in phase actions (countdown start, cancellation bounce,
    /// game countdown, game over cleanup) after each transition.
    pub default_phase_actions: bool,

    /// Wait [`ArenaOptions::END_GAME_DELAY`] before cleaning up after
    /// `GAME_OVER`.
    pub end_game_delay: bool,

    /// Put participants into spectator mode during the end game delay.
    /// Only has an effect together with `end_game_delay`.
    pub end_game_spectator: bool,

    /// Participants may change the world (break or place blocks) while the
    /// arena is in a lobby phase.
    pub allow_lobby_world_changes: bool,

    /// Participants may take damage while the arena is in a lobby phase.
    pub allow_lobby_damage: bool,

    /// Participants may lose hunger while the arena is in a lobby phase.
    pub allow_lobby_hunger: bool,

    /// Texts sent to participants.
    pub messages: ArenaMessages,
}

impl Default for ArenaOptions {
    fn default() -> Self {
        Self {
            min_participants: 2,
            max_participants: 8,
            countdown_secs: 30,
            dedicated_mode: true,
            trigger_participant_events: true,
            auto_trigger_on_membership: true,
            default_phase_actions: true,
            end_game_delay: true,
            end_game_spectator: true,
            allow_lobby_world_changes: false,
            allow_lobby_damage: false,
            allow_lobby_hunger: false,
            messages: ArenaMessages::default(),
        }
    }
}

impl ArenaOptions {
    /// Longest lobby countdown accepted (one hour).
    pub const MAX_COUNTDOWN_SECS: u32 = 3600;

    /// How long `GAME_OVER` waits before cleanup when `end_game_delay` is on.
    pub const END_GAME_DELAY: std::time::Duration = std::time::Duration::from_secs(5);

    /// Clamp and fix out-of-range values so the options are safe to use.
    ///
    /// Rules:
    /// - `max_participants` raised to `min_participants` if smaller.
    /// - `countdown_secs` capped to [`Self::MAX_COUNTDOWN_SECS`].
    pub fn validated(mut self) -> Self {
        if self.max_participants < self.min_participants {
            warn!(
                min = self.min_participants,
                max = self.max_participants,
                "max_participants below min_participants, raising max"
            );
            self.max_participants = self.min_participants;
        }
        if self.countdown_secs > Self::MAX_COUNTDOWN_SECS {
            warn!(
                countdown = self.countdown_secs,
                max = Self::MAX_COUNTDOWN_SECS,
                "countdown_secs exceeds maximum, clamping"
            );
            self.countdown_secs = Self::MAX_COUNTDOWN_SECS;
        }
        self
    }

    /// Sets the participant limits.
    pub fn with_limits(mut self, min: usize, max: usize) -> Self {
        self.min_participants = min;
        self.max_participants = max;
        self
    }

    /// Sets the countdown length.
    pub fn with_countdown(mut self, secs: u32) -> Self {
        self.countdown_secs = secs;
        self
    }

    /// Whether `action` is allowed while the arena is in a lobby phase.
    pub fn allows_in_lobby(&self, action: LobbyAction) -> bool {
        match action {
            LobbyAction::ModifyWorld => self.allow_lobby_world_changes,
            LobbyAction::Damage => self.allow_lobby_damage,
            LobbyAction::Hunger => self.allow_lobby_hunger,
        }
    }
}

/// Something a participant does to the game world that a lobby can forbid.
///
/// The host asks [`Arena::permits`](crate::Arena::permits) before letting
/// it happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LobbyAction {
    /// Breaking or placing blocks.
    ModifyWorld,
    /// Taking damage.
    Damage,
    /// Losing hunger.
    Hunger,
}

// ---------------------------------------------------------------------------
// ArenaMessages
// ---------------------------------------------------------------------------

/// Message templates.
///
/// `%name%` is replaced with the participant id and `%time%` with the
/// seconds left on the countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaMessages {
    pub game_in_progress: String,
    pub lobby_full: String,
    pub participant_joined: String,
    pub participant_left: String,
    pub countdown_started: String,
    pub countdown_progress: String,
    pub countdown_cancelled: String,
    pub game_over: String,
}

impl Default for ArenaMessages {
    fn default() -> Self {
        Self {
            game_in_progress: "The game is currently in progress!".into(),
            lobby_full: "The lobby is full!".into(),
            participant_joined: "%name% has joined the game!".into(),
            participant_left: "%name% has left the game!".into(),
            countdown_started: "%time% seconds until the game begins!".into(),
            countdown_progress: "%time% seconds until the game begins!".into(),
            countdown_cancelled: "Countdown cancelled!".into(),
            game_over: "The game is over!".into(),
        }
    }
}

/// Replaces `%name%` in a template.
pub(crate) fn with_name(template: &str, name: &str) -> String {
    template.replace("%name%", name)
}

/// Replaces `%time%` in a template.
pub(crate) fn with_time(template: &str, seconds: u32) -> String {
    template.replace("%time%", &seconds.to_string())
}
