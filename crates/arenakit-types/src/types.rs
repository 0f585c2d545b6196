//! Identity, phase and location types.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifies a participant of an arena.
///
/// The host decides what the string is (a player name, an account id, a
/// connection tag). The engine only compares it and substitutes it into
/// `%name%` placeholders, so it should be something a human can read.
///
/// `#[serde(transparent)]` keeps the wire form a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    /// Creates an id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// PhaseId
// ---------------------------------------------------------------------------

/// A named phase in an arena's lifecycle.
///
/// Phases are compared by name, never by identity: two ids built
/// independently from the same string are interchangeable. The well-known
/// phases are associated constants; game code adds its own with
/// [`PhaseId::new`].
///
/// ```text
/// LOBBY_WAITING → LOBBY_COUNTDOWN → GAME_COUNTDOWN → GAME_PLAYING → GAME_OVER
///        ▲               │                                              │
///        └── COUNTDOWN_CANCELLED ◄┘                                     │
///        └──────────────────────────────────────────────────────────────┘
/// ```
///
/// The arrows are conventions enforced by the built-in phase actions, not by
/// the type. Any registered phase may be entered from any other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseId(Cow<'static, str>);

impl PhaseId {
    /// Waiting for enough participants to start the countdown.
    pub const LOBBY_WAITING: PhaseId = PhaseId(Cow::Borrowed("LOBBY_WAITING"));
    /// Minimum reached; the lobby countdown is running.
    pub const LOBBY_COUNTDOWN: PhaseId = PhaseId(Cow::Borrowed("LOBBY_COUNTDOWN"));
    /// The lobby countdown finished; the game is being prepared.
    pub const GAME_COUNTDOWN: PhaseId = PhaseId(Cow::Borrowed("GAME_COUNTDOWN"));
    /// The game is running. What happens here is up to the game.
    pub const GAME_PLAYING: PhaseId = PhaseId(Cow::Borrowed("GAME_PLAYING"));
    /// The game ended; participants are being cleaned up.
    pub const GAME_OVER: PhaseId = PhaseId(Cow::Borrowed("GAME_OVER"));
    /// Transient phase entered when the lobby countdown is aborted.
    pub const COUNTDOWN_CANCELLED: PhaseId = PhaseId(Cow::Borrowed("COUNTDOWN_CANCELLED"));

    /// The built-in phases, in lifecycle order. These can never be removed
    /// from an arena.
    pub const DEFAULTS: [PhaseId; 6] = [
        Self::LOBBY_WAITING,
        Self::LOBBY_COUNTDOWN,
        Self::GAME_COUNTDOWN,
        Self::GAME_PLAYING,
        Self::GAME_OVER,
        Self::COUNTDOWN_CANCELLED,
    ];

    /// Creates a custom phase id.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// The phase name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Returns `true` for one of the built-in phases.
    pub fn is_default(&self) -> bool {
        Self::DEFAULTS.contains(self)
    }

    /// Returns `true` while participants may still join.
    pub fn is_lobby(&self) -> bool {
        *self == Self::LOBBY_WAITING || *self == Self::LOBBY_COUNTDOWN
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PhaseId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A position in a named world.
///
/// The engine never interprets coordinates. It stores them and hands them
/// back to the host's `relocate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@({}, {}, {})", self.world, self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who a message should reach inside one arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every participant on the roster.
    All,
    /// One participant.
    Participant(ParticipantId),
    /// Every participant except one, e.g. "X joined" to the others.
    AllExcept(ParticipantId),
}

impl Recipient {
    /// Returns `true` if `participant` is addressed by this recipient.
    pub fn includes(&self, participant: &ParticipantId) -> bool {
        match self {
            Self::All => true,
            Self::Participant(target) => target == participant,
            Self::AllExcept(excluded) => excluded != participant,
        }
    }
}
