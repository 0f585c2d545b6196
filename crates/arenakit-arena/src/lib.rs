//! Arena lifecycle for arenakit.
//!
//! An arena is a named game space that moves through phases: participants
//! gather in `LOBBY_WAITING`, a countdown runs in `LOBBY_COUNTDOWN` once
//! enough have joined, and the game goes through `GAME_COUNTDOWN`,
//! `GAME_PLAYING` and `GAME_OVER` before the arena resets to the lobby.
//! Each arena runs as an isolated Tokio task (actor model) that owns its
//! roster, its countdown and its data.
//!
//! # Key types
//!
//! - [`Arena`] — the lifecycle rules: join/leave, transitions, phase actions
//! - [`ArenaHandle`] — send commands to an arena running on its own task
//! - [`ArenaRegistry`] — arenas by case-insensitive name, host event routing
//! - [`ArenaStateMachine`] — current phase, registered phases and hooks
//! - [`ArenaData`] — persistent options, variables, locations and spawns
//! - [`ArenaOptions`] — limits, countdown length, behavior toggles, messages
//! - [`Host`] — the side effects the engine asks the host to perform

mod actor;
mod arena;
mod config;
mod data;
mod error;
mod events;
mod hooks;
mod host;
mod machine;
mod registry;
mod roster;
mod states;

pub use actor::{ArenaHandle, DEFAULT_CHANNEL_SIZE, spawn_arena};
pub use arena::{Arena, ArenaInfo, PhaseContext};
pub use config::{ArenaMessages, ArenaOptions, LobbyAction};
pub use data::ArenaData;
pub use error::ArenaError;
pub use events::{ArenaEvent, ArenaView, Observer, ObserverId, observer};
pub use hooks::{Hook, PhaseHookTable, hook};
pub use host::{Host, NullHost};
pub use machine::ArenaStateMachine;
pub use registry::ArenaRegistry;
pub use roster::{JoinOutcome, Rejection, Roster};
pub use states::StateSet;

pub use arenakit_countdown::TickOutcome;
pub use arenakit_types::{Location, ParticipantId, PhaseId, Recipient, Value, ValueKind};
