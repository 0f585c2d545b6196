//! # arenakit
//!
//! Arena lifecycle engine for multiplayer minigames.
//!
//! An arena gathers participants in a lobby, counts down once enough have
//! joined, runs the game and resets itself afterwards. Hosts plug in their
//! own world through the [`Host`] trait and extend the lifecycle with custom
//! phases, hooks and observers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use arenakit::prelude::*;
//!
//! # async fn run() -> Result<(), ArenakitError> {
//! arenakit::telemetry::init("info")?;
//!
//! let registry = ArenaRegistry::new();
//! let mut arena = Arena::new("duel", Arc::new(NullHost));
//! arena.set_options(ArenaOptions::default().with_limits(2, 2));
//! let duel = registry.spawn(arena)?;
//!
//! duel.register_hook(PhaseId::GAME_PLAYING, |ctx| {
//!     ctx.disperse();
//! })
//! .await?;
//! duel.join("alice").await?;
//! duel.join("bob").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Crates
//!
//! - [`types`] — participant ids, phases, locations, variable values
//! - [`countdown`] — the cancellable lobby countdown
//! - [`arena`] — the arena, its actor handle and the registry
//! - [`store`] — persistence of arena data

mod error;
pub mod telemetry;

pub use error::ArenakitError;

pub use arenakit_arena as arena;
pub use arenakit_countdown as countdown;
pub use arenakit_store as store;
pub use arenakit_types as types;

pub use arenakit_arena::{
    Arena, ArenaData, ArenaError, ArenaEvent, ArenaHandle, ArenaInfo, ArenaMessages,
    ArenaOptions, ArenaRegistry, ArenaView, Host, JoinOutcome, LobbyAction, NullHost, PhaseContext,
    Rejection, hook, observer,
};
pub use arenakit_store::{ArenaStore, JsonDirStore, MemoryStore, StoreError, restore_all};
pub use arenakit_types::{Location, ParticipantId, PhaseId, Recipient, Value, ValueKind};

pub mod prelude {
    pub use crate::ArenakitError;
    pub use arenakit_arena::{
        Arena, ArenaData, ArenaEvent, ArenaHandle, ArenaOptions, ArenaRegistry, Host,
        JoinOutcome, NullHost, PhaseContext,
    };
    pub use arenakit_store::{ArenaStore, JsonDirStore};
    pub use arenakit_types::{Location, ParticipantId, PhaseId, Recipient};
}
