//! Shared vocabulary for arenakit.
//!
//! Every other crate in the workspace speaks in these types:
//!
//! - **Identity** ([`ParticipantId`], [`PhaseId`]) — who is in an arena and
//!   which lifecycle phase it is in.
//! - **Places** ([`Location`]) — a serializable world position used for
//!   lobby spawns, fallback locations and named bookmarks.
//! - **Values** ([`Value`], [`ValueKind`], [`VariableType`]) — the closed set
//!   of primitive kinds an arena's custom variables may hold.
//! - **Addressing** ([`Recipient`]) — who a message is meant for.
//!
//! The crate has no runtime behavior of its own. It exists so the state
//! machine, the countdown and the persistence layer agree on one
//! representation without depending on each other.

mod types;
mod value;

pub use types::{Location, ParticipantId, PhaseId, Recipient};
pub use value::{Value, ValueKind, VariableType};
