//! Participant roster.

use arenakit_types::ParticipantId;
use indexmap::IndexSet;

/// Why a participant was not added to the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The lobby is at `max_participants`.
    LobbyFull,
    /// The arena is past its lobby phases.
    GameInProgress,
    /// The participant is already on the roster.
    AlreadyJoined,
}

/// Result of a join attempt.
///
/// Rejections are normal outcomes, not errors: by the time the caller sees
/// one, the participant has already been messaged, relocated or
/// disconnected according to the arena's options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    Rejected(Rejection),
}

impl JoinOutcome {
    pub fn is_joined(&self) -> bool {
        matches!(self, Self::Joined)
    }
}

/// The participants currently in one arena, in join order, without
/// duplicates.
///
/// Capacity is checked and the member inserted in one call
/// ([`try_insert`](Self::try_insert)). Together with the arena running on a
/// single task this keeps concurrent joins from overfilling it.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    members: IndexSet<ParticipantId>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `participant` unless it is already present or the roster holds
    /// `capacity` members. `None` means unbounded.
    pub fn try_insert(
        &mut self,
        participant: ParticipantId,
        capacity: Option<usize>,
    ) -> Result<(), Rejection> {
        if self.members.contains(&participant) {
            return Err(Rejection::AlreadyJoined);
        }
        if capacity.is_some_and(|max| self.members.len() >= max) {
            return Err(Rejection::LobbyFull);
        }
        self.members.insert(participant);
        Ok(())
    }

    /// Removes `participant`, keeping everyone else in join order.
    pub fn remove(&mut self, participant: &ParticipantId) -> bool {
        self.members.shift_remove(participant)
    }

    /// Empties the roster, returning who was on it.
    pub fn drain(&mut self) -> Vec<ParticipantId> {
        self.members.drain(..).collect()
    }

    pub fn contains(&self, participant: &ParticipantId) -> bool {
        self.members.contains(participant)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticipantId> {
        self.members.iter()
    }

    /// A copy of the members in join order.
    pub fn to_vec(&self) -> Vec<ParticipantId> {
        self.members.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
