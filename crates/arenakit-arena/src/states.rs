//! The set of phases valid for one arena.

use arenakit_types::PhaseId;
use indexmap::IndexSet;

/// Ordered set of the phases an arena may enter.
///
/// Always contains [`PhaseId::DEFAULTS`]; those can never be removed.
/// Custom phases are kept in registration order after the defaults.
#[derive(Debug, Clone)]
pub struct StateSet {
    states: IndexSet<PhaseId>,
}

impl StateSet {
    /// A set holding only the built-in phases.
    pub fn new() -> Self {
        Self {
            states: PhaseId::DEFAULTS.into_iter().collect(),
        }
    }

    /// Adds a phase. Returns `false` if it is already present.
    pub fn register(&mut self, id: PhaseId) -> bool {
        self.states.insert(id)
    }

    /// Removes a custom phase. Returns `false` for a built-in phase or one
    /// that is not present.
    pub fn remove(&mut self, id: &PhaseId) -> bool {
        if id.is_default() {
            return false;
        }
        self.states.shift_remove(id)
    }

    pub fn contains(&self, id: &PhaseId) -> bool {
        self.states.contains(id)
    }

    /// Phases in order: built-ins first, then custom ones as registered.
    pub fn iter(&self) -> impl Iterator<Item = &PhaseId> {
        self.states.iter()
    }

    /// The built-in phases, in their fixed order.
    pub fn defaults(&self) -> impl Iterator<Item = &PhaseId> {
        self.states.iter().filter(|id| id.is_default())
    }

    /// Only the phases added on top of the built-ins.
    pub fn custom(&self) -> impl Iterator<Item = &PhaseId> {
        self.states.iter().filter(|id| !id.is_default())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Never true in practice: the built-ins are always present.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl Default for StateSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_contains_all_defaults() {
        let set = StateSet::new();
        assert_eq!(set.len(), PhaseId::DEFAULTS.len());
        for id in PhaseId::DEFAULTS {
            assert!(set.contains(&id));
        }
        assert_eq!(set.custom().count(), 0);
        assert!(set.defaults().eq(PhaseId::DEFAULTS.iter()));
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut set = StateSet::new();
        assert!(set.register(PhaseId::new("SUDDEN_DEATH")));
        assert!(!set.register(PhaseId::new("SUDDEN_DEATH")));
        assert!(!set.register(PhaseId::GAME_PLAYING));
    }

    #[test]
    fn test_defaults_cannot_be_removed() {
        let mut set = StateSet::new();
        for id in PhaseId::DEFAULTS {
            assert!(!set.remove(&id));
            assert!(set.contains(&id));
        }
    }

    #[test]
    fn test_remove_custom_and_unknown() {
        let mut set = StateSet::new();
        let custom = PhaseId::new("SUDDEN_DEATH");
        assert!(!set.remove(&custom));
        set.register(custom.clone());
        assert!(set.remove(&custom));
        assert!(!set.contains(&custom));
    }

    #[test]
    fn test_iteration_order() {
        let mut set = StateSet::new();
        set.register(PhaseId::new("B"));
        set.register(PhaseId::new("A"));
        let custom: Vec<&str> = set.custom().map(|id| id.name()).collect();
        assert_eq!(custom, ["B", "A"]);
        assert_eq!(set.iter().next(), Some(&PhaseId::LOBBY_WAITING));
    }
}
