//! Per-phase hooks.

use std::collections::HashMap;
use std::fmt;

use arenakit_types::PhaseId;

use crate::PhaseContext;

/// An action run every time its phase is entered.
///
/// Hooks run on the arena's own task, right after observers have been told
/// about the transition. They must not block: the countdown shares that
/// task. A hook may request further transitions through
/// [`PhaseContext::transition`].
pub type Hook = Box<dyn FnMut(&mut PhaseContext<'_>) + Send>;

/// Boxes a closure as a [`Hook`].
pub fn hook<F>(f: F) -> Hook
where
    F: FnMut(&mut PhaseContext<'_>) + Send + 'static,
{
    Box::new(f)
}

/// Maps a phase to at most one [`Hook`].
///
/// The table does not know which phases exist; the state machine checks
/// that before registering.
#[derive(Default)]
pub struct PhaseHookTable {
    hooks: HashMap<PhaseId, Hook>,
}

impl PhaseHookTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `hook` for `id`. Returns `false` if `id` already has one.
    pub fn register(&mut self, id: PhaseId, hook: Hook) -> bool {
        if self.hooks.contains_key(&id) {
            return false;
        }
        self.hooks.insert(id, hook);
        true
    }

    /// Drops the hook for `id`. Returns `false` if there was none.
    pub fn remove(&mut self, id: &PhaseId) -> bool {
        self.hooks.remove(id).is_some()
    }

    pub fn contains(&self, id: &PhaseId) -> bool {
        self.hooks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Takes the hook out while it runs, so it can borrow the arena.
    pub(crate) fn take(&mut self, id: &PhaseId) -> Option<Hook> {
        self.hooks.remove(id)
    }

    /// Puts a hook back after it ran. Never overwrites a hook registered in
    /// the meantime.
    pub(crate) fn restore(&mut self, id: PhaseId, hook: Hook) {
        self.hooks.entry(id).or_insert(hook);
    }
}

impl fmt::Debug for PhaseHookTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.hooks.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Hook {
        hook(|_ctx| {})
    }

    #[test]
    fn test_one_hook_per_phase() {
        let mut table = PhaseHookTable::new();
        assert!(table.register(PhaseId::GAME_PLAYING, noop()));
        assert!(!table.register(PhaseId::GAME_PLAYING, noop()));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut table = PhaseHookTable::new();
        assert!(!table.remove(&PhaseId::GAME_OVER));
        table.register(PhaseId::GAME_OVER, noop());
        assert!(table.remove(&PhaseId::GAME_OVER));
        assert!(table.is_empty());
    }

    #[test]
    fn test_take_and_restore() {
        let mut table = PhaseHookTable::new();
        table.register(PhaseId::GAME_OVER, noop());
        let hook = table.take(&PhaseId::GAME_OVER).unwrap();
        assert!(!table.contains(&PhaseId::GAME_OVER));
        table.restore(PhaseId::GAME_OVER, hook);
        assert!(table.contains(&PhaseId::GAME_OVER));
    }
}
