//! Persistent arena data: options, custom variables and locations.

use std::collections::HashMap;

use arenakit_types::{Location, Value, ValueKind, VariableType};
use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ArenaOptions;

/// Everything about an arena that outlives a process: its name, options,
/// custom variables and bookmarked locations.
///
/// Runtime state (phase, roster, countdown) is deliberately absent; a
/// loaded arena always starts in `LOBBY_WAITING` with nobody in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaData {
    name: String,
    #[serde(default)]
    pub options: ArenaOptions,
    #[serde(default)]
    variables: HashMap<String, Value>,
    #[serde(default)]
    locations: HashMap<String, Location>,
    /// Where joined participants are sent.
    #[serde(default)]
    lobby_spawn: Option<Location>,
    /// Where rejected participants are sent outside dedicated mode.
    #[serde(default)]
    fallback: Option<Location>,
    /// Named spawn points for the game itself, in insertion order.
    #[serde(default)]
    spawns: IndexMap<String, Location>,
}

impl ArenaData {
    /// Data for a new arena with default options.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_options(name, ArenaOptions::default())
    }

    pub fn with_options(name: impl Into<String>, options: ArenaOptions) -> Self {
        Self {
            name: name.into(),
            options,
            variables: HashMap::new(),
            locations: HashMap::new(),
            lobby_spawn: None,
            fallback: None,
            spawns: IndexMap::new(),
        }
    }

    /// The arena name. Fixed for the life of the data.
    pub fn name(&self) -> &str {
        &self.name
    }

    // ------------------------------------------------------------------------
    // Custom variables
    // ------------------------------------------------------------------------

    /// Stores a variable, replacing any previous value and kind.
    pub fn set_variable(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Reads a variable only if it is stored with exactly `kind`.
    pub fn get_variable(&self, key: &str, kind: ValueKind) -> Option<&Value> {
        self.variables.get(key).filter(|value| value.kind() == kind)
    }

    /// Typed read: `data.get::<i32>("rounds")`. Strict like
    /// [`get_variable`](Self::get_variable).
    pub fn get<T: VariableType>(&self, key: &str) -> Option<T> {
        self.get_variable(key, T::KIND).and_then(T::from_value)
    }

    pub fn remove_variable(&mut self, key: &str) -> Option<Value> {
        self.variables.remove(key)
    }

    pub fn variables(&self) -> &HashMap<String, Value> {
        &self.variables
    }

    // ------------------------------------------------------------------------
    // Named locations
    // ------------------------------------------------------------------------

    pub fn set_location(&mut self, key: impl Into<String>, location: Location) {
        self.locations.insert(key.into(), location);
    }

    pub fn get_location(&self, key: &str) -> Option<&Location> {
        self.locations.get(key)
    }

    pub fn remove_location(&mut self, key: &str) -> Option<Location> {
        self.locations.remove(key)
    }

    pub fn locations(&self) -> &HashMap<String, Location> {
        &self.locations
    }

    // ------------------------------------------------------------------------
    // Lobby and fallback
    // ------------------------------------------------------------------------

    pub fn set_lobby_spawn(&mut self, location: Option<Location>) {
        self.lobby_spawn = location;
    }

    pub fn lobby_spawn(&self) -> Option<&Location> {
        self.lobby_spawn.as_ref()
    }

    pub fn set_fallback(&mut self, location: Option<Location>) {
        self.fallback = location;
    }

    pub fn fallback(&self) -> Option<&Location> {
        self.fallback.as_ref()
    }

    // ------------------------------------------------------------------------
    // Spawn points
    // ------------------------------------------------------------------------

    /// Adds a spawn point. `false` if the name is taken.
    pub fn add_spawn(&mut self, name: impl Into<String>, location: Location) -> bool {
        let name = name.into();
        if self.spawns.contains_key(&name) {
            return false;
        }
        self.spawns.insert(name, location);
        true
    }

    /// Removes a spawn point. `false` if there was none by that name.
    pub fn remove_spawn(&mut self, name: &str) -> bool {
        self.spawns.shift_remove(name).is_some()
    }

    pub fn spawn(&self, name: &str) -> Option<&Location> {
        self.spawns.get(name)
    }

    pub fn spawns(&self) -> &IndexMap<String, Location> {
        &self.spawns
    }

    /// A uniformly chosen spawn point, `None` when there are none.
    pub fn random_spawn(&self) -> Option<&Location> {
        if self.spawns.is_empty() {
            return None;
        }
        let index = rand::rng().random_range(0..self.spawns.len());
        self.spawns.get_index(index).map(|(_, location)| location)
    }

    /// Replaces everything except the name with `other`'s contents.
    pub(crate) fn replace_keeping_name(&mut self, other: ArenaData) {
        let name = std::mem::take(&mut self.name);
        *self = Self { name, ..other };
    }
}
