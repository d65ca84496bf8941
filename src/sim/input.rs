//! Held-key tracking
//!
//! Key events arrive asynchronously from the host; the simulation only
//! ever sees a [`Controls`] snapshot taken once at the top of a tick.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Controller keys the enzyme responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    TurnLeft,
    TurnRight,
    Forward,
    Reverse,
    /// Vertical thrust up (variant B)
    Lift,
    /// Vertical thrust down (variant B)
    Drop,
}

/// Sparse set of currently held keys
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Drop every held key (focus loss, session exit)
    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Snapshot for one tick
    pub fn snapshot(&self) -> Controls {
        Controls {
            turn_left: self.is_held(Key::TurnLeft),
            turn_right: self.is_held(Key::TurnRight),
            forward: self.is_held(Key::Forward),
            reverse: self.is_held(Key::Reverse),
            lift: self.is_held(Key::Lift),
            drop: self.is_held(Key::Drop),
        }
    }
}

/// Held keys for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub turn_left: bool,
    pub turn_right: bool,
    pub forward: bool,
    pub reverse: bool,
    pub lift: bool,
    pub drop: bool,
}

impl Controls {
    /// Forward or reverse thrust requested
    pub fn thrusting(&self) -> bool {
        self.forward || self.reverse
    }

    pub fn turning(&self) -> bool {
        self.turn_left || self.turn_right
    }
}
