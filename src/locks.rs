//! Per-player transaction exclusion
//!
//! Two simultaneous grants for the same player could interleave remote
//! commands over independent sessions and leave the tier/grant state
//! inconsistent. The registry hands out at most one token per player
//! identifier; the token is released when its guard drops.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex};

/// How a second in-flight request for the same player is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentionPolicy {
    /// Reject immediately with a transaction-in-progress condition
    #[default]
    Reject,
    /// Block until the in-flight transaction releases the player
    Wait,
}

/// Registry of players with an in-flight grant transaction
#[derive(Debug, Default)]
pub struct PlayerLockRegistry {
    in_flight: Mutex<HashSet<String>>,
    released: Condvar,
}

impl PlayerLockRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(HashSet::new()),
            released: Condvar::new(),
        }
    }

    /// Try to acquire the player's token without blocking
    pub fn try_acquire(&self, player: &str) -> Option<PlayerLockGuard<'_>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .expect("player lock registry poisoned");
        if in_flight.contains(player) {
            return None;
        }
        in_flight.insert(player.to_string());
        Some(PlayerLockGuard {
            registry: self,
            player: player.to_string(),
        })
    }

    /// Acquire the player's token, blocking until it is free
    pub fn acquire(&self, player: &str) -> PlayerLockGuard<'_> {
        let mut in_flight = self
            .in_flight
            .lock()
            .expect("player lock registry poisoned");
        while in_flight.contains(player) {
            in_flight = self
                .released
                .wait(in_flight)
                .expect("player lock registry poisoned");
        }
        in_flight.insert(player.to_string());
        PlayerLockGuard {
            registry: self,
            player: player.to_string(),
        }
    }

    /// Whether the player currently has an in-flight transaction
    pub fn is_in_flight(&self, player: &str) -> bool {
        self.in_flight
            .lock()
            .expect("player lock registry poisoned")
            .contains(player)
    }

    fn release(&self, player: &str) {
        let mut in_flight = self
            .in_flight
            .lock()
            .expect("player lock registry poisoned");
        in_flight.remove(player);
        self.released.notify_all();
    }
}

/// Exclusive token for one player's in-flight transaction
///
/// Held across the whole session lifecycle; dropping it releases the player
/// on every exit path, including panics and early returns.
#[derive(Debug)]
pub struct PlayerLockGuard<'a> {
    registry: &'a PlayerLockRegistry,
    player: String,
}

impl PlayerLockGuard<'_> {
    /// The player this guard covers
    pub fn player(&self) -> &str {
        &self.player
    }
}

impl Drop for PlayerLockGuard<'_> {
    fn drop(&mut self) {
        self.registry.release(&self.player);
    }
}
