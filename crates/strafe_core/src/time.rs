//! Level clock and deadlines
//!
//! Every delayed transition in the gameplay layer (reload countdown, attack
//! windup, reclamation, door motion, scene transitions) stores a
//! [`Deadline`] and checks it against [`GameClock::now`] on each tick.

use serde::{Deserialize, Serialize};

/// Seconds since level start, advanced once per simulation tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GameClock {
    now: f32,
    frame: u64,
}

impl GameClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time in seconds
    #[inline]
    pub fn now(&self) -> f32 {
        self.now
    }

    /// Number of ticks advanced so far
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advance by `delta_time`. Negative or non-finite deltas are treated as 0.
    pub fn advance(&mut self, delta_time: f32) -> f32 {
        let dt = if delta_time.is_finite() && delta_time > 0.0 {
            delta_time
        } else {
            if delta_time != 0.0 {
                log::warn!("Ignoring invalid frame delta {}", delta_time);
            }
            0.0
        };
        self.now += dt;
        self.frame += 1;
        dt
    }

    /// Build a deadline `delay` seconds from now
    pub fn after(&self, delay: f32) -> Deadline {
        Deadline::after(self.now, delay)
    }

    /// Reset to time zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A timestamp a suspended transition resumes at
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Deadline(pub f32);

impl Deadline {
    /// Deadline `delay` seconds after `now`
    #[inline]
    pub fn after(now: f32, delay: f32) -> Self {
        Self(now + delay.max(0.0))
    }

    /// Whether the deadline has been reached
    #[inline]
    pub fn is_due(&self, now: f32) -> bool {
        now >= self.0
    }

    /// Seconds left until the deadline (never negative)
    #[inline]
    pub fn remaining(&self, now: f32) -> f32 {
        (self.0 - now).max(0.0)
    }

    /// The timestamp itself
    #[inline]
    pub fn at(&self) -> f32 {
        self.0
    }
}
