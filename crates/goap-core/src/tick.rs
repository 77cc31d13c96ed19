#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-tick input handed down by the owning control loop.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
}

impl TickContext {
    pub fn new(tick: u64, dt_seconds: f32) -> Self {
        Self { tick, dt_seconds }
    }

    /// Context for the following tick with the same step size.
    pub fn next(self) -> Self {
        Self {
            tick: self.tick.saturating_add(1),
            dt_seconds: self.dt_seconds,
        }
    }
}
