//! Tree/universe mode and the smoothed mix each component follows.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::easing::smoothing_factor;

/// Which layout is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Particles assemble into the tree.
    #[default]
    Tree,
    /// Particles disperse into the starfield.
    Universe,
}

impl ViewMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Tree => ViewMode::Universe,
            ViewMode::Universe => ViewMode::Tree,
        }
    }

    /// Mix value this mode pulls toward.
    #[inline]
    pub fn target(self) -> f32 {
        match self {
            ViewMode::Tree => 0.0,
            ViewMode::Universe => 1.0,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Tree => write!(f, "tree"),
            ViewMode::Universe => write!(f, "universe"),
        }
    }
}

/// Single source of truth for the requested mode.
///
/// Owned by the scene composer; components receive the current value each
/// frame and never hold on to this.
#[derive(Debug, Clone, Default)]
pub struct ModeState {
    mode: ViewMode,
    changes: u64,
}

impl ModeState {
    /// Start in the given mode.
    pub fn new(mode: ViewMode) -> Self {
        Self { mode, changes: 0 }
    }

    /// Currently requested mode.
    #[inline]
    pub fn current(&self) -> ViewMode {
        self.mode
    }

    /// Flip the mode and return the new value.
    pub fn toggle(&mut self) -> ViewMode {
        self.mode = self.mode.toggled();
        self.changes += 1;
        self.mode
    }

    /// Request a specific mode. Returns `true` if it differed from the current one.
    pub fn set(&mut self, mode: ViewMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.changes += 1;
        true
    }

    /// How many times the mode has changed.
    pub fn changes(&self) -> u64 {
        self.changes
    }
}

/// Smoothed `[0, 1]` blend between tree (0) and universe (1).
///
/// The mode only changes the target; the value always travels there by
/// exponential approach, so a toggle can never make it jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeMix {
    value: f32,
    rate: f32,
}

impl ModeMix {
    /// Snap threshold once the value is indistinguishable from its target.
    pub const SETTLE_EPSILON: f32 = 1e-4;

    /// Start at the given mode's resting value.
    pub fn new(mode: ViewMode, rate: f32) -> Self {
        Self {
            value: mode.target(),
            rate,
        }
    }

    /// Current mix value.
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Smoothing rate (1/seconds).
    #[inline]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Largest change a single `update` of `dt` seconds can make.
    #[inline]
    pub fn max_step(&self, dt: f32) -> f32 {
        smoothing_factor(self.rate, dt)
    }

    /// Advance toward `mode` by `dt` seconds. Returns the new value.
    pub fn update(&mut self, mode: ViewMode, dt: f32) -> f32 {
        let target = mode.target();
        let k = smoothing_factor(self.rate, dt);
        self.value += (target - self.value) * k;
        if (target - self.value).abs() < Self::SETTLE_EPSILON {
            self.value = target;
        }
        self.value = self.value.clamp(0.0, 1.0);
        self.value
    }
}
