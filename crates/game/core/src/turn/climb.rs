//! The climb check: a small local state machine with three outcome tiers.
//!
//! A failed climb never relocates the climber, and fall damage applies
//! only on the critical tier.

use crate::dice::{DiceExpr, Roll};

/// Tallest obstacle anyone can attempt to climb.
pub const MAX_CLIMB_M: f32 = 4.0;

/// Which way the climber is going relative to their current footing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ClimbDirection {
    Up,
    Level,
    Down,
}

impl ClimbDirection {
    /// Classified from the surface height difference; within half a meter
    /// either way the climb counts as level.
    pub fn from_height_gap(dz_m: f32) -> Self {
        if dz_m > 0.5 {
            ClimbDirection::Up
        } else if dz_m < -0.5 {
            ClimbDirection::Down
        } else {
            ClimbDirection::Level
        }
    }
}

/// Outcome tiers of a climb attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClimbOutcome {
    /// Clears the obstacle cleanly.
    Success,
    /// Scrambles over, but the effort costs the rest of the turn's
    /// movement.
    Partial,
    /// Slips and falls on this side; takes fall damage, stays put.
    CriticalFail,
}

/// A prepared climb: difficulty scaled by the height to clear.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClimbCheck {
    pub direction: ClimbDirection,
    pub gap_m: f32,
    pub dc: i32,
}

impl ClimbCheck {
    pub fn new(direction: ClimbDirection, gap_m: f32) -> Self {
        let base = match direction {
            ClimbDirection::Up => 10,
            ClimbDirection::Level => 8,
            ClimbDirection::Down => 6,
        };
        Self {
            direction,
            gap_m,
            dc: base + (gap_m * 2.0).round() as i32,
        }
    }

    /// Grades a d20 roll: make the DC to succeed, miss it by up to 5 to
    /// scramble over, miss by more to fall.
    pub fn outcome(&self, roll: &Roll) -> ClimbOutcome {
        if roll.total >= self.dc {
            ClimbOutcome::Success
        } else if roll.total >= self.dc - 5 {
            ClimbOutcome::Partial
        } else {
            ClimbOutcome::CriticalFail
        }
    }

    /// Fall damage dice for the critical tier: 1d6 per full three meters
    /// of gap, at least 1d6.
    pub fn fall_damage(&self) -> DiceExpr {
        let dice = ((self.gap_m / 3.0).floor() as u32).max(1);
        DiceExpr::new(dice, 6, 0)
    }
}
