//! Dice expressions and the rolling abstraction.
//!
//! Rolls come back with a normalized [0, 1] quality (how good the raw roll
//! was between its minimum and maximum) so checks can grade outcomes
//! without re-deriving the dice bounds. Advantage keeps the best of N+1
//! rolls, disadvantage the worst.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// A dice expression of the form `NdF` or `NdF+M`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiceExpr {
    pub count: u32,
    pub faces: u32,
    pub modifier: i32,
}

impl DiceExpr {
    pub fn new(count: u32, faces: u32, modifier: i32) -> Self {
        Self {
            count,
            faces,
            modifier,
        }
    }

    pub const D20: Self = Self {
        count: 1,
        faces: 20,
        modifier: 0,
    };

    /// Smallest possible unmodified total.
    pub fn min(&self) -> i32 {
        self.count as i32
    }

    /// Largest possible unmodified total.
    pub fn max(&self) -> i32 {
        (self.count * self.faces) as i32
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifier != 0 {
            write!(f, "{}d{}+{}", self.count, self.faces, self.modifier)
        } else {
            write!(f, "{}d{}", self.count, self.faces)
        }
    }
}

/// Malformed dice expression.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid dice expression '{0}'")]
pub struct DiceError(pub String);

impl FromStr for DiceExpr {
    type Err = DiceError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let bad = || DiceError(text.to_string());
        let (dice, modifier) = match text.split_once('+') {
            Some((dice, m)) => (dice, m.trim().parse::<i32>().map_err(|_| bad())?),
            None => (text, 0),
        };
        let (count, faces) = dice.trim().split_once('d').ok_or_else(bad)?;
        let count: u32 = count.trim().parse().map_err(|_| bad())?;
        let faces: u32 = faces.trim().parse().map_err(|_| bad())?;
        if count == 0 || faces == 0 {
            return Err(bad());
        }
        Ok(Self {
            count,
            faces,
            modifier,
        })
    }
}

impl TryFrom<String> for DiceExpr {
    type Error = DiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DiceExpr> for String {
    fn from(expr: DiceExpr) -> Self {
        expr.to_string()
    }
}

/// Outcome of a roll: the modified total and the normalized quality of the
/// unmodified result in [0, 1] (0 = minimum, 1 = maximum).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Roll {
    pub total: i32,
    pub quality: f32,
}

/// Source of dice results.
///
/// The production implementation is [`RandomRoller`]; tests substitute
/// scripted rollers to pin outcomes.
pub trait DiceRoller {
    /// Rolls `expr` honoring `advantage`: positive keeps the best of that
    /// many extra rolls, negative keeps the worst.
    fn roll(&mut self, expr: DiceExpr, advantage: i32) -> Roll;
}

/// Uniform random roller backed by a small, seedable PRNG.
pub struct RandomRoller {
    rng: SmallRng,
}

impl RandomRoller {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn roll_once(&mut self, expr: DiceExpr) -> i32 {
        (0..expr.count)
            .map(|_| self.rng.gen_range(1..=expr.faces as i32))
            .sum()
    }
}

impl Default for RandomRoller {
    fn default() -> Self {
        Self::new()
    }
}

impl DiceRoller for RandomRoller {
    fn roll(&mut self, expr: DiceExpr, advantage: i32) -> Roll {
        let mut result = self.roll_once(expr);
        for _ in 0..advantage.abs() {
            let extra = self.roll_once(expr);
            result = if advantage > 0 {
                result.max(extra)
            } else {
                result.min(extra)
            };
        }

        let span = (expr.max() - expr.min()).max(1);
        let quality = (result - expr.min()) as f32 / span as f32;
        Roll {
            total: result + expr.modifier,
            quality,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Replays a fixed list of totals; quality is derived from the
    /// expression bounds so a scripted 20 on a d20 grades as a critical.
    pub(crate) struct ScriptedRoller(pub Vec<i32>);

    impl DiceRoller for ScriptedRoller {
        fn roll(&mut self, expr: DiceExpr, _advantage: i32) -> Roll {
            let total = self.0.remove(0);
            let span = (expr.max() - expr.min()).max(1);
            Roll {
                total,
                quality: (total - expr.min()) as f32 / span as f32,
            }
        }
    }
}
