//! Fog-of-war attenuation.
//!
//! Transparency decays multiplicatively along the path from the observer:
//! each tile keeps `upstream × (1 − opacity × step_m)` of the light, so
//! dense smoke a few tiles thick blots out everything behind it while thin
//! haze only matters over distance.

use super::fields::{OpacityField, ScalarGrid};
use crate::config::GameConfig;
use crate::grid::{Direction, Position, crown};

/// Cumulative [0, 1] transparency toward one observer per tile.
#[derive(Clone, Debug)]
pub struct TransparencyField {
    values: ScalarGrid,
    origin: Position,
}

impl TransparencyField {
    /// Fraction of the view surviving the fog between observer and tile.
    pub fn value(&self, position: Position) -> Option<f32> {
        self.values.get(position)
    }

    pub fn origin(&self) -> Position {
        self.origin
    }
}

/// Sweeps the room and returns the fog transparency field for an observer
/// at `origin`. Pure function of the opacity field plus the origin.
pub fn compute_transparency(
    opacity: &OpacityField,
    origin: Position,
    config: &GameConfig,
) -> TransparencyField {
    let dims = opacity.dims();
    let mut values = ScalarGrid::filled(dims, 0.0);

    // Seed: the observer's own tile is fully transparent.
    values.set(origin, 1.0);

    for radius in 1.. {
        let ring = crown(origin, dims, radius);
        if ring.is_empty() {
            break;
        }
        for pos in ring {
            let (dx, dy) = origin.offset_to(pos);
            let lineage = Direction::from_offset(dx, dy)
                .expect("ring tile has a bearing");
            let (sx, sy) = lineage.delta();
            let upstream = Position::new(pos.x - sx, pos.y - sy);

            let inherited = values.get(upstream).unwrap_or(0.0);
            let step_m = config.units_to_m(upstream.euclid_units(pos));
            let loss = opacity.opacity(pos).unwrap_or(0.0) * step_m;
            let transparency = (inherited * (1.0 - loss)).clamp(0.0, 1.0);
            values.set(pos, transparency);
        }
    }

    TransparencyField { values, origin }
}
