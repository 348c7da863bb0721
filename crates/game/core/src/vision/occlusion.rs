//! "Nap of Earth" terrain occlusion.
//!
//! One crown-by-crown sweep from the observer computes, for every tile, how
//! far below the line of sight its surface sits. Each ring tile inherits the
//! steepest sight-blocking slope seen along its angular lineage (via its
//! upstream neighbor, one step closer to the origin), so the whole field
//! costs O(cells).

use super::fields::{ElevationField, ScalarGrid};
use crate::config::GameConfig;
use crate::grid::{Direction, Position, crown};

/// Per-tile occlusion result for one observer position and eye height.
///
/// `deficit` is how many meters of cover stand between the sight line and
/// the tile surface: 0 means the surface is in plain view, larger values
/// mean a target must be that tall (modulo the visibility fraction) to poke
/// out above the intervening terrain.
#[derive(Clone, Debug)]
pub struct OcclusionField {
    deficit: ScalarGrid,
    epsilon_m: f32,
    origin: Position,
}

impl OcclusionField {
    /// Meters of cover above the sight line at `position`.
    pub fn deficit(&self, position: Position) -> Option<f32> {
        self.deficit.get(position)
    }

    /// Whether the bare terrain surface at `position` is in view.
    pub fn terrain_visible(&self, position: Position) -> bool {
        self.deficit(position)
            .is_some_and(|d| d <= self.epsilon_m)
    }

    pub fn origin(&self) -> Position {
        self.origin
    }
}

/// Sweeps the room and returns the occlusion field for an observer whose
/// eyes are `eye_height_m` above the surface at `origin`.
///
/// Pure function of the elevation field plus observer state. The running
/// blocking slope (tangent of the max blocking elevation angle) can only
/// grow along a lineage: once terrain blocks the view, nothing farther and
/// lower un-blocks it.
pub fn compute_occlusion(
    elevation: &ElevationField,
    origin: Position,
    eye_height_m: f32,
    config: &GameConfig,
) -> OcclusionField {
    let dims = elevation.dims();
    let mut deficit = ScalarGrid::filled(dims, 0.0);
    let mut max_slope = ScalarGrid::filled(dims, f32::NEG_INFINITY);

    let eye_abs = elevation.surface(origin).unwrap_or(0.0) + eye_height_m;

    // The observer always sees their own tile.
    deficit.set(origin, 0.0);
    max_slope.set(origin, f32::NEG_INFINITY);

    for radius in 1.. {
        let ring = crown(origin, dims, radius);
        if ring.is_empty() {
            break;
        }
        for pos in ring {
            let (dx, dy) = origin.offset_to(pos);
            // Safe: ring tiles are never the origin.
            let lineage = Direction::from_offset(dx, dy)
                .expect("ring tile has a bearing");
            let (sx, sy) = lineage.delta();
            let upstream = Position::new(pos.x - sx, pos.y - sy);

            let inherited = max_slope.get(upstream).unwrap_or(f32::NEG_INFINITY);
            let surface = elevation.surface(pos).unwrap_or(0.0);
            let dist_m = config.units_to_m(origin.euclid_units(pos));

            // Height of the sight-blocking line projected out to this tile.
            let blocked_h = if inherited == f32::NEG_INFINITY {
                f32::NEG_INFINITY
            } else {
                eye_abs + inherited * dist_m
            };
            deficit.set(pos, (blocked_h - surface).max(0.0));

            let own_slope = (surface - eye_abs) / dist_m;
            max_slope.set(pos, inherited.max(own_slope));
        }
    }

    OcclusionField {
        deficit,
        epsilon_m: config.occlusion_epsilon_m,
        origin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Tile, TileMap};

    fn field_with_wall(wall_height: f32) -> OcclusionField {
        let mut map = TileMap::filled(11, 1, Tile::floor(' ', "floor"));
        map.tile_mut(Position::new(5, 0)).unwrap().obstacle_height = wall_height;
        let elevation = ElevationField::from_map(&map);
        compute_occlusion(
            &elevation,
            Position::new(0, 0),
            1.7,
            &GameConfig::default(),
        )
    }

    #[test]
    fn flat_ground_has_no_deficit() {
        let map = TileMap::filled(7, 7, Tile::floor(' ', "floor"));
        let elevation = ElevationField::from_map(&map);
        let field = compute_occlusion(
            &elevation,
            Position::new(3, 3),
            1.7,
            &GameConfig::default(),
        );
        for (pos, _) in map.iter() {
            assert_eq!(field.deficit(pos), Some(0.0), "at {pos}");
            assert!(field.terrain_visible(pos));
        }
    }

    #[test]
    fn wall_shadows_terrain_behind_it() {
        let field = field_with_wall(3.0);
        // The wall face itself is visible.
        assert!(field.deficit(Position::new(5, 0)).unwrap() <= 0.01);
        // Ground behind it is buried under the projected sight line, and
        // the deficit grows with distance.
        let near = field.deficit(Position::new(6, 0)).unwrap();
        let far = field.deficit(Position::new(10, 0)).unwrap();
        assert!(near > 0.01);
        assert!(far > near);
    }

    #[test]
    fn raising_the_wall_never_improves_visibility() {
        let spot = Position::new(10, 0);
        let mut previous = 0.0f32;
        for wall_height in [0.0, 1.0, 2.0, 4.0, 8.0] {
            let deficit = field_with_wall(wall_height).deficit(spot).unwrap();
            assert!(
                deficit >= previous,
                "wall {wall_height}: deficit {deficit} < {previous}"
            );
            previous = deficit;
        }
    }

    #[test]
    fn high_ground_sees_over_low_cover() {
        let mut map = TileMap::filled(11, 1, Tile::floor(' ', "floor"));
        map.tile_mut(Position::new(0, 0)).unwrap().elevation = 10.0;
        map.tile_mut(Position::new(5, 0)).unwrap().obstacle_height = 2.0;
        let elevation = ElevationField::from_map(&map);
        let field = compute_occlusion(
            &elevation,
            Position::new(0, 0),
            1.7,
            &GameConfig::default(),
        );
        // From a 10 m rise, a 2 m wall casts no shadow on the far floor.
        assert_eq!(field.deficit(Position::new(10, 0)), Some(0.0));
    }
}
