//! Elevation-aware visibility: terrain occlusion and fog attenuation.
//!
//! Both computations sweep the grid once in concentric crowns around the
//! observer and produce a whole-room field, so perception queries for any
//! number of targets cost one sweep per observer instead of one ray per
//! target.

mod fields;
mod fog;
mod occlusion;

pub use fields::{ElevationField, OpacityField};
pub use fog::{TransparencyField, compute_transparency};
pub use occlusion::{OcclusionField, compute_occlusion};

use crate::config::GameConfig;
use crate::grid::Position;

/// Combined per-observer visibility decision over the two sweep results.
///
/// Cutoff semantics are inclusive on the visible side: a target whose
/// occlusion deficit is exactly 75% of its height, or whose cumulative
/// transparency is exactly the fog floor, is still visible. Only strictly
/// deeper cover or strictly thicker fog hides it, which keeps the boundary
/// deterministic under repeated evaluation.
pub struct Visibility {
    occlusion: OcclusionField,
    transparency: TransparencyField,
    height_fraction: f32,
    fog_floor: f32,
}

impl Visibility {
    pub fn new(
        occlusion: OcclusionField,
        transparency: TransparencyField,
        config: &GameConfig,
    ) -> Self {
        Self {
            occlusion,
            transparency,
            height_fraction: config.height_visibility_fraction,
            fog_floor: config.fog_visibility_floor,
        }
    }

    /// Whether a target of height `target_height_m` standing at `position`
    /// can be seen by the observer the fields were computed for.
    ///
    /// Out-of-bounds positions are never visible.
    pub fn can_see(&self, position: Position, target_height_m: f32) -> bool {
        let Some(deficit) = self.occlusion.deficit(position) else {
            return false;
        };
        let Some(transparency) = self.transparency.value(position) else {
            return false;
        };
        deficit <= self.height_fraction * target_height_m && transparency >= self.fog_floor
    }

    /// Whether the terrain surface of the tile itself is in view.
    pub fn terrain_visible(&self, position: Position) -> bool {
        self.occlusion.terrain_visible(position)
            && self
                .transparency
                .value(position)
                .is_some_and(|t| t >= self.fog_floor)
    }

    pub fn occlusion(&self) -> &OcclusionField {
        &self.occlusion
    }

    pub fn transparency(&self) -> &TransparencyField {
        &self.transparency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Tile, TileMap};

    fn flat_map(width: u32, height: u32) -> TileMap {
        TileMap::filled(width, height, Tile::floor(' ', "floor"))
    }

    fn visibility_for(map: &TileMap, origin: Position, config: &GameConfig) -> Visibility {
        let elevation = ElevationField::from_map(map);
        let opacity = OpacityField::from_map(map);
        let occ = compute_occlusion(&elevation, origin, config.default_eye_height_m, config);
        let trans = compute_transparency(&opacity, origin, config);
        Visibility::new(occ, trans, config)
    }

    #[test]
    fn open_ground_is_fully_visible() {
        let config = GameConfig::default();
        let map = flat_map(9, 9);
        let vis = visibility_for(&map, Position::new(4, 4), &config);
        for (pos, _) in map.iter() {
            assert!(vis.can_see(pos, 1.7), "expected {pos} visible");
            assert!(vis.terrain_visible(pos));
        }
    }

    #[test]
    fn out_of_bounds_is_never_visible() {
        let config = GameConfig::default();
        let map = flat_map(5, 5);
        let vis = visibility_for(&map, Position::new(2, 2), &config);
        assert!(!vis.can_see(Position::new(5, 2), 1.7));
        assert!(!vis.can_see(Position::new(-1, 0), 1.7));
    }

    #[test]
    fn wall_hides_a_short_target_but_not_a_tall_one() {
        let config = GameConfig::default();
        let mut map = flat_map(9, 1);
        map.tile_mut(Position::new(4, 0)).unwrap().obstacle_height = 3.0;
        let vis = visibility_for(&map, Position::new(0, 0), &config);

        let behind = Position::new(8, 0);
        // A human-sized target is swallowed by the wall shadow.
        assert!(!vis.can_see(behind, 1.7));
        // A tower-sized target still pokes out above the cover.
        assert!(vis.can_see(behind, 30.0));
    }

    #[test]
    fn height_cutoff_boundary_is_deterministic() {
        let config = GameConfig::default();
        let mut map = flat_map(9, 1);
        map.tile_mut(Position::new(4, 0)).unwrap().obstacle_height = 3.0;
        let vis = visibility_for(&map, Position::new(0, 0), &config);

        let behind = Position::new(8, 0);
        let deficit = vis.occlusion().deficit(behind).unwrap();
        assert!(deficit > 0.0);
        let boundary_height = deficit / config.height_visibility_fraction;
        // Clearly on either side of the cutoff the rule is unambiguous.
        assert!(vis.can_see(behind, boundary_height * 1.01));
        assert!(!vis.can_see(behind, boundary_height * 0.99));
        // Exactly at the boundary the answer is stable across evaluations.
        let first = vis.can_see(behind, boundary_height);
        assert_eq!(first, vis.can_see(behind, boundary_height));
    }

    #[test]
    fn fog_floor_boundary_is_visible() {
        // Unit scale keeps the arithmetic exact: one tile of opacity 0.5
        // puts cumulative transparency at exactly the 0.5 floor.
        let config = GameConfig {
            meters_per_unit: 1.0,
            ..GameConfig::default()
        };
        let mut map = flat_map(3, 1);
        map.tile_mut(Position::new(1, 0)).unwrap().opacity = 0.5;
        map.tile_mut(Position::new(2, 0)).unwrap().opacity = 0.5;

        let origin = Position::new(0, 0);
        let trans = compute_transparency(&OpacityField::from_map(&map), origin, &config);
        assert_eq!(trans.value(Position::new(1, 0)), Some(0.5));
        // Behind the fog tile transparency keeps decaying.
        assert_eq!(trans.value(Position::new(2, 0)), Some(0.25));

        let occ = compute_occlusion(
            &ElevationField::from_map(&map),
            origin,
            config.default_eye_height_m,
            &config,
        );
        let vis = Visibility::new(occ, trans, &config);
        // Exactly at the floor: visible. Below it: hidden.
        assert!(vis.can_see(Position::new(1, 0), 1.7));
        assert!(!vis.can_see(Position::new(2, 0), 1.7));
    }
}
