//! Tunable rule constants shared by every subsystem.
//!
//! One `GameConfig` is constructed at session start and passed by reference
//! into the components that need it. In particular it owns the single
//! grid-unit-to-meters conversion factor: every distance reported anywhere
//! in the engine derives from this one constant.

/// Rule constants for a game session.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct GameConfig {
    /// Width of one grid tile in meters.
    pub meters_per_unit: f32,

    /// Maximum perception radius in grid units.
    pub max_scan_units: u32,

    /// Distance band edges in grid units: close is `<= close_max_units`,
    /// far is `>= far_min_units`, everything between is mid.
    pub close_max_units: u32,
    pub far_min_units: u32,

    /// Terrain higher than the sight line by more than this is occluding.
    pub occlusion_epsilon_m: f32,

    /// A target is hidden once cover swallows this fraction of its height.
    pub height_visibility_fraction: f32,

    /// A target is hidden once cumulative fog transparency drops below this.
    pub fog_visibility_floor: f32,

    /// Default eye height of an observer with no explicit height, in meters.
    pub default_eye_height_m: f32,

    /// Wall-clock length of one actor turn, in seconds.
    pub base_turn_seconds: u32,

    /// More sightings of a kind than this are reported as "several".
    pub plural_threshold: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            meters_per_unit: 1.5,
            max_scan_units: 50,
            close_max_units: 6,
            far_min_units: 21,
            occlusion_epsilon_m: 0.01,
            height_visibility_fraction: 0.75,
            fog_visibility_floor: 0.5,
            default_eye_height_m: 1.7,
            base_turn_seconds: 6,
            plural_threshold: 3,
        }
    }
}

impl GameConfig {
    /// Converts a distance in grid units to meters.
    pub fn units_to_m(&self, units: f32) -> f32 {
        units * self.meters_per_unit
    }

    /// Converts a distance in grid units to the whole meters shown to players.
    pub fn units_to_reported_m(&self, units: f32) -> u32 {
        self.units_to_m(units).round().max(0.0) as u32
    }
}
