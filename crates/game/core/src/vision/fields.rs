//! Derived scalar grids rebuilt whenever a room loads.

use crate::grid::{MapDimensions, Position, TileMap};

/// Dense per-tile `f32` grid shared by the derived fields.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ScalarGrid {
    dims: MapDimensions,
    values: Vec<f32>,
}

impl ScalarGrid {
    pub(crate) fn filled(dims: MapDimensions, value: f32) -> Self {
        Self {
            dims,
            values: vec![value; dims.cell_count()],
        }
    }

    pub(crate) fn dims(&self) -> MapDimensions {
        self.dims
    }

    pub(crate) fn get(&self, position: Position) -> Option<f32> {
        if !self.dims.contains(position) {
            return None;
        }
        let idx = position.y as usize * self.dims.width as usize + position.x as usize;
        self.values.get(idx).copied()
    }

    pub(crate) fn set(&mut self, position: Position, value: f32) {
        if self.dims.contains(position) {
            let idx = position.y as usize * self.dims.width as usize + position.x as usize;
            self.values[idx] = value;
        }
    }
}

/// Top-of-surface height (terrain elevation plus obstacle) per tile, in
/// meters. Input to the occlusion sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct ElevationField {
    pub(crate) grid: ScalarGrid,
}

impl ElevationField {
    pub fn from_map(map: &TileMap) -> Self {
        let mut grid = ScalarGrid::filled(map.dimensions(), 0.0);
        for (pos, tile) in map.iter() {
            grid.set(pos, tile.surface_height());
        }
        Self { grid }
    }

    pub fn dims(&self) -> MapDimensions {
        self.grid.dims()
    }

    pub fn surface(&self, position: Position) -> Option<f32> {
        self.grid.get(position)
    }
}

/// Fog coefficient (fractional visibility loss per meter) per tile.
/// Input to the transparency sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct OpacityField {
    pub(crate) grid: ScalarGrid,
}

impl OpacityField {
    pub fn from_map(map: &TileMap) -> Self {
        let mut grid = ScalarGrid::filled(map.dimensions(), 0.0);
        for (pos, tile) in map.iter() {
            grid.set(pos, tile.opacity);
        }
        Self { grid }
    }

    pub fn dims(&self) -> MapDimensions {
        self.grid.dims()
    }

    pub fn opacity(&self, position: Position) -> Option<f32> {
        self.grid.get(position)
    }
}
