//! Cost-aware A* pathfinding over the tile grid.
//!
//! Movement is 8-directional; a diagonal step costs √2 straight steps.
//! Step cost is the step length in meters times the destination tile's
//! difficulty multiplier, so the returned `distance_m` is directly
//! comparable with an actor's movement budget.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::config::GameConfig;
use crate::grid::{Direction, Position, TileMap};

/// Result of a path search: ordered tiles from the start (inclusive) to the
/// point actually reached, plus the cost of walking them.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    pub positions: Vec<Position>,
    pub distance_m: f32,
}

impl Path {
    fn stationary(start: Position) -> Self {
        Self {
            positions: vec![start],
            distance_m: 0.0,
        }
    }

    pub fn destination(&self) -> Position {
        *self.positions.last().expect("path contains the start")
    }

    /// True when the search could not leave the starting tile.
    pub fn is_stationary(&self) -> bool {
        self.positions.len() <= 1
    }

    /// Number of steps taken (tiles entered).
    pub fn step_count(&self) -> usize {
        self.positions.len().saturating_sub(1)
    }
}

/// Pathfinding failures. Out-of-bounds endpoints are programming errors and
/// are propagated fatally by callers rather than retried.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("path endpoint {0} is outside the grid")]
    OutOfBounds(Position),
}

const COST_EPS: f32 = 1e-4;

/// Frontier entry ordered by (f, g, position) so the heap is deterministic.
struct Open {
    f: f32,
    g: f32,
    pos: Position,
}

impl PartialEq for Open {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Open {}

impl PartialOrd for Open {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Open {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the smallest f first.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.g.total_cmp(&self.g))
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

/// Finds a cost-minimal route from `start` toward `goal`.
///
/// `occupied` reports tiles held by other actors; they are never entered.
/// When pathing toward an entity the goal tile itself is occupied, so the
/// search naturally stops on the best adjacent tile.
///
/// With a `budget_m`, expansion prunes nodes beyond the budget and an
/// unreachable goal yields the best partial path: the reached tile closest
/// (by straight-line distance) to the goal. "Too far" is never an error; a
/// fully boxed-in start returns a stationary path of zero cost.
pub fn find_path(
    map: &TileMap,
    occupied: impl Fn(Position) -> bool,
    start: Position,
    goal: Position,
    budget_m: Option<f32>,
    config: &GameConfig,
) -> Result<Path, PathError> {
    if !map.contains(start) {
        return Err(PathError::OutOfBounds(start));
    }
    if !map.contains(goal) {
        return Err(PathError::OutOfBounds(goal));
    }
    if start == goal || budget_m.is_some_and(|b| b <= 0.0) {
        return Ok(Path::stationary(start));
    }

    // Keep the heuristic admissible even when some terrain is easier than
    // unit difficulty.
    let min_difficulty = map
        .iter()
        .filter(|(_, t)| t.is_passable())
        .map(|(_, t)| t.difficulty)
        .fold(1.0f32, f32::min)
        .clamp(0.0, 1.0);
    let h = |pos: Position| config.units_to_m(pos.euclid_units(goal)) * min_difficulty;

    let mut best_g: HashMap<Position, f32> = HashMap::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut open = BinaryHeap::new();

    best_g.insert(start, 0.0);
    open.push(Open {
        f: h(start),
        g: 0.0,
        pos: start,
    });

    // Best partial fallback: reached node nearest the goal, ties by cost.
    let mut nearest = start;
    let mut nearest_h = h(start);
    let mut nearest_g = 0.0f32;

    while let Some(Open { g, pos, .. }) = open.pop() {
        if best_g.get(&pos).is_some_and(|&known| g > known + COST_EPS) {
            continue; // stale heap entry
        }
        if pos == goal {
            return Ok(reconstruct(&came_from, start, goal, g));
        }

        let here_h = h(pos);
        if here_h < nearest_h - COST_EPS
            || (here_h <= nearest_h + COST_EPS && g < nearest_g)
        {
            nearest = pos;
            nearest_h = here_h;
            nearest_g = g;
        }

        for direction in Direction::ALL {
            let next = pos.step(direction);
            let Some(tile) = map.tile(next) else {
                continue;
            };
            if !tile.is_passable() || occupied(next) {
                continue;
            }

            let (dx, dy) = direction.delta();
            let step_units = if dx != 0 && dy != 0 {
                std::f32::consts::SQRT_2
            } else {
                1.0
            };
            let next_g = g + config.units_to_m(step_units) * tile.difficulty;
            if budget_m.is_some_and(|b| next_g > b + COST_EPS) {
                continue;
            }
            if best_g
                .get(&next)
                .is_none_or(|&known| next_g < known - COST_EPS)
            {
                best_g.insert(next, next_g);
                came_from.insert(next, pos);
                open.push(Open {
                    f: next_g + h(next),
                    g: next_g,
                    pos: next,
                });
            }
        }
    }

    Ok(reconstruct(&came_from, start, nearest, nearest_g))
}

/// Walks `max_units` steps along a bearing, clamped to the grid, and
/// returns the last in-bounds tile. Used to turn "move east as far as
/// possible" into an ordinary goal-directed search.
pub fn bearing_goal(
    map: &TileMap,
    from: Position,
    direction: Direction,
    max_units: u32,
) -> Position {
    let (dx, dy) = direction.delta();
    let mut goal = from;
    for step in 1..=max_units as i32 {
        let candidate = Position::new(from.x + dx * step, from.y + dy * step);
        if !map.contains(candidate) {
            break;
        }
        goal = candidate;
    }
    goal
}

fn reconstruct(
    came_from: &HashMap<Position, Position>,
    start: Position,
    end: Position,
    cost_m: f32,
) -> Path {
    let mut positions = vec![end];
    let mut cursor = end;
    while cursor != start {
        cursor = came_from[&cursor];
        positions.push(cursor);
    }
    positions.reverse();
    Path {
        positions,
        distance_m: cost_m,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Tile, TileMap};

    fn open_map(width: u32, height: u32) -> TileMap {
        TileMap::filled(width, height, Tile::floor(' ', "floor"))
    }

    fn wall(map: &mut TileMap, pos: Position) {
        let tile = map.tile_mut(pos).unwrap();
        tile.difficulty = Tile::IMPASSABLE;
        tile.obstacle_height = 3.0;
    }

    fn no_one(_: Position) -> bool {
        false
    }

    #[test]
    fn straight_line_costs_steps_times_scale() {
        let map = open_map(6, 1);
        let config = GameConfig::default();
        let path = find_path(
            &map,
            no_one,
            Position::new(0, 0),
            Position::new(4, 0),
            None,
            &config,
        )
        .unwrap();
        assert_eq!(path.destination(), Position::new(4, 0));
        assert_eq!(path.step_count(), 4);
        assert!((path.distance_m - 6.0).abs() < 1e-3);
    }

    #[test]
    fn diagonal_routes_are_diagonal_optimal() {
        let map = open_map(8, 8);
        let config = GameConfig::default();
        let path = find_path(
            &map,
            no_one,
            Position::new(0, 0),
            Position::new(3, 4),
            None,
            &config,
        )
        .unwrap();
        // Three diagonal steps plus one straight step.
        let expected = (3.0 * std::f32::consts::SQRT_2 + 1.0) * config.meters_per_unit;
        assert_eq!(path.destination(), Position::new(3, 4));
        assert!((path.distance_m - expected).abs() < 1e-3);
    }

    #[test]
    fn wall_forces_a_detour() {
        let mut map = open_map(7, 7);
        // Vertical wall at x = 3 with a gap at the top row.
        for y in 1..7 {
            wall(&mut map, Position::new(3, y));
        }
        let config = GameConfig::default();
        let direct = find_path(
            &map,
            no_one,
            Position::new(0, 3),
            Position::new(6, 3),
            None,
            &config,
        )
        .unwrap();
        assert_eq!(direct.destination(), Position::new(6, 3));
        assert!(direct.positions.iter().all(|p| map.tile(*p).unwrap().is_passable()));
        // Detour through the gap is strictly longer than the open-field path.
        let open_cost = 6.0 * config.meters_per_unit;
        assert!(direct.distance_m > open_cost + 1e-3);
    }

    #[test]
    fn fully_enclosed_start_stays_put() {
        let mut map = open_map(5, 5);
        for pos in [
            Position::new(1, 1),
            Position::new(2, 1),
            Position::new(3, 1),
            Position::new(1, 2),
            Position::new(3, 2),
            Position::new(1, 3),
            Position::new(2, 3),
            Position::new(3, 3),
        ] {
            wall(&mut map, pos);
        }
        let path = find_path(
            &map,
            no_one,
            Position::new(2, 2),
            Position::new(4, 4),
            None,
            &GameConfig::default(),
        )
        .unwrap();
        assert!(path.is_stationary());
        assert_eq!(path.distance_m, 0.0);
    }

    #[test]
    fn budget_yields_best_partial_path() {
        let map = open_map(10, 1);
        let config = GameConfig::default();
        let path = find_path(
            &map,
            no_one,
            Position::new(0, 0),
            Position::new(9, 0),
            Some(4.5),
            &config,
        )
        .unwrap();
        // 4.5 m buys exactly three 1.5 m steps toward the goal.
        assert_eq!(path.destination(), Position::new(3, 0));
        assert!((path.distance_m - 4.5).abs() < 1e-3);
    }

    #[test]
    fn zero_budget_is_a_stationary_path() {
        let map = open_map(4, 4);
        let path = find_path(
            &map,
            no_one,
            Position::new(1, 1),
            Position::new(3, 3),
            Some(0.0),
            &GameConfig::default(),
        )
        .unwrap();
        assert!(path.is_stationary());
        assert_eq!(path.distance_m, 0.0);
    }

    #[test]
    fn occupied_tiles_are_routed_around() {
        let map = open_map(5, 3);
        let blocker = Position::new(2, 1);
        let path = find_path(
            &map,
            |p| p == blocker,
            Position::new(0, 1),
            Position::new(4, 1),
            None,
            &GameConfig::default(),
        )
        .unwrap();
        assert_eq!(path.destination(), Position::new(4, 1));
        assert!(!path.positions.contains(&blocker));
    }

    #[test]
    fn occupied_goal_stops_adjacent() {
        let map = open_map(5, 1);
        let target = Position::new(4, 0);
        let path = find_path(
            &map,
            |p| p == target,
            Position::new(0, 0),
            target,
            None,
            &GameConfig::default(),
        )
        .unwrap();
        assert_eq!(path.destination(), Position::new(3, 0));
    }

    #[test]
    fn difficult_terrain_is_avoided_when_cheaper() {
        let mut map = open_map(3, 3);
        map.tile_mut(Position::new(1, 1)).unwrap().difficulty = 10.0;
        let config = GameConfig::default();
        let path = find_path(
            &map,
            no_one,
            Position::new(0, 1),
            Position::new(2, 1),
            None,
            &config,
        )
        .unwrap();
        // Going around the mire (two diagonals) beats wading through it.
        assert!(!path.positions.contains(&Position::new(1, 1)));
        let expected = 2.0 * std::f32::consts::SQRT_2 * config.meters_per_unit;
        assert!((path.distance_m - expected).abs() < 1e-3);
    }

    #[test]
    fn out_of_bounds_endpoints_are_programming_errors() {
        let map = open_map(3, 3);
        let config = GameConfig::default();
        assert!(matches!(
            find_path(&map, no_one, Position::new(-1, 0), Position::new(2, 2), None, &config),
            Err(PathError::OutOfBounds(_))
        ));
        assert!(matches!(
            find_path(&map, no_one, Position::new(0, 0), Position::new(3, 0), None, &config),
            Err(PathError::OutOfBounds(_))
        ));
    }

    #[test]
    fn bearing_goal_clamps_to_the_grid() {
        let map = open_map(5, 5);
        assert_eq!(
            bearing_goal(&map, Position::new(2, 2), Direction::East, 50),
            Position::new(4, 2)
        );
        assert_eq!(
            bearing_goal(&map, Position::new(0, 0), Direction::NorthWest, 50),
            Position::new(0, 0)
        );
    }
}
