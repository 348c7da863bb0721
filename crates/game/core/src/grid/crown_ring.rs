//! Concentric square rings ("crowns") around an origin tile.
//!
//! The visibility sweeps process the grid crown by crown: every tile in
//! ring `r` reads state computed for ring `r - 1`, so one pass over the
//! rings touches each cell exactly once.

use super::{MapDimensions, Position};

/// Tiles of the square ring at Chebyshev radius `radius` around `origin`,
/// clipped to the grid. Radius 0 is the origin itself.
///
/// Ordering walks the south edge west-to-east, then the east edge
/// south-to-north, the north edge east-to-west, and the west edge
/// north-to-south. Callers only rely on the clipping; the order is kept
/// stable for reproducibility.
pub fn crown(origin: Position, dims: MapDimensions, radius: i32) -> Vec<Position> {
    if radius <= 0 {
        return if dims.contains(origin) {
            vec![origin]
        } else {
            Vec::new()
        };
    }

    let mut ring = Vec::with_capacity(8 * radius as usize);
    for i in -radius + 1..=radius {
        ring.push(Position::new(origin.x + i, origin.y + radius));
    }
    for j in (-radius..radius).rev() {
        ring.push(Position::new(origin.x + radius, origin.y + j));
    }
    for i in (-radius..radius).rev() {
        ring.push(Position::new(origin.x + i, origin.y - radius));
    }
    for j in -radius + 1..=radius {
        ring.push(Position::new(origin.x - radius, origin.y + j));
    }

    ring.retain(|pos| dims.contains(*pos));
    ring
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_zero_is_the_origin() {
        let dims = MapDimensions::new(5, 5);
        assert_eq!(crown(Position::new(2, 2), dims, 0), vec![Position::new(2, 2)]);
    }

    #[test]
    fn full_ring_has_eight_r_tiles() {
        let dims = MapDimensions::new(9, 9);
        let origin = Position::new(4, 4);
        for radius in 1..=3 {
            let ring = crown(origin, dims, radius);
            assert_eq!(ring.len(), 8 * radius as usize, "radius {radius}");
            for pos in &ring {
                assert_eq!(pos.ring_radius(origin), radius);
            }
        }
    }

    #[test]
    fn ring_has_no_duplicates() {
        let dims = MapDimensions::new(9, 9);
        let ring = crown(Position::new(4, 4), dims, 3);
        let mut unique = ring.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ring.len());
    }

    #[test]
    fn rings_are_clipped_at_the_boundary() {
        let dims = MapDimensions::new(4, 4);
        let ring = crown(Position::new(0, 0), dims, 2);
        assert!(ring.iter().all(|p| dims.contains(*p)));
        // Corner origin keeps only the in-bounds quarter of the ring.
        assert_eq!(ring.len(), 5);
    }

    #[test]
    fn far_rings_become_empty() {
        let dims = MapDimensions::new(3, 3);
        assert!(crown(Position::new(1, 1), dims, 4).is_empty());
    }
}
