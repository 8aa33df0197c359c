/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

//! Dust grid: one cleanliness byte per pixel, row-major.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::{CleanerError, Point, HEIGHT, WIDTH};

/// Dust value of a wall. Walls never change.
pub const WALL: u8 = 0;

/// Dust value of untouched floor.
pub const DIRTY: u8 = 1;

/// Dust value of fully clean floor.
pub const CLEAN: u8 = 255;

/// Radius of the circular brush under the robot.
pub const BRUSH_RADIUS: i32 = 33;

/// Radius of the robot's footprint, used for wall proximity.
pub const ROBOT_RADIUS: i32 = 32;

/// Per-pixel cleanliness of the room. `0` is a wall, `255` is fully clean, anything in between
/// is floor that still carries dust.
///
/// The grid always holds exactly `WIDTH * HEIGHT` bytes, `y` outer and `x` inner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DustGrid {
    cells: Vec<u8>,
}

impl DustGrid {
    /// Create a grid where every pixel has the same value.
    pub fn filled(value: u8) -> Self {
        Self {
            cells: vec![value; WIDTH * HEIGHT],
        }
    }

    /// Wrap raw row-major bytes. Fails unless there is exactly one byte per pixel.
    pub fn from_bytes(cells: Vec<u8>) -> Result<Self, CleanerError> {
        if cells.len() != WIDTH * HEIGHT {
            return Err(CleanerError::DustLength {
                expected: WIDTH * HEIGHT,
                actual: cells.len(),
            });
        }
        Ok(Self { cells })
    }

    /// Raw row-major bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    /// Encode as base64, the form the grid takes inside of a snapshot.
    pub fn encode(&self) -> String {
        STANDARD.encode(&self.cells)
    }

    /// Decode the base64 form produced by [`DustGrid::encode`].
    pub fn decode(dust: &str) -> Result<Self, CleanerError> {
        let cells = STANDARD
            .decode(dust)
            .map_err(|e| CleanerError::Base64(e.to_string()))?;
        Self::from_bytes(cells)
    }

    fn index(p: Point) -> usize {
        p.y as usize * WIDTH + p.x as usize
    }

    /// Get the dust value of a pixel. The point must be inside of the room.
    pub fn get(&self, p: Point) -> u8 {
        self.cells[Self::index(p)]
    }

    /// How much dust is left on a pixel, `255 - value`.
    pub fn dirt(&self, p: Point) -> i64 {
        i64::from(CLEAN - self.get(p))
    }

    /// Whether the point is inside of the room and a wall.
    pub fn is_wall(&self, p: Point) -> bool {
        p.in_bounds() && self.get(p) == WALL
    }

    pub(crate) fn paint(&mut self, p: Point, value: u8) {
        if p.in_bounds() {
            let index = Self::index(p);
            self.cells[index] = value;
        }
    }

    /// Number of wall pixels.
    pub fn count_walls(&self) -> usize {
        self.cells.iter().filter(|&&v| v == WALL).count()
    }

    /// Whether a disk of `radius` around `p` touches a wall.
    ///
    /// Scans the square `[-radius, radius)` around `p` and keeps offsets with squared length
    /// below `radius²`. Pixels outside of the room are ignored.
    pub fn wall_near(&self, p: Point, radius: i32) -> bool {
        let r2 = radius * radius;
        for j in -radius..radius {
            for i in -radius..radius {
                if i * i + j * j >= r2 {
                    continue;
                }
                if self.is_wall(Point::new(p.x + i, p.y + j)) {
                    return true;
                }
            }
        }
        false
    }

    /// Erase dust in a disk around `center`: every floor pixel closer than `radius` becomes
    /// fully clean. Walls are left alone. Returns how many pixels changed.
    pub fn brush(&mut self, center: Point, radius: i32) -> usize {
        let r2 = radius * radius;
        let mut cleaned = 0;
        for j in -radius..=radius {
            for i in -radius..=radius {
                if i * i + j * j >= r2 {
                    continue;
                }
                let p = Point::new(center.x + i, center.y + j);
                if !p.in_bounds() {
                    continue;
                }
                let cell = &mut self.cells[Self::index(p)];
                if *cell != WALL && *cell != CLEAN {
                    *cell = CLEAN;
                    cleaned += 1;
                }
            }
        }
        cleaned
    }

    /// Cleaned pixel-units: `ceil(sum(value / 255))` over all pixels.
    ///
    /// Always derived from the cells, never cached.
    pub fn score(&self) -> u64 {
        let sum: u64 = self.cells.iter().map(|&v| u64::from(v)).sum();
        (sum + u64::from(CLEAN) - 1) / u64::from(CLEAN)
    }
}

/// Wall lookup for one decision. Built once from a grid, then answers "is there a wall within
/// `radius` of P" with a summed-area table of wall pixels, falling back to the exact disk scan
/// only when the surrounding square holds a wall.
pub struct ObstacleMask<'a> {
    grid: &'a DustGrid,
    radius: i32,
    walls: Vec<u32>,
}

impl<'a> ObstacleMask<'a> {
    const STRIDE: usize = WIDTH + 1;

    /// Build the mask of a grid.
    pub fn new(grid: &'a DustGrid, radius: i32) -> Self {
        let mut walls = vec![0u32; Self::STRIDE * (HEIGHT + 1)];
        for y in 0..HEIGHT {
            let mut row = 0;
            for x in 0..WIDTH {
                if grid.cells[y * WIDTH + x] == WALL {
                    row += 1;
                }
                walls[(y + 1) * Self::STRIDE + x + 1] = walls[y * Self::STRIDE + x + 1] + row;
            }
        }
        Self {
            grid,
            radius,
            walls,
        }
    }

    /// The grid the mask was built from.
    pub fn grid(&self) -> &DustGrid {
        self.grid
    }

    /// Wall pixels in the half-open rectangle `[x0, x1) x [y0, y1)`, clipped to the room.
    fn walls_in(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> u32 {
        let x0 = x0.clamp(0, WIDTH as i32) as usize;
        let x1 = x1.clamp(0, WIDTH as i32) as usize;
        let y0 = y0.clamp(0, HEIGHT as i32) as usize;
        let y1 = y1.clamp(0, HEIGHT as i32) as usize;
        if x0 >= x1 || y0 >= y1 {
            return 0;
        }
        let at = |x: usize, y: usize| self.walls[y * Self::STRIDE + x];
        at(x1, y1) - at(x1, y0) - (at(x0, y1) - at(x0, y0))
    }

    /// Same answer as [`DustGrid::wall_near`] with the mask's radius.
    pub fn wall_near(&self, p: Point) -> bool {
        let r = self.radius;
        if self.walls_in(p.x - r, p.y - r, p.x + r, p.y + r) == 0 {
            return false;
        }
        self.grid.wall_near(p, r)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn grid_with_wall_at(p: Point) -> DustGrid {
        let mut grid = DustGrid::filled(DIRTY);
        grid.paint(p, WALL);
        grid
    }

    #[test]
    fn test_from_bytes_rejects_wrong_length() {
        assert_eq!(
            DustGrid::from_bytes(vec![0; 10]),
            Err(CleanerError::DustLength {
                expected: WIDTH * HEIGHT,
                actual: 10,
            })
        );
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        assert!(matches!(
            DustGrid::decode("not base64!"),
            Err(CleanerError::Base64(_))
        ));
    }

    #[test]
    fn test_decode_rejects_undersized_dust() {
        let short = STANDARD.encode([255u8; 64]);
        assert_eq!(
            DustGrid::decode(&short),
            Err(CleanerError::DustLength {
                expected: WIDTH * HEIGHT,
                actual: 64,
            })
        );
    }

    #[test]
    fn test_wall_near_atop_wall() {
        let p = Point::new(640, 400);
        assert!(grid_with_wall_at(p).wall_near(p, ROBOT_RADIUS));
    }

    #[test]
    fn test_wall_near_radius_boundary() {
        let wall = Point::new(640, 400);
        let grid = grid_with_wall_at(wall);
        assert!(grid.wall_near(Point::new(640 - 31, 400), ROBOT_RADIUS));
        assert!(!grid.wall_near(Point::new(640 + 32, 400), ROBOT_RADIUS));
        assert!(!grid.wall_near(Point::new(640 - 32, 400), ROBOT_RADIUS));
        assert!(!grid.wall_near(Point::new(640 + 23, 400 + 23), ROBOT_RADIUS));
        assert!(grid.wall_near(Point::new(640 - 22, 400 - 22), ROBOT_RADIUS));
    }

    #[test]
    fn test_wall_near_ignores_outside_of_room() {
        let grid = DustGrid::filled(DIRTY);
        assert!(!grid.wall_near(Point::new(0, 0), ROBOT_RADIUS));
        assert!(!grid.wall_near(Point::new(1279, 799), ROBOT_RADIUS));
    }

    #[test]
    fn test_brush_cleans_floor_and_keeps_walls() {
        let center = Point::new(200, 200);
        let wall = Point::new(210, 200);
        let mut grid = grid_with_wall_at(wall);
        let cleaned = grid.brush(center, BRUSH_RADIUS);
        assert!(cleaned > 0);
        assert_eq!(grid.get(center), CLEAN);
        assert_eq!(grid.get(Point::new(200 + 32, 200)), CLEAN);
        assert_eq!(grid.get(Point::new(200 + 33, 200)), DIRTY);
        assert_eq!(grid.get(wall), WALL);

        // a second pass changes nothing
        assert_eq!(grid.brush(center, BRUSH_RADIUS), 0);
    }

    #[test]
    fn test_brush_never_lowers_a_value() {
        let mut grid = DustGrid::filled(200);
        grid.paint(Point::new(5, 5), 100);
        let before = grid.clone();
        grid.brush(Point::new(5, 5), BRUSH_RADIUS);
        for (b, a) in before.as_bytes().iter().zip(grid.as_bytes()) {
            assert!(a >= b);
        }
    }

    #[test]
    fn test_score_rounds_up() {
        assert_eq!(DustGrid::filled(WALL).score(), 0);
        assert_eq!(DustGrid::filled(CLEAN).score(), (WIDTH * HEIGHT) as u64);
        // 1024000 / 255 = 4015.69
        assert_eq!(DustGrid::filled(DIRTY).score(), 4016);
    }

    #[test]
    fn test_score_is_idempotent() {
        let mut grid = DustGrid::filled(DIRTY);
        grid.brush(Point::new(100, 100), BRUSH_RADIUS);
        let first = grid.score();
        assert_eq!(first, grid.score());
        assert!(first > DustGrid::filled(DIRTY).score());
    }

    #[test]
    fn test_mask_agrees_with_exact_scan() {
        let mut grid = DustGrid::filled(DIRTY);
        for x in 300..340 {
            grid.paint(Point::new(x, 300), WALL);
        }
        grid.paint(Point::new(0, 0), WALL);
        let mask = ObstacleMask::new(&grid, ROBOT_RADIUS);
        for y in (240..360).step_by(3) {
            for x in (240..400).step_by(3) {
                let p = Point::new(x, y);
                assert_eq!(mask.wall_near(p), grid.wall_near(p, ROBOT_RADIUS), "{}", p);
            }
        }
        assert!(mask.wall_near(Point::new(10, 10)));
        assert!(!mask.wall_near(Point::new(640, 600)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn test_encode_decode_round_trip(seed in any::<u64>()) {
            let mut rng = rand_pcg::Pcg64::seed_from_u64(seed);
            let cells: Vec<u8> = (0..WIDTH * HEIGHT).map(|_| rng.gen()).collect();
            let grid = DustGrid::from_bytes(cells).expect("full grid");
            let decoded = DustGrid::decode(&grid.encode()).expect("decode failed");
            prop_assert_eq!(decoded, grid);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_mask_matches_single_wall(
            wx in 0..WIDTH as i32,
            wy in 0..HEIGHT as i32,
            dx in -40..40i32,
            dy in -40..40i32,
        ) {
            let grid = grid_with_wall_at(Point::new(wx, wy));
            let mask = ObstacleMask::new(&grid, ROBOT_RADIUS);
            let p = Point::new(wx + dx, wy + dy);
            prop_assert_eq!(mask.wall_near(p), grid.wall_near(p, ROBOT_RADIUS));
        }

        #[test]
        fn test_wall_near_is_clear_far_away_and_set_on_top(
            wx in 0..WIDTH as i32,
            wy in 0..HEIGHT as i32,
            px in 0..WIDTH as i32,
            py in 0..HEIGHT as i32,
        ) {
            let wall = Point::new(wx, wy);
            let p = Point::new(px, py);
            let grid = grid_with_wall_at(wall);
            prop_assert!(grid.wall_near(wall, ROBOT_RADIUS));
            if p.distance_squared(wall) > i64::from(ROBOT_RADIUS * ROBOT_RADIUS) {
                prop_assert!(!grid.wall_near(p, ROBOT_RADIUS));
            }
        }
    }
}
