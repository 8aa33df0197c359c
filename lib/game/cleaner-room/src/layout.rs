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

//! Fixed floor plans. A layout is a list of wall rectangles painted onto a dirty floor.

use serde::{Deserialize, Serialize};

use crate::grid::{DustGrid, DIRTY, WALL};
use crate::{Point, HEIGHT, WIDTH};

/// Axis-aligned block of wall pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallRect {
    /// Left column.
    pub x: i32,

    /// Top row.
    pub y: i32,

    /// Width in pixels.
    pub width: i32,

    /// Height in pixels.
    pub height: i32,
}

impl WallRect {
    /// Create a new wall rectangle.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Floor plan of a room: a wall border of `border` pixels around the room plus interior walls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomLayout {
    /// Thickness of the outer wall.
    pub border: i32,

    /// Interior walls and furniture.
    pub walls: Vec<WallRect>,
}

impl Default for RoomLayout {
    fn default() -> Self {
        Self {
            border: 4,
            walls: vec![
                // partition with a doorway at the bottom
                WallRect::new(420, 0, 8, 520),
                WallRect::new(820, 380, 460, 8),
                // pillar
                WallRect::new(640, 180, 40, 40),
                // table
                WallRect::new(180, 560, 150, 100),
                // wardrobe
                WallRect::new(980, 620, 200, 180),
            ],
        }
    }
}

impl RoomLayout {
    /// A room with only the outer wall.
    pub fn empty() -> Self {
        Self {
            border: 4,
            walls: Vec::new(),
        }
    }

    fn border_walls(&self) -> [WallRect; 4] {
        let (w, h, b) = (WIDTH as i32, HEIGHT as i32, self.border);
        [
            WallRect::new(0, 0, w, b),
            WallRect::new(0, h - b, w, b),
            WallRect::new(0, 0, b, h),
            WallRect::new(w - b, 0, b, h),
        ]
    }

    /// Paint the layout onto a fully dirty floor.
    pub fn paint(&self) -> DustGrid {
        let mut grid = DustGrid::filled(DIRTY);
        for rect in self.border_walls().iter().chain(self.walls.iter()) {
            for y in rect.y..rect.y + rect.height {
                for x in rect.x..rect.x + rect.width {
                    grid.paint(Point::new(x, y), WALL);
                }
            }
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_layout_has_only_the_border() {
        let grid = RoomLayout::empty().paint();
        assert!(grid.is_wall(Point::new(0, 0)));
        assert!(grid.is_wall(Point::new(3, 400)));
        assert!(grid.is_wall(Point::new(1276, 400)));
        assert!(grid.is_wall(Point::new(640, 796)));
        assert!(!grid.is_wall(Point::new(4, 4)));
        assert!(!grid.is_wall(Point::new(1275, 795)));
        assert_eq!(grid.count_walls(), WIDTH * HEIGHT - (WIDTH - 8) * (HEIGHT - 8));
        assert_eq!(grid.get(Point::new(640, 400)), DIRTY);
    }

    #[test]
    fn test_default_layout_paints_interior_walls() {
        let grid = RoomLayout::default().paint();
        assert!(grid.is_wall(Point::new(424, 100)));
        assert!(!grid.is_wall(Point::new(424, 600)));
        assert!(grid.is_wall(Point::new(200, 600)));
        // start position stays clear
        assert!(!grid.wall_near(Point::new(100, 200), crate::grid::ROBOT_RADIUS));
    }

    #[test]
    fn test_layout_from_partial_toml_like_json() {
        let layout: RoomLayout = serde_json::from_str(r#"{"walls": []}"#).unwrap();
        assert_eq!(layout, RoomLayout::empty());
    }
}
