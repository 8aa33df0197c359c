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

use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::grid::{DustGrid, BRUSH_RADIUS, WALL};
use crate::layout::RoomLayout;
use crate::socks::SockSet;
use crate::Point;

/// How a room is generated and how long an episode in it lasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Socks scattered on the floor.
    pub sock_count: usize,

    /// Where the robot starts.
    pub start: Point,

    /// Episode length in seconds.
    pub seconds: u32,

    /// Timer frames per second.
    pub frames_per_second: u32,

    /// Seed for sock placement.
    pub seed: u64,

    /// Floor plan.
    pub layout: RoomLayout,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            sock_count: 21,
            start: Point::new(100, 200),
            seconds: 5 * 60,
            frames_per_second: 60,
            seed: 123,
            layout: RoomLayout::default(),
        }
    }
}

/// The live room: dust and socks. Only the mover writes to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    grid: DustGrid,
    socks: SockSet,
}

impl Room {
    /// Create a room from parts.
    pub fn new(grid: DustGrid, socks: SockSet) -> Self {
        Self { grid, socks }
    }

    /// Paint the layout and scatter `sock_count` socks with a generator seeded by `seed`.
    ///
    /// Socks land in `[40, 1240) x [50, 750)` and never on a wall pixel. Placement gives up
    /// after a bounded number of rejections, so a room with hardly any floor gets fewer socks.
    pub fn generate(layout: &RoomLayout, sock_count: usize, seed: u64) -> Self {
        let grid = layout.paint();
        let mut rng = rand_pcg::Pcg64::seed_from_u64(seed);
        let mut socks = SockSet::new();
        let mut attempts = sock_count * 1000;
        while socks.len() < sock_count && attempts > 0 {
            attempts -= 1;
            let x = (rng.gen::<f64>() * 1200.0 + 40.0).floor() as i32;
            let y = (rng.gen::<f64>() * 700.0 + 50.0).floor() as i32;
            let p = Point::new(x, y);
            if grid.get(p) != WALL {
                socks.push(p);
            }
        }
        Self { grid, socks }
    }

    /// Generate from a config, with an explicit seed.
    pub fn from_config(config: &RoomConfig, seed: u64) -> Self {
        Self::generate(&config.layout, config.sock_count, seed)
    }

    /// The dust grid.
    pub fn grid(&self) -> &DustGrid {
        &self.grid
    }

    /// Socks still on the floor.
    pub fn socks(&self) -> &SockSet {
        &self.socks
    }

    /// Run the brush at `center`. Returns how many pixels became clean.
    pub fn brush(&mut self, center: Point) -> usize {
        self.grid.brush(center, BRUSH_RADIUS)
    }

    /// Pick up socks within `radius` of `p`.
    pub fn collect_socks(&mut self, p: Point, radius: i32) -> usize {
        self.socks.collect(p, radius)
    }

    /// Current score of the room.
    pub fn score(&self) -> u64 {
        self.grid.score()
    }
}
