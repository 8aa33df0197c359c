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

#![warn(missing_docs)]

//! Cleaner room model.
//!
//! A rectangular room of `WIDTH x HEIGHT` pixels where every pixel carries a dust value, a set
//! of socks lying on the floor, and the countdown timer of an episode. This crate only holds the
//! state and the operations on it; deciding where the robot goes and moving it live elsewhere.

use serde::{Deserialize, Serialize};

pub mod grid;
pub mod layout;
pub mod room;
pub mod snapshot;
pub mod socks;
pub mod timer;

pub use grid::{DustGrid, ObstacleMask};
pub use layout::{RoomLayout, WallRect};
pub use room::{Room, RoomConfig};
pub use snapshot::{Command, DecodedSnapshot, EpisodeSnapshot, GameOver};
pub use socks::SockSet;
pub use timer::Timer;

/// Width of the room in pixels.
pub const WIDTH: usize = 1280;

/// Height of the room in pixels.
pub const HEIGHT: usize = 800;

/// Cleaner room error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CleanerError {
    /// Dust payload is not valid base64.
    #[error("dust is not valid base64: {0}")]
    Base64(String),

    /// Dust payload does not hold exactly one byte per pixel.
    #[error("dust has {actual} bytes, expected {expected}")]
    DustLength {
        /// Bytes a full room needs.
        expected: usize,

        /// Bytes received.
        actual: usize,
    },

    /// A point of the snapshot lies outside of the room.
    #[error("{what} is outside of the room: {point}")]
    OutOfBounds {
        /// What the point describes, e.g. "robot".
        what: &'static str,

        /// The offending point.
        point: Point,
    },

    /// Request could not be parsed or names no known operation.
    #[error("unknown request: {0}")]
    UnknownRequest(String),

    /// Response could not be encoded or decoded.
    #[error("json error: {0}")]
    Json(String),
}

/// Integer pixel coordinate. Also used for direction vectors, where the components are small
/// deltas.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Column, growing to the right.
    pub x: i32,

    /// Row, growing downwards.
    pub y: i32,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether the point lies inside of the room.
    pub fn in_bounds(&self) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as usize) < WIDTH && (self.y as usize) < HEIGHT
    }

    /// Point moved by a direction vector.
    pub fn offset(&self, direction: Point) -> Point {
        Point::new(self.x + direction.x, self.y + direction.y)
    }

    /// Squared euclidean distance to another point.
    pub fn distance_squared(&self, other: Point) -> i64 {
        let dx = i64::from(self.x - other.x);
        let dy = i64::from(self.y - other.y);
        dx * dx + dy * dy
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
