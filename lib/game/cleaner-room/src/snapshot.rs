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

//! Messages exchanged between the simulator and the decision side.

use serde::{Deserialize, Deserializer, Serialize};

use crate::grid::DustGrid;
use crate::room::Room;
use crate::socks::SockSet;
use crate::timer::Timer;
use crate::{CleanerError, Point};

/// Full state of an episode as sent to the decision side. `dust` is the base64 form of the
/// grid, `score` is derived from the grid at capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSnapshot {
    /// Episode countdown.
    pub timer: Timer,

    /// Score at capture time.
    pub score: u64,

    /// Base64 of `WIDTH * HEIGHT` dust bytes, row-major.
    pub dust: String,

    /// Robot position.
    pub robot: Point,

    /// Socks still on the floor.
    pub socks: Vec<Point>,
}

/// A snapshot that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSnapshot {
    /// Dust grid, a private copy of the room's.
    pub grid: DustGrid,

    /// Robot position, inside of the room.
    pub robot: Point,

    /// Socks, all inside of the room.
    pub socks: SockSet,

    /// Episode countdown.
    pub timer: Timer,
}

impl EpisodeSnapshot {
    /// Capture the current state of an episode.
    pub fn capture(room: &Room, robot: Point, timer: Timer) -> Self {
        Self {
            timer,
            score: room.score(),
            dust: room.grid().encode(),
            robot,
            socks: room.socks().points().to_vec(),
        }
    }

    /// Validate and decode. Nothing is produced unless the whole snapshot is well formed.
    pub fn decode(&self) -> Result<DecodedSnapshot, CleanerError> {
        if !self.robot.in_bounds() {
            return Err(CleanerError::OutOfBounds {
                what: "robot",
                point: self.robot,
            });
        }
        if let Some(sock) = self.socks.iter().find(|sock| !sock.in_bounds()) {
            return Err(CleanerError::OutOfBounds {
                what: "sock",
                point: *sock,
            });
        }
        let grid = DustGrid::decode(&self.dust)?;
        Ok(DecodedSnapshot {
            grid,
            robot: self.robot,
            socks: SockSet::from_points(self.socks.clone()),
            timer: self.timer,
        })
    }
}

/// Where the robot should go next. `fast` skips per-frame pacing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    /// Target column.
    pub x: i32,

    /// Target row.
    pub y: i32,

    /// Skip animation.
    pub fast: bool,
}

impl Command {
    /// The target as a point.
    pub fn target(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// End of an episode with its final score.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameOver {
    /// Final score. Accepted as a number or as a numeric string, since page scripts often send
    /// the score label's text.
    #[serde(deserialize_with = "score_from_number_or_text")]
    pub score: u64,
}

fn score_from_number_or_text<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Score {
        Number(u64),
        Text(String),
    }

    match Score::deserialize(deserializer)? {
        Score::Number(score) => Ok(score),
        Score::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}
