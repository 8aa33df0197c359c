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

use serde::{Deserialize, Serialize};

/// How much `dt` grows for every collected sock.
pub const SOCK_DT_PENALTY: f64 = 0.5;

/// Frame rate assumed when a timer is built from a raw frame budget or read off the wire.
pub const DEFAULT_FRAMES_PER_SECOND: u32 = 60;

fn default_frames_per_second() -> u32 {
    DEFAULT_FRAMES_PER_SECOND
}

/// Episode countdown. `timeout` is measured in frames and drops by `dt` on every tick; `dt`
/// starts at 1 and only ever grows, once per collected sock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    /// Frames left.
    pub timeout: f64,

    /// Frames consumed by one tick.
    pub dt: f64,

    /// Only used to display the remaining time; not part of the wire shape.
    #[serde(skip, default = "default_frames_per_second")]
    frames_per_second: u32,
}

impl Timer {
    /// Create a timer for `seconds` at `frames_per_second`.
    pub fn new(seconds: u32, frames_per_second: u32) -> Self {
        Self {
            frames_per_second,
            ..Self::from_frames(f64::from(seconds) * f64::from(frames_per_second))
        }
    }

    /// Create a timer with a raw frame budget at [`DEFAULT_FRAMES_PER_SECOND`].
    pub fn from_frames(timeout: f64) -> Self {
        Self {
            timeout,
            dt: 1.0,
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
        }
    }

    /// Frames per second used to display the remaining time.
    pub fn frames_per_second(&self) -> u32 {
        self.frames_per_second
    }

    /// Spend `steps` ticks. Returns whether the episode is still running.
    pub fn tick(&mut self, steps: u32) -> bool {
        self.timeout -= self.dt * f64::from(steps);
        self.is_running()
    }

    /// Make every following tick more expensive because `count` socks were picked up.
    pub fn collect(&mut self, count: usize) {
        if count > 0 {
            self.dt += count as f64 * SOCK_DT_PENALTY;
        }
    }

    /// Whether there is time left.
    pub fn is_running(&self) -> bool {
        self.timeout > 0.0
    }
}

// m:ss of the remaining time.
impl std::fmt::Display for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rate = f64::from(self.frames_per_second.max(1));
        let seconds = (self.timeout.max(0.0) / rate).floor() as u64;
        write!(f, "{}:{:02}", seconds / 60, seconds % 60)
    }
}
