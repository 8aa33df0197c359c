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

//! One episode in a room: generate, drive the robot until the timer runs out, report.

use std::time::Duration;

use cleaner_room::{Command, EpisodeSnapshot, Room, RoomConfig, Timer};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::movement::{Movement, Robot};
use crate::Environment;

/// Pacing and limits of the decision loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ticks every decision costs before the robot starts moving.
    pub decision_ticks: u32,

    /// Upper bound on decision cycles per episode.
    pub max_cycles: u64,

    /// Delay per movement step unless the command asks for a fast move. `None` never waits.
    pub frame_millis: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            decision_ticks: 3,
            max_cycles: 100_000,
            frame_millis: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Room generated, episode not started.
    Init,

    /// Robot is cleaning.
    Running,

    /// Timer ran out. Waits for a reset.
    Ended,
}

/// The room, the robot, and the clock of one episode. The only writer of the dust grid is the
/// [`Movement`] driven from [`Environment::execute_action`].
#[derive(Debug, Clone)]
pub struct CleanerEnvironment {
    room_config: RoomConfig,
    config: SimulationConfig,
    room: Room,
    robot: Robot,
    timer: Timer,
    phase: Phase,
    socks_collected: usize,
    steps: u64,
}

impl CleanerEnvironment {
    pub fn new(room_config: RoomConfig, config: SimulationConfig) -> Self {
        let room = Room::from_config(&room_config, room_config.seed);
        let robot = Robot::new(room_config.start);
        let timer = Timer::new(room_config.seconds, room_config.frames_per_second);
        Self {
            room_config,
            config,
            room,
            robot,
            timer,
            phase: Phase::Init,
            socks_collected: 0,
            steps: 0,
        }
    }

    /// Start an episode in a prepared room: robot back at the start, fresh timer.
    pub fn start_in(&mut self, room: Room) {
        self.room = room;
        self.robot = Robot::new(self.room_config.start);
        self.timer = Timer::new(self.room_config.seconds, self.room_config.frames_per_second);
        self.socks_collected = 0;
        self.steps = 0;
        self.phase = Phase::Running;
        info!(
            "episode started: {} socks, timer {}, score {}",
            self.room.socks().len(),
            self.timer,
            self.room.score()
        );
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn socks_collected(&self) -> usize {
        self.socks_collected
    }

    /// Movement steps taken this episode.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn end(&mut self) {
        self.phase = Phase::Ended;
        info!(
            "episode over after {} steps: score {}, {} socks collected",
            self.steps,
            self.room.score(),
            self.socks_collected
        );
    }
}

impl Environment for CleanerEnvironment {
    type Action = Command;
    type Percept = EpisodeSnapshot;
    type Score = u64;

    fn reset(&mut self, seed: u64) {
        let room = Room::from_config(&self.room_config, seed);
        self.start_in(room);
    }

    fn percept(&self) -> EpisodeSnapshot {
        EpisodeSnapshot::capture(&self.room, self.robot.position, self.timer)
    }

    fn execute_action(&mut self, command: &Command) {
        if self.phase != Phase::Running {
            warn!("ignoring {:?} while {:?}", command, self.phase);
            return;
        }
        if !self.timer.tick(self.config.decision_ticks) {
            self.end();
            return;
        }

        let frame = self
            .config
            .frame_millis
            .filter(|_| !command.fast)
            .map(Duration::from_millis);
        let mut movement = Movement::new(self.robot.position, command.target());
        loop {
            let step = movement.step(&mut self.robot, &mut self.room);
            if step.moved {
                self.steps += 1;
                if step.items_collected > 0 {
                    self.socks_collected += step.items_collected;
                    self.timer.collect(step.items_collected);
                    debug!(
                        "picked up {} socks at {}, dt now {}",
                        step.items_collected, step.position, self.timer.dt
                    );
                }
                if !self.timer.tick(1) {
                    self.end();
                    return;
                }
                if let Some(frame) = frame {
                    std::thread::sleep(frame);
                }
            }
            if movement.is_done() {
                break;
            }
        }
        debug!(
            "move to {} ended at {}{}",
            command.target(),
            self.robot.position,
            if movement.collided() { " (wall)" } else { "" }
        );
    }

    fn score(&self) -> u64 {
        self.room.score()
    }

    fn is_terminal(&self) -> bool {
        self.phase == Phase::Ended
    }
}
