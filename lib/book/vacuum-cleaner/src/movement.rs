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

//! Driving the robot towards a target one pixel step at a time.

use cleaner_room::grid::ROBOT_RADIUS;
use cleaner_room::socks::SOCK_RADIUS;
use cleaner_room::{Point, Room};

/// Share of the remaining turn the heading covers per step.
pub const HEADING_SMOOTHING: f64 = 0.1;

/// Where the robot is and where it faces. The heading is only eased towards the direction of
/// travel for display; no decision reads it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Robot {
    pub position: Point,
    pub heading: f64,
}

impl Robot {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            heading: 0.0,
        }
    }
}

/// Outcome of one [`Movement::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Robot position after the step.
    pub position: Point,

    /// Whether the robot changed position during the step.
    pub moved: bool,

    /// Whether the step ran into a wall and ended the movement.
    pub collided: bool,

    /// Socks picked up at the new position.
    pub items_collected: usize,
}

/// A move from the robot's position to a target along a Bresenham line.
///
/// Each call to [`Movement::step`] advances one iteration of the line: an x step, a y step, or
/// both. Every axis step is checked against the live grid before it is taken, so the move ends
/// short of the target as soon as the robot's footprint would touch a wall or leave the room.
/// The caller cancels a move simply by not stepping it any more.
#[derive(Debug, Clone)]
pub struct Movement {
    target: Point,
    dx: i64,
    dy: i64,
    sx: i32,
    sy: i32,
    error: i64,
    target_heading: f64,
    robot_radius: i32,
    sock_radius: i32,
    started: bool,
    done: bool,
    collided: bool,
}

impl Movement {
    pub fn new(from: Point, target: Point) -> Self {
        Self::with_radii(from, target, ROBOT_RADIUS, SOCK_RADIUS)
    }

    pub fn with_radii(from: Point, target: Point, robot_radius: i32, sock_radius: i32) -> Self {
        // Targets arrive over the wire and may lie anywhere in i32.
        let dx = (i64::from(target.x) - i64::from(from.x)).abs();
        let dy = -(i64::from(target.y) - i64::from(from.y)).abs();
        Self {
            target,
            dx,
            dy,
            sx: if from.x < target.x { 1 } else { -1 },
            sy: if from.y < target.y { 1 } else { -1 },
            error: dx + dy,
            target_heading: (f64::from(target.y) - f64::from(from.y))
                .atan2(f64::from(target.x) - f64::from(from.x)),
            robot_radius,
            sock_radius,
            started: false,
            done: false,
            collided: false,
        }
    }

    pub fn target(&self) -> Point {
        self.target
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Whether the move ended on a wall rather than on the target.
    pub fn collided(&self) -> bool {
        self.collided
    }

    fn blocked(&self, room: &Room, p: Point) -> bool {
        !p.in_bounds() || room.grid().wall_near(p, self.robot_radius)
    }

    /// Advance one iteration. The first call also brushes the starting position. Every position
    /// the robot moves onto is brushed and cleared of socks.
    pub fn step(&mut self, robot: &mut Robot, room: &mut Room) -> StepResult {
        let start = robot.position;
        if self.done {
            return StepResult {
                position: start,
                moved: false,
                collided: false,
                items_collected: 0,
            };
        }
        if !self.started {
            self.started = true;
            room.brush(start);
        }
        robot.heading += (self.target_heading - robot.heading) * HEADING_SMOOTHING;

        let mut collided = false;
        if start == self.target {
            self.done = true;
        } else {
            let e2 = 2 * self.error;
            if e2 >= self.dy {
                if robot.position.x == self.target.x {
                    self.done = true;
                } else {
                    let next = Point::new(robot.position.x + self.sx, robot.position.y);
                    if self.blocked(room, next) {
                        collided = true;
                    } else {
                        self.error += self.dy;
                        robot.position = next;
                    }
                }
            }
            if !self.done && !collided && e2 <= self.dx {
                if robot.position.y == self.target.y {
                    self.done = true;
                } else {
                    let next = Point::new(robot.position.x, robot.position.y + self.sy);
                    if self.blocked(room, next) {
                        collided = true;
                    } else {
                        self.error += self.dx;
                        robot.position = next;
                    }
                }
            }
        }

        if collided {
            self.done = true;
            self.collided = true;
        }
        if robot.position == self.target {
            self.done = true;
        }

        let moved = robot.position != start;
        let items_collected = if moved {
            room.brush(robot.position);
            room.collect_socks(robot.position, self.sock_radius)
        } else {
            0
        };
        StepResult {
            position: robot.position,
            moved,
            collided,
            items_collected,
        }
    }
}
