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

//! Frontier scoring: pick the next target by casting rays from the robot in a fixed set of
//! directions and scoring the dust each ray can reach before it runs into a wall.
//!
//! This is a greedy, myopic heuristic. It never backtracks and does not guarantee coverage;
//! the visited set is the only thing keeping the robot from oscillating between two targets.

use cleaner_room::grid::ROBOT_RADIUS;
use cleaner_room::socks::SOCK_RADIUS;
use cleaner_room::{DustGrid, ObstacleMask, Point, SockSet, HEIGHT, WIDTH};
use log::debug;
use rand::{Rng as _, SeedableRng};
use serde::{Deserialize, Serialize};

pub type Rng = rand_pcg::Pcg64;
pub type HashSet<T> = rustc_hash::FxHashSet<T>;

/// Tunables of the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Number of direction rings, see [`direction_table`].
    pub rings: u32,

    /// Seed of the generator behind the stuck fallback.
    pub seed: u64,

    /// Rays stop where a disk of this radius would touch a wall.
    pub robot_radius: i32,

    /// Ray points this close to a sock are penalised.
    pub sock_radius: i32,

    /// Subtracted from a ray's score for every point near a sock.
    pub sock_penalty: i64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            rings: 6,
            seed: 2,
            robot_radius: ROBOT_RADIUS,
            sock_radius: SOCK_RADIUS,
            sock_penalty: 100_000,
        }
    }
}

fn gcd(a: i32, b: i32) -> i32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Lattice points on the boundary of the square with half-width `n`, in order of increasing
/// angle starting at `(n, 0)`.
fn square_boundary(n: i32) -> Vec<Point> {
    let mut points = Vec::with_capacity(8 * n as usize);
    points.extend((0..n).map(|y| Point::new(n, y)));
    points.extend((-n + 1..=n).rev().map(|x| Point::new(x, n)));
    points.extend((-n + 1..=n).rev().map(|y| Point::new(-n, y)));
    points.extend((-n..n).map(|x| Point::new(x, -n)));
    points.extend((-n..0).map(|y| Point::new(n, y)));
    points
}

/// Directions of one ring.
///
/// Ring 0 holds the four axis directions. Ring `n > 0` holds the primitive lattice vectors on
/// the square of half-width `n` that are not axis-aligned: ring 1 the diagonals, ring 2 the
/// knight moves, and every further ring a finer angular resolution. A primitive vector never
/// repeats the angle of an earlier ring.
pub fn direction_ring(ring: u32) -> Vec<Point> {
    if ring == 0 {
        return vec![
            Point::new(1, 0),
            Point::new(0, 1),
            Point::new(-1, 0),
            Point::new(0, -1),
        ];
    }
    square_boundary(ring as i32)
        .into_iter()
        .filter(|d| d.x != 0 && d.y != 0 && gcd(d.x.abs(), d.y.abs()) == 1)
        .collect()
}

/// Directions of rings `0..rings`, ring by ring. This order breaks score ties.
pub fn direction_table(rings: u32) -> Vec<Point> {
    (0..rings).flat_map(direction_ring).collect()
}

/// Targets chosen so far. Only grows until the planner is replaced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VisitedSet {
    points: HashSet<Point>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the point was new.
    pub fn insert(&mut self, p: Point) -> bool {
        self.points.insert(p)
    }

    pub fn contains(&self, p: Point) -> bool {
        self.points.contains(&p)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }
}

/// Result of casting one ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub direction: Point,

    /// Last point the robot can reach along the ray. The robot's own position when the very
    /// first step is blocked.
    pub endpoint: Point,

    pub score: i64,
}

/// A chosen target and the ray it came from. `candidate` is `None` when every ray ended on a
/// visited point and the target was drawn at random instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub target: Point,
    pub candidate: Option<Candidate>,
}

impl Selection {
    pub fn is_fallback(&self) -> bool {
        self.candidate.is_none()
    }
}

/// Chooses targets for one episode. Owns everything that survives between decisions: the
/// direction table, the visited set, and the random generator for the stuck fallback.
#[derive(Debug, Clone)]
pub struct FrontierPlanner {
    config: PlannerConfig,
    directions: Vec<Point>,
    visited: VisitedSet,
    rng: Rng,
}

impl FrontierPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        let directions = direction_table(config.rings);
        let rng = Rng::seed_from_u64(config.seed);
        Self {
            config,
            directions,
            visited: VisitedSet::new(),
            rng,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn directions(&self) -> &[Point] {
        &self.directions
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn mark_visited(&mut self, p: Point) -> bool {
        self.visited.insert(p)
    }

    /// Cast every ray from `robot` over a read-only grid.
    pub fn score_directions(
        &self,
        grid: &DustGrid,
        robot: Point,
        socks: &SockSet,
    ) -> Vec<Candidate> {
        let mask = ObstacleMask::new(grid, self.config.robot_radius);
        self.directions
            .iter()
            .map(|&direction| self.cast_ray(&mask, robot, socks, direction))
            .collect()
    }

    // Walk from the robot in steps of `direction` until the next point leaves the room or gets
    // too close to a wall. Socks do not stop the ray, they only cost score.
    fn cast_ray(
        &self,
        mask: &ObstacleMask,
        robot: Point,
        socks: &SockSet,
        direction: Point,
    ) -> Candidate {
        let grid = mask.grid();
        let mut endpoint = robot;
        let mut score = 0;
        loop {
            let next = endpoint.offset(direction);
            if !next.in_bounds() || mask.wall_near(next) {
                break;
            }
            score += grid.dirt(next);
            if socks.near(next, self.config.sock_radius) {
                score -= self.config.sock_penalty;
            }
            endpoint = next;
        }
        Candidate {
            direction,
            endpoint,
            score,
        }
    }

    /// Pick the next target and mark it visited.
    ///
    /// The best-scoring ray whose endpoint was not visited yet wins, the earliest direction on
    /// ties. When every endpoint was visited the target is a random unvisited point.
    pub fn select(&mut self, grid: &DustGrid, robot: Point, socks: &SockSet) -> Selection {
        let candidates = self.score_directions(grid, robot, socks);
        let best = candidates
            .iter()
            .filter(|c| !self.visited.contains(c.endpoint))
            .fold(None, |best: Option<&Candidate>, c| match best {
                Some(b) if b.score >= c.score => Some(b),
                _ => Some(c),
            })
            .copied();

        let selection = match best {
            Some(candidate) => Selection {
                target: candidate.endpoint,
                candidate: Some(candidate),
            },
            None => {
                let target = self.random_unvisited_point().unwrap_or(robot);
                debug!(
                    "all {} rays end on visited points, drawing {}",
                    candidates.len(),
                    target
                );
                Selection {
                    target,
                    candidate: None,
                }
            }
        };

        self.visited.insert(selection.target);
        debug!(
            "robot {} -> target {} (score {:?}, {} visited)",
            robot,
            selection.target,
            selection.candidate.map(|c| c.score),
            self.visited.len()
        );
        selection
    }

    pub fn select_target(&mut self, grid: &DustGrid, robot: Point, socks: &SockSet) -> Point {
        self.select(grid, robot, socks).target
    }

    // Rejection sampling. None only once every pixel of the room was visited.
    fn random_unvisited_point(&mut self) -> Option<Point> {
        if self.visited.len() >= WIDTH * HEIGHT {
            return None;
        }
        loop {
            let p = Point::new(
                self.rng.gen_range(0..WIDTH as i32),
                self.rng.gen_range(0..HEIGHT as i32),
            );
            if !self.visited.contains(p) {
                return Some(p);
            }
        }
    }
}
