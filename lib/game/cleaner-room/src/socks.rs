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

use crate::Point;

/// Radius within which the robot picks up a sock.
pub const SOCK_RADIUS: i32 = 24;

/// Socks lying on the floor. A collected sock is removed, not flagged.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SockSet {
    socks: Vec<Point>,
}

impl SockSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set from sock positions.
    pub fn from_points(socks: Vec<Point>) -> Self {
        Self { socks }
    }

    /// Add a sock.
    pub fn push(&mut self, sock: Point) {
        self.socks.push(sock);
    }

    /// Number of socks still on the floor.
    pub fn len(&self) -> usize {
        self.socks.len()
    }

    /// Whether every sock was collected.
    pub fn is_empty(&self) -> bool {
        self.socks.is_empty()
    }

    /// Sock positions.
    pub fn points(&self) -> &[Point] {
        &self.socks
    }

    /// Whether any sock centre lies within `radius` of `p`, edge included.
    pub fn near(&self, p: Point, radius: i32) -> bool {
        let r2 = i64::from(radius) * i64::from(radius);
        self.socks.iter().any(|sock| sock.distance_squared(p) <= r2)
    }

    /// Remove every sock within `radius` of `p`. Returns how many were picked up.
    pub fn collect(&mut self, p: Point, radius: i32) -> usize {
        let r2 = i64::from(radius) * i64::from(radius);
        let before = self.socks.len();
        self.socks.retain(|sock| sock.distance_squared(p) > r2);
        before - self.socks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_includes_the_edge() {
        let socks = SockSet::from_points(vec![Point::new(100, 100)]);
        assert!(socks.near(Point::new(124, 100), SOCK_RADIUS));
        assert!(!socks.near(Point::new(125, 100), SOCK_RADIUS));
        assert!(socks.near(Point::new(100, 76), SOCK_RADIUS));
    }

    #[test]
    fn test_collect_removes_only_close_socks() {
        let mut socks = SockSet::from_points(vec![
            Point::new(100, 100),
            Point::new(110, 110),
            Point::new(500, 500),
        ]);
        assert_eq!(socks.collect(Point::new(105, 105), SOCK_RADIUS), 2);
        assert_eq!(socks.points(), &[Point::new(500, 500)]);
        assert_eq!(socks.collect(Point::new(105, 105), SOCK_RADIUS), 0);
        assert_eq!(socks.len(), 1);
    }

    #[test]
    fn test_empty_set_is_never_near() {
        let mut socks = SockSet::new();
        assert!(socks.is_empty());
        assert!(!socks.near(Point::new(0, 0), SOCK_RADIUS));
        socks.push(Point::new(0, 0));
        assert!(socks.near(Point::new(0, 0), SOCK_RADIUS));
    }
}
