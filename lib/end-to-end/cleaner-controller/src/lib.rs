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

//! The decision side of the cleaner: answers `reset`, `next` and `restart` with a frontier
//! planner, either called directly or through JSON text a transport can carry.

use cleaner_room::{CleanerError, Command, EpisodeSnapshot, GameOver};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use vacuum_cleaner::frontier::{FrontierPlanner, PlannerConfig};
use vacuum_cleaner::Agent;

pub mod wire;

pub use wire::{Request, Response};

/// Answers the controller gives that are not decisions.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Ask the simulator to skip per-frame pacing.
    pub fast: bool,

    /// Ask for a new episode after game over.
    pub restart: bool,
}

/// Owns the planner of the current episode. Every controller is independent, so several
/// episodes can run side by side.
pub struct RobotController {
    config: ControllerConfig,
    planner_config: PlannerConfig,
    room_seed: u64,
    planner: Option<FrontierPlanner>,
    decisions: u64,
}

impl RobotController {
    pub fn new(config: ControllerConfig, planner_config: PlannerConfig, room_seed: u64) -> Self {
        Self {
            config,
            planner_config,
            room_seed,
            planner: None,
            decisions: 0,
        }
    }

    pub fn room_seed(&self) -> u64 {
        self.room_seed
    }

    /// The planner of the current episode, if a decision or reset created one.
    pub fn planner(&self) -> Option<&FrontierPlanner> {
        self.planner.as_ref()
    }

    /// Drop all episode state and return the seed the room is generated from.
    pub fn reset(&mut self) -> u64 {
        self.planner = Some(FrontierPlanner::new(self.planner_config.clone()));
        self.decisions = 0;
        info!("controller reset, room seed {}", self.room_seed);
        self.room_seed
    }

    /// Decide where the robot goes next. A malformed snapshot is rejected before any state
    /// changes.
    pub fn next(&mut self, snapshot: &EpisodeSnapshot) -> Result<Command, CleanerError> {
        let decoded = snapshot.decode().map_err(|e| {
            warn!("rejected snapshot: {}", e);
            e
        })?;
        let planner_config = &self.planner_config;
        let planner = self
            .planner
            .get_or_insert_with(|| FrontierPlanner::new(planner_config.clone()));
        let target = planner.select_target(&decoded.grid, decoded.robot, &decoded.socks);
        self.decisions += 1;
        debug!(
            "decision {}: {} -> {}, timer {}, score {}",
            self.decisions, decoded.robot, target, decoded.timer, snapshot.score
        );
        Ok(Command {
            x: target.x,
            y: target.y,
            fast: self.config.fast,
        })
    }

    /// The episode is over. Returns whether another one should begin right away.
    pub fn restart(&mut self, game_over: &GameOver) -> bool {
        info!(
            "game over after {} decisions, score {}",
            self.decisions, game_over.score
        );
        self.config.restart
    }

    pub fn handle(&mut self, request: &Request) -> Result<Response, CleanerError> {
        match request {
            Request::Reset => Ok(Response::Seed(self.reset())),
            Request::Next(snapshot) => self.next(snapshot).map(Response::Command),
            Request::Restart(game_over) => Ok(Response::Restart(self.restart(game_over))),
        }
    }

    /// Dispatch a JSON request and encode the response. This is what a transport binds to.
    pub fn handle_json(&mut self, request: &str) -> Result<String, CleanerError> {
        let request: Request = serde_json::from_str(request)
            .map_err(|e| CleanerError::UnknownRequest(e.to_string()))?;
        let response = self.handle(&request)?;
        serde_json::to_string(&response).map_err(|e| CleanerError::Json(e.to_string()))
    }
}

impl Agent for RobotController {
    type Action = Command;
    type Percept = EpisodeSnapshot;
    type Error = CleanerError;

    fn act(&mut self, percept: &EpisodeSnapshot) -> Result<Command, CleanerError> {
        self.next(percept)
    }

    fn reset(&mut self) -> u64 {
        RobotController::reset(self)
    }

    fn restart(&mut self, final_score: u64) -> bool {
        RobotController::restart(self, &GameOver { score: final_score })
    }
}

/// Talks to a controller only through JSON text, the way a remote simulator would.
pub struct JsonAgent {
    controller: RobotController,
}

impl JsonAgent {
    pub fn new(controller: RobotController) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &RobotController {
        &self.controller
    }

    fn round_trip(&mut self, request: &Request) -> Result<Response, CleanerError> {
        let request =
            serde_json::to_string(request).map_err(|e| CleanerError::Json(e.to_string()))?;
        let response = self.controller.handle_json(&request)?;
        serde_json::from_str(&response).map_err(|e| CleanerError::Json(e.to_string()))
    }
}

impl Agent for JsonAgent {
    type Action = Command;
    type Percept = EpisodeSnapshot;
    type Error = CleanerError;

    fn act(&mut self, percept: &EpisodeSnapshot) -> Result<Command, CleanerError> {
        match self.round_trip(&Request::Next(percept.clone()))? {
            Response::Command(command) => Ok(command),
            other => Err(CleanerError::Json(format!("expected a command, got {:?}", other))),
        }
    }

    fn reset(&mut self) -> u64 {
        match self.round_trip(&Request::Reset) {
            Ok(Response::Seed(seed)) => seed,
            other => {
                warn!("reset failed ({:?}), using the configured seed", other);
                self.controller.room_seed()
            }
        }
    }

    fn restart(&mut self, final_score: u64) -> bool {
        match self.round_trip(&Request::Restart(GameOver { score: final_score })) {
            Ok(Response::Restart(restart)) => restart,
            other => {
                warn!("restart failed ({:?}), not restarting", other);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use cleaner_room::layout::RoomLayout;
    use cleaner_room::{Point, Room, RoomConfig, SockSet, Timer};
    use vacuum_cleaner::episode::{CleanerEnvironment, SimulationConfig};
    use vacuum_cleaner::Simulation;

    use super::*;

    fn controller() -> RobotController {
        RobotController::new(ControllerConfig::default(), PlannerConfig::default(), 123)
    }

    fn empty_room_snapshot(robot: Point) -> EpisodeSnapshot {
        let room = Room::new(RoomLayout::empty().paint(), SockSet::new());
        EpisodeSnapshot::capture(&room, robot, Timer::new(300, 60))
    }

    fn short_room_config() -> RoomConfig {
        RoomConfig {
            seconds: 10,
            ..RoomConfig::default()
        }
    }

    #[test]
    fn test_reset_returns_room_seed_and_fresh_planner() {
        let mut controller = controller();
        assert!(controller.planner().is_none());
        assert_eq!(controller.reset(), 123);
        controller.next(&empty_room_snapshot(Point::new(100, 200))).unwrap();
        assert_eq!(controller.planner().map(|p| p.visited().len()), Some(1));

        controller.reset();
        assert_eq!(controller.planner().map(|p| p.visited().len()), Some(0));
    }

    #[test]
    fn test_next_in_empty_room_heads_for_the_far_wall() {
        let mut controller = controller();
        let command = controller.next(&empty_room_snapshot(Point::new(100, 200))).unwrap();
        assert_eq!(
            command,
            Command {
                x: 1244,
                y: 200,
                fast: false
            }
        );
    }

    #[test]
    fn test_rejected_snapshot_changes_nothing() {
        let mut controller = controller();
        controller.reset();
        let mut snapshot = empty_room_snapshot(Point::new(100, 200));
        snapshot.dust.truncate(1000);
        assert!(matches!(
            controller.next(&snapshot),
            Err(CleanerError::DustLength { .. })
        ));

        let mut snapshot = empty_room_snapshot(Point::new(100, 200));
        snapshot.robot = Point::new(100, 800);
        assert!(matches!(
            controller.next(&snapshot),
            Err(CleanerError::OutOfBounds { what: "robot", .. })
        ));
        assert_eq!(controller.planner().map(|p| p.visited().len()), Some(0));
    }

    #[test]
    fn test_restart_answers_from_config() {
        let mut controller = controller();
        assert!(!controller.restart(&GameOver { score: 10 }));
        let mut eager = RobotController::new(
            ControllerConfig {
                fast: true,
                restart: true,
            },
            PlannerConfig::default(),
            1,
        );
        assert!(eager.restart(&GameOver { score: 10 }));
        let command = eager.next(&empty_room_snapshot(Point::new(100, 200))).unwrap();
        assert!(command.fast);
    }

    #[test]
    fn test_handle_json() {
        let mut controller = controller();
        assert_eq!(controller.handle_json(r#"{"type":"reset"}"#).unwrap(), "123");
        assert_eq!(
            controller
                .handle_json(r#"{"type":"restart","score":77}"#)
                .unwrap(),
            "false"
        );
        assert_eq!(
            controller
                .handle_json(r#"{"type":"restart","score":"77"}"#)
                .unwrap(),
            "false"
        );
        assert!(matches!(
            controller.handle_json(r#"{"type":"launch"}"#),
            Err(CleanerError::UnknownRequest(_))
        ));

        let next = serde_json::to_string(&Request::Next(empty_room_snapshot(Point::new(100, 200))))
            .unwrap();
        assert_eq!(
            controller.handle_json(&next).unwrap(),
            r#"{"x":1244,"y":200,"fast":false}"#
        );
    }

    #[test]
    fn test_full_episode_cleans_the_room() {
        let environment = CleanerEnvironment::new(short_room_config(), SimulationConfig::default());
        let initial = Room::from_config(&short_room_config(), 123).score();
        let mut simulation = Simulation::new(environment, controller(), 10_000);

        let report = simulation.run();
        assert!(report.terminated);
        assert!(!report.restart);
        assert_eq!(report.failed_cycles, 0);
        assert!(report.cycles > 1);
        assert!(report.score > initial);
        assert!(!simulation.environment().timer().is_running());
    }

    #[test]
    fn test_json_transport_matches_direct_calls() {
        let direct = Simulation::new(
            CleanerEnvironment::new(short_room_config(), SimulationConfig::default()),
            controller(),
            10_000,
        )
        .run();
        let over_json = Simulation::new(
            CleanerEnvironment::new(short_room_config(), SimulationConfig::default()),
            JsonAgent::new(controller()),
            10_000,
        )
        .run();
        assert_eq!(direct, over_json);
    }
}
