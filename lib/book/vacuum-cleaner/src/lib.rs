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

// PEAS - Performance, Environment, Action, Sensing
//
// See:
// -  Chapter 2: Intelligent Agents, page 40
//
// The environment here is a room full of dust, the agent a planner that picks where the robot
// drives next, and the simulation the loop that ties the two together until the timer runs out.

use log::{info, warn};

pub mod episode;
pub mod frontier;
pub mod movement;

/// An Agent acts in a Performance, Environment, Action, Sensing (PEAS) cycle.
/// For a given Perception, the Agent will return an Action, or an error when the decision could
/// not be made (e.g. the percept was rejected or the link to the decision side failed).
///
/// Notice that the Agent is not aware of an Environment, it's only interface
/// is the Perception coming in then the Action going out.
pub trait Agent {
    type Action;
    type Percept;
    type Error: std::fmt::Display;

    fn act(&mut self, percept: &Self::Percept) -> Result<Self::Action, Self::Error>;

    /// Forget everything about the previous episode. Returns the seed the Environment uses to
    /// set up the next one.
    fn reset(&mut self) -> u64;

    /// The episode ended with `final_score`. Returns whether another episode should start.
    fn restart(&mut self, final_score: u64) -> bool;
}

/// An Environment runs a single Agent in a Performance, Environment, Action, Sensing (PEAS) cycle.
///
/// Notice that the Environment is not aware of an Agent.
pub trait Environment {
    type Action;
    type Percept;
    type Score: num_traits::Unsigned + Copy + Into<u64> + std::fmt::Display;

    /// Start a fresh episode from `seed`.
    fn reset(&mut self, seed: u64);

    fn percept(&self) -> Self::Percept;
    fn execute_action(&mut self, action: &Self::Action);

    /// Returns the score of the Environment. This is not cumulative or stateful. This is the score
    /// of the Environment at the current state.
    fn score(&self) -> Self::Score;

    /// Whether the episode is over.
    fn is_terminal(&self) -> bool;
}

/// Outcome of one [`Simulation::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationReport<_Score> {
    /// Score when the run stopped.
    pub score: _Score,

    /// Decision cycles, failed ones included.
    pub cycles: u64,

    /// Cycles where the agent returned an error and the robot stayed put.
    pub failed_cycles: u64,

    /// Whether the environment reached its end, as opposed to hitting the cycle limit.
    pub terminated: bool,

    /// Whether the agent asked for another episode.
    pub restart: bool,
}

/// A Simulation runs a single Agent through one episode of Performance, Environment, Action,
/// Sensing (PEAS) cycles, until the Environment is terminal or `max_cycles` decisions were made.
///
/// The Simulation is aware of both the Environment and the single Agent. Notice that the Agent's
/// generic Action and Percept come from the Environment. The Agent still does not need to know that
/// the Environment exists, but the Agent definitely needs the Environment's Action and Percept
/// types.
pub struct Simulation<_Environment, _Agent>
where
    _Environment: Environment,
    _Agent: Agent<Action = _Environment::Action, Percept = _Environment::Percept>,
{
    environment: _Environment,
    agent: _Agent,
    max_cycles: u64,
}

impl<_Environment, _Agent> Simulation<_Environment, _Agent>
where
    _Environment: Environment,
    _Agent: Agent<Action = _Environment::Action, Percept = _Environment::Percept>,
{
    pub fn new(environment: _Environment, agent: _Agent, max_cycles: u64) -> Self {
        Self {
            environment,
            agent,
            max_cycles,
        }
    }

    pub fn run(&mut self) -> SimulationReport<_Environment::Score> {
        let seed = self.agent.reset();
        self.environment.reset(seed);

        let mut cycles = 0;
        let mut failed_cycles = 0;
        while !self.environment.is_terminal() && cycles < self.max_cycles {
            let percept = self.environment.percept();
            match self.agent.act(&percept) {
                Ok(action) => self.environment.execute_action(&action),
                Err(e) => {
                    failed_cycles += 1;
                    warn!("cycle {} failed, robot stays put: {}", cycles, e);
                }
            }
            cycles += 1;
        }

        let score = self.environment.score();
        let terminated = self.environment.is_terminal();
        let restart = terminated && self.agent.restart(score.into());
        info!(
            "simulation stopped after {} cycles ({} failed), score: {}",
            cycles, failed_cycles, score
        );
        SimulationReport {
            score,
            cycles,
            failed_cycles,
            terminated,
            restart,
        }
    }

    pub fn environment(&self) -> &_Environment {
        &self.environment
    }

    pub fn agent(&self) -> &_Agent {
        &self.agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Counts down one unit per action; the action says how much score to add.
    struct CountdownEnvironment {
        left: u64,
        score: u64,
        seed: Option<u64>,
    }

    impl Environment for CountdownEnvironment {
        type Action = u64;
        type Percept = u64;
        type Score = u64;

        fn reset(&mut self, seed: u64) {
            self.seed = Some(seed);
            self.left = 3;
            self.score = 0;
        }

        fn percept(&self) -> u64 {
            self.left
        }

        fn execute_action(&mut self, action: &u64) {
            self.left -= 1;
            self.score += action;
        }

        fn score(&self) -> u64 {
            self.score
        }

        fn is_terminal(&self) -> bool {
            self.left == 0
        }
    }

    // Fails every other cycle.
    struct FlakyAgent {
        calls: u64,
        final_score: Option<u64>,
    }

    impl Agent for FlakyAgent {
        type Action = u64;
        type Percept = u64;
        type Error = String;

        fn act(&mut self, percept: &u64) -> Result<u64, String> {
            self.calls += 1;
            if self.calls % 2 == 0 {
                Err("link down".to_string())
            } else {
                Ok(*percept * 10)
            }
        }

        fn reset(&mut self) -> u64 {
            42
        }

        fn restart(&mut self, final_score: u64) -> bool {
            self.final_score = Some(final_score);
            true
        }
    }

    fn simulation(max_cycles: u64) -> Simulation<CountdownEnvironment, FlakyAgent> {
        let environment = CountdownEnvironment {
            left: 0,
            score: 0,
            seed: None,
        };
        let agent = FlakyAgent {
            calls: 0,
            final_score: None,
        };
        Simulation::new(environment, agent, max_cycles)
    }

    #[test]
    fn test_failed_cycles_leave_environment_untouched() {
        let mut simulation = simulation(100);
        let report = simulation.run();

        // actions at left = 3, 2, 1; failures in between
        assert_eq!(report.score, 60);
        assert_eq!(report.cycles, 5);
        assert_eq!(report.failed_cycles, 2);
        assert!(report.terminated);
        assert!(report.restart);
        assert_eq!(simulation.environment().seed, Some(42));
        assert_eq!(simulation.agent().final_score, Some(60));
    }

    #[test]
    fn test_cycle_limit_stops_without_restart() {
        let mut simulation = simulation(2);
        let report = simulation.run();
        assert_eq!(report.cycles, 2);
        assert!(!report.terminated);
        assert!(!report.restart);
        assert_eq!(simulation.agent().final_score, None);
    }
}
