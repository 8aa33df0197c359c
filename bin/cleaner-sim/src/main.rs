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

//! Run cleaner episodes headless and print their scores.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use cleaner_controller::{ControllerConfig, JsonAgent, RobotController};
use cleaner_room::{Command, EpisodeSnapshot, RoomConfig, RoomLayout};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use vacuum_cleaner::episode::{CleanerEnvironment, SimulationConfig};
use vacuum_cleaner::frontier::PlannerConfig;
use vacuum_cleaner::{Agent, Simulation, SimulationReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Layout {
    /// Border walls only.
    Empty,
    /// Border plus furniture.
    Furnished,
}

#[derive(Parser, Debug)]
#[command(name = "cleaner-sim")]
#[command(about = "Simulate a cleaning robot sweeping a room and picking up socks", long_about = None)]
struct Args {
    /// TOML file with [room], [planner], [controller] and [simulation] tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Independent episodes, run in parallel
    #[arg(long, default_value_t = 1)]
    episodes: u64,

    /// Room seed of the first episode, the others count up from it
    #[arg(long)]
    seed: Option<u64>,

    /// Direction rings the planner casts rays along
    #[arg(long)]
    rings: Option<u32>,

    /// Skip per-frame pacing
    #[arg(long)]
    fast: bool,

    /// Send every request through its JSON form
    #[arg(long)]
    wire: bool,

    /// Milliseconds per movement step
    #[arg(long)]
    frame_ms: Option<u64>,

    /// Stop an episode after this many decisions
    #[arg(long)]
    max_cycles: Option<u64>,

    #[arg(long, value_enum)]
    layout: Option<Layout>,

    /// Episodes played back to back when the controller asks to restart
    #[arg(long, default_value_t = 0)]
    max_restarts: u32,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct Config {
    room: RoomConfig,
    planner: PlannerConfig,
    controller: ControllerConfig,
    simulation: SimulationConfig,
}

fn load_config(args: &Args) -> Config {
    let config = match &args.config {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(contents) => match basic_toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("failed to parse config {}: {}", path.display(), e);
                    Config::default()
                }
            },
            Err(e) => {
                log::warn!("failed to read config {}: {}", path.display(), e);
                Config::default()
            }
        },
        None => Config::default(),
    };
    apply_overrides(config, args)
}

fn apply_overrides(mut config: Config, args: &Args) -> Config {
    if let Some(seed) = args.seed {
        config.room.seed = seed;
    }
    if let Some(rings) = args.rings {
        config.planner.rings = rings;
    }
    if args.fast {
        config.controller.fast = true;
    }
    if args.max_restarts > 0 {
        config.controller.restart = true;
    }
    if let Some(frame_ms) = args.frame_ms {
        config.simulation.frame_millis = Some(frame_ms);
    }
    if let Some(max_cycles) = args.max_cycles {
        config.simulation.max_cycles = max_cycles;
    }
    match args.layout {
        Some(Layout::Empty) => config.room.layout = RoomLayout::empty(),
        Some(Layout::Furnished) => config.room.layout = RoomLayout::default(),
        None => {}
    }
    config
}

/// Play until the controller no longer asks for a restart, or the restart budget is spent.
fn play<_Agent>(
    environment: CleanerEnvironment,
    agent: _Agent,
    max_cycles: u64,
    max_restarts: u32,
) -> Vec<SimulationReport<u64>>
where
    _Agent: Agent<Action = Command, Percept = EpisodeSnapshot>,
{
    let mut simulation = Simulation::new(environment, agent, max_cycles);
    let mut reports = vec![simulation.run()];
    while reports.len() <= max_restarts as usize && reports.iter().all(|r| r.restart) {
        reports.push(simulation.run());
    }
    reports
}

// Seeds count up from the first one and wrap around at the top.
fn episode_seed(first: u64, episode: u64) -> u64 {
    first.wrapping_add(episode)
}

fn run_episode(
    config: &Config,
    seed: u64,
    wire: bool,
    max_restarts: u32,
) -> Vec<SimulationReport<u64>> {
    let environment = CleanerEnvironment::new(config.room.clone(), config.simulation.clone());
    let controller = RobotController::new(config.controller.clone(), config.planner.clone(), seed);
    let max_cycles = config.simulation.max_cycles;
    if wire {
        play(environment, JsonAgent::new(controller), max_cycles, max_restarts)
    } else {
        play(environment, controller, max_cycles, max_restarts)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let args = Args::parse();
    let config = load_config(&args);
    log::info!(
        "running {} episode(s), first seed {}, {} rings",
        args.episodes,
        config.room.seed,
        config.planner.rings
    );

    let results: Vec<(u64, Vec<SimulationReport<u64>>)> = (0..args.episodes)
        .into_par_iter()
        .map(|i| {
            let seed = episode_seed(config.room.seed, i);
            (seed, run_episode(&config, seed, args.wire, args.max_restarts))
        })
        .collect();

    let mut total = 0;
    let mut games = 0;
    for (seed, reports) in &results {
        for (round, report) in reports.iter().enumerate() {
            println!(
                "seed {} round {}: score {} after {} decisions ({} failed)",
                seed, round, report.score, report.cycles, report.failed_cycles
            );
            total += report.score;
            games += 1;
        }
    }
    if games > 0 {
        println!("average score: {:.1}", total as f64 / games as f64);
    }
}
