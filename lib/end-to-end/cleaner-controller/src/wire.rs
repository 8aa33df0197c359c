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

//! Request and response shapes a transport carries between the simulator and the controller.

use cleaner_room::{Command, EpisodeSnapshot, GameOver};
use serde::{Deserialize, Serialize};

/// A request, tagged by `type`:
///
/// - `{"type":"reset"}`
/// - `{"type":"next","timer":{..},"score":..,"dust":"..","robot":{..},"socks":[..]}`
/// - `{"type":"restart","score":..}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Request {
    Reset,
    Next(EpisodeSnapshot),
    Restart(GameOver),
}

/// A response: the room seed, the next command, or whether to restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Seed(u64),
    Command(Command),
    Restart(bool),
}

#[cfg(test)]
mod tests {
    use cleaner_room::{Point, Timer};

    use super::*;

    #[test]
    fn test_request_tags() {
        assert_eq!(
            serde_json::to_string(&Request::Reset).unwrap(),
            r#"{"type":"reset"}"#
        );
        assert_eq!(
            serde_json::to_string(&Request::Restart(GameOver { score: 9 })).unwrap(),
            r#"{"type":"restart","score":9}"#
        );
        let next: Request = serde_json::from_str(
            r#"{"type":"next","timer":{"timeout":5.0,"dt":1.0},"score":0,"dust":"","robot":{"x":1,"y":2},"socks":[]}"#,
        )
        .unwrap();
        assert_eq!(
            next,
            Request::Next(EpisodeSnapshot {
                timer: Timer::from_frames(5.0),
                score: 0,
                dust: String::new(),
                robot: Point::new(1, 2),
                socks: vec![],
            })
        );
    }

    #[test]
    fn test_untagged_responses() {
        assert_eq!(serde_json::to_string(&Response::Seed(123)).unwrap(), "123");
        assert_eq!(serde_json::to_string(&Response::Restart(false)).unwrap(), "false");
        let command: Response = serde_json::from_str(r#"{"x":3,"y":4,"fast":false}"#).unwrap();
        assert_eq!(
            command,
            Response::Command(Command {
                x: 3,
                y: 4,
                fast: false
            })
        );
        assert_eq!(serde_json::from_str::<Response>("true").unwrap(), Response::Restart(true));
    }
}
