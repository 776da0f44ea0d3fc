//! Line-oriented command grammar read from stdin and fix files.

use geocache_core::{CacheAction, Cell, Command, Direction, LatLng, SensorFailureReason};
use geocache_system_sensor::SensorEvent;
use thiserror::Error;

/// One parsed input line.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ScriptCommand {
    /// Forwarded to the world as-is.
    World(Command),
    /// Injected through the position source.
    Sensor(SensorEvent),
    /// Lists materialized caches.
    Caches,
    /// Prints the status panel.
    Status,
    /// Starts a fresh game.
    Restart,
    /// Ends the session.
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum ScriptError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{command}` expects {expected}")]
    Arity {
        command: &'static str,
        expected: &'static str,
    },
    #[error("`{0}` is not a number")]
    Number(String),
}

/// Parses a stdin line; blank lines and `#` comments yield `None`.
pub(crate) fn parse_line(line: &str) -> Result<Option<ScriptCommand>, ScriptError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    if head.starts_with('#') {
        return Ok(None);
    }
    let rest: Vec<&str> = words.collect();

    let command = match head {
        "n" | "north" => move_command(Direction::North, &rest)?,
        "s" | "south" => move_command(Direction::South, &rest)?,
        "e" | "east" => move_command(Direction::East, &rest)?,
        "w" | "west" => move_command(Direction::West, &rest)?,
        "fix" => ScriptCommand::Sensor(SensorEvent::Fix(position("fix", &rest)?)),
        "fail" => ScriptCommand::Sensor(SensorEvent::Failure(failure(&rest)?)),
        "look" => ScriptCommand::World(Command::InspectCache {
            cell: cell("look", &rest)?,
        }),
        "take" => interact("take", CacheAction::Take, &rest)?,
        "place" => interact("place", CacheAction::Place, &rest)?,
        "destroy" => interact("destroy", CacheAction::Destroy, &rest)?,
        "caches" => bare("caches", ScriptCommand::Caches, &rest)?,
        "status" => bare("status", ScriptCommand::Status, &rest)?,
        "restart" => bare("restart", ScriptCommand::Restart, &rest)?,
        "quit" | "exit" => bare("quit", ScriptCommand::Quit, &rest)?,
        other => return Err(ScriptError::Unknown(other.to_owned())),
    };
    Ok(Some(command))
}

/// Parses a fix file line: `LAT LNG` or `fail REASON`.
pub(crate) fn parse_fix_line(line: &str) -> Result<Option<SensorEvent>, ScriptError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => Ok(None),
        [first, ..] if first.starts_with('#') => Ok(None),
        ["fail", rest @ ..] => failure(rest).map(|reason| Some(SensorEvent::Failure(reason))),
        coordinates => position("fix", coordinates).map(|fix| Some(SensorEvent::Fix(fix))),
    }
}

fn bare(
    command: &'static str,
    parsed: ScriptCommand,
    rest: &[&str],
) -> Result<ScriptCommand, ScriptError> {
    if rest.is_empty() {
        Ok(parsed)
    } else {
        Err(ScriptError::Arity {
            command,
            expected: "no arguments",
        })
    }
}

fn move_command(direction: Direction, rest: &[&str]) -> Result<ScriptCommand, ScriptError> {
    bare(
        "move",
        ScriptCommand::World(Command::Move { direction }),
        rest,
    )
}

fn interact(
    command: &'static str,
    action: CacheAction,
    rest: &[&str],
) -> Result<ScriptCommand, ScriptError> {
    Ok(ScriptCommand::World(Command::Interact {
        cell: cell(command, rest)?,
        action,
    }))
}

fn cell(command: &'static str, rest: &[&str]) -> Result<Cell, ScriptError> {
    match rest {
        [i, j] => Ok(Cell::new(number(i)?, number(j)?)),
        _ => Err(ScriptError::Arity {
            command,
            expected: "two cell indices `I J`",
        }),
    }
}

fn position(command: &'static str, rest: &[&str]) -> Result<LatLng, ScriptError> {
    match rest {
        [lat, lng] => Ok(LatLng::new(number(lat)?, number(lng)?)),
        _ => Err(ScriptError::Arity {
            command,
            expected: "a position `LAT LNG`",
        }),
    }
}

fn failure(rest: &[&str]) -> Result<SensorFailureReason, ScriptError> {
    match rest {
        [] => Err(ScriptError::Arity {
            command: "fail",
            expected: "a reason",
        }),
        ["denied"] => Ok(SensorFailureReason::PermissionDenied),
        ["unavailable"] => Ok(SensorFailureReason::PositionUnavailable),
        ["timeout"] => Ok(SensorFailureReason::Timeout),
        words => Ok(SensorFailureReason::Other {
            message: words.join(" "),
        }),
    }
}

fn number<T: std::str::FromStr>(word: &str) -> Result<T, ScriptError> {
    word.parse()
        .map_err(|_| ScriptError::Number(word.to_owned()))
}
