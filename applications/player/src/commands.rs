//! Text controls read from stdin
//!
//! One command per line. A line holding only whitespace toggles play/pause,
//! the terminal stand-in for a space bar.

use crate::error::{PlayerError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    TogglePlay,
    Next,
    Prev,
    /// Volume level, 0.0-1.0
    Volume(f32),
    /// Seek fraction, 0.0-1.0
    Seek(f32),
    /// Playlist position, zero-based
    Select(usize),
    List,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  play | p | <space>   toggle play/pause
  next | n             next track
  prev | b             previous track
  vol <0..1>           set volume
  seek <0..1>          seek to a fraction of the track
  select <i>           play playlist entry i
  list                 show the playlist
  status               show what is playing
  help                 show this help
  quit | q             exit";

/// Parse one input line
///
/// Returns `Ok(None)` for an empty line.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(Some(Command::TogglePlay));
    };
    let argument = words.next();

    let command = match name.to_ascii_lowercase().as_str() {
        "play" | "pause" | "p" => Command::TogglePlay,
        "next" | "n" => Command::Next,
        "prev" | "b" => Command::Prev,
        "vol" | "volume" => Command::Volume(fraction("vol", argument)?),
        "seek" => Command::Seek(fraction("seek", argument)?),
        "select" | "s" => {
            let value = argument.ok_or(PlayerError::MissingArgument("select"))?;
            let index = value.parse().map_err(|_| PlayerError::InvalidArgument {
                command: "select",
                value: value.to_string(),
            })?;
            Command::Select(index)
        }
        "list" | "l" => Command::List,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ => return Err(PlayerError::UnknownCommand(name.to_string())),
    };

    Ok(Some(command))
}

fn fraction(command: &'static str, argument: Option<&str>) -> Result<f32> {
    let value = argument.ok_or(PlayerError::MissingArgument(command))?;
    value
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PlayerError::InvalidArgument {
            command,
            value: value.to_string(),
        })
}
