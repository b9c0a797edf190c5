// Command types - Input thread -> clock driver

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Start,
    Stop,
    AdjustBpm(i32),
    SetBpm(i32),
    SetBeatsPerBar(i32),
    SetSubdivisions(i32),
    NextTempoMarking,
    Quit,
}

/// Errors from parsing a typed command line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandParseError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command '{0}'")]
    Unknown(String),

    #[error("Command '{0}' needs a number")]
    MissingNumber(String),
}

impl FromStr for Command {
    type Err = CommandParseError;

    /// Parse one line typed at the interactive prompt
    ///
    /// `space`/`t` toggles, `+`/`-` nudge the tempo by 1 (`++`/`--` by 10),
    /// `bpm N`, `beats N` and `subs N` set values, `m` cycles the tempo
    /// marking and `q` quits.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            // Empty line or the space bar
            return Ok(Command::Toggle);
        };

        let number = |name: &str, value: Option<&str>| -> Result<i32, CommandParseError> {
            value
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| CommandParseError::MissingNumber(name.to_string()))
        };

        match word {
            "t" | "toggle" => Ok(Command::Toggle),
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            "+" => Ok(Command::AdjustBpm(1)),
            "-" => Ok(Command::AdjustBpm(-1)),
            "++" => Ok(Command::AdjustBpm(10)),
            "--" => Ok(Command::AdjustBpm(-10)),
            "bpm" => number(word, parts.next()).map(Command::SetBpm),
            "beats" | "b" => number(word, parts.next()).map(Command::SetBeatsPerBar),
            "subs" | "s" => number(word, parts.next()).map(Command::SetSubdivisions),
            "m" | "marking" => Ok(Command::NextTempoMarking),
            "q" | "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }
}
