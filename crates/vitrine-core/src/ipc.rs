//! Line protocol spoken on the control socket. One command per line.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

pub const SOCKET_PATH: &str = "/tmp/vitrine.sock";

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
enum Verb {
    Show,
    Hide,
    Next,
    #[strum(to_string = "prev", serialize = "previous")]
    Prev,
    Face,
    Slide,
    Setup,
}

/// Face and slide indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Show,
    Hide,
    Next,
    Prev,
    Face(usize),
    Slide(usize),
    Setup,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command '{0}'")]
    Unknown(String),
    #[error("'{0}' needs an index")]
    MissingIndex(String),
    #[error("Invalid index '{0}': {1}")]
    InvalidIndex(String, ParseIntError),
    #[error("Unexpected argument '{0}'")]
    UnexpectedArgument(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let word = words.next().ok_or(CommandError::Empty)?;
        let verb = Verb::from_str(word).map_err(|_| CommandError::Unknown(word.to_string()))?;

        let command = match verb {
            Verb::Face | Verb::Slide => {
                let raw = words
                    .next()
                    .ok_or_else(|| CommandError::MissingIndex(verb.to_string()))?;
                let index = raw
                    .parse()
                    .map_err(|e| CommandError::InvalidIndex(raw.to_string(), e))?;
                if verb == Verb::Face {
                    Self::Face(index)
                } else {
                    Self::Slide(index)
                }
            }
            Verb::Show => Self::Show,
            Verb::Hide => Self::Hide,
            Verb::Next => Self::Next,
            Verb::Prev => Self::Prev,
            Verb::Setup => Self::Setup,
        };

        match words.next() {
            Some(extra) => Err(CommandError::UnexpectedArgument(extra.to_string())),
            None => Ok(command),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Show => write!(f, "{}", Verb::Show),
            Self::Hide => write!(f, "{}", Verb::Hide),
            Self::Next => write!(f, "{}", Verb::Next),
            Self::Prev => write!(f, "{}", Verb::Prev),
            Self::Face(i) => write!(f, "{} {}", Verb::Face, i),
            Self::Slide(i) => write!(f, "{} {}", Verb::Slide, i),
            Self::Setup => write!(f, "{}", Verb::Setup),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cases = vec![
            ("show", Command::Show),
            ("  HIDE  ", Command::Hide),
            ("next", Command::Next),
            ("prev", Command::Prev),
            ("previous", Command::Prev),
            ("face 2", Command::Face(2)),
            ("Slide 0", Command::Slide(0)),
            ("setup", Command::Setup),
        ];

        for (line, expected) in cases {
            assert_eq!(line.parse::<Command>(), Ok(expected), "parsing {line:?}");
        }
    }

    #[test]
    fn test_display_is_parseable() {
        assert_eq!(Command::Face(3).to_string(), "face 3");
        assert_eq!(Command::Prev.to_string(), "prev");
        assert_eq!("slide 7".parse::<Command>().unwrap().to_string(), "slide 7");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "spin".parse::<Command>(),
            Err(CommandError::Unknown("spin".to_string()))
        );
        assert_eq!(
            "face".parse::<Command>(),
            Err(CommandError::MissingIndex("face".to_string()))
        );
        assert!(matches!(
            "slide -1".parse::<Command>(),
            Err(CommandError::InvalidIndex(raw, _)) if raw == "-1"
        ));
        assert_eq!(
            "next 2".parse::<Command>(),
            Err(CommandError::UnexpectedArgument("2".to_string()))
        );
    }
}
