use std::str::FromStr;

use super::direction::Direction;
use super::error::CommandError;

/// One line typed at the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Call { floor: u8, direction: Direction },
    Press { floor: u8 },
    Board { weight: u32 },
    Disembark,
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        if input.is_empty() {
            return Err(CommandError::Empty);
        }
        if input.contains(['q', 'Q']) {
            return Ok(Command::Quit);
        }

        if input.starts_with('-') {
            return Ok(Command::Disembark);
        }
        if let Some(weight) = input.strip_prefix('+') {
            if weight.is_empty() {
                return Err(CommandError::MissingWeight);
            }
            return weight
                .parse()
                .map(|weight| Command::Board { weight })
                .map_err(|_| CommandError::BadWeight(weight.to_string()));
        }

        let last = input.chars().next_back().ok_or(CommandError::Empty)?;
        if !last.is_alphabetic() {
            return parse_floor(input).map(|floor| Command::Press { floor });
        }

        let direction = match last.to_ascii_uppercase() {
            'U' => Direction::Up,
            'D' => Direction::Down,
            other => return Err(CommandError::BadDirection(other)),
        };
        let floor = parse_floor(&input[..input.len() - last.len_utf8()])?;
        Ok(Command::Call { floor, direction })
    }
}

fn parse_floor(text: &str) -> Result<u8, CommandError> {
    text.trim()
        .parse()
        .map_err(|_| CommandError::BadFloor(text.to_string()))
}
