use super::call::Call;

/// Travel direction of the car. A stopped car still remembers which way it
/// is scanning, so there is no `Stop` variant.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Down,
    Up,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
        }
    }

    /// The hall button a passenger travelling this way presses.
    pub fn to_call(self) -> Call {
        match self {
            Direction::Up => Call::HallUp,
            Direction::Down => Call::HallDown,
        }
    }

    /// True if `target` lies strictly beyond `floor` when moving this way.
    pub fn is_ahead(self, floor: u8, target: u8) -> bool {
        match self {
            Direction::Up => target > floor,
            Direction::Down => target < floor,
        }
    }

    pub fn next_floor(self, floor: u8) -> u8 {
        match self {
            Direction::Up => floor.saturating_add(1),
            Direction::Down => floor.saturating_sub(1),
        }
    }

    pub fn as_string(self) -> String {
        match self {
            Direction::Down => String::from("down"),
            Direction::Up => String::from("up"),
        }
    }
}
