use std::fmt;

use super::call::Call;
use super::direction::Direction;

/// A single button press: which floor, and which button.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Request {
    pub floor: u8,
    pub call: Call,
}

impl Request {
    pub fn new(floor: u8, call: Call) -> Self {
        Request { floor, call }
    }

    pub fn hall(floor: u8, direction: Direction) -> Self {
        Request { floor, call: direction.to_call() }
    }

    pub fn cab(floor: u8) -> Self {
        Request { floor, call: Call::Cab }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.floor, self.call)
    }
}
