use std::fmt;

use super::direction::Direction;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Moving,
    Stopped,
}

impl Motion {
    pub fn as_string(self) -> String {
        match self {
            Motion::Moving => String::from("moving"),
            Motion::Stopped => String::from("stopped"),
        }
    }
}

/// Why the status was last replaced.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevatorEvent {
    GetOn,
    GotOff,
    ChangeDirections,
    Idling,
    WaitOnFloor,
    StartMovingToFloor,
    FinishedMovingToFloor,
    Blocked,
}

impl ElevatorEvent {
    pub fn as_string(self) -> String {
        match self {
            ElevatorEvent::GetOn => String::from("getOn"),
            ElevatorEvent::GotOff => String::from("gotOff"),
            ElevatorEvent::ChangeDirections => String::from("changeDirections"),
            ElevatorEvent::Idling => String::from("idling"),
            ElevatorEvent::WaitOnFloor => String::from("waitOnFloor"),
            ElevatorEvent::StartMovingToFloor => String::from("startMoving"),
            ElevatorEvent::FinishedMovingToFloor => String::from("finishedMoving"),
            ElevatorEvent::Blocked => String::from("blocked"),
        }
    }
}

/// Sensor snapshot of the car. Never edited in place: every transition
/// publishes a new value.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElevatorStatus {
    pub direction: Direction,
    pub motion: Motion,
    pub event: ElevatorEvent,
    pub current_floor: u8,
    pub next_floor: u8,
    pub current_weight: u32,
    pub max_weight: u32,
}

impl ElevatorStatus {
    pub fn new(max_weight: u32) -> Self {
        ElevatorStatus {
            direction: Direction::Up,
            motion: Motion::Stopped,
            event: ElevatorEvent::Idling,
            current_floor: 1,
            next_floor: 1,
            current_weight: 0,
            max_weight,
        }
    }

    pub fn weight_limit_reached(&self) -> bool {
        self.current_weight >= self.max_weight
    }

    pub fn is_stopped(&self) -> bool {
        self.motion == Motion::Stopped
    }

    /// Same position and motion, new occupant weight.
    pub fn with_weight(&self, current_weight: u32, event: ElevatorEvent) -> Self {
        ElevatorStatus { current_weight, event, ..*self }
    }
}

impl fmt::Display for ElevatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} floor {}->{} {} {} {}/{}",
            self.event.as_string(),
            self.current_floor,
            self.next_floor,
            self.motion.as_string(),
            self.direction.as_string(),
            self.current_weight,
            self.max_weight,
        )
    }
}
