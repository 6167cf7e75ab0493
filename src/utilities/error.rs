use std::io;

use thiserror::Error;

/// Operations the car refuses. Everything except `Spawn` is raised before
/// any state is touched.
#[derive(Debug, Error)]
pub enum ElevatorError {
    #[error("floor must be greater than 0")]
    FloorBelowBottom,
    #[error("floor {floor} is above the top floor {num_floors}")]
    FloorAboveTop { floor: u8, num_floors: u8 },
    #[error("cannot go down from the first floor")]
    DownFromBottom,
    #[error("cannot go up from the top floor")]
    UpFromTop,
    #[error("cannot board or leave while the car is moving")]
    Moving,
    #[error("the elevator has been shut down")]
    Disposed,
    #[error("invalid elevator settings: {0}")]
    InvalidSettings(String),
    #[error("could not start the elevator worker")]
    Spawn(#[from] io::Error),
}

/// Malformed text commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("bad input: empty command")]
    Empty,
    #[error("must provide a weight")]
    MissingWeight,
    #[error("bad weight `{0}`")]
    BadWeight(String),
    #[error("bad floor `{0}`")]
    BadFloor(String),
    #[error("bad direction `{0}`")]
    BadDirection(char),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("could not parse config file {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("bad value `{value}` for {name}")]
    Env { name: &'static str, value: String },
}

/// Everything that can end the binary.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Elevator(#[from] ElevatorError),
    #[error(transparent)]
    Io(#[from] io::Error),
}
