use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use super::error::{ConfigError, ElevatorError};

const CONFIG_FILE: &str = "config.json";
const FALLBACK_CONFIG_FILE: &str = "_config.json";

const FLOORS_VAR: &str = "ELEVATOR_FLOORS";
const MAX_WEIGHT_VAR: &str = "ELEVATOR_MAX_WEIGHT";

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "elevator", about = "Single-car elevator controller driven by text commands on stdin")]
pub struct Args {
    /// Config file; defaults to config.json, then _config.json.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub floors: Option<u8>,
    #[arg(long)]
    pub max_weight: Option<u32>,
    /// Append every observation as a JSON line to this file.
    #[arg(long)]
    pub record: Option<PathBuf>,
    /// Redraw a status table on stdout after every state change.
    #[arg(long)]
    pub debug_status: bool,
}

/// Simulated durations, in milliseconds.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Timing {
    pub travel_ms: u64,
    pub door_ms: u64,
    pub idle_cooldown_ms: u64,
    pub blocked_pause_ms: u64,
    pub drain_poll_ms: u64,
    pub drain_settle_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            travel_ms: 3000,
            door_ms: 1000,
            idle_cooldown_ms: 3000,
            blocked_pause_ms: 5000,
            drain_poll_ms: 1000,
            drain_settle_ms: 5000,
        }
    }
}

impl Timing {
    pub fn travel(&self) -> Duration {
        Duration::from_millis(self.travel_ms)
    }

    pub fn door(&self) -> Duration {
        Duration::from_millis(self.door_ms)
    }

    pub fn idle_cooldown(&self) -> Duration {
        Duration::from_millis(self.idle_cooldown_ms)
    }

    pub fn blocked_pause(&self) -> Duration {
        Duration::from_millis(self.blocked_pause_ms)
    }

    pub fn drain_poll(&self) -> Duration {
        Duration::from_millis(self.drain_poll_ms)
    }

    pub fn drain_settle(&self) -> Duration {
        Duration::from_millis(self.drain_settle_ms)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ElevatorSettings {
    pub num_floors: u8,
    pub max_weight: u32,
    pub timing: Timing,
}

impl Default for ElevatorSettings {
    fn default() -> Self {
        ElevatorSettings {
            num_floors: 10,
            max_weight: 1000,
            timing: Timing::default(),
        }
    }
}

impl ElevatorSettings {
    pub fn new(max_weight: u32, num_floors: u8) -> Self {
        ElevatorSettings { num_floors, max_weight, ..Default::default() }
    }

    pub fn validate(&self) -> Result<(), ElevatorError> {
        if self.num_floors == 0 {
            return Err(ElevatorError::InvalidSettings(String::from("num_floors must be at least 1")));
        }
        Ok(())
    }
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub elevator: ElevatorSettings,
    pub log_level: String,
    pub record_path: Option<PathBuf>,
    pub debug_status: bool,
    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            elevator: ElevatorSettings::default(),
            log_level: String::from("info"),
            record_path: None,
            debug_status: false,
            source: None,
        }
    }
}

impl Config {
    /// File, then environment, then command line; later sources win.
    pub fn get(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::read(path)?,
            None => Self::read_default()?,
        };
        config.apply_env(|name| env::var(name).ok())?;
        config.apply_args(args);
        Ok(config)
    }

    fn read_default() -> Result<Self, ConfigError> {
        for file_path in [CONFIG_FILE, FALLBACK_CONFIG_FILE] {
            let path = Path::new(file_path);
            if path.exists() {
                return Self::read(path);
            }
        }
        Ok(Self::default())
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(value) = lookup(FLOORS_VAR) {
            self.elevator.num_floors = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Env { name: FLOORS_VAR, value })?;
        }
        if let Some(value) = lookup(MAX_WEIGHT_VAR) {
            self.elevator.max_weight = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Env { name: MAX_WEIGHT_VAR, value })?;
        }
        Ok(())
    }

    fn apply_args(&mut self, args: &Args) {
        if let Some(floors) = args.floors {
            self.elevator.num_floors = floors;
        }
        if let Some(max_weight) = args.max_weight {
            self.elevator.max_weight = max_weight;
        }
        if let Some(record) = &args.record {
            self.record_path = Some(record.clone());
        }
        if args.debug_status {
            self.debug_status = true;
        }
    }
}
