pub mod modules;
pub mod utilities;

pub use modules::elevator::Elevator;
pub use utilities::config::ElevatorSettings;
pub use utilities::error::ElevatorError;
