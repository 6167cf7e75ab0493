use std::sync::Arc;
use std::thread;

use clap::Parser;
use crossbeam_channel::{select, unbounded, Receiver, Sender};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::utilities::command::Command;
use crate::utilities::config::{Args, Config};
use crate::utilities::error::RunError;

use self::debug::Debug;
use self::elevator::Elevator;
use self::recorder::Observation;

pub mod debug;
pub mod elevator;
mod fsm;
pub mod io;
pub mod recorder;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Logs every press and status change, and feeds the recorder and the
/// debug table when they are enabled. Returns when `stop_rx` disconnects.
fn observe(
    elevator: Arc<Elevator>,
    stop_rx: Receiver<()>,
    recorder_tx: Option<Sender<Observation>>,
    mut debug: Option<Debug<std::io::Stdout>>,
) {
    let press_rx = elevator.subscribe_button_presses();
    let status_rx = elevator.subscribe_status();
    let record = |observation: Observation| {
        if let Some(recorder_tx) = &recorder_tx {
            if recorder_tx.send(observation).is_err() {
                warn!("recorder stopped");
            }
        }
    };

    loop {
        select! {
            recv(press_rx) -> msg => {
                let Ok(request) = msg else { break };
                info!(%request, "button pressed");
                record(Observation::ButtonPressed(request));
            },
            recv(status_rx) -> msg => {
                let Ok(status) = msg else { break };
                info!(%status, "status");
                if let Some(debug) = debug.as_mut() {
                    if let Err(error) = debug.print_status(&status, &elevator.pending_requests()) {
                        warn!(%error, "could not draw the status table");
                    }
                }
                record(Observation::StatusUpdated(status));
            },
            recv(stop_rx) -> _ => {
                break;
            },
        }
    }
}

pub fn run() -> Result<(), RunError> {
    // READ CONFIGURATION
    let args = Args::parse();
    let config = Config::get(&args)?;
    init_logging(&config.log_level);
    match &config.source {
        Some(path) => info!(path = %path.display(), "loaded configuration"),
        None => info!("no configuration file provided, using default settings"),
    }

    // INITIALIZE THE CAR
    let num_floors = config.elevator.num_floors;
    let elevator = Arc::new(Elevator::new(config.elevator.clone())?);
    info!(status = %elevator.status(), "ready");

    // INITIALIZE THREAD FOR OBSERVATIONS
    let recorder_tx = match &config.record_path {
        Some(path) => Some(recorder::init(path)?),
        None => None,
    };
    let debug = config.debug_status.then(|| Debug::new(num_floors));
    let (stop_tx, stop_rx) = unbounded::<()>();
    let observer = {
        let elevator = Arc::clone(&elevator);
        thread::Builder::new()
            .name("observer".to_string())
            .spawn(move || observe(elevator, stop_rx, recorder_tx, debug))?
    };

    // INITIALIZE INPUT
    let line_rx = io::init()?;

    for line in line_rx.iter() {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match input.parse::<Command>() {
            Ok(Command::Quit) => {
                info!("shutting down");
                break;
            }
            Ok(command) => {
                if let Err(error) = elevator.apply(command) {
                    warn!(%error, input, "invalid operation");
                }
            }
            Err(error) => warn!(%error, input, "bad argument"),
        }
    }

    let result = elevator.close();
    drop(stop_tx);
    if observer.join().is_err() {
        error!("observer thread panicked");
    }
    result?;
    Ok(())
}
