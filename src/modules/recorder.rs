/// ----- RECORDER MODULE -----
/// Appends everything the car reports to a file, one JSON object per
/// line, so a run can be replayed or inspected afterwards.

use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::Path;
use std::thread;

use crossbeam_channel::{unbounded, Sender};
use tracing::error;

use crate::utilities::elevator_status::ElevatorStatus;
use crate::utilities::request::Request;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observation {
    ButtonPressed(Request),
    StatusUpdated(ElevatorStatus),
}

pub struct Recorder<W: Write> {
    writer: W,
}

impl<W: Write> Recorder<W> {
    pub fn new(writer: W) -> Self {
        Recorder { writer }
    }

    pub fn record(&mut self, observation: &Observation) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, observation)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

/// Opens `path` for appending and records on a background thread until
/// the returned sender is dropped.
pub fn init(path: &Path) -> io::Result<Sender<Observation>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut recorder: Recorder<LineWriter<File>> = Recorder::new(LineWriter::new(file));

    let (observation_tx, observation_rx) = unbounded::<Observation>();
    thread::Builder::new().name("recorder".to_string()).spawn(move || {
        for observation in observation_rx.iter() {
            if let Err(error) = recorder.record(&observation) {
                error!(%error, "could not record observation");
                break;
            }
        }
    })?;
    Ok(observation_tx)
}
