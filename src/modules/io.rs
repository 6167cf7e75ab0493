/// ----- I/O MODULE -----
/// This module reads console input on its own thread and hands every
/// line to the rest of the program through a channel. The channel
/// disconnects when the input ends.

use std::io::{self, BufRead, BufReader};
use std::thread;

use crossbeam_channel::{unbounded, Receiver};
use tracing::warn;

pub fn init() -> io::Result<Receiver<String>> {
    spawn_reader(BufReader::new(io::stdin()))
}

pub fn spawn_reader<R: BufRead + Send + 'static>(reader: R) -> io::Result<Receiver<String>> {
    let (line_tx, line_rx) = unbounded();
    thread::Builder::new().name("input".to_string()).spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    warn!(%error, "could not read input");
                    break;
                }
            }
        }
    })?;
    Ok(line_rx)
}
