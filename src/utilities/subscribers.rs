use std::sync::{Mutex, PoisonError};

use crossbeam_channel::{unbounded, Receiver, Sender};

/// Fan-out of published values to every live subscriber.
///
/// Each subscriber gets its own unbounded channel, so publishing never
/// blocks the publisher. Subscribers that dropped their receiver are
/// forgotten on the next publish.
#[derive(Debug)]
pub struct Subscribers<T> {
    senders: Mutex<Vec<Sender<T>>>,
}

impl<T: Clone> Subscribers<T> {
    pub fn new() -> Self {
        Subscribers { senders: Mutex::new(Vec::new()) }
    }

    pub fn subscribe(&self) -> Receiver<T> {
        let (tx, rx) = unbounded();
        self.senders.lock().unwrap_or_else(PoisonError::into_inner).push(tx);
        rx
    }

    pub fn publish(&self, value: &T) {
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|tx| tx.send(value.clone()).is_ok());
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.senders.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl<T: Clone> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}
