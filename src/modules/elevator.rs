use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, error, info};

use crate::modules::fsm;
use crate::utilities::call::Call;
use crate::utilities::command::Command;
use crate::utilities::config::ElevatorSettings;
use crate::utilities::direction::Direction;
use crate::utilities::elevator_status::{ElevatorEvent, ElevatorStatus, Motion};
use crate::utilities::error::ElevatorError;
use crate::utilities::request::Request;
use crate::utilities::requests::Requests;
use crate::utilities::subscribers::Subscribers;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State shared between the public handle and the worker thread.
///
/// Lock order: `status`, then `deferred` or `occupants`, then the
/// subscriber lists. Status observations are published while the status
/// write lock is held, so every subscriber sees transitions in order.
pub(crate) struct Shared {
    pub settings: ElevatorSettings,
    pub requests: Requests,
    status: RwLock<ElevatorStatus>,
    /// Presses for the floor the car is travelling to, keyed by floor.
    deferred: Mutex<BTreeMap<u8, Vec<Request>>>,
    occupants: Mutex<Vec<u32>>,
    presses: Subscribers<Request>,
    statuses: Subscribers<ElevatorStatus>,
    wake_tx: Sender<()>,
    disposed: AtomicBool,
}

impl Shared {
    fn new(settings: ElevatorSettings, wake_tx: Sender<()>) -> Self {
        Shared {
            requests: Requests::new(settings.num_floors),
            status: RwLock::new(ElevatorStatus::new(settings.max_weight)),
            deferred: Mutex::new(BTreeMap::new()),
            occupants: Mutex::new(Vec::new()),
            presses: Subscribers::new(),
            statuses: Subscribers::new(),
            wake_tx,
            disposed: AtomicBool::new(false),
            settings,
        }
    }

    fn read_status(&self) -> RwLockReadGuard<'_, ElevatorStatus> {
        self.status.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_status(&self) -> RwLockWriteGuard<'_, ElevatorStatus> {
        self.status.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> ElevatorStatus {
        *self.read_status()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Replaces the car position and motion; occupant weight is carried over.
    pub fn update(&self, current_floor: u8, next_floor: u8, direction: Direction, motion: Motion, event: ElevatorEvent) {
        let mut status = self.write_status();
        *status = ElevatorStatus {
            direction,
            motion,
            event,
            current_floor,
            next_floor,
            ..*status
        };
        debug!(status = %*status, "status updated");
        self.statuses.publish(&status);
    }

    fn wake(&self) {
        // Fails only once the worker is gone.
        let _ = self.wake_tx.send(());
    }

    fn validate(&self, floor: u8, call: Call) -> Result<(), ElevatorError> {
        let num_floors = self.settings.num_floors;
        if floor < 1 {
            return Err(ElevatorError::FloorBelowBottom);
        }
        if floor == 1 && call == Call::HallDown {
            return Err(ElevatorError::DownFromBottom);
        }
        if floor > num_floors {
            return Err(ElevatorError::FloorAboveTop { floor, num_floors });
        }
        if floor == num_floors && call == Call::HallUp {
            return Err(ElevatorError::UpFromTop);
        }
        Ok(())
    }

    /// Records a validated press, holding it back if the car is already on
    /// its way to that floor.
    fn register(&self, request: Request) {
        let status = self.read_status();

        if status.motion == Motion::Moving && status.next_floor == request.floor {
            let mut deferred = lock(&self.deferred);
            let waiting = deferred.entry(request.floor).or_default();
            if !waiting.contains(&request) {
                waiting.push(request);
                debug!(%request, "press deferred until the car settles");
                self.presses.publish(&request);
            }
            return;
        }

        if self.requests.add(request.floor, request.call) {
            debug!(%request, "press registered");
            self.presses.publish(&request);
            self.wake();
        }
    }

    /// Moves deferred presses for every floor except `settled_floor` into
    /// the registry. Floor 0 flushes everything.
    pub fn reinject_deferred(&self, settled_floor: u8) {
        let released: Vec<Request> = {
            let mut deferred = lock(&self.deferred);
            let floors: Vec<u8> = deferred.keys().copied().filter(|floor| *floor != settled_floor).collect();
            floors
                .into_iter()
                .filter_map(|floor| deferred.remove(&floor))
                .flatten()
                .collect()
        };

        for request in released {
            self.requests.add(request.floor, request.call);
            self.wake();
        }
    }

    fn has_deferred(&self) -> bool {
        !lock(&self.deferred).is_empty()
    }

    pub fn board(&self, weight: u32) -> Result<(), ElevatorError> {
        let mut status = self.write_status();
        if !status.is_stopped() {
            return Err(ElevatorError::Moving);
        }

        let current_weight = {
            let mut occupants = lock(&self.occupants);
            occupants.push(weight);
            occupants.iter().fold(0u32, |sum, weight| sum.saturating_add(*weight))
        };
        *status = status.with_weight(current_weight, ElevatorEvent::GetOn);
        debug!(status = %*status, "passenger boarded");
        self.statuses.publish(&status);
        Ok(())
    }

    /// The most recent passenger leaves. Nothing happens if the car is empty.
    pub fn disembark(&self) -> Result<(), ElevatorError> {
        let mut status = self.write_status();
        if !status.is_stopped() {
            return Err(ElevatorError::Moving);
        }

        let current_weight = {
            let mut occupants = lock(&self.occupants);
            if occupants.pop().is_none() {
                return Ok(());
            }
            occupants.iter().fold(0u32, |sum, weight| sum.saturating_add(*weight))
        };
        *status = status.with_weight(current_weight, ElevatorEvent::GotOff);
        debug!(status = %*status, "passenger got off");
        self.statuses.publish(&status);
        Ok(())
    }
}

/// Handle to one elevator car.
///
/// Construction starts the worker thread that moves the car. Every method
/// takes `&self`, so the handle can be shared between threads behind an
/// `Arc`.
pub struct Elevator {
    shared: Arc<Shared>,
    shutdown_tx: Mutex<Option<Sender<()>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Elevator {
    pub fn new(settings: ElevatorSettings) -> Result<Self, ElevatorError> {
        settings.validate()?;

        let (wake_tx, wake_rx) = unbounded();
        let (shutdown_tx, shutdown_rx) = unbounded();
        let shared = Arc::new(Shared::new(settings, wake_tx));

        let worker = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("fsm".to_string())
                .spawn(move || fsm::main(shared, wake_rx, shutdown_rx))?
        };

        info!(
            num_floors = shared.settings.num_floors,
            max_weight = shared.settings.max_weight,
            "elevator started"
        );
        Ok(Elevator {
            shared,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Default timings.
    pub fn with_limits(max_weight: u32, num_floors: u8) -> Result<Self, ElevatorError> {
        Self::new(ElevatorSettings::new(max_weight, num_floors))
    }

    pub fn settings(&self) -> &ElevatorSettings {
        &self.shared.settings
    }

    pub fn status(&self) -> ElevatorStatus {
        self.shared.status()
    }

    /// Presses waiting in the registry. Deferred presses are not included.
    pub fn pending_requests(&self) -> Vec<Request> {
        self.shared.requests.pending()
    }

    pub fn subscribe_button_presses(&self) -> Receiver<Request> {
        self.shared.presses.subscribe()
    }

    pub fn subscribe_status(&self) -> Receiver<ElevatorStatus> {
        self.shared.statuses.subscribe()
    }

    fn ensure_running(&self) -> Result<(), ElevatorError> {
        if self.shared.is_disposed() {
            return Err(ElevatorError::Disposed);
        }
        Ok(())
    }

    pub fn call_elevator_outside(&self, floor: u8, direction: Direction) -> Result<(), ElevatorError> {
        self.ensure_running()?;
        let request = Request::hall(floor, direction);
        self.shared.validate(floor, request.call)?;
        self.shared.register(request);
        Ok(())
    }

    pub fn press_floor_button_inside(&self, floor: u8) -> Result<(), ElevatorError> {
        self.ensure_running()?;
        let request = Request::cab(floor);
        self.shared.validate(floor, request.call)?;
        self.shared.register(request);
        Ok(())
    }

    pub fn board(&self, weight: u32) -> Result<(), ElevatorError> {
        self.ensure_running()?;
        self.shared.board(weight)
    }

    pub fn disembark(&self) -> Result<(), ElevatorError> {
        self.ensure_running()?;
        self.shared.disembark()
    }

    /// Runs a parsed console command. `Quit` is left to the caller.
    pub fn apply(&self, command: Command) -> Result<(), ElevatorError> {
        match command {
            Command::Call { floor, direction } => self.call_elevator_outside(floor, direction),
            Command::Press { floor } => self.press_floor_button_inside(floor),
            Command::Board { weight } => self.board(weight),
            Command::Disembark => self.disembark(),
            Command::Quit => Ok(()),
        }
    }

    /// Blocks until no press is outstanding anywhere, then lets the car
    /// settle for a while longer.
    pub fn drain_input(&self) -> Result<(), ElevatorError> {
        self.ensure_running()?;
        let timing = &self.shared.settings.timing;
        while self.shared.requests.any() || self.shared.has_deferred() {
            thread::sleep(timing.drain_poll());
        }
        thread::sleep(timing.drain_settle());
        Ok(())
    }

    /// Serves everything outstanding, then stops the worker.
    pub fn close(&self) -> Result<(), ElevatorError> {
        self.drain_input()?;
        self.stop_worker();
        info!("elevator closed");
        Ok(())
    }

    fn stop_worker(&self) {
        self.shared.disposed.store(true, Ordering::SeqCst);
        lock(&self.shutdown_tx).take();
        if let Some(worker) = lock(&self.worker).take() {
            if worker.join().is_err() {
                error!("elevator worker panicked");
            }
        }
    }
}

impl Drop for Elevator {
    fn drop(&mut self) {
        self.stop_worker();
    }
}
