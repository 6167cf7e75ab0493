/// ----- FSM MODULE -----
/// This module is the state machine moving the car. It sleeps until a
/// press arrives, then sweeps in its current direction one floor at a
/// time, stopping where a press can be served, until nothing is left.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{select, Receiver, RecvTimeoutError};
use tracing::{debug, info, warn};

use crate::modules::elevator::Shared;
use crate::utilities::call::Call;
use crate::utilities::direction::Direction;
use crate::utilities::elevator_status::{ElevatorEvent, Motion};
use crate::utilities::request::Request;

/// The car was shut down during a pause.
struct Halted;

struct Fsm {
    shared: Arc<Shared>,
    wake_rx: Receiver<()>,
    shutdown_rx: Receiver<()>,
}

pub(crate) fn main(shared: Arc<Shared>, wake_rx: Receiver<()>, shutdown_rx: Receiver<()>) {
    let fsm = Fsm { shared, wake_rx, shutdown_rx };

    loop {
        if fsm.shared.is_disposed() {
            break;
        }
        select! {
            recv(fsm.wake_rx) -> msg => {
                if msg.is_err() {
                    break;
                }
            },
            recv(fsm.shutdown_rx) -> _ => {
                break;
            },
        }
        if fsm.serve().is_err() {
            break;
        }
    }
    info!("elevator worker stopped");
}

impl Fsm {
    /// Waits `duration` unless the car is shut down first.
    fn pause(&self, duration: Duration) -> Result<(), Halted> {
        match self.shutdown_rx.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => Ok(()),
            _ => Err(Halted),
        }
    }

    fn serve(&self) -> Result<(), Halted> {
        while self.shared.requests.any() {
            let direction = self.shared.status().direction;
            while self.advance(direction)? {}
        }

        if self.wake_rx.is_empty() {
            let status = self.shared.status();
            self.shared.update(
                status.current_floor,
                status.current_floor,
                status.direction,
                Motion::Stopped,
                ElevatorEvent::Idling,
            );
        }

        self.pause(self.shared.settings.timing.idle_cooldown())?;
        self.shared.reinject_deferred(0);
        Ok(())
    }

    /// One step of a sweep. Returns true if the car moved a floor and
    /// should keep going the same way.
    fn advance(&self, direction: Direction) -> Result<bool, Halted> {
        let current_floor = self.shared.status().current_floor;
        let scan = match direction {
            Direction::Up => self.shared.requests.scan_to_top(current_floor),
            Direction::Down => self.shared.requests.scan_to_bottom(current_floor),
        };
        let reverse = direction.opposite();

        let Some(last_floor) = scan.last_floor else {
            if !self.shared.requests.any_toward(reverse) {
                debug!(floor = current_floor, "only calls going {} are left behind the car", direction.as_string());
            }
            self.change_direction(current_floor, reverse, ElevatorEvent::ChangeDirections);
            return Ok(false);
        };

        let get_off = scan.current_floor_has(Call::Cab);
        if direction.is_ahead(current_floor, last_floor) {
            if self.decide_to_wait_on_floor(&scan.current_floor_presses, direction) {
                self.wait_on_floor(current_floor, direction, get_off)?;
            }
            self.travel_between_floors(current_floor, direction.next_floor(current_floor), direction)?;
            return Ok(true);
        }

        let wait_on_last_floor = self.decide_to_wait_on_floor(&scan.current_floor_presses, Direction::Up)
            || self.decide_to_wait_on_floor(&scan.current_floor_presses, Direction::Down);

        if wait_on_last_floor {
            self.wait_on_last_floor(current_floor, direction, get_off)?;
            if scan.last_floor_has(reverse.to_call()) {
                self.change_direction(current_floor, reverse, ElevatorEvent::ChangeDirections);
            }
        } else if last_floor == current_floor {
            // Only presses the car may not honour are left here
            warn!(floor = current_floor, "car is too heavy to serve this floor");
            self.change_direction(current_floor, reverse, ElevatorEvent::Blocked);
            self.pause(self.shared.settings.timing.blocked_pause())?;
        } else {
            self.change_direction(current_floor, reverse, ElevatorEvent::ChangeDirections);
        }

        Ok(false)
    }

    /// An overloaded car only stops for passengers inside.
    fn decide_to_wait_on_floor(&self, presses: &[Request], direction: Direction) -> bool {
        let overloaded = self.shared.status().weight_limit_reached();
        presses
            .iter()
            .any(|request| !request.call.is_hall() || (request.call == direction.to_call() && !overloaded))
    }

    fn change_direction(&self, floor: u8, direction: Direction, event: ElevatorEvent) {
        self.shared.update(floor, floor, direction, Motion::Stopped, event);
    }

    fn wait_on_last_floor(&self, floor: u8, direction: Direction, get_off: bool) -> Result<(), Halted> {
        for call in Call::iter() {
            self.shared.requests.remove(floor, call);
        }
        self.wait_on_floor(floor, direction, get_off)
    }

    fn wait_on_floor(&self, floor: u8, direction: Direction, get_off: bool) -> Result<(), Halted> {
        self.shared.update(floor, floor, direction, Motion::Stopped, ElevatorEvent::WaitOnFloor);

        if get_off {
            if let Err(error) = self.shared.disembark() {
                warn!(%error, floor, "passenger could not get off");
            }
        }

        self.shared.requests.remove(floor, Call::Cab);
        self.shared.requests.remove(floor, direction.to_call());

        self.pause(self.shared.settings.timing.door())?;
        self.shared.reinject_deferred(floor);
        Ok(())
    }

    fn travel_between_floors(&self, current_floor: u8, next_floor: u8, direction: Direction) -> Result<(), Halted> {
        self.shared.update(current_floor, next_floor, direction, Motion::Moving, ElevatorEvent::StartMovingToFloor);
        self.pause(self.shared.settings.timing.travel())?;
        self.shared.update(next_floor, next_floor, direction, Motion::Moving, ElevatorEvent::FinishedMovingToFloor);
        self.shared.reinject_deferred(next_floor);
        Ok(())
    }
}
