use std::sync::{Mutex, MutexGuard, PoisonError};

use super::call::Call;
use super::direction::Direction;
use super::request::Request;

/// What a directional scan found, from the car's floor outward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub current_floor_presses: Vec<Request>,
    pub last_floor_presses: Vec<Request>,
    pub current_floor: u8,
    /// Furthest floor in the scan direction with anything outstanding.
    pub last_floor: Option<u8>,
}

impl ScanResult {
    pub fn current_floor_has(&self, call: Call) -> bool {
        self.current_floor_presses.iter().any(|request| request.call == call)
    }

    pub fn last_floor_has(&self, call: Call) -> bool {
        self.last_floor_presses.iter().any(|request| request.call == call)
    }
}

/// Outstanding button presses, one slot per floor.
///
/// Every floor slot has its own lock, so presses on different floors never
/// contend and an insert can't race the removal that empties the same
/// floor. A floor counts as present exactly when some button in its slot is
/// set. Scans take the floor locks one at a time: the result is a snapshot
/// that may miss presses made while the scan was running.
#[derive(Debug)]
pub struct Requests {
    floors: Vec<Mutex<[bool; Call::COUNT]>>,
    num_floors: u8,
}

impl Requests {
    pub fn new(num_floors: u8) -> Self {
        Requests {
            floors: (0..num_floors).map(|_| Mutex::new([false; Call::COUNT])).collect(),
            num_floors,
        }
    }

    // Floors are numbered from 1.
    fn slot(&self, floor: u8) -> Option<MutexGuard<'_, [bool; Call::COUNT]>> {
        let index = (floor as usize).checked_sub(1)?;
        self.floors
            .get(index)
            .map(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Returns true if the press was not already outstanding.
    pub fn add(&self, floor: u8, call: Call) -> bool {
        match self.slot(floor) {
            Some(mut slot) if !slot[call as usize] => {
                slot[call as usize] = true;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&self, floor: u8, call: Call) {
        if let Some(mut slot) = self.slot(floor) {
            slot[call as usize] = false;
        }
    }

    pub fn presses_at(&self, floor: u8) -> Vec<Request> {
        match self.slot(floor) {
            Some(slot) => Call::iter()
                .filter(|call| slot[*call as usize])
                .map(|call| Request::new(floor, call))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Scans `current_floor..=num_floors`.
    pub fn scan_to_top(&self, current_floor: u8) -> ScanResult {
        self.scan(current_floor, current_floor..=self.num_floors)
    }

    /// Scans `current_floor..=1`, top down.
    pub fn scan_to_bottom(&self, current_floor: u8) -> ScanResult {
        self.scan(current_floor, (1..=current_floor).rev())
    }

    fn scan(&self, current_floor: u8, floors: impl Iterator<Item = u8>) -> ScanResult {
        let mut result = ScanResult {
            current_floor_presses: Vec::new(),
            last_floor_presses: Vec::new(),
            current_floor,
            last_floor: None,
        };

        for floor in floors {
            let presses = self.presses_at(floor);
            if presses.is_empty() {
                continue;
            }
            if floor == current_floor {
                result.current_floor_presses = presses.clone();
            }
            result.last_floor_presses = presses;
            result.last_floor = Some(floor);
        }
        result
    }

    pub fn any(&self) -> bool {
        (1..=self.num_floors).any(|floor| !self.presses_at(floor).is_empty())
    }

    /// True if anything is outstanding for passengers going `direction`.
    /// Cab presses count for both directions.
    pub fn any_toward(&self, direction: Direction) -> bool {
        let hall_call = direction.to_call();
        (1..=self.num_floors).any(|floor| {
            self.presses_at(floor)
                .iter()
                .any(|request| request.call == hall_call || request.call == Call::Cab)
        })
    }

    pub fn pending(&self) -> Vec<Request> {
        (1..=self.num_floors).flat_map(|floor| self.presses_at(floor)).collect()
    }
}
