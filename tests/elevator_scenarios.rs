use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;

use elevator::utilities::config::{ElevatorSettings, Timing};
use elevator::utilities::direction::Direction;
use elevator::utilities::elevator_status::{ElevatorEvent, ElevatorStatus, Motion};
use elevator::utilities::request::Request;
use elevator::{Elevator, ElevatorError};

fn fast_timing() -> Timing {
    Timing {
        travel_ms: 30,
        door_ms: 10,
        idle_cooldown_ms: 40,
        blocked_pause_ms: 50,
        drain_poll_ms: 10,
        drain_settle_ms: 100,
    }
}

fn elevator_with(timing: Timing, max_weight: u32, num_floors: u8) -> Elevator {
    Elevator::new(ElevatorSettings { num_floors, max_weight, timing }).unwrap()
}

/// Same behaviour as the real car, on a millisecond clock.
fn fast_elevator(max_weight: u32, num_floors: u8) -> Elevator {
    elevator_with(fast_timing(), max_weight, num_floors)
}

/// Slow enough travel that a press made right after departure lands
/// while the car is still between floors.
fn slow_travel_elevator(max_weight: u32, num_floors: u8) -> Elevator {
    elevator_with(Timing { travel_ms: 200, ..fast_timing() }, max_weight, num_floors)
}

fn wait_for(status_rx: &Receiver<ElevatorStatus>, event: ElevatorEvent) -> ElevatorStatus {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let status = status_rx.recv_timeout(remaining).expect("the car never reported the event");
        if status.event == event {
            return status;
        }
    }
}

fn stops(statuses: &[ElevatorStatus]) -> Vec<u8> {
    statuses
        .iter()
        .filter(|status| status.event == ElevatorEvent::WaitOnFloor)
        .map(|status| status.current_floor)
        .collect()
}

#[test]
fn hall_call_one_floor_up() {
    let elevator = fast_elevator(1000, 10);
    let status_rx = elevator.subscribe_status();

    elevator.call_elevator_outside(2, Direction::Up).unwrap();
    elevator.drain_input().unwrap();

    let trace: Vec<(ElevatorEvent, u8, u8)> = status_rx
        .try_iter()
        .map(|status| (status.event, status.current_floor, status.next_floor))
        .collect();
    assert_eq!(
        trace,
        vec![
            (ElevatorEvent::StartMovingToFloor, 1, 2),
            (ElevatorEvent::FinishedMovingToFloor, 2, 2),
            (ElevatorEvent::WaitOnFloor, 2, 2),
            (ElevatorEvent::Idling, 2, 2),
        ]
    );

    let status = elevator.status();
    assert_eq!(status.current_floor, 2);
    assert_eq!(status.direction, Direction::Up);
    assert_eq!(status.motion, Motion::Stopped);
    assert_eq!(status.event, ElevatorEvent::Idling);
}

#[test]
fn sweeps_up_then_turns_for_a_down_call() {
    let elevator = fast_elevator(1000, 10);
    let status_rx = elevator.subscribe_status();

    elevator.call_elevator_outside(2, Direction::Up).unwrap();
    elevator.press_floor_button_inside(4).unwrap();
    elevator.call_elevator_outside(5, Direction::Down).unwrap();
    elevator.drain_input().unwrap();

    let statuses: Vec<ElevatorStatus> = status_rx.try_iter().collect();
    assert_eq!(stops(&statuses), vec![2, 4, 5]);

    let status = elevator.status();
    assert_eq!(status.current_floor, 5);
    assert_eq!(status.direction, Direction::Down);
    assert_eq!(status.motion, Motion::Stopped);
}

#[test]
fn passes_a_down_call_on_the_way_up_and_serves_it_on_the_way_back() {
    let elevator = fast_elevator(1000, 10);
    let status_rx = elevator.subscribe_status();

    elevator.press_floor_button_inside(4).unwrap();
    elevator.call_elevator_outside(2, Direction::Down).unwrap();
    elevator.drain_input().unwrap();

    let statuses: Vec<ElevatorStatus> = status_rx.try_iter().collect();
    assert_eq!(stops(&statuses), vec![4, 2]);

    let status = elevator.status();
    assert_eq!(status.current_floor, 2);
    assert_eq!(status.direction, Direction::Down);
    assert_eq!(status.motion, Motion::Stopped);
}

#[test]
fn overloaded_car_is_blocked_until_a_passenger_leaves() {
    let elevator = fast_elevator(200, 10);
    let status_rx = elevator.subscribe_status();

    elevator.board(1000).unwrap();
    elevator.call_elevator_outside(2, Direction::Up).unwrap();

    let blocked = wait_for(&status_rx, ElevatorEvent::Blocked);
    assert_eq!(blocked.current_floor, 2);
    assert_eq!(blocked.motion, Motion::Stopped);
    assert_eq!(elevator.pending_requests(), vec![Request::hall(2, Direction::Up)]);

    elevator.press_floor_button_inside(1).unwrap();
    elevator.drain_input().unwrap();

    let status = elevator.status();
    assert_eq!(status.current_floor, 2);
    assert_eq!(status.direction, Direction::Up);
    assert_eq!(status.motion, Motion::Stopped);
    assert_eq!(status.event, ElevatorEvent::Idling);
    assert_eq!(status.current_weight, 0);
}

#[test]
fn overloaded_car_skips_hall_calls_until_it_is_lighter() {
    let elevator = fast_elevator(200, 10);
    let status_rx = elevator.subscribe_status();

    elevator.board(250).unwrap();
    elevator.call_elevator_outside(2, Direction::Up).unwrap();
    elevator.press_floor_button_inside(3).unwrap();
    elevator.drain_input().unwrap();

    let statuses: Vec<ElevatorStatus> = status_rx.try_iter().collect();
    assert_eq!(stops(&statuses), vec![3, 2]);
    assert!(statuses
        .iter()
        .any(|status| status.event == ElevatorEvent::GotOff && status.current_floor == 3));

    let status = elevator.status();
    assert_eq!(status.current_floor, 2);
    assert_eq!(status.direction, Direction::Up);
    assert_eq!(status.current_weight, 0);
}

#[test]
fn presses_on_the_current_floor_do_not_move_the_car() {
    let elevator = fast_elevator(1000, 10);
    let status_rx = elevator.subscribe_status();

    elevator.call_elevator_outside(1, Direction::Up).unwrap();
    elevator.press_floor_button_inside(1).unwrap();
    elevator.press_floor_button_inside(1).unwrap();
    elevator.drain_input().unwrap();

    let statuses: Vec<ElevatorStatus> = status_rx.try_iter().collect();
    assert!(statuses.iter().all(|status| status.current_floor == 1 && status.motion == Motion::Stopped));
    assert!(!stops(&statuses).is_empty());
    assert_eq!(elevator.status().current_floor, 1);
}

#[test]
fn stops_once_per_floor_for_consecutive_up_calls() {
    let elevator = fast_elevator(1000, 10);
    let status_rx = elevator.subscribe_status();

    elevator.call_elevator_outside(1, Direction::Up).unwrap();
    elevator.call_elevator_outside(2, Direction::Up).unwrap();
    elevator.call_elevator_outside(3, Direction::Up).unwrap();
    elevator.drain_input().unwrap();

    let statuses: Vec<ElevatorStatus> = status_rx.try_iter().collect();
    assert_eq!(stops(&statuses), vec![1, 2, 3]);
}

#[test]
fn press_for_the_floor_being_approached_is_served_later() {
    let elevator = slow_travel_elevator(1000, 10);
    let status_rx = elevator.subscribe_status();
    let press_rx = elevator.subscribe_button_presses();

    elevator.press_floor_button_inside(3).unwrap();
    let moving = wait_for(&status_rx, ElevatorEvent::StartMovingToFloor);
    assert_eq!(moving.next_floor, 2);

    elevator.press_floor_button_inside(2).unwrap();
    assert!(!elevator.pending_requests().contains(&Request::cab(2)));
    let presses: Vec<Request> = press_rx.try_iter().collect();
    assert_eq!(presses, vec![Request::cab(3), Request::cab(2)]);

    elevator.drain_input().unwrap();
    let statuses: Vec<ElevatorStatus> = status_rx.try_iter().collect();
    assert_eq!(stops(&statuses), vec![3, 2]);
    assert!(elevator.pending_requests().is_empty());
}

#[test]
fn deferred_press_alone_is_picked_up_after_idling() {
    let elevator = slow_travel_elevator(1000, 10);
    let status_rx = elevator.subscribe_status();

    elevator.press_floor_button_inside(2).unwrap();
    let moving = wait_for(&status_rx, ElevatorEvent::StartMovingToFloor);
    assert_eq!(moving.next_floor, 2);

    // Held back while the car is on its way; nothing else is outstanding.
    elevator.call_elevator_outside(2, Direction::Up).unwrap();
    assert!(elevator.pending_requests().is_empty());

    elevator.drain_input().unwrap();

    let trace: Vec<(ElevatorEvent, u8)> = status_rx
        .try_iter()
        .map(|status| (status.event, status.current_floor))
        .collect();
    assert_eq!(
        trace,
        vec![
            (ElevatorEvent::FinishedMovingToFloor, 2),
            (ElevatorEvent::WaitOnFloor, 2),
            (ElevatorEvent::Idling, 2),
            (ElevatorEvent::WaitOnFloor, 2),
            (ElevatorEvent::Idling, 2),
        ]
    );
    assert!(elevator.pending_requests().is_empty());
}

#[test]
fn repeated_press_is_reported_once() {
    let elevator = fast_elevator(1000, 10);
    let press_rx = elevator.subscribe_button_presses();

    elevator.press_floor_button_inside(7).unwrap();
    elevator.press_floor_button_inside(7).unwrap();

    assert_eq!(press_rx.try_iter().collect::<Vec<_>>(), vec![Request::cab(7)]);
    assert_eq!(elevator.pending_requests(), vec![Request::cab(7)]);
}

#[test]
fn rejected_calls_leave_no_trace() {
    let elevator = fast_elevator(1000, 5);
    let press_rx = elevator.subscribe_button_presses();

    assert!(matches!(elevator.call_elevator_outside(0, Direction::Up), Err(ElevatorError::FloorBelowBottom)));
    assert!(matches!(elevator.call_elevator_outside(1, Direction::Down), Err(ElevatorError::DownFromBottom)));
    assert!(matches!(elevator.press_floor_button_inside(6), Err(ElevatorError::FloorAboveTop { .. })));
    assert!(matches!(elevator.call_elevator_outside(5, Direction::Up), Err(ElevatorError::UpFromTop)));

    assert!(press_rx.try_recv().is_err());
    assert!(elevator.pending_requests().is_empty());
    assert_eq!(elevator.status(), ElevatorStatus::new(1000));
}

#[test]
fn passengers_cannot_board_or_leave_a_moving_car() {
    let elevator = fast_elevator(1000, 10);
    let status_rx = elevator.subscribe_status();

    elevator.board(80).unwrap();
    elevator.press_floor_button_inside(5).unwrap();
    wait_for(&status_rx, ElevatorEvent::StartMovingToFloor);

    assert!(matches!(elevator.board(60), Err(ElevatorError::Moving)));
    assert!(matches!(elevator.disembark(), Err(ElevatorError::Moving)));

    elevator.drain_input().unwrap();
    // The passenger got off at the cab stop.
    assert_eq!(elevator.status().current_weight, 0);
}

#[test]
fn draining_an_idle_car_returns_every_time() {
    let elevator = fast_elevator(1000, 10);
    let started = Instant::now();
    elevator.drain_input().unwrap();
    elevator.drain_input().unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn closed_car_refuses_everything() {
    let elevator = fast_elevator(1000, 10);
    elevator.call_elevator_outside(3, Direction::Up).unwrap();
    elevator.close().unwrap();

    assert_eq!(elevator.status().current_floor, 3);
    assert!(matches!(elevator.close(), Err(ElevatorError::Disposed)));
    assert!(matches!(elevator.press_floor_button_inside(2), Err(ElevatorError::Disposed)));
    assert!(matches!(elevator.call_elevator_outside(2, Direction::Up), Err(ElevatorError::Disposed)));
    assert!(matches!(elevator.board(70), Err(ElevatorError::Disposed)));
    assert!(matches!(elevator.disembark(), Err(ElevatorError::Disposed)));
    assert!(matches!(elevator.drain_input(), Err(ElevatorError::Disposed)));
}

#[test]
fn dropping_an_unclosed_car_stops_its_worker() {
    let elevator = fast_elevator(1000, 10);
    let status_rx = elevator.subscribe_status();
    elevator.press_floor_button_inside(9).unwrap();
    wait_for(&status_rx, ElevatorEvent::StartMovingToFloor);

    let started = Instant::now();
    drop(elevator);
    assert!(started.elapsed() < Duration::from_secs(1));
    // Every sender is gone once the worker has exited.
    while status_rx.recv_timeout(Duration::from_secs(1)).is_ok() {}
    assert!(status_rx.recv_timeout(Duration::from_millis(10)).is_err());
}
