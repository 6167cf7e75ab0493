use std::io::{self, stdout, Stdout, Write};

use crossterm::{cursor, terminal, ExecutableCommand};

use crate::utilities::call::Call;
use crate::utilities::elevator_status::ElevatorStatus;
use crate::utilities::request::Request;

/// Status table redrawn in place after every change.
pub struct Debug<W: Write> {
    out: W,
    num_floors: u8,
    drawn: bool,
}

impl Debug<Stdout> {
    pub fn new(num_floors: u8) -> Self {
        Debug::with_writer(stdout(), num_floors)
    }
}

impl<W: Write> Debug<W> {
    pub fn with_writer(out: W, num_floors: u8) -> Self {
        Debug { out, num_floors, drawn: false }
    }

    fn height(&self) -> u16 {
        22 + 2 * u16::from(self.num_floors)
    }

    pub fn print_status(&mut self, status: &ElevatorStatus, pending: &[Request]) -> io::Result<()> {
        if self.drawn {
            let height = self.height();
            self.out.execute(cursor::MoveUp(height))?;
            self.out.execute(terminal::Clear(terminal::ClearType::FromCursorDown))?;
        }
        self.drawn = true;

        writeln!(self.out, "+---------------------------------------------------+")?;
        writeln!(self.out, "| ORDERS FOR THIS ELEVATOR                          |")?;
        writeln!(self.out, "+------------+------------+------------+------------+")?;
        writeln!(self.out, "| {0:<10} | {1:<10} | {2:<10} | {3:<10} |", "FLOOR", "HALL UP", "HALL DOWN", "CAB")?;
        for floor in (1..=self.num_floors).rev() {
            let pressed = |call: Call| pending.contains(&Request::new(floor, call));
            writeln!(self.out, "+------------+------------+------------+------------+")?;
            writeln!(
                self.out,
                "| {0:<10} | {1:<10} | {2:<10} | {3:<10} |",
                floor,
                pressed(Call::HallUp),
                pressed(Call::HallDown),
                pressed(Call::Cab),
            )?;
        }
        writeln!(self.out, "+------------+------------+------------+------------+\n\n")?;

        writeln!(self.out, "+-------------------------+")?;
        writeln!(self.out, "| STATE MACHINE           |")?;
        writeln!(self.out, "+------------+------------+")?;
        writeln!(self.out, "| {0:<10} | {1:<10} |", "EVENT", status.event.as_string())?;
        writeln!(self.out, "+------------+------------+")?;
        writeln!(self.out, "| {0:<10} | {1:<10} |", "FLOOR", status.current_floor)?;
        writeln!(self.out, "+------------+------------+")?;
        writeln!(self.out, "| {0:<10} | {1:<10} |", "NEXT", status.next_floor)?;
        writeln!(self.out, "+------------+------------+")?;
        writeln!(self.out, "| {0:<10} | {1:<10} |", "DIRECTION", status.direction.as_string())?;
        writeln!(self.out, "+------------+------------+")?;
        writeln!(self.out, "| {0:<10} | {1:<10} |", "MOTION", status.motion.as_string())?;
        writeln!(self.out, "+------------+------------+")?;
        writeln!(self.out, "| {0:<10} | {1:<10} |", "WEIGHT", format!("{}/{}", status.current_weight, status.max_weight))?;
        writeln!(self.out, "+------------+------------+")?;

        self.out.flush()
    }
}
