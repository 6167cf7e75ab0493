use std::fmt;

/// The button that produced a request: one of the two hall buttons outside
/// the car, or a floor button inside it.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Call {
    HallUp = 0,
    HallDown = 1,
    Cab = 2,
}

impl Call {
    pub const COUNT: usize = 3;

    pub fn iter() -> impl Iterator<Item = Call> {
        [Call::HallUp, Call::HallDown, Call::Cab].into_iter()
    }

    pub fn is_hall(self) -> bool {
        !matches!(self, Call::Cab)
    }
}

impl fmt::Display for Call {
    // Suffix used by the command language: `3U`, `3D`, `3`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Call::HallUp => write!(f, "U"),
            Call::HallDown => write!(f, "D"),
            Call::Cab => Ok(()),
        }
    }
}
