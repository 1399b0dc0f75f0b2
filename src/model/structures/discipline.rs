use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{EnumIter, EnumString};

/// A ranking discipline. `Gravity` is not a discipline events are held in, it is the
/// combined view over every Enduro and DH event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, EnumString
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Discipline {
    Enduro,
    Dh,
    Gravity
}

impl Discipline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Discipline::Enduro => "ENDURO",
            Discipline::Dh => "DH",
            Discipline::Gravity => "GRAVITY"
        }
    }

    /// The `events.discipline` values whose results feed this ranking.
    pub fn event_disciplines(&self) -> &'static [Discipline] {
        match self {
            Discipline::Enduro => &[Discipline::Enduro],
            Discipline::Dh => &[Discipline::Dh],
            Discipline::Gravity => &[Discipline::Enduro, Discipline::Dh]
        }
    }

    /// Whether an event held in `event_discipline` counts toward this ranking.
    pub fn includes(&self, event_discipline: &str) -> bool {
        self.event_disciplines()
            .iter()
            .any(|d| d.as_str().eq_ignore_ascii_case(event_discipline.trim()))
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
