use serde::Serialize;

/// Tier of a competition. Anything the platform stores that is not one of the known
/// tiers (including a missing level) maps to `Unknown`.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    WorldCup,
    WorldSeries,
    Ews,
    NationalChampionship,
    National,
    Regional,
    Local,
    Unknown
}

impl EventLevel {
    pub fn multiplier(&self) -> f64 {
        match self {
            EventLevel::WorldCup => 1.50,
            EventLevel::WorldSeries => 1.40,
            EventLevel::Ews => 1.30,
            EventLevel::NationalChampionship => 1.25,
            EventLevel::National => 1.10,
            EventLevel::Regional => 1.00,
            EventLevel::Local => 0.90,
            EventLevel::Unknown => 1.00
        }
    }
}

impl From<Option<&str>> for EventLevel {
    fn from(level: Option<&str>) -> Self {
        let Some(level) = level else {
            return EventLevel::Unknown;
        };

        match level.trim().to_ascii_lowercase().as_str() {
            "world_cup" => EventLevel::WorldCup,
            "world_series" => EventLevel::WorldSeries,
            "ews" => EventLevel::Ews,
            "national_championship" | "sm" => EventLevel::NationalChampionship,
            "national" => EventLevel::National,
            "regional" => EventLevel::Regional,
            "local" => EventLevel::Local,
            _ => EventLevel::Unknown
        }
    }
}

impl From<&str> for EventLevel {
    fn from(level: &str) -> Self {
        EventLevel::from(Some(level))
    }
}
