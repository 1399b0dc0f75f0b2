// Decay window
pub const LAST_12_MONTHS: u32 = 12;
pub const LOOKBACK_MONTHS: u32 = 24;
pub const MONTHS_13_24_WEIGHT: f64 = 0.5;
// Snapshots older than this are deleted. The read path only needs LOOKBACK_MONTHS.
pub const RETENTION_MONTHS: u32 = 26;
// (minimum field size, multiplier), ordered from largest field down
pub const FIELD_SIZE_MULTIPLIERS: [(i64, f64); 7] = [
    (50, 1.00),
    (40, 0.95),
    (30, 0.90),
    (20, 0.85),
    (15, 0.80),
    (10, 0.75),
    (5, 0.60)
];
pub const SMALL_FIELD_MULTIPLIER: f64 = 0.50;
// Result eligibility
pub const FINISHED_STATUS: &str = "finished";
pub const CLASS_FLAG_ENABLED: i32 = 1;
// Reader defaults
pub const DEFAULT_PER_PAGE: i64 = 50;
pub const MAX_PER_PAGE: i64 = 500;
