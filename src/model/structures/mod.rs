pub mod discipline;
pub mod event_level;
