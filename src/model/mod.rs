pub mod aggregation;
pub mod backfill;
pub mod constants;
pub mod decay;
pub mod ranking_engine;
pub mod retention;
pub mod scoring;
pub mod snapshot;
pub mod structures;
