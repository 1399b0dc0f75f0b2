//! Database tests run against a throwaway Postgres container and need a local
//! Docker daemon: `cargo test --test database -- --ignored`.

#[path = "../common/mod.rs"]
mod common;

mod backfill_tests;
mod transaction_tests;
