pub mod db;
pub mod db_structs;
pub mod query;
pub mod reader;
pub mod results;
