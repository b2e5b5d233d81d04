// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod cache;
pub mod config;
pub mod db;
pub mod model;
pub mod trade;
