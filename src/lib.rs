// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod config;
pub mod export;
pub mod optimizer;
pub mod pool;
pub mod portfolio;
pub mod roster;
pub mod sim;
