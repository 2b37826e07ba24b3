// ABOUTME: Library root for rds-bluegreen - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod deploy;
pub mod error;
pub mod gateway;
pub mod output;
pub mod rerun;
pub mod types;
pub mod wait;
