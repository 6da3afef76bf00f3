//! Jotti API — HTTP surface over the table ledger.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod telemetry;
