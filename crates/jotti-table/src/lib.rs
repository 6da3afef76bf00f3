//! Jotti — table order ledger bounded context.
//!
//! Responsible for the per-table event stream: placing orders, registering
//! payments, and replaying the stream into order history, balance and
//! unpaid-product views.

pub mod application;
pub mod domain;
