//! Domain model of the table ledger.

pub mod commands;
pub mod events;
pub mod order;
pub mod payment;
pub mod product_line;
pub mod projection;
pub mod schema;
pub mod subject;
