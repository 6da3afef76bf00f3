//! Shared test doubles and fixtures for the Jotti ledger.

mod clock;
mod fixtures;
mod id;
mod repository;

pub use clock::FixedClock;
pub use fixtures::{fixed_now, stored_event};
pub use id::SequenceIdGenerator;
pub use repository::{FailingEventRepository, RecordingEventRepository};
