//! Test id generator — deterministic `IdGenerator` implementation for tests.

use std::sync::Mutex;

use jotti_core::id::IdGenerator;
use uuid::Uuid;

/// An id generator that hands out a predetermined sequence of UUIDs.
/// Panics if the sequence is exhausted.
#[derive(Debug)]
pub struct SequenceIdGenerator {
    ids: Vec<Uuid>,
    index: Mutex<usize>,
}

impl SequenceIdGenerator {
    /// Create a new `SequenceIdGenerator` yielding `ids` in order.
    #[must_use]
    pub fn new(ids: Vec<Uuid>) -> Self {
        Self {
            ids,
            index: Mutex::new(0),
        }
    }
}

impl IdGenerator for SequenceIdGenerator {
    fn next_id(&self) -> Uuid {
        let mut index = self.index.lock().unwrap();
        let id = self.ids[*index];
        *index += 1;
        id
    }
}
