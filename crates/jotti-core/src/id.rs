//! Identifier generation abstraction.
//!
//! Order and payment ids are minted when a fact is built. Production code
//! uses random v4 UUIDs; tests inject a predetermined sequence.

use uuid::Uuid;

/// Source of fresh identifiers for new facts.
pub trait IdGenerator: Send + Sync {
    /// Returns a new, previously unused identifier.
    fn next_id(&self) -> Uuid;
}

/// Generates random (v4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}
