//! Jotti Event Store — persistence for the append-only event log.
//!
//! Provides the PostgreSQL store used in production, an in-memory store for
//! tests and local runs, and a decorator that bounds every store call by a
//! deadline.

pub mod deadline_event_repository;
pub mod memory_event_repository;
pub mod pg_event_repository;
