//! Jotti Core — shared ledger abstractions.
//!
//! This crate defines the event envelope, the error taxonomy and the
//! collaborator traits (clock, id generation, event repository) that the
//! table ledger and its stores depend on. It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod id;
pub mod repository;
