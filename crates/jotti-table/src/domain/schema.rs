//! Payload schema registry.
//!
//! Payloads are stored schema-on-read, so every reader decodes and validates
//! them again. The registry maps each event type string to the decoder for
//! that type and version. It is built once at startup and handed to whoever
//! replays events.

use std::collections::HashMap;

use jotti_core::error::{DomainError, ValidationErrors};
use serde::Deserialize;

use super::events::{
    ORDER_PLACED_V1, OrderPlacedV1, PAYMENT_REGISTERED_V1, PaymentRegisteredV1, TableEventKind,
};

/// Decodes and validates one event type's payload.
pub type PayloadDecoder = fn(&serde_json::Value) -> Result<TableEventKind, ValidationErrors>;

/// Registry of payload decoders keyed by event type.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    decoders: HashMap<&'static str, PayloadDecoder>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every v1 table event schema.
    #[must_use]
    pub fn table_v1() -> Self {
        Self::new()
            .with(ORDER_PLACED_V1, decode_order_placed_v1)
            .with(PAYMENT_REGISTERED_V1, decode_payment_registered_v1)
    }

    /// Registers `decoder` for `event_type`, replacing any previous one.
    #[must_use]
    pub fn with(mut self, event_type: &'static str, decoder: PayloadDecoder) -> Self {
        self.decoders.insert(event_type, decoder);
        self
    }

    /// Decodes and validates `payload` as `event_type`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnsupportedEventType` if no decoder is
    /// registered, or `DomainError::Validation` if the payload is malformed.
    pub fn decode(
        &self,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<TableEventKind, DomainError> {
        let decoder = self
            .decoders
            .get(event_type)
            .ok_or_else(|| DomainError::UnsupportedEventType(event_type.to_owned()))?;
        decoder(payload).map_err(DomainError::Validation)
    }
}

fn malformed(err: &serde_json::Error) -> ValidationErrors {
    ValidationErrors::single("payload", err.to_string())
}

fn decode_order_placed_v1(payload: &serde_json::Value) -> Result<TableEventKind, ValidationErrors> {
    let data = OrderPlacedV1::deserialize(payload).map_err(|e| malformed(&e))?;
    data.validate()?;
    Ok(TableEventKind::OrderPlacedV1(data))
}

fn decode_payment_registered_v1(
    payload: &serde_json::Value,
) -> Result<TableEventKind, ValidationErrors> {
    let data = PaymentRegisteredV1::deserialize(payload).map_err(|e| malformed(&e))?;
    data.validate()?;
    Ok(TableEventKind::PaymentRegisteredV1(data))
}
