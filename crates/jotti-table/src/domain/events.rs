//! Domain events of the table ledger.
//!
//! Event types follow `<domain>.<fact>:<version>`. A new payload shape gets a
//! new version suffix and its own schema; historical rows keep their type and
//! are never migrated.

use jotti_core::error::{DomainError, ValidationErrors};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::product_line::{ProductLine, validate_lines};

/// Event type string for `OrderPlaced` v1.
pub const ORDER_PLACED_V1: &str = "table.order-placed:v1";
/// Event type string for `PaymentRegistered` v1.
pub const PAYMENT_REGISTERED_V1: &str = "table.payment-registered:v1";

/// Every event type that records a placed order.
pub const ORDER_PLACED_TYPES: &[&str] = &[ORDER_PLACED_V1];
/// Every event type that records a registered payment.
pub const PAYMENT_REGISTERED_TYPES: &[&str] = &[PAYMENT_REGISTERED_V1];

fn validate_uuid(field: &str, value: &str, errors: &mut ValidationErrors) {
    if Uuid::try_parse(value).is_err() {
        errors.push(field, "must be a valid UUID");
    }
}

/// Payload of `table.order-placed:v1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPlacedV1 {
    /// The order identifier (UUID string).
    pub order_id: String,
    /// The ordered product lines, in the order they were entered.
    pub products: Vec<ProductLine>,
}

impl OrderPlacedV1 {
    /// Records every violated field constraint.
    pub fn validate_into(&self, errors: &mut ValidationErrors) {
        validate_uuid("orderId", &self.order_id, errors);
        validate_lines("products", &self.products, errors);
    }

    /// Validates the payload.
    ///
    /// # Errors
    ///
    /// Returns the list of violated field constraints.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.validate_into(&mut errors);
        errors.into_result()
    }
}

/// Payload of `table.payment-registered:v1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRegisteredV1 {
    /// The payment identifier (UUID string).
    pub payment_id: String,
    /// The paid product lines.
    pub products: Vec<ProductLine>,
}

impl PaymentRegisteredV1 {
    /// Records every violated field constraint.
    pub fn validate_into(&self, errors: &mut ValidationErrors) {
        validate_uuid("paymentId", &self.payment_id, errors);
        validate_lines("products", &self.products, errors);
    }

    /// Validates the payload.
    ///
    /// # Errors
    ///
    /// Returns the list of violated field constraints.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.validate_into(&mut errors);
        errors.into_result()
    }
}

/// Decoded payload variants, tagged by event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEventKind {
    /// An order has been placed at the table.
    OrderPlacedV1(OrderPlacedV1),
    /// A payment has been registered at the table.
    PaymentRegisteredV1(PaymentRegisteredV1),
}

impl TableEventKind {
    /// Returns the event type string this variant is stored under.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::OrderPlacedV1(_) => ORDER_PLACED_V1,
            Self::PaymentRegisteredV1(_) => PAYMENT_REGISTERED_V1,
        }
    }

    /// Serializes the payload (without a tag; the tag is the event type).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if serialization fails.
    pub fn to_payload(&self) -> Result<serde_json::Value, DomainError> {
        let value = match self {
            Self::OrderPlacedV1(data) => serde_json::to_value(data),
            Self::PaymentRegisteredV1(data) => serde_json::to_value(data),
        };
        value.map_err(|e| {
            DomainError::Validation(ValidationErrors::single("payload", e.to_string()))
        })
    }
}
