//! Payments: building `PaymentRegistered` facts and reading them back.

use chrono::{DateTime, Utc};
use jotti_core::clock::Clock;
use jotti_core::error::{DomainError, ValidationErrors};
use jotti_core::event::NewEvent;
use jotti_core::id::IdGenerator;
use jotti_core::repository::StoredEvent;
use serde::Serialize;
use uuid::Uuid;

use super::events::{PAYMENT_REGISTERED_TYPES, PaymentRegisteredV1, TableEventKind};
use super::product_line::{ProductLine, sum_lines, validate_lines};
use super::schema::SchemaRegistry;
use super::subject::{parse_table_id, table_subject};

/// A payment as reconstructed from its `PaymentRegistered` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Payment identifier.
    pub id: Uuid,
    /// The user who registered the payment.
    pub actor_id: i64,
    /// The table the payment belongs to.
    pub table_id: i64,
    /// Paid product lines.
    pub products: Vec<ProductLine>,
    /// Sum of `unit_price_cents × quantity` over `products`.
    pub total_payment_cents: i64,
    /// When the payment was registered.
    pub registered_at: DateTime<Utc>,
}

impl Payment {
    /// Checks the payment invariants.
    ///
    /// # Errors
    ///
    /// Returns every violated invariant.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.actor_id < 1 {
            errors.push("actorId", "must be at least 1");
        }
        if self.table_id < 1 {
            errors.push("tableId", "must be at least 1");
        }
        validate_lines("products", &self.products, &mut errors);
        if self.total_payment_cents < 0 {
            errors.push("totalPaymentCents", "must be non-negative");
        }
        errors.into_result()
    }
}

/// Builds the `PaymentRegistered` event for a new payment.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the table id, the product lines or
/// the envelope are invalid, or if the payment total overflows.
pub fn new_payment_registered_event(
    actor_id: i64,
    table_id: i64,
    products: Vec<ProductLine>,
    ids: &dyn IdGenerator,
    clock: &dyn Clock,
) -> Result<(Uuid, NewEvent), DomainError> {
    let payment_id = ids.next_id();
    let data = PaymentRegisteredV1 {
        payment_id: payment_id.to_string(),
        products,
    };

    let mut errors = ValidationErrors::new();
    if table_id < 1 {
        errors.push("tableId", "must be at least 1");
    }
    data.validate_into(&mut errors);
    errors.into_result()?;
    sum_lines(&data.products, "totalPaymentCents")?;

    let kind = TableEventKind::PaymentRegisteredV1(data);
    let event = NewEvent::new(
        actor_id,
        kind.event_type(),
        table_subject(table_id),
        kind.to_payload()?,
        clock.now(),
    )?;
    Ok((payment_id, event))
}

/// Reconstructs a [`Payment`] from a stored `PaymentRegistered` event.
///
/// # Errors
///
/// Same taxonomy as [`build_order_from_event`](super::order::build_order_from_event).
pub fn build_payment_from_event(
    event: &StoredEvent,
    schemas: &SchemaRegistry,
) -> Result<Payment, DomainError> {
    if !PAYMENT_REGISTERED_TYPES.contains(&event.event_type.as_str()) {
        return Err(DomainError::UnsupportedEventType(event.event_type.clone()));
    }
    let table_id = parse_table_id(&event.subject)?;

    let TableEventKind::PaymentRegisteredV1(data) =
        schemas.decode(&event.event_type, &event.payload)?
    else {
        return Err(DomainError::UnsupportedEventType(event.event_type.clone()));
    };

    let total_payment_cents = sum_lines(&data.products, "totalPaymentCents")?;
    let id = Uuid::try_parse(&data.payment_id)
        .map_err(|_| ValidationErrors::single("paymentId", "must be a valid UUID"))?;

    let payment = Payment {
        id,
        actor_id: event.actor_id,
        table_id,
        products: data.products,
        total_payment_cents,
        registered_at: event.occurred_at,
    };
    payment.validate()?;
    Ok(payment)
}
