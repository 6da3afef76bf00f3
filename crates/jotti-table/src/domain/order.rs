//! Orders: building `OrderPlaced` facts and reading them back.

use chrono::{DateTime, Utc};
use jotti_core::clock::Clock;
use jotti_core::error::{DomainError, ValidationErrors};
use jotti_core::event::NewEvent;
use jotti_core::id::IdGenerator;
use jotti_core::repository::StoredEvent;
use serde::Serialize;
use uuid::Uuid;

use super::events::{ORDER_PLACED_TYPES, OrderPlacedV1, TableEventKind};
use super::product_line::{ProductLine, sum_lines, validate_lines};
use super::schema::SchemaRegistry;
use super::subject::{parse_table_id, table_subject};

/// An order as reconstructed from its `OrderPlaced` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order identifier.
    pub id: Uuid,
    /// The user who placed the order.
    pub actor_id: i64,
    /// The table the order belongs to.
    pub table_id: i64,
    /// Ordered product lines.
    pub products: Vec<ProductLine>,
    /// Sum of `unit_price_cents × quantity` over `products`. Always derived,
    /// never read from the payload.
    pub total_net_price_cents: i64,
    /// When the order was placed.
    pub placed_at: DateTime<Utc>,
}

impl Order {
    /// Checks the order invariants.
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
        if self.total_net_price_cents < 0 {
            errors.push("totalNetPriceCents", "must be non-negative");
        }
        errors.into_result()
    }
}

/// Builds the `OrderPlaced` event for a new order.
///
/// Nothing is persisted; the caller appends the returned event.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the table id, the product lines or
/// the envelope are invalid, or if the order total overflows.
pub fn new_order_placed_event(
    actor_id: i64,
    table_id: i64,
    products: Vec<ProductLine>,
    ids: &dyn IdGenerator,
    clock: &dyn Clock,
) -> Result<(Uuid, NewEvent), DomainError> {
    let order_id = ids.next_id();
    let data = OrderPlacedV1 {
        order_id: order_id.to_string(),
        products,
    };

    let mut errors = ValidationErrors::new();
    if table_id < 1 {
        errors.push("tableId", "must be at least 1");
    }
    data.validate_into(&mut errors);
    errors.into_result()?;
    sum_lines(&data.products, "totalNetPriceCents")?;

    let kind = TableEventKind::OrderPlacedV1(data);
    let event = NewEvent::new(
        actor_id,
        kind.event_type(),
        table_subject(table_id),
        kind.to_payload()?,
        clock.now(),
    )?;
    Ok((order_id, event))
}

/// Reconstructs an [`Order`] from a stored `OrderPlaced` event.
///
/// # Errors
///
/// - `DomainError::UnsupportedEventType` if the event is not an order event.
/// - `DomainError::InvalidSubject` if the subject is not `table:<digits>`.
/// - `DomainError::Validation` if the payload or the assembled order is
///   invalid.
pub fn build_order_from_event(
    event: &StoredEvent,
    schemas: &SchemaRegistry,
) -> Result<Order, DomainError> {
    if !ORDER_PLACED_TYPES.contains(&event.event_type.as_str()) {
        return Err(DomainError::UnsupportedEventType(event.event_type.clone()));
    }
    let table_id = parse_table_id(&event.subject)?;

    let TableEventKind::OrderPlacedV1(data) = schemas.decode(&event.event_type, &event.payload)?
    else {
        return Err(DomainError::UnsupportedEventType(event.event_type.clone()));
    };

    let total_net_price_cents = sum_lines(&data.products, "totalNetPriceCents")?;
    let id = Uuid::try_parse(&data.order_id)
        .map_err(|_| ValidationErrors::single("orderId", "must be a valid UUID"))?;

    let order = Order {
        id,
        actor_id: event.actor_id,
        table_id,
        products: data.products,
        total_net_price_cents,
        placed_at: event.occurred_at,
    };
    order.validate()?;
    Ok(order)
}
