//! Projections over a table's event stream.
//!
//! Every function here is a pure fold over an already fetched, id-ordered
//! slice of events. There is no cached view: callers replay from the store
//! on every query. Any event that fails to decode aborts the whole
//! projection; nothing is skipped.

use std::collections::HashMap;

use jotti_core::error::{DomainError, ValidationErrors};
use jotti_core::repository::StoredEvent;
use serde::Serialize;

use super::order::{Order, build_order_from_event};
use super::payment::{Payment, build_payment_from_event};
use super::schema::SchemaRegistry;

/// A product aggregated over every order placed at a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpaidProductLine {
    /// Product identifier.
    pub product_id: i64,
    /// Name on the first line that created this entry.
    pub name: String,
    /// Unit price shared by every merged line.
    pub unit_price_cents: i64,
    /// Total quantity over every merged line.
    pub quantity: i64,
}

/// Rebuilds every order in store order.
///
/// # Errors
///
/// Returns the first error raised by [`build_order_from_event`].
pub fn orders_from_events(
    events: &[StoredEvent],
    schemas: &SchemaRegistry,
) -> Result<Vec<Order>, DomainError> {
    events
        .iter()
        .map(|event| build_order_from_event(event, schemas))
        .collect()
}

/// Rebuilds every payment in store order.
///
/// # Errors
///
/// Returns the first error raised by [`build_payment_from_event`].
pub fn payments_from_events(
    events: &[StoredEvent],
    schemas: &SchemaRegistry,
) -> Result<Vec<Payment>, DomainError> {
    events
        .iter()
        .map(|event| build_payment_from_event(event, schemas))
        .collect()
}

/// Sums the net price of every order.
///
/// Payments are not subtracted.
///
/// # Errors
///
/// Returns a decoding error, or `DomainError::Validation` on `balanceCents`
/// if the sum overflows.
pub fn balance_from_events(
    events: &[StoredEvent],
    schemas: &SchemaRegistry,
) -> Result<i64, DomainError> {
    let mut balance: i64 = 0;
    for event in events {
        let order = build_order_from_event(event, schemas)?;
        balance = balance
            .checked_add(order.total_net_price_cents)
            .ok_or_else(|| ValidationErrors::single("balanceCents", "balance overflows"))?;
    }
    Ok(balance)
}

/// Aggregates every ordered line by `(product_id, unit_price_cents)`.
///
/// Lines with the same key add their quantities. The same product at a
/// different price stays a separate entry. Entries appear in the order their
/// key was first seen.
///
/// # Errors
///
/// Returns a decoding error, or `DomainError::Validation` if a merged
/// quantity overflows.
pub fn unpaid_products_from_events(
    events: &[StoredEvent],
    schemas: &SchemaRegistry,
) -> Result<Vec<UnpaidProductLine>, DomainError> {
    let mut lines: Vec<UnpaidProductLine> = Vec::new();
    let mut index: HashMap<(i64, i64), usize> = HashMap::new();

    for event in events {
        let order = build_order_from_event(event, schemas)?;
        for product in order.products {
            let key = (product.product_id, product.unit_price_cents);
            if let Some(&slot) = index.get(&key) {
                let entry = &mut lines[slot];
                entry.quantity = entry
                    .quantity
                    .checked_add(product.quantity)
                    .ok_or_else(|| ValidationErrors::single("quantity", "quantity overflows"))?;
            } else {
                index.insert(key, lines.len());
                lines.push(UnpaidProductLine {
                    product_id: product.product_id,
                    name: product.name,
                    unit_price_cents: product.unit_price_cents,
                    quantity: product.quantity,
                });
            }
        }
    }
    Ok(lines)
}
