//! Commands for the table ledger.

use jotti_core::command::Command;
use uuid::Uuid;

use super::product_line::ProductLine;

/// Command to place an order at a table.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user placing the order.
    pub actor_id: i64,
    /// The table identifier.
    pub table_id: i64,
    /// The ordered product lines.
    pub products: Vec<ProductLine>,
}

impl Command for PlaceOrder {
    fn command_type(&self) -> &'static str {
        "table.place_order"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor_id(&self) -> i64 {
        self.actor_id
    }
}

/// Command to register a payment at a table.
#[derive(Debug, Clone)]
pub struct RegisterPayment {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user registering the payment.
    pub actor_id: i64,
    /// The table identifier.
    pub table_id: i64,
    /// The paid product lines.
    pub products: Vec<ProductLine>,
}

impl Command for RegisterPayment {
    fn command_type(&self) -> &'static str {
        "table.register_payment"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor_id(&self) -> i64 {
        self.actor_id
    }
}
