//! Command handlers for the table ledger.
//!
//! Each handler builds and validates the fact, then appends it. Validation
//! happens before the store is touched, so a rejected command writes nothing.

use jotti_core::clock::Clock;
use jotti_core::command::Command;
use jotti_core::error::DomainError;
use jotti_core::id::IdGenerator;
use jotti_core::repository::EventRepository;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::commands::{PlaceOrder, RegisterPayment};
use crate::domain::order::new_order_placed_event;
use crate::domain::payment::new_payment_registered_event;

/// Result of a successfully placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceOrderResult {
    /// The new order's identifier.
    pub order_id: Uuid,
    /// Store id of the `OrderPlaced` event.
    pub event_id: i64,
}

/// Result of a successfully registered payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterPaymentResult {
    /// The new payment's identifier.
    pub payment_id: Uuid,
    /// Store id of the `PaymentRegistered` event.
    pub event_id: i64,
}

fn log_failure(command: &dyn Command, table_id: i64, err: &DomainError) {
    if let DomainError::Validation(violations) = err {
        warn!(
            command = command.command_type(),
            correlation_id = %command.correlation_id(),
            actor_id = command.actor_id(),
            table_id,
            %violations,
            "command rejected"
        );
    } else {
        error!(
            command = command.command_type(),
            correlation_id = %command.correlation_id(),
            actor_id = command.actor_id(),
            table_id,
            retryable = err.is_retryable(),
            error = %err,
            "command failed"
        );
    }
}

/// Handles the `PlaceOrder` command: builds the `OrderPlaced` event and
/// appends it.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the command is invalid, or
/// `DomainError::Storage` if the append fails.
pub async fn handle_place_order(
    command: &PlaceOrder,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    repo: &dyn EventRepository,
) -> Result<PlaceOrderResult, DomainError> {
    let result = async {
        let (order_id, event) = new_order_placed_event(
            command.actor_id,
            command.table_id,
            command.products.clone(),
            ids,
            clock,
        )?;
        let event_id = repo.append(&event).await?;
        Ok::<_, DomainError>(PlaceOrderResult { order_id, event_id })
    }
    .await;

    match &result {
        Ok(placed) => info!(
            correlation_id = %command.correlation_id,
            table_id = command.table_id,
            order_id = %placed.order_id,
            event_id = placed.event_id,
            "order placed"
        ),
        Err(err) => log_failure(command, command.table_id, err),
    }
    result
}

/// Handles the `RegisterPayment` command: builds the `PaymentRegistered`
/// event and appends it.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the command is invalid, or
/// `DomainError::Storage` if the append fails.
pub async fn handle_register_payment(
    command: &RegisterPayment,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    repo: &dyn EventRepository,
) -> Result<RegisterPaymentResult, DomainError> {
    let result = async {
        let (payment_id, event) = new_payment_registered_event(
            command.actor_id,
            command.table_id,
            command.products.clone(),
            ids,
            clock,
        )?;
        let event_id = repo.append(&event).await?;
        Ok::<_, DomainError>(RegisterPaymentResult {
            payment_id,
            event_id,
        })
    }
    .await;

    match &result {
        Ok(registered) => info!(
            correlation_id = %command.correlation_id,
            table_id = command.table_id,
            payment_id = %registered.payment_id,
            event_id = registered.event_id,
            "payment registered"
        ),
        Err(err) => log_failure(command, command.table_id, err),
    }
    result
}

#[cfg(test)]
mod tests {
    use jotti_core::error::DomainError;
    use jotti_test_support::{
        FailingEventRepository, FixedClock, RecordingEventRepository, SequenceIdGenerator,
        fixed_now,
    };
    use uuid::Uuid;

    use super::*;
    use crate::domain::events::{ORDER_PLACED_V1, PAYMENT_REGISTERED_V1};
    use crate::domain::product_line::ProductLine;

    fn pizza(quantity: i64) -> ProductLine {
        ProductLine {
            product_id: 5,
            name: "Pizza Margherita".to_owned(),
            unit_price_cents: 500,
            quantity,
        }
    }

    fn place_order(products: Vec<ProductLine>) -> PlaceOrder {
        PlaceOrder {
            correlation_id: Uuid::new_v4(),
            actor_id: 1,
            table_id: 3,
            products,
        }
    }

    #[tokio::test]
    async fn test_handle_place_order_appends_one_event() {
        // Arrange
        let order_id = Uuid::new_v4();
        let ids = SequenceIdGenerator::new(vec![order_id]);
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::new(vec![]);

        // Act
        let result = handle_place_order(&place_order(vec![pizza(2)]), &clock, &ids, &repo)
            .await
            .unwrap();

        // Assert
        assert_eq!(result.order_id, order_id);
        assert_eq!(result.event_id, 1);
        let appended = repo.appended_events();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].event_type(), ORDER_PLACED_V1);
        assert_eq!(appended[0].subject(), "table:3");
        assert_eq!(appended[0].payload()["orderId"], order_id.to_string());
    }

    #[tokio::test]
    async fn test_handle_place_order_with_empty_products_appends_nothing() {
        let ids = SequenceIdGenerator::new(vec![Uuid::new_v4()]);
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::new(vec![]);

        let result = handle_place_order(&place_order(vec![]), &clock, &ids, &repo).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(repo.appended_events().is_empty());
    }

    #[tokio::test]
    async fn test_handle_place_order_surfaces_storage_errors() {
        let ids = SequenceIdGenerator::new(vec![Uuid::new_v4()]);
        let clock = FixedClock(fixed_now());

        let result =
            handle_place_order(&place_order(vec![pizza(1)]), &clock, &ids, &FailingEventRepository)
                .await;

        match result {
            Err(err @ DomainError::Storage(_)) => assert!(err.is_retryable()),
            other => panic!("expected Storage, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_register_payment_appends_one_event() {
        let payment_id = Uuid::new_v4();
        let ids = SequenceIdGenerator::new(vec![payment_id]);
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::new(vec![]);
        let command = RegisterPayment {
            correlation_id: Uuid::new_v4(),
            actor_id: 2,
            table_id: 3,
            products: vec![pizza(1)],
        };

        let result = handle_register_payment(&command, &clock, &ids, &repo)
            .await
            .unwrap();

        assert_eq!(result.payment_id, payment_id);
        let appended = repo.appended_events();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].event_type(), PAYMENT_REGISTERED_V1);
        assert_eq!(appended[0].actor_id(), 2);
    }

    #[tokio::test]
    async fn test_handle_register_payment_rejects_bad_table() {
        let ids = SequenceIdGenerator::new(vec![Uuid::new_v4()]);
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::new(vec![]);
        let command = RegisterPayment {
            correlation_id: Uuid::new_v4(),
            actor_id: 2,
            table_id: -1,
            products: vec![pizza(1)],
        };

        let result = handle_register_payment(&command, &clock, &ids, &repo).await;

        match result {
            Err(DomainError::Validation(errors)) => assert!(errors.has_field("tableId")),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert!(repo.appended_events().is_empty());
    }
}
