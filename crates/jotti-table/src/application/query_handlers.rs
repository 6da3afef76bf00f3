//! Query handlers for the table ledger.
//!
//! Each query fetches the table's stream from the store in id order and
//! replays it. Events that can no longer be decoded are logged loudly and
//! returned as errors.

use jotti_core::error::{DomainError, ValidationErrors};
use jotti_core::repository::{EventRepository, StoredEvent};
use tracing::{debug, error};

use crate::domain::events::{ORDER_PLACED_TYPES, PAYMENT_REGISTERED_TYPES};
use crate::domain::order::Order;
use crate::domain::payment::Payment;
use crate::domain::projection::{
    UnpaidProductLine, balance_from_events, orders_from_events, payments_from_events,
    unpaid_products_from_events,
};
use crate::domain::schema::SchemaRegistry;
use crate::domain::subject::table_subject;

fn check_table_id(table_id: i64) -> Result<(), DomainError> {
    if table_id < 1 {
        return Err(ValidationErrors::single("tableId", "must be at least 1").into());
    }
    Ok(())
}

async fn load_stream(
    table_id: i64,
    event_types: &[&str],
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    check_table_id(table_id)?;
    let events = repo
        .query_by_subject(&table_subject(table_id), event_types)
        .await?;
    debug!(table_id, events = events.len(), "replaying table stream");
    Ok(events)
}

/// Stored rows were validated when written, so a replay that fails
/// validation means the log is corrupt, not that the caller sent bad input.
fn report<T>(table_id: i64, result: Result<T, DomainError>) -> Result<T, DomainError> {
    let result = result.map_err(|err| match err {
        DomainError::Validation(violations) => DomainError::CorruptEvent(violations.to_string()),
        other => other,
    });
    if let Err(err) = &result
        && err.is_corruption()
    {
        error!(table_id, error = %err, "table stream cannot be replayed");
    }
    result
}

/// Returns every order placed at the table, in store order.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a non-positive table id,
/// `DomainError::Storage` if the store fails, or a decoding error if a stored
/// event is corrupt.
pub async fn get_orders(
    table_id: i64,
    schemas: &SchemaRegistry,
    repo: &dyn EventRepository,
) -> Result<Vec<Order>, DomainError> {
    let events = load_stream(table_id, ORDER_PLACED_TYPES, repo).await?;
    report(table_id, orders_from_events(&events, schemas))
}

/// Returns the table's balance in cents: the sum of all order totals.
///
/// # Errors
///
/// Same as [`get_orders`].
pub async fn get_balance(
    table_id: i64,
    schemas: &SchemaRegistry,
    repo: &dyn EventRepository,
) -> Result<i64, DomainError> {
    let events = load_stream(table_id, ORDER_PLACED_TYPES, repo).await?;
    report(table_id, balance_from_events(&events, schemas))
}

/// Returns every ordered product at the table, merged by product and unit
/// price.
///
/// # Errors
///
/// Same as [`get_orders`].
pub async fn get_unpaid_products(
    table_id: i64,
    schemas: &SchemaRegistry,
    repo: &dyn EventRepository,
) -> Result<Vec<UnpaidProductLine>, DomainError> {
    let events = load_stream(table_id, ORDER_PLACED_TYPES, repo).await?;
    report(table_id, unpaid_products_from_events(&events, schemas))
}

/// Returns every payment registered at the table, in store order.
///
/// # Errors
///
/// Same as [`get_orders`].
pub async fn get_payments(
    table_id: i64,
    schemas: &SchemaRegistry,
    repo: &dyn EventRepository,
) -> Result<Vec<Payment>, DomainError> {
    let events = load_stream(table_id, PAYMENT_REGISTERED_TYPES, repo).await?;
    report(table_id, payments_from_events(&events, schemas))
}

/// Returns a single stored event, for audit and debugging.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no event has this id, or
/// `DomainError::Storage` if the store fails.
pub async fn get_event(id: i64, repo: &dyn EventRepository) -> Result<StoredEvent, DomainError> {
    repo.read_by_id(id).await
}

#[cfg(test)]
mod tests {
    use jotti_core::event::NewEvent;
    use jotti_event_store::memory_event_repository::InMemoryEventRepository;
    use jotti_test_support::{
        FailingEventRepository, FixedClock, RecordingEventRepository, SequenceIdGenerator,
        fixed_now, stored_event,
    };
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::domain::events::ORDER_PLACED_V1;
    use crate::domain::order::new_order_placed_event;
    use crate::domain::payment::new_payment_registered_event;
    use crate::domain::product_line::ProductLine;

    fn line(product_id: i64, name: &str, unit_price_cents: i64, quantity: i64) -> ProductLine {
        ProductLine {
            product_id,
            name: name.to_owned(),
            unit_price_cents,
            quantity,
        }
    }

    fn scenario_lines() -> Vec<ProductLine> {
        vec![
            line(5, "Pizza Margherita", 500, 2),
            line(7, "Apfelschorle", 150, 1),
        ]
    }

    async fn append(repo: &InMemoryEventRepository, event: (Uuid, NewEvent)) {
        repo.append(&event.1).await.unwrap();
    }

    fn clock() -> FixedClock {
        FixedClock(fixed_now())
    }

    fn ids() -> SequenceIdGenerator {
        SequenceIdGenerator::new(vec![Uuid::new_v4()])
    }

    #[tokio::test]
    async fn test_table_scenario_replays_balance_and_unpaid_products() {
        // Arrange
        let schemas = SchemaRegistry::table_v1();
        let repo = InMemoryEventRepository::new();
        append(
            &repo,
            new_order_placed_event(1, 1, scenario_lines(), &ids(), &clock()).unwrap(),
        )
        .await;

        // Act / Assert
        assert_eq!(get_balance(1, &schemas, &repo).await.unwrap(), 1150);

        append(
            &repo,
            new_order_placed_event(1, 1, scenario_lines(), &ids(), &clock()).unwrap(),
        )
        .await;

        assert_eq!(get_balance(1, &schemas, &repo).await.unwrap(), 2300);
        let unpaid = get_unpaid_products(1, &schemas, &repo).await.unwrap();
        let keys: Vec<(i64, i64, i64)> = unpaid
            .iter()
            .map(|p| (p.product_id, p.unit_price_cents, p.quantity))
            .collect();
        assert_eq!(keys, vec![(5, 500, 4), (7, 150, 2)]);
        let orders = get_orders(1, &schemas, &repo).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_ne!(orders[0].id, orders[1].id);
    }

    #[tokio::test]
    async fn test_other_tables_are_not_included() {
        let schemas = SchemaRegistry::table_v1();
        let repo = InMemoryEventRepository::new();
        append(
            &repo,
            new_order_placed_event(1, 1, scenario_lines(), &ids(), &clock()).unwrap(),
        )
        .await;
        append(
            &repo,
            new_order_placed_event(1, 2, scenario_lines(), &ids(), &clock()).unwrap(),
        )
        .await;

        let orders = get_orders(2, &schemas, &repo).await.unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].table_id, 2);
    }

    #[tokio::test]
    async fn test_payments_are_listed_but_do_not_change_balance() {
        let schemas = SchemaRegistry::table_v1();
        let repo = InMemoryEventRepository::new();
        append(
            &repo,
            new_order_placed_event(1, 1, scenario_lines(), &ids(), &clock()).unwrap(),
        )
        .await;
        append(
            &repo,
            new_payment_registered_event(
                1,
                1,
                vec![line(5, "Pizza Margherita", 500, 2)],
                &ids(),
                &clock(),
            )
            .unwrap(),
        )
        .await;

        let payments = get_payments(1, &schemas, &repo).await.unwrap();
        let balance = get_balance(1, &schemas, &repo).await.unwrap();
        let unpaid = get_unpaid_products(1, &schemas, &repo).await.unwrap();

        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].total_payment_cents, 1000);
        assert_eq!(balance, 1150);
        assert_eq!(unpaid.len(), 2);
    }

    #[tokio::test]
    async fn test_queries_only_request_their_event_types() {
        let schemas = SchemaRegistry::table_v1();
        let repo = RecordingEventRepository::new(vec![]);

        get_balance(4, &schemas, &repo).await.unwrap();
        get_payments(4, &schemas, &repo).await.unwrap();

        assert_eq!(
            repo.queries(),
            vec![
                ("table:4".to_owned(), vec![ORDER_PLACED_V1.to_owned()]),
                (
                    "table:4".to_owned(),
                    vec!["table.payment-registered:v1".to_owned()]
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_non_positive_table_id_is_rejected_before_querying() {
        let schemas = SchemaRegistry::table_v1();
        let repo = RecordingEventRepository::new(vec![]);

        let result = get_orders(0, &schemas, &repo).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(repo.queries().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_stream_is_an_error() {
        let schemas = SchemaRegistry::table_v1();
        let repo = RecordingEventRepository::new(vec![stored_event(
            1,
            ORDER_PLACED_V1,
            "table:1",
            json!({"orderId": "not-a-uuid", "products": []}),
        )]);

        let result = get_balance(1, &schemas, &repo).await;

        match result {
            Err(DomainError::CorruptEvent(reason)) => assert!(reason.contains("orderId")),
            other => panic!("expected CorruptEvent, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_storage_failure_is_surfaced() {
        let schemas = SchemaRegistry::table_v1();

        let result = get_unpaid_products(1, &schemas, &FailingEventRepository).await;

        assert!(matches!(result, Err(DomainError::Storage(_))));
    }

    #[tokio::test]
    async fn test_get_event_reads_by_id() {
        let repo = InMemoryEventRepository::new();
        append(
            &repo,
            new_order_placed_event(6, 1, scenario_lines(), &ids(), &clock()).unwrap(),
        )
        .await;

        let event = get_event(1, &repo).await.unwrap();
        let missing = get_event(2, &repo).await;

        assert_eq!(event.actor_id, 6);
        assert_eq!(event.event_type, ORDER_PLACED_V1);
        assert!(matches!(missing, Err(DomainError::NotFound(2))));
    }
}
