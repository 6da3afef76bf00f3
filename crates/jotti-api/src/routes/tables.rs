//! Routes for the table ledger: placing orders, registering payments and
//! replaying a table's stream.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use jotti_table::application::{command_handlers, query_handlers};
use jotti_table::domain::commands::{PlaceOrder, RegisterPayment};
use jotti_table::domain::order::Order;
use jotti_table::domain::payment::Payment;
use jotti_table::domain::product_line::ProductLine;
use jotti_table::domain::projection::UnpaidProductLine;

use crate::error::ApiError;
use crate::extract::{JsonBody, PathParams};
use crate::state::AppState;

/// Request body for POST /{tableId}/orders and POST /{tableId}/payments.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLinesRequest {
    /// The user on whose behalf the fact is recorded.
    pub actor_id: i64,
    /// The product lines.
    pub products: Vec<ProductLine>,
}

/// Response body for a placed order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    /// The new order's identifier.
    pub order_id: Uuid,
    /// Store id of the recorded event.
    pub event_id: i64,
}

/// Response body for a registered payment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPaymentResponse {
    /// The new payment's identifier.
    pub payment_id: Uuid,
    /// Store id of the recorded event.
    pub event_id: i64,
}

/// Response body for GET /{tableId}/orders.
#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    /// Orders in the order they were placed.
    pub orders: Vec<Order>,
}

/// Response body for GET /{tableId}/balance.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    /// Sum of every order's net price.
    pub balance_cents: i64,
}

/// Response body for GET /{tableId}/unpaid-products.
#[derive(Debug, Serialize)]
pub struct UnpaidProductsResponse {
    /// Ordered products merged by product and unit price.
    pub products: Vec<UnpaidProductLine>,
}

/// Response body for GET /{tableId}/payments.
#[derive(Debug, Serialize)]
pub struct PaymentsResponse {
    /// Payments in the order they were registered.
    pub payments: Vec<Payment>,
}

/// POST /{tableId}/orders
#[instrument(skip(state, request), fields(actor_id = request.actor_id))]
async fn place_order(
    State(state): State<AppState>,
    PathParams(table_id): PathParams<i64>,
    JsonBody(request): JsonBody<ProductLinesRequest>,
) -> Result<(StatusCode, Json<PlaceOrderResponse>), ApiError> {
    let command = PlaceOrder {
        correlation_id: Uuid::new_v4(),
        actor_id: request.actor_id,
        table_id,
        products: request.products,
    };

    debug!(correlation_id = %command.correlation_id, "handling place_order command");

    let placed = command_handlers::handle_place_order(
        &command,
        state.clock.as_ref(),
        state.ids.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(PlaceOrderResponse {
            order_id: placed.order_id,
            event_id: placed.event_id,
        }),
    ))
}

/// POST /{tableId}/payments
#[instrument(skip(state, request), fields(actor_id = request.actor_id))]
async fn register_payment(
    State(state): State<AppState>,
    PathParams(table_id): PathParams<i64>,
    JsonBody(request): JsonBody<ProductLinesRequest>,
) -> Result<(StatusCode, Json<RegisterPaymentResponse>), ApiError> {
    let command = RegisterPayment {
        correlation_id: Uuid::new_v4(),
        actor_id: request.actor_id,
        table_id,
        products: request.products,
    };

    debug!(correlation_id = %command.correlation_id, "handling register_payment command");

    let registered = command_handlers::handle_register_payment(
        &command,
        state.clock.as_ref(),
        state.ids.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterPaymentResponse {
            payment_id: registered.payment_id,
            event_id: registered.event_id,
        }),
    ))
}

/// GET /{tableId}/orders
#[instrument(skip(state))]
async fn list_orders(
    State(state): State<AppState>,
    PathParams(table_id): PathParams<i64>,
) -> Result<Json<OrdersResponse>, ApiError> {
    let orders =
        query_handlers::get_orders(table_id, &state.schemas, &*state.event_repository).await?;
    Ok(Json(OrdersResponse { orders }))
}

/// GET /{tableId}/balance
#[instrument(skip(state))]
async fn balance(
    State(state): State<AppState>,
    PathParams(table_id): PathParams<i64>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance_cents =
        query_handlers::get_balance(table_id, &state.schemas, &*state.event_repository).await?;
    Ok(Json(BalanceResponse { balance_cents }))
}

/// GET /{tableId}/unpaid-products
#[instrument(skip(state))]
async fn unpaid_products(
    State(state): State<AppState>,
    PathParams(table_id): PathParams<i64>,
) -> Result<Json<UnpaidProductsResponse>, ApiError> {
    let products =
        query_handlers::get_unpaid_products(table_id, &state.schemas, &*state.event_repository)
            .await?;
    Ok(Json(UnpaidProductsResponse { products }))
}

/// GET /{tableId}/payments
#[instrument(skip(state))]
async fn list_payments(
    State(state): State<AppState>,
    PathParams(table_id): PathParams<i64>,
) -> Result<Json<PaymentsResponse>, ApiError> {
    let payments =
        query_handlers::get_payments(table_id, &state.schemas, &*state.event_repository).await?;
    Ok(Json(PaymentsResponse { payments }))
}

/// Returns the router for the table ledger.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{table_id}/orders", get(list_orders).post(place_order))
        .route("/{table_id}/payments", get(list_payments).post(register_payment))
        .route("/{table_id}/balance", get(balance))
        .route("/{table_id}/unpaid-products", get(unpaid_products))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use jotti_core::repository::EventRepository;
    use jotti_table::domain::schema::SchemaRegistry;
    use jotti_test_support::{
        FailingEventRepository, FixedClock, RecordingEventRepository, SequenceIdGenerator,
        fixed_now,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn app_state_with(event_repository: Arc<dyn EventRepository>) -> AppState {
        AppState::new(
            Arc::new(FixedClock(fixed_now())),
            Arc::new(SequenceIdGenerator::new(vec![Uuid::new_v4()])),
            event_repository,
            SchemaRegistry::table_v1(),
        )
    }

    fn order_body() -> Value {
        serde_json::json!({
            "actorId": 1,
            "products": [
                {"productId": 5, "name": "Pizza Margherita", "unitPriceCents": 500, "quantity": 2}
            ]
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_place_order_returns_201_with_ids() {
        // Arrange
        let repo = Arc::new(RecordingEventRepository::new(vec![]));
        let app = router().with_state(app_state_with(repo.clone()));

        // Act
        let (status, json) = send(app, post("/7/orders", &order_body())).await;

        // Assert
        assert_eq!(status, StatusCode::CREATED);
        assert!(json["orderId"].is_string());
        assert_eq!(json["eventId"], 1);
        assert_eq!(repo.appended_events()[0].subject(), "table:7");
    }

    #[tokio::test]
    async fn test_place_order_with_failing_repo_returns_503() {
        let app = router().with_state(app_state_with(Arc::new(FailingEventRepository)));

        let (status, json) = send(app, post("/7/orders", &order_body())).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "storage_unavailable");
    }

    #[tokio::test]
    async fn test_balance_of_empty_table_is_zero() {
        let app = router().with_state(app_state_with(Arc::new(RecordingEventRepository::new(
            vec![],
        ))));
        let request = Request::builder()
            .uri("/7/balance")
            .body(Body::empty())
            .unwrap();

        let (status, json) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["balanceCents"], 0);
    }
}
