//! HTTP API handlers for the order index

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::Order;
use crate::error::TradingError;
use crate::metrics::MetricsSnapshot;
use crate::service::{PlaceOrderRequest, TradingService};
use common::OrderId;

/// State for the order API - uses Arc for Clone
pub struct ApiState<S: ?Sized> {
    pub service: Arc<S>,
}

impl<S: TradingService + ?Sized> Clone for ApiState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

/// Convenience type for dynamic dispatch
pub type DynApiState = ApiState<dyn TradingService>;

/// Error wrapper mapping [`TradingError`] onto HTTP responses
///
/// Invalid orders become 400, unknown ids become 404, both with a
/// `{"error", "message"}` JSON body.
#[derive(Debug)]
pub struct ApiError(TradingError);

impl From<TradingError> for ApiError {
    fn from(err: TradingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            TradingError::InvalidOrder(_) => (StatusCode::BAD_REQUEST, "invalid_order"),
            TradingError::OrderNotFound(_) => (StatusCode::NOT_FOUND, "order_not_found"),
        };
        let body = Json(serde_json::json!({
            "error": code,
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}

/// Place a new order
pub async fn place_order<S: TradingService + 'static + ?Sized>(
    State(state): State<ApiState<S>>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = state.service.place_order(request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Cancel a live order by id
pub async fn cancel_order<S: TradingService + 'static + ?Sized>(
    State(state): State<ApiState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, ApiError> {
    let order = state.service.cancel_order(OrderId::from_uuid(id)).await?;
    Ok(Json(order))
}

/// List all live orders
pub async fn list_orders<S: TradingService + 'static + ?Sized>(
    State(state): State<ApiState<S>>,
) -> Json<Vec<Order>> {
    Json(state.service.all_orders().await)
}

/// List orders currently part of a match
pub async fn list_matched<S: TradingService + 'static + ?Sized>(
    State(state): State<ApiState<S>>,
) -> Json<Vec<Order>> {
    Json(state.service.matched_orders().await)
}

/// List live orders not currently part of a match
pub async fn list_unmatched<S: TradingService + 'static + ?Sized>(
    State(state): State<ApiState<S>>,
) -> Json<Vec<Order>> {
    Json(state.service.unmatched_orders().await)
}

/// Engine counters as JSON
pub async fn engine_metrics<S: TradingService + 'static + ?Sized>(
    State(state): State<ApiState<S>>,
) -> Json<MetricsSnapshot> {
    Json(state.service.metrics().await)
}

/// Health check
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "matchbook"
    }))
}
