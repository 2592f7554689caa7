use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use std::sync::Arc;
use tracing::debug;

use crate::application::{CreateOrderCommand, TradingService};
use crate::domain::{AccountId, Direction, OrderId, OrderType, StockCode};
use crate::presentation::rest::{ApiError, dto::*};

use super::AppState;

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /api/v1/accounts/{account_id}/balance
pub async fn get_account_balance<T: TradingService>(
    State(state): State<Arc<AppState<T>>>,
    account_id: Result<Path<AccountId>, PathRejection>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let Path(account_id) = account_id.map_err(|_| ApiError::bad_request("invalid account ID"))?;

    let balance = state.service.get_account_balance(account_id).await?;
    Ok(Json(balance.into()))
}

/// GET /api/v1/accounts/{account_id}/holdings
pub async fn get_account_holdings<T: TradingService>(
    State(state): State<Arc<AppState<T>>>,
    account_id: Result<Path<AccountId>, PathRejection>,
) -> Result<Json<Vec<HoldingResponse>>, ApiError> {
    let Path(account_id) = account_id.map_err(|_| ApiError::bad_request("invalid account ID"))?;

    let holdings = state.service.get_account_holdings(account_id).await?;
    Ok(Json(holdings.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/orders
pub async fn create_order<T: TradingService>(
    State(state): State<Arc<AppState<T>>>,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let Json(req) = body.map_err(|e| {
        debug!(error = %e, "rejected order body");
        ApiError::invalid_body()
    })?;

    // Parse request
    let direction = Direction::try_from(req.direction.as_str())
        .map_err(|_| ApiError::invalid_parameter("direction", "must be BUY or SELL"))?;

    let order_type = OrderType::try_from(req.order_type.as_str())
        .map_err(|_| ApiError::invalid_parameter("type", "must be MARKET or LIMIT"))?;

    let stock_code = StockCode::new(&req.stock_code)
        .map_err(|e| ApiError::invalid_parameter("stock_code", e))?;

    let command = CreateOrderCommand::new(
        req.account_id,
        stock_code,
        order_type,
        direction,
        req.quantity,
        req.price,
    )?;

    let order = state.service.create_order(command).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// DELETE /api/v1/orders/{order_id}
pub async fn cancel_order<T: TradingService>(
    State(state): State<Arc<AppState<T>>>,
    order_id: Result<Path<OrderId>, PathRejection>,
) -> Result<Json<OrderResponse>, ApiError> {
    let Path(order_id) = order_id.map_err(|_| ApiError::bad_request("invalid order ID"))?;

    let order = state.service.cancel_order(order_id).await?;
    Ok(Json(order.into()))
}
