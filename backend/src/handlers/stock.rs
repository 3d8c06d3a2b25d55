//! HTTP handlers for stock endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::models::StockItem;
use shared::types::to_display;

use crate::error::AppResult;
use crate::services::stock::{AdjustStockInput, CreateStockItemInput, StockService};
use crate::AppState;

/// Stock item with its display-unit rendering
#[derive(Debug, serde::Serialize)]
pub struct StockItemResponse {
    #[serde(flatten)]
    pub item: StockItem,
    pub display_quantity: Decimal,
    pub display_unit: &'static str,
}

impl From<StockItem> for StockItemResponse {
    fn from(item: StockItem) -> Self {
        let (display_quantity, display_unit) = to_display(item.quantity, item.unit);
        Self {
            item,
            display_quantity,
            display_unit,
        }
    }
}

/// List all stock items
pub async fn list_stock(State(state): State<AppState>) -> AppResult<Json<Vec<StockItemResponse>>> {
    let service = StockService::new(state.store.clone());
    let items = service.list().await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// Create a stock item
pub async fn create_stock_item(
    State(state): State<AppState>,
    Json(input): Json<CreateStockItemInput>,
) -> AppResult<Json<StockItemResponse>> {
    let service = StockService::new(state.store.clone());
    let item = service.create_item(input).await?;
    Ok(Json(item.into()))
}

/// Delete a stock item
pub async fn delete_stock_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = StockService::new(state.store.clone());
    service.delete(item_id).await?;
    Ok(Json(()))
}

/// Add stock to an item
pub async fn credit_stock(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<Json<StockItemResponse>> {
    let service = StockService::new(state.store.clone());
    let item = service.credit(item_id, input.amount).await?;
    Ok(Json(item.into()))
}

/// Remove stock from an item
pub async fn debit_stock(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<Json<StockItemResponse>> {
    let service = StockService::new(state.store.clone());
    let item = service.debit(item_id, input.amount).await?;
    Ok(Json(item.into()))
}

/// List items at or below their alert threshold
pub async fn list_stock_alerts(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<StockItemResponse>>> {
    let service = StockService::new(state.store.clone());
    let items = service.low_stock().await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}
