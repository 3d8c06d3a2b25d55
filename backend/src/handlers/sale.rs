//! HTTP handlers for sale endpoints

use axum::{extract::State, Json};

use shared::models::Sale;

use crate::error::AppResult;
use crate::services::sale::{RecordSaleInput, SaleService};
use crate::AppState;

use super::lot::LotResponse;

/// List all sales, newest first
pub async fn list_sales(State(state): State<AppState>) -> AppResult<Json<Vec<Sale>>> {
    let service = SaleService::new(state.store.clone());
    let sales = service.list_sales().await?;
    Ok(Json(sales))
}

/// Record a sale against a lot
pub async fn record_sale(
    State(state): State<AppState>,
    Json(input): Json<RecordSaleInput>,
) -> AppResult<Json<Sale>> {
    let service = SaleService::new(state.store.clone());
    let sale = service.record_sale(input).await?;
    Ok(Json(sale))
}

/// List lots that still have units to sell, newest first
pub async fn list_open_lots(State(state): State<AppState>) -> AppResult<Json<Vec<LotResponse>>> {
    let service = SaleService::new(state.store.clone());
    let lots = service.open_lots().await?;
    Ok(Json(lots.into_iter().map(Into::into).collect()))
}
