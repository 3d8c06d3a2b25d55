//! HTTP handlers for production lot endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use shared::models::ProductionLot;

use crate::error::AppResult;
use crate::services::lot::{CreateLotInput, LotService};
use crate::AppState;

/// Production lot with its derived remaining-unit count
#[derive(Debug, serde::Serialize)]
pub struct LotResponse {
    #[serde(flatten)]
    pub lot: ProductionLot,
    pub remaining_units: i32,
}

impl From<ProductionLot> for LotResponse {
    fn from(lot: ProductionLot) -> Self {
        let remaining_units = lot.remaining_units();
        Self {
            lot,
            remaining_units,
        }
    }
}

/// List all lots, newest first
pub async fn list_lots(State(state): State<AppState>) -> AppResult<Json<Vec<LotResponse>>> {
    let service = LotService::new(state.store.clone());
    let lots = service.list().await?;
    Ok(Json(lots.into_iter().map(Into::into).collect()))
}

/// Create a production lot, consuming recipe ingredients when applicable
pub async fn create_lot(
    State(state): State<AppState>,
    Json(input): Json<CreateLotInput>,
) -> AppResult<Json<LotResponse>> {
    let service = LotService::new(state.store.clone());
    let lot = service.create_lot(input).await?;
    Ok(Json(lot.into()))
}

/// Delete a lot that has no recorded sales
pub async fn delete_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = LotService::new(state.store.clone());
    service.delete(lot_id).await?;
    Ok(Json(()))
}
