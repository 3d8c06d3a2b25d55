//! Sales ledger service: sale recording against lot unit counters and
//! read-only sale/open-lot projections

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use shared::models::{ProductionLot, Sale};

use crate::error::{AppError, AppResult};
use crate::store::{NewSale, Store};

/// Sale service owning sale records
#[derive(Clone)]
pub struct SaleService {
    store: Arc<dyn Store>,
}

/// Input for recording a sale
#[derive(Debug, Deserialize)]
pub struct RecordSaleInput {
    pub lot_id: Uuid,
    pub client: String,
    pub units: i32,
    pub unit_price: Decimal,
}

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Record a sale against a lot. The remaining-units check, the sale
    /// record and the sold-unit increment are one atomic store operation.
    pub async fn record_sale(&self, input: RecordSaleInput) -> AppResult<Sale> {
        if input.client.trim().is_empty() {
            return Err(AppError::Validation {
                field: "client".to_string(),
                message: "Client cannot be empty".to_string(),
            });
        }
        if input.units <= 0 {
            return Err(AppError::InvalidQuantity {
                field: "units".to_string(),
                message: "Units sold must be positive".to_string(),
            });
        }
        if input.unit_price < Decimal::ZERO {
            return Err(AppError::InvalidQuantity {
                field: "unit_price".to_string(),
                message: "Unit price cannot be negative".to_string(),
            });
        }

        let sale = self
            .store
            .insert_sale(NewSale {
                lot_id: input.lot_id,
                client: input.client,
                units: input.units,
                unit_price: input.unit_price,
            })
            .await?;

        tracing::info!(
            sale = %sale.id,
            lot = %sale.lot_id,
            units = sale.units,
            "sale recorded"
        );
        Ok(sale)
    }

    /// All sales, newest first
    pub async fn list_sales(&self) -> AppResult<Vec<Sale>> {
        self.store.list_sales().await
    }

    /// Lots that still have units to sell, newest first
    pub async fn open_lots(&self) -> AppResult<Vec<ProductionLot>> {
        self.store.list_open_lots().await
    }
}
