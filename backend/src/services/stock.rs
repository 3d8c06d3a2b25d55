//! Stock ledger service: intake, credit/debit, deletion guards and the
//! low-stock view

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use shared::models::StockItem;
use shared::types::to_canonical;
use shared::validation::below_threshold;

use crate::error::{AppError, AppResult};
use crate::store::{NewStockItem, Store};

/// Stock service owning stock item balances
#[derive(Clone)]
pub struct StockService {
    store: Arc<dyn Store>,
}

/// Input for creating a stock item.
///
/// Quantity and alert threshold are interpreted in the same input unit and
/// normalized together.
#[derive(Debug, Deserialize)]
pub struct CreateStockItemInput {
    pub name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub supplier: Option<String>,
    pub alert_threshold: Decimal,
}

/// Input for crediting or debiting a stock item, canonical units
#[derive(Debug, Deserialize)]
pub struct AdjustStockInput {
    pub amount: Decimal,
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Record a stock intake, normalizing quantity and threshold to
    /// canonical units
    pub async fn create_item(&self, input: CreateStockItemInput) -> AppResult<StockItem> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Stock item name cannot be empty".to_string(),
            });
        }
        if input.quantity < Decimal::ZERO {
            return Err(AppError::InvalidQuantity {
                field: "quantity".to_string(),
                message: "Initial quantity cannot be negative".to_string(),
            });
        }
        if input.alert_threshold < Decimal::ZERO {
            return Err(AppError::InvalidQuantity {
                field: "alert_threshold".to_string(),
                message: "Alert threshold cannot be negative".to_string(),
            });
        }

        let (quantity, unit) = to_canonical(input.quantity, &input.unit);
        let (alert_threshold, _) = to_canonical(input.alert_threshold, &input.unit);

        let item = self
            .store
            .insert_stock_item(NewStockItem {
                name: input.name,
                quantity,
                unit,
                supplier: input.supplier,
                alert_threshold,
            })
            .await?;

        tracing::info!(item = %item.id, name = %item.name, "stock item created");
        Ok(item)
    }

    /// Add stock, amount in canonical units
    pub async fn credit(&self, item_id: Uuid, amount: Decimal) -> AppResult<StockItem> {
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidQuantity {
                field: "amount".to_string(),
                message: "Credit amount must be positive".to_string(),
            });
        }
        self.store.credit_stock(item_id, amount).await
    }

    /// Remove stock, amount in canonical units; fails without mutating when
    /// the balance would go negative
    pub async fn debit(&self, item_id: Uuid, amount: Decimal) -> AppResult<StockItem> {
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidQuantity {
                field: "amount".to_string(),
                message: "Debit amount must be positive".to_string(),
            });
        }
        self.store.debit_stock(item_id, amount).await
    }

    /// Delete a stock item; blocked while any recipe ingredient references it
    pub async fn delete(&self, item_id: Uuid) -> AppResult<()> {
        self.store.delete_stock_item(item_id).await?;
        tracing::info!(item = %item_id, "stock item deleted");
        Ok(())
    }

    pub async fn get(&self, item_id: Uuid) -> AppResult<StockItem> {
        self.store.get_stock_item(item_id).await
    }

    /// All stock items in creation order
    pub async fn list(&self) -> AppResult<Vec<StockItem>> {
        self.store.list_stock_items().await
    }

    /// Items at or below their alert threshold, creation order
    pub async fn low_stock(&self) -> AppResult<Vec<StockItem>> {
        let items = self.store.list_stock_items().await?;
        Ok(below_threshold(&items).into_iter().cloned().collect())
    }
}
