//! Production lot service: lot creation with optional recipe consumption,
//! deletion guards and listings

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use shared::models::{ProductKind, ProductionLot};
use shared::validation::{consumption_for, packaged_unit_count};

use crate::error::{AppError, AppResult};
use crate::store::{NewLot, Store};

/// Lot service owning production lots
#[derive(Clone)]
pub struct LotService {
    store: Arc<dyn Store>,
}

/// Input for creating a production lot
#[derive(Debug, Deserialize)]
pub struct CreateLotInput {
    pub name: String,
    pub kind: ProductKind,
    pub recipe_id: Option<Uuid>,
    pub volume_liters: Decimal,
    pub unit_size_liters: Decimal,
}

impl LotService {
    /// Create a new LotService instance
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a lot. A brewed lot with a recipe consumes the recipe's
    /// ingredients proportionally to the produced volume; the stock debit
    /// and the lot record succeed or fail together.
    pub async fn create_lot(&self, input: CreateLotInput) -> AppResult<ProductionLot> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Lot name cannot be empty".to_string(),
            });
        }
        if input.volume_liters <= Decimal::ZERO {
            return Err(AppError::InvalidQuantity {
                field: "volume_liters".to_string(),
                message: "Volume must be positive".to_string(),
            });
        }
        if input.unit_size_liters <= Decimal::ZERO {
            return Err(AppError::InvalidQuantity {
                field: "unit_size_liters".to_string(),
                message: "Unit size must be positive".to_string(),
            });
        }

        let unit_count = packaged_unit_count(input.volume_liters, input.unit_size_liters)
            .ok_or_else(|| AppError::InvalidQuantity {
                field: "unit_size_liters".to_string(),
                message: "Unit count out of range".to_string(),
            })?;

        let plan = match (input.kind, input.recipe_id) {
            (ProductKind::Brewed, Some(recipe_id)) => {
                let recipe = self.store.get_recipe(recipe_id).await?;
                consumption_for(&recipe.ingredients, input.volume_liters)
            }
            _ => Vec::new(),
        };

        let lot = self
            .store
            .insert_lot(
                NewLot {
                    name: input.name,
                    kind: input.kind,
                    recipe_id: input.recipe_id,
                    volume_liters: input.volume_liters,
                    unit_size_liters: input.unit_size_liters,
                    unit_count,
                },
                &plan,
            )
            .await?;

        tracing::info!(
            lot = %lot.id,
            name = %lot.name,
            kind = lot.kind.as_str(),
            units = lot.unit_count,
            "production lot created"
        );
        Ok(lot)
    }

    /// Delete a lot; blocked once any units have been sold
    pub async fn delete(&self, lot_id: Uuid) -> AppResult<()> {
        self.store.delete_lot(lot_id).await?;
        tracing::info!(lot = %lot_id, "production lot deleted");
        Ok(())
    }

    pub async fn get(&self, lot_id: Uuid) -> AppResult<ProductionLot> {
        self.store.get_lot(lot_id).await
    }

    /// All lots, newest first
    pub async fn list(&self) -> AppResult<Vec<ProductionLot>> {
        self.store.list_lots().await
    }
}
