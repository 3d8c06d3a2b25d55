//! PostgreSQL store
//!
//! Check-then-mutate sequences (debit, consumption, sale recording, guarded
//! deletes) run inside a transaction with `SELECT ... FOR UPDATE` row locks,
//! so concurrent callers serialize per affected row.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::models::{
    IngredientDraw, ProductKind, ProductionLot, Recipe, RecipeIngredient, RecipeWithIngredients,
    Sale, StockItem,
};
use shared::types::Unit;

use crate::error::{AppError, AppResult};

use super::{NewLot, NewSale, NewStockItem, Store};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

type StockRow = (
    Uuid,
    String,
    Decimal,
    String,
    Option<String>,
    Decimal,
    DateTime<Utc>,
);

type LotRow = (
    Uuid,
    String,
    String,
    Option<Uuid>,
    Decimal,
    Decimal,
    i32,
    i32,
    DateTime<Utc>,
);

type SaleRow = (Uuid, Uuid, String, i32, Decimal, DateTime<Utc>);

const STOCK_COLUMNS: &str = "id, name, quantity, unit, supplier, alert_threshold, created_at";
const LOT_COLUMNS: &str = "id, name, kind, recipe_id, volume_liters, unit_size_liters, \
                           unit_count, units_sold, created_at";
const SALE_COLUMNS: &str = "id, lot_id, client, units, unit_price, created_at";

fn stock_from_row(row: StockRow) -> AppResult<StockItem> {
    let unit = Unit::from_str(&row.3)
        .ok_or_else(|| AppError::Internal(format!("unknown stored unit: {}", row.3)))?;
    Ok(StockItem {
        id: row.0,
        name: row.1,
        quantity: row.2,
        unit,
        supplier: row.4,
        alert_threshold: row.5,
        created_at: row.6,
    })
}

fn lot_from_row(row: LotRow) -> AppResult<ProductionLot> {
    let kind = ProductKind::from_str(&row.2)
        .ok_or_else(|| AppError::Internal(format!("unknown stored product kind: {}", row.2)))?;
    Ok(ProductionLot {
        id: row.0,
        name: row.1,
        kind,
        recipe_id: row.3,
        volume_liters: row.4,
        unit_size_liters: row.5,
        unit_count: row.6,
        units_sold: row.7,
        created_at: row.8,
    })
}

fn sale_from_row(row: SaleRow) -> Sale {
    Sale {
        id: row.0,
        lot_id: row.1,
        client: row.2,
        units: row.3,
        unit_price: row.4,
        created_at: row.5,
    }
}

/// Lock every plan line, validate all of them, then debit. The first
/// under-stocked item aborts the transaction before any quantity changes.
async fn consume_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    plan: &[IngredientDraw],
) -> AppResult<()> {
    for draw in plan {
        let (name, quantity) = sqlx::query_as::<_, (String, Decimal)>(
            "SELECT name, quantity FROM stock_items WHERE id = $1 FOR UPDATE",
        )
        .bind(draw.stock_item_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;

        if quantity < draw.required {
            return Err(AppError::InsufficientStock(name));
        }
    }

    for draw in plan {
        sqlx::query("UPDATE stock_items SET quantity = quantity - $1 WHERE id = $2")
            .bind(draw.required)
            .bind(draw.stock_item_id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

/// Insert ingredient rows for a recipe, preserving list order
async fn insert_ingredients_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    ingredients: &[(Uuid, Decimal)],
) -> AppResult<Vec<RecipeIngredient>> {
    let mut rows = Vec::with_capacity(ingredients.len());
    for (position, (stock_item_id, rate_per_liter)) in ingredients.iter().enumerate() {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM stock_items WHERE id = $1)",
        )
        .bind(stock_item_id)
        .fetch_one(&mut **tx)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Stock item".to_string()));
        }

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, stock_item_id, rate_per_liter, position)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(recipe_id)
        .bind(stock_item_id)
        .bind(rate_per_liter)
        .bind(position as i32)
        .fetch_one(&mut **tx)
        .await?;

        rows.push(RecipeIngredient {
            id,
            recipe_id,
            stock_item_id: *stock_item_id,
            rate_per_liter: *rate_per_liter,
        });
    }
    Ok(rows)
}

impl PgStore {
    /// Create a new PgStore instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn fetch_ingredients(&self, recipe_id: Uuid) -> AppResult<Vec<RecipeIngredient>> {
        let rows = sqlx::query_as::<_, (Uuid, Uuid, Uuid, Decimal)>(
            r#"
            SELECT id, recipe_id, stock_item_id, rate_per_liter
            FROM recipe_ingredients
            WHERE recipe_id = $1
            ORDER BY position
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| RecipeIngredient {
                id: r.0,
                recipe_id: r.1,
                stock_item_id: r.2,
                rate_per_liter: r.3,
            })
            .collect())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn insert_stock_item(&self, new: NewStockItem) -> AppResult<StockItem> {
        let row = sqlx::query_as::<_, StockRow>(&format!(
            r#"
            INSERT INTO stock_items (name, quantity, unit, supplier, alert_threshold)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            STOCK_COLUMNS
        ))
        .bind(&new.name)
        .bind(new.quantity)
        .bind(new.unit.as_str())
        .bind(&new.supplier)
        .bind(new.alert_threshold)
        .fetch_one(&self.db)
        .await?;

        stock_from_row(row)
    }

    async fn get_stock_item(&self, id: Uuid) -> AppResult<StockItem> {
        let row = sqlx::query_as::<_, StockRow>(&format!(
            "SELECT {} FROM stock_items WHERE id = $1",
            STOCK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;

        stock_from_row(row)
    }

    async fn list_stock_items(&self) -> AppResult<Vec<StockItem>> {
        let rows = sqlx::query_as::<_, StockRow>(&format!(
            "SELECT {} FROM stock_items ORDER BY created_at, id",
            STOCK_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(stock_from_row).collect()
    }

    async fn credit_stock(&self, id: Uuid, amount: Decimal) -> AppResult<StockItem> {
        let row = sqlx::query_as::<_, StockRow>(&format!(
            r#"
            UPDATE stock_items
            SET quantity = quantity + $1
            WHERE id = $2
            RETURNING {}
            "#,
            STOCK_COLUMNS
        ))
        .bind(amount)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;

        stock_from_row(row)
    }

    async fn debit_stock(&self, id: Uuid, amount: Decimal) -> AppResult<StockItem> {
        let mut tx = self.db.begin().await?;

        let (name, quantity) = sqlx::query_as::<_, (String, Decimal)>(
            "SELECT name, quantity FROM stock_items WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;

        if quantity < amount {
            return Err(AppError::InsufficientStock(name));
        }

        let row = sqlx::query_as::<_, StockRow>(&format!(
            r#"
            UPDATE stock_items
            SET quantity = quantity - $1
            WHERE id = $2
            RETURNING {}
            "#,
            STOCK_COLUMNS
        ))
        .bind(amount)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        stock_from_row(row)
    }

    async fn delete_stock_item(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let name = sqlx::query_scalar::<_, String>(
            "SELECT name FROM stock_items WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;

        let in_use = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM recipe_ingredients WHERE stock_item_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if in_use {
            return Err(AppError::ItemInUse(name));
        }

        sqlx::query("DELETE FROM stock_items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn insert_recipe(
        &self,
        name: &str,
        ingredients: &[(Uuid, Decimal)],
    ) -> AppResult<RecipeWithIngredients> {
        let mut tx = self.db.begin().await?;

        let (id, created_at) = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            "INSERT INTO recipes (name) VALUES ($1) RETURNING id, created_at",
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        let rows = insert_ingredients_in_tx(&mut tx, id, ingredients).await?;

        tx.commit().await?;

        Ok(RecipeWithIngredients {
            recipe: Recipe {
                id,
                name: name.to_string(),
                created_at,
            },
            ingredients: rows,
        })
    }

    async fn get_recipe(&self, id: Uuid) -> AppResult<RecipeWithIngredients> {
        let row = sqlx::query_as::<_, (Uuid, String, DateTime<Utc>)>(
            "SELECT id, name, created_at FROM recipes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

        let ingredients = self.fetch_ingredients(id).await?;

        Ok(RecipeWithIngredients {
            recipe: Recipe {
                id: row.0,
                name: row.1,
                created_at: row.2,
            },
            ingredients,
        })
    }

    async fn list_recipes(&self) -> AppResult<Vec<RecipeWithIngredients>> {
        let recipes = sqlx::query_as::<_, (Uuid, String, DateTime<Utc>)>(
            "SELECT id, name, created_at FROM recipes ORDER BY created_at, id",
        )
        .fetch_all(&self.db)
        .await?;

        let ingredient_rows = sqlx::query_as::<_, (Uuid, Uuid, Uuid, Decimal)>(
            r#"
            SELECT id, recipe_id, stock_item_id, rate_per_liter
            FROM recipe_ingredients
            ORDER BY recipe_id, position
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut by_recipe: HashMap<Uuid, Vec<RecipeIngredient>> = HashMap::new();
        for r in ingredient_rows {
            by_recipe.entry(r.1).or_default().push(RecipeIngredient {
                id: r.0,
                recipe_id: r.1,
                stock_item_id: r.2,
                rate_per_liter: r.3,
            });
        }

        Ok(recipes
            .into_iter()
            .map(|r| RecipeWithIngredients {
                ingredients: by_recipe.remove(&r.0).unwrap_or_default(),
                recipe: Recipe {
                    id: r.0,
                    name: r.1,
                    created_at: r.2,
                },
            })
            .collect())
    }

    async fn replace_ingredients(
        &self,
        recipe_id: Uuid,
        name: &str,
        ingredients: &[(Uuid, Decimal)],
    ) -> AppResult<RecipeWithIngredients> {
        let mut tx = self.db.begin().await?;

        let created_at = sqlx::query_scalar::<_, DateTime<Utc>>(
            "UPDATE recipes SET name = $1 WHERE id = $2 RETURNING created_at",
        )
        .bind(name)
        .bind(recipe_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;

        let rows = insert_ingredients_in_tx(&mut tx, recipe_id, ingredients).await?;

        tx.commit().await?;

        Ok(RecipeWithIngredients {
            recipe: Recipe {
                id: recipe_id,
                name: name.to_string(),
                created_at,
            },
            ingredients: rows,
        })
    }

    async fn delete_recipe(&self, id: Uuid) -> AppResult<()> {
        // Ingredient rows cascade; lots fall back to a NULL recipe reference
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Recipe".to_string()));
        }

        Ok(())
    }

    async fn consume_ingredients(&self, plan: &[IngredientDraw]) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        consume_in_tx(&mut tx, plan).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn insert_lot(&self, new: NewLot, plan: &[IngredientDraw]) -> AppResult<ProductionLot> {
        let mut tx = self.db.begin().await?;

        consume_in_tx(&mut tx, plan).await?;

        let row = sqlx::query_as::<_, LotRow>(&format!(
            r#"
            INSERT INTO production_lots (name, kind, recipe_id, volume_liters, unit_size_liters, unit_count)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            LOT_COLUMNS
        ))
        .bind(&new.name)
        .bind(new.kind.as_str())
        .bind(new.recipe_id)
        .bind(new.volume_liters)
        .bind(new.unit_size_liters)
        .bind(new.unit_count)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        lot_from_row(row)
    }

    async fn get_lot(&self, id: Uuid) -> AppResult<ProductionLot> {
        let row = sqlx::query_as::<_, LotRow>(&format!(
            "SELECT {} FROM production_lots WHERE id = $1",
            LOT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Lot".to_string()))?;

        lot_from_row(row)
    }

    async fn list_lots(&self) -> AppResult<Vec<ProductionLot>> {
        let rows = sqlx::query_as::<_, LotRow>(&format!(
            "SELECT {} FROM production_lots ORDER BY created_at DESC, id DESC",
            LOT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(lot_from_row).collect()
    }

    async fn list_open_lots(&self) -> AppResult<Vec<ProductionLot>> {
        let rows = sqlx::query_as::<_, LotRow>(&format!(
            r#"
            SELECT {}
            FROM production_lots
            WHERE unit_count > units_sold
            ORDER BY created_at DESC, id DESC
            "#,
            LOT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(lot_from_row).collect()
    }

    async fn delete_lot(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let (name, units_sold) = sqlx::query_as::<_, (String, i32)>(
            "SELECT name, units_sold FROM production_lots WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Lot".to_string()))?;

        if units_sold > 0 {
            return Err(AppError::LotHasSales(name));
        }

        sqlx::query("DELETE FROM production_lots WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn insert_sale(&self, new: NewSale) -> AppResult<Sale> {
        let mut tx = self.db.begin().await?;

        let (unit_count, units_sold) = sqlx::query_as::<_, (i32, i32)>(
            "SELECT unit_count, units_sold FROM production_lots WHERE id = $1 FOR UPDATE",
        )
        .bind(new.lot_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Lot".to_string()))?;

        let remaining = unit_count - units_sold;
        if new.units > remaining {
            return Err(AppError::InsufficientUnits {
                requested: new.units,
                remaining,
            });
        }

        sqlx::query("UPDATE production_lots SET units_sold = units_sold + $1 WHERE id = $2")
            .bind(new.units)
            .bind(new.lot_id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, SaleRow>(&format!(
            r#"
            INSERT INTO sales (lot_id, client, units, unit_price)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            SALE_COLUMNS
        ))
        .bind(new.lot_id)
        .bind(&new.client)
        .bind(new.units)
        .bind(new.unit_price)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(sale_from_row(row))
    }

    async fn list_sales(&self) -> AppResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {} FROM sales ORDER BY created_at DESC, id DESC",
            SALE_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(sale_from_row).collect())
    }
}
