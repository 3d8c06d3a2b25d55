//! In-memory store
//!
//! Keeps all state behind a single mutex so every store operation is atomic
//! with respect to every other. Used for test isolation; rows keep insertion
//! order, which doubles as creation order.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::models::{
    IngredientDraw, ProductionLot, Recipe, RecipeIngredient, RecipeWithIngredients, Sale, StockItem,
};

use crate::error::{AppError, AppResult};

use super::{NewLot, NewSale, NewStockItem, Store};

#[derive(Default)]
pub struct MemStore {
    inner: Mutex<State>,
}

#[derive(Default)]
struct State {
    stock: Vec<StockItem>,
    recipes: Vec<Recipe>,
    ingredients: Vec<RecipeIngredient>,
    lots: Vec<ProductionLot>,
    sales: Vec<Sale>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> AppResult<MutexGuard<'_, State>> {
        self.inner
            .lock()
            .map_err(|_| AppError::Internal("store lock poisoned".to_string()))
    }
}

impl State {
    fn stock_mut(&mut self, id: Uuid) -> AppResult<&mut StockItem> {
        self.stock
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| AppError::NotFound("Stock item".to_string()))
    }

    fn ensure_stock_exists(&self, id: Uuid) -> AppResult<()> {
        if self.stock.iter().any(|item| item.id == id) {
            Ok(())
        } else {
            Err(AppError::NotFound("Stock item".to_string()))
        }
    }

    fn ingredients_of(&self, recipe_id: Uuid) -> Vec<RecipeIngredient> {
        self.ingredients
            .iter()
            .filter(|ing| ing.recipe_id == recipe_id)
            .cloned()
            .collect()
    }

    /// Validate every plan line before touching any quantity
    fn consume(&mut self, plan: &[IngredientDraw]) -> AppResult<()> {
        for draw in plan {
            let item = self
                .stock
                .iter()
                .find(|item| item.id == draw.stock_item_id)
                .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;
            if item.quantity < draw.required {
                return Err(AppError::InsufficientStock(item.name.clone()));
            }
        }
        for draw in plan {
            if let Some(item) = self.stock.iter_mut().find(|item| item.id == draw.stock_item_id) {
                item.quantity -= draw.required;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemStore {
    async fn ping(&self) -> AppResult<()> {
        self.locked().map(|_| ())
    }

    async fn insert_stock_item(&self, new: NewStockItem) -> AppResult<StockItem> {
        let mut state = self.locked()?;
        let item = StockItem {
            id: Uuid::new_v4(),
            name: new.name,
            quantity: new.quantity,
            unit: new.unit,
            supplier: new.supplier,
            alert_threshold: new.alert_threshold,
            created_at: Utc::now(),
        };
        state.stock.push(item.clone());
        Ok(item)
    }

    async fn get_stock_item(&self, id: Uuid) -> AppResult<StockItem> {
        let state = self.locked()?;
        state
            .stock
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Stock item".to_string()))
    }

    async fn list_stock_items(&self) -> AppResult<Vec<StockItem>> {
        Ok(self.locked()?.stock.clone())
    }

    async fn credit_stock(&self, id: Uuid, amount: Decimal) -> AppResult<StockItem> {
        let mut state = self.locked()?;
        let item = state.stock_mut(id)?;
        item.quantity += amount;
        Ok(item.clone())
    }

    async fn debit_stock(&self, id: Uuid, amount: Decimal) -> AppResult<StockItem> {
        let mut state = self.locked()?;
        let item = state.stock_mut(id)?;
        if item.quantity < amount {
            return Err(AppError::InsufficientStock(item.name.clone()));
        }
        item.quantity -= amount;
        Ok(item.clone())
    }

    async fn delete_stock_item(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.locked()?;
        let name = state
            .stock
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.name.clone())
            .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;
        if state.ingredients.iter().any(|ing| ing.stock_item_id == id) {
            return Err(AppError::ItemInUse(name));
        }
        state.stock.retain(|item| item.id != id);
        Ok(())
    }

    async fn insert_recipe(
        &self,
        name: &str,
        ingredients: &[(Uuid, Decimal)],
    ) -> AppResult<RecipeWithIngredients> {
        let mut state = self.locked()?;
        for (stock_item_id, _) in ingredients {
            state.ensure_stock_exists(*stock_item_id)?;
        }
        let recipe = Recipe {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        state.recipes.push(recipe.clone());
        for (stock_item_id, rate_per_liter) in ingredients {
            state.ingredients.push(RecipeIngredient {
                id: Uuid::new_v4(),
                recipe_id: recipe.id,
                stock_item_id: *stock_item_id,
                rate_per_liter: *rate_per_liter,
            });
        }
        let ingredients = state.ingredients_of(recipe.id);
        Ok(RecipeWithIngredients { recipe, ingredients })
    }

    async fn get_recipe(&self, id: Uuid) -> AppResult<RecipeWithIngredients> {
        let state = self.locked()?;
        let recipe = state
            .recipes
            .iter()
            .find(|recipe| recipe.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;
        let ingredients = state.ingredients_of(id);
        Ok(RecipeWithIngredients { recipe, ingredients })
    }

    async fn list_recipes(&self) -> AppResult<Vec<RecipeWithIngredients>> {
        let state = self.locked()?;
        Ok(state
            .recipes
            .iter()
            .map(|recipe| RecipeWithIngredients {
                recipe: recipe.clone(),
                ingredients: state.ingredients_of(recipe.id),
            })
            .collect())
    }

    async fn replace_ingredients(
        &self,
        recipe_id: Uuid,
        name: &str,
        ingredients: &[(Uuid, Decimal)],
    ) -> AppResult<RecipeWithIngredients> {
        let mut state = self.locked()?;
        for (stock_item_id, _) in ingredients {
            state.ensure_stock_exists(*stock_item_id)?;
        }
        let recipe = {
            let recipe = state
                .recipes
                .iter_mut()
                .find(|recipe| recipe.id == recipe_id)
                .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;
            recipe.name = name.to_string();
            recipe.clone()
        };
        state.ingredients.retain(|ing| ing.recipe_id != recipe_id);
        for (stock_item_id, rate_per_liter) in ingredients {
            state.ingredients.push(RecipeIngredient {
                id: Uuid::new_v4(),
                recipe_id,
                stock_item_id: *stock_item_id,
                rate_per_liter: *rate_per_liter,
            });
        }
        let ingredients = state.ingredients_of(recipe_id);
        Ok(RecipeWithIngredients { recipe, ingredients })
    }

    async fn delete_recipe(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.locked()?;
        if !state.recipes.iter().any(|recipe| recipe.id == id) {
            return Err(AppError::NotFound("Recipe".to_string()));
        }
        state.ingredients.retain(|ing| ing.recipe_id != id);
        for lot in state.lots.iter_mut() {
            if lot.recipe_id == Some(id) {
                lot.recipe_id = None;
            }
        }
        state.recipes.retain(|recipe| recipe.id != id);
        Ok(())
    }

    async fn consume_ingredients(&self, plan: &[IngredientDraw]) -> AppResult<()> {
        self.locked()?.consume(plan)
    }

    async fn insert_lot(&self, new: NewLot, plan: &[IngredientDraw]) -> AppResult<ProductionLot> {
        let mut state = self.locked()?;
        state.consume(plan)?;
        let lot = ProductionLot {
            id: Uuid::new_v4(),
            name: new.name,
            kind: new.kind,
            recipe_id: new.recipe_id,
            volume_liters: new.volume_liters,
            unit_size_liters: new.unit_size_liters,
            unit_count: new.unit_count,
            units_sold: 0,
            created_at: Utc::now(),
        };
        state.lots.push(lot.clone());
        Ok(lot)
    }

    async fn get_lot(&self, id: Uuid) -> AppResult<ProductionLot> {
        let state = self.locked()?;
        state
            .lots
            .iter()
            .find(|lot| lot.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Lot".to_string()))
    }

    async fn list_lots(&self) -> AppResult<Vec<ProductionLot>> {
        Ok(self.locked()?.lots.iter().rev().cloned().collect())
    }

    async fn list_open_lots(&self) -> AppResult<Vec<ProductionLot>> {
        Ok(self
            .locked()?
            .lots
            .iter()
            .rev()
            .filter(|lot| lot.remaining_units() > 0)
            .cloned()
            .collect())
    }

    async fn delete_lot(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.locked()?;
        let lot = state
            .lots
            .iter()
            .find(|lot| lot.id == id)
            .ok_or_else(|| AppError::NotFound("Lot".to_string()))?;
        if lot.units_sold > 0 {
            return Err(AppError::LotHasSales(lot.name.clone()));
        }
        state.lots.retain(|lot| lot.id != id);
        Ok(())
    }

    async fn insert_sale(&self, new: NewSale) -> AppResult<Sale> {
        let mut state = self.locked()?;
        let lot = state
            .lots
            .iter_mut()
            .find(|lot| lot.id == new.lot_id)
            .ok_or_else(|| AppError::NotFound("Lot".to_string()))?;
        let remaining = lot.remaining_units();
        if new.units > remaining {
            return Err(AppError::InsufficientUnits {
                requested: new.units,
                remaining,
            });
        }
        lot.units_sold += new.units;
        let sale = Sale {
            id: Uuid::new_v4(),
            lot_id: new.lot_id,
            client: new.client,
            units: new.units,
            unit_price: new.unit_price,
            created_at: Utc::now(),
        };
        state.sales.push(sale.clone());
        Ok(sale)
    }

    async fn list_sales(&self) -> AppResult<Vec<Sale>> {
        Ok(self.locked()?.sales.iter().rev().cloned().collect())
    }
}
