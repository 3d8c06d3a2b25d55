//! Recipe catalog service: formulas, ingredient replacement and recipe
//! application against the stock ledger

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use shared::models::{IngredientDraw, IngredientSpec, RecipeWithIngredients};
use shared::validation::{consumption_for, filter_ingredient_specs, IngredientPolicy};

use crate::error::{AppError, AppResult};
use crate::store::Store;

/// Recipe service owning recipes and their ingredient lists
#[derive(Clone)]
pub struct RecipeService {
    store: Arc<dyn Store>,
    policy: IngredientPolicy,
}

/// Input for creating or updating a recipe
#[derive(Debug, Deserialize)]
pub struct RecipeInput {
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<IngredientSpec>,
}

/// Input for applying a recipe at a given output volume
#[derive(Debug, Deserialize)]
pub struct ApplyRecipeInput {
    pub volume_liters: Decimal,
}

impl RecipeService {
    /// Create a new RecipeService instance
    pub fn new(store: Arc<dyn Store>, policy: IngredientPolicy) -> Self {
        Self { store, policy }
    }

    /// Create a recipe with its ingredient list in one atomic operation
    pub async fn create(&self, input: RecipeInput) -> AppResult<RecipeWithIngredients> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Recipe name cannot be empty".to_string(),
            });
        }

        let ingredients = self.filtered(&input.ingredients)?;
        let recipe = self.store.insert_recipe(&input.name, &ingredients).await?;

        tracing::info!(
            recipe = %recipe.recipe.id,
            name = %recipe.recipe.name,
            ingredients = recipe.ingredients.len(),
            "recipe created"
        );
        Ok(recipe)
    }

    /// Rename a recipe and replace its whole ingredient list atomically
    pub async fn update(&self, recipe_id: Uuid, input: RecipeInput) -> AppResult<RecipeWithIngredients> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Recipe name cannot be empty".to_string(),
            });
        }

        let ingredients = self.filtered(&input.ingredients)?;
        self.store
            .replace_ingredients(recipe_id, &input.name, &ingredients)
            .await
    }

    /// Delete a recipe; its ingredient rows go with it and referencing lots
    /// fall back to no recipe
    pub async fn delete(&self, recipe_id: Uuid) -> AppResult<()> {
        self.store.delete_recipe(recipe_id).await?;
        tracing::info!(recipe = %recipe_id, "recipe deleted");
        Ok(())
    }

    pub async fn get(&self, recipe_id: Uuid) -> AppResult<RecipeWithIngredients> {
        self.store.get_recipe(recipe_id).await
    }

    pub async fn list(&self) -> AppResult<Vec<RecipeWithIngredients>> {
        self.store.list_recipes().await
    }

    /// Apply a recipe at the given volume: every ingredient's requirement is
    /// validated against stock before anything is debited, then all lines
    /// are debited together. Returns the executed consumption plan.
    pub async fn apply(&self, recipe_id: Uuid, volume_liters: Decimal) -> AppResult<Vec<IngredientDraw>> {
        if volume_liters <= Decimal::ZERO {
            return Err(AppError::InvalidQuantity {
                field: "volume_liters".to_string(),
                message: "Volume must be positive".to_string(),
            });
        }

        let recipe = self.store.get_recipe(recipe_id).await?;
        let plan = consumption_for(&recipe.ingredients, volume_liters);
        self.store.consume_ingredients(&plan).await?;

        tracing::info!(
            recipe = %recipe_id,
            volume = %volume_liters,
            lines = plan.len(),
            "recipe applied, stock debited"
        );
        Ok(plan)
    }

    fn filtered(&self, specs: &[IngredientSpec]) -> AppResult<Vec<(Uuid, Decimal)>> {
        let total = specs.len();
        let kept = filter_ingredient_specs(specs, self.policy).map_err(|message| {
            AppError::InvalidQuantity {
                field: "ingredients".to_string(),
                message: message.to_string(),
            }
        })?;
        if kept.len() < total {
            tracing::debug!(dropped = total - kept.len(), "incomplete ingredient rows skipped");
        }
        Ok(kept)
    }
}
