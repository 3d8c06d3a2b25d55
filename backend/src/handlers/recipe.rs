//! HTTP handlers for recipe endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use shared::models::{IngredientDraw, RecipeWithIngredients};
use shared::validation::IngredientPolicy;

use crate::error::AppResult;
use crate::services::recipe::{ApplyRecipeInput, RecipeInput, RecipeService};
use crate::AppState;

fn recipe_service(state: &AppState) -> RecipeService {
    let policy = if state.config.recipes.strict_ingredients {
        IngredientPolicy::Strict
    } else {
        IngredientPolicy::Lenient
    };
    RecipeService::new(state.store.clone(), policy)
}

/// List all recipes with their ingredients
pub async fn list_recipes(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<RecipeWithIngredients>>> {
    let recipes = recipe_service(&state).list().await?;
    Ok(Json(recipes))
}

/// Create a recipe with its ingredient list
pub async fn create_recipe(
    State(state): State<AppState>,
    Json(input): Json<RecipeInput>,
) -> AppResult<Json<RecipeWithIngredients>> {
    let recipe = recipe_service(&state).create(input).await?;
    Ok(Json(recipe))
}

/// Rename a recipe and replace its ingredient list
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    Json(input): Json<RecipeInput>,
) -> AppResult<Json<RecipeWithIngredients>> {
    let recipe = recipe_service(&state).update(recipe_id, input).await?;
    Ok(Json(recipe))
}

/// Delete a recipe
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    recipe_service(&state).delete(recipe_id).await?;
    Ok(Json(()))
}

/// Apply a recipe at a volume, debiting ingredient stock all-or-nothing
pub async fn apply_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    Json(input): Json<ApplyRecipeInput>,
) -> AppResult<Json<Vec<IngredientDraw>>> {
    let plan = recipe_service(&state)
        .apply(recipe_id, input.volume_liters)
        .await?;
    Ok(Json(plan))
}
