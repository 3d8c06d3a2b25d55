//! Recipe models
//!
//! A recipe exclusively owns its ingredient rows; each row references a stock
//! item and carries the consumption rate per liter of output.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named production formula
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// One ingredient line of a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub stock_item_id: Uuid,
    /// Stock consumed per liter of recipe output, canonical units
    pub rate_per_liter: Decimal,
}

/// A recipe together with its ordered ingredient list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeWithIngredients {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub ingredients: Vec<RecipeIngredient>,
}

/// A raw ingredient row as entered by a user, possibly incomplete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientSpec {
    pub stock_item_id: Option<Uuid>,
    pub rate_per_liter: Option<Decimal>,
}

/// One line of a consumption plan: how much of a stock item a recipe
/// application will debit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientDraw {
    pub stock_item_id: Uuid,
    pub required: Decimal,
}
