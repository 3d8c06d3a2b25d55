//! Production lot model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of product a lot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// Brewed from a recipe; creation may consume the recipe's ingredients
    Brewed,
    Other,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Brewed => "brewed",
            ProductKind::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "brewed" => Some(ProductKind::Brewed),
            "other" => Some(ProductKind::Other),
            _ => None,
        }
    }
}

/// A produced batch, packaged into a fixed number of units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionLot {
    pub id: Uuid,
    pub name: String,
    pub kind: ProductKind,
    pub recipe_id: Option<Uuid>,
    pub volume_liters: Decimal,
    pub unit_size_liters: Decimal,
    pub unit_count: i32,
    pub units_sold: i32,
    pub created_at: DateTime<Utc>,
}

impl ProductionLot {
    /// Units still available for sale
    pub fn remaining_units(&self) -> i32 {
        self.unit_count - self.units_sold
    }
}
