//! Stock item model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Unit;

/// A raw material held in stock, quantity in its canonical unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockItem {
    pub id: Uuid,
    pub name: String,
    pub quantity: Decimal,
    pub unit: Unit,
    pub supplier: Option<String>,
    pub alert_threshold: Decimal,
    pub created_at: DateTime<Utc>,
}

impl StockItem {
    /// Quantity at or below the alert threshold
    pub fn is_below_threshold(&self) -> bool {
        self.quantity <= self.alert_threshold
    }
}
