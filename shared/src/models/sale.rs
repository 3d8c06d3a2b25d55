//! Sale record model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sale of packaged units from a production lot. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub lot_id: Uuid,
    pub client: String,
    pub units: i32,
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
}
