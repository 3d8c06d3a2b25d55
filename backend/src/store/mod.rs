//! Persistence layer for the brasserie stock platform
//!
//! Services talk to storage through the [`Store`] trait. Multi-row
//! operations (recipe replacement, ingredient consumption, lot creation,
//! sale recording) are single trait methods so each backend can make them
//! atomic: Postgres wraps them in a transaction with row locks, the
//! in-memory store serializes them behind one lock.

mod memory;
mod postgres;

pub use memory::MemStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::models::{
    IngredientDraw, ProductKind, ProductionLot, RecipeWithIngredients, Sale, StockItem,
};
use shared::types::Unit;

use crate::error::AppResult;

/// A new stock item, quantities already normalized to canonical units
#[derive(Debug, Clone)]
pub struct NewStockItem {
    pub name: String,
    pub quantity: Decimal,
    pub unit: Unit,
    pub supplier: Option<String>,
    pub alert_threshold: Decimal,
}

/// A new production lot with its precomputed unit count
#[derive(Debug, Clone)]
pub struct NewLot {
    pub name: String,
    pub kind: ProductKind,
    pub recipe_id: Option<Uuid>,
    pub volume_liters: Decimal,
    pub unit_size_liters: Decimal,
    pub unit_count: i32,
}

/// A new sale against a production lot
#[derive(Debug, Clone)]
pub struct NewSale {
    pub lot_id: Uuid,
    pub client: String,
    pub units: i32,
    pub unit_price: Decimal,
}

/// Storage collaborator for the domain services.
///
/// Fetch-all methods return stable creation order; lot and sale listings are
/// newest-first. Every method either fully succeeds or leaves no visible
/// mutation.
#[async_trait]
pub trait Store: Send + Sync {
    /// Storage reachability probe for health reporting
    async fn ping(&self) -> AppResult<()>;

    // Stock items
    async fn insert_stock_item(&self, new: NewStockItem) -> AppResult<StockItem>;
    async fn get_stock_item(&self, id: Uuid) -> AppResult<StockItem>;
    async fn list_stock_items(&self) -> AppResult<Vec<StockItem>>;
    async fn credit_stock(&self, id: Uuid, amount: Decimal) -> AppResult<StockItem>;
    /// Check-then-debit in one atomic step; `InsufficientStock` on underflow
    async fn debit_stock(&self, id: Uuid, amount: Decimal) -> AppResult<StockItem>;
    /// `ItemInUse` while any recipe ingredient references the item
    async fn delete_stock_item(&self, id: Uuid) -> AppResult<()>;

    // Recipes
    async fn insert_recipe(
        &self,
        name: &str,
        ingredients: &[(Uuid, Decimal)],
    ) -> AppResult<RecipeWithIngredients>;
    async fn get_recipe(&self, id: Uuid) -> AppResult<RecipeWithIngredients>;
    async fn list_recipes(&self) -> AppResult<Vec<RecipeWithIngredients>>;
    /// Delete-all-then-reinsert of the ingredient list, plus rename, atomic
    async fn replace_ingredients(
        &self,
        recipe_id: Uuid,
        name: &str,
        ingredients: &[(Uuid, Decimal)],
    ) -> AppResult<RecipeWithIngredients>;
    /// Cascades ingredient rows; clears the recipe reference on lots
    async fn delete_recipe(&self, id: Uuid) -> AppResult<()>;
    /// All-or-nothing debit of every plan line; `InsufficientStock` names
    /// the first under-stocked item and nothing is debited
    async fn consume_ingredients(&self, plan: &[IngredientDraw]) -> AppResult<()>;

    // Production lots
    /// Lot insert plus plan consumption in one atomic step
    async fn insert_lot(&self, new: NewLot, plan: &[IngredientDraw]) -> AppResult<ProductionLot>;
    async fn get_lot(&self, id: Uuid) -> AppResult<ProductionLot>;
    async fn list_lots(&self) -> AppResult<Vec<ProductionLot>>;
    /// Lots with remaining units, newest first
    async fn list_open_lots(&self) -> AppResult<Vec<ProductionLot>>;
    /// `LotHasSales` once any units have been sold
    async fn delete_lot(&self, id: Uuid) -> AppResult<()>;

    // Sales
    /// Remaining-units guard, sale insert and counter increment, atomic
    async fn insert_sale(&self, new: NewSale) -> AppResult<Sale>;
    async fn list_sales(&self) -> AppResult<Vec<Sale>>;
}
