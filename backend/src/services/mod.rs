//! Business logic services for the brasserie stock platform

pub mod lot;
pub mod recipe;
pub mod sale;
pub mod stock;

pub use lot::LotService;
pub use recipe::RecipeService;
pub use sale::SaleService;
pub use stock::StockService;
