//! Stock ledger tests
//!
//! Covers unit normalization on intake, debit non-negativity, deletion
//! guards and alert thresholds.

use std::str::FromStr;
use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;

use brasserie_backend::error::AppError;
use brasserie_backend::services::recipe::{RecipeInput, RecipeService};
use brasserie_backend::services::stock::{CreateStockItemInput, StockService};
use brasserie_backend::store::MemStore;
use shared::models::IngredientSpec;
use shared::types::{to_canonical, to_display, Unit};
use shared::validation::IngredientPolicy;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn item_input(name: &str, quantity: &str, unit: &str, threshold: &str) -> CreateStockItemInput {
    CreateStockItemInput {
        name: name.to_string(),
        quantity: dec(quantity),
        unit: unit.to_string(),
        supplier: None,
        alert_threshold: dec(threshold),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn create_normalizes_gram_input_to_kilograms() {
        let service = StockService::new(Arc::new(MemStore::new()));

        let item = service
            .create_item(item_input("Hops", "500", "g", "100"))
            .await
            .unwrap();

        assert_eq!(item.unit, Unit::Kilograms);
        assert_eq!(item.quantity, dec("0.5"));
        assert_eq!(item.alert_threshold, dec("0.1"));
    }

    #[tokio::test]
    async fn create_keeps_unrecognized_units_as_counts() {
        let service = StockService::new(Arc::new(MemStore::new()));

        let item = service
            .create_item(item_input("Bottle caps", "250", "box", "50"))
            .await
            .unwrap();

        assert_eq!(item.unit, Unit::Count);
        assert_eq!(item.quantity, dec("250"));
    }

    #[tokio::test]
    async fn create_rejects_negative_quantities() {
        let service = StockService::new(Arc::new(MemStore::new()));

        let err = service
            .create_item(item_input("Malt", "-1", "kg", "0"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidQuantity { .. }));

        let err = service
            .create_item(item_input("Malt", "1", "kg", "-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidQuantity { .. }));
    }

    #[tokio::test]
    async fn credit_and_debit_move_the_balance() {
        let service = StockService::new(Arc::new(MemStore::new()));
        let item = service
            .create_item(item_input("Malt", "10", "kg", "2"))
            .await
            .unwrap();

        let item = service.credit(item.id, dec("2.5")).await.unwrap();
        assert_eq!(item.quantity, dec("12.5"));

        let item = service.debit(item.id, dec("4")).await.unwrap();
        assert_eq!(item.quantity, dec("8.5"));
    }

    #[tokio::test]
    async fn debit_past_zero_fails_and_leaves_quantity_unchanged() {
        let service = StockService::new(Arc::new(MemStore::new()));
        let item = service
            .create_item(item_input("Malt", "10", "kg", "2"))
            .await
            .unwrap();

        let err = service.debit(item.id, dec("10.5")).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock(ref name) if name == "Malt"));

        let unchanged = service.get(item.id).await.unwrap();
        assert_eq!(unchanged.quantity, dec("10"));
    }

    #[tokio::test]
    async fn adjustments_require_positive_amounts() {
        let service = StockService::new(Arc::new(MemStore::new()));
        let item = service
            .create_item(item_input("Malt", "10", "kg", "2"))
            .await
            .unwrap();

        assert!(matches!(
            service.credit(item.id, dec("0")).await.unwrap_err(),
            AppError::InvalidQuantity { .. }
        ));
        assert!(matches!(
            service.debit(item.id, dec("-3")).await.unwrap_err(),
            AppError::InvalidQuantity { .. }
        ));
    }

    #[tokio::test]
    async fn unknown_items_report_not_found() {
        let service = StockService::new(Arc::new(MemStore::new()));

        let err = service.debit(uuid::Uuid::new_v4(), dec("1")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn deleting_a_referenced_item_is_blocked() {
        let store = Arc::new(MemStore::new());
        let stock = StockService::new(store.clone());
        let recipes = RecipeService::new(store.clone(), IngredientPolicy::Lenient);

        let malt = stock
            .create_item(item_input("Malt", "10", "kg", "2"))
            .await
            .unwrap();
        let recipe = recipes
            .create(RecipeInput {
                name: "Pale Ale".to_string(),
                ingredients: vec![IngredientSpec {
                    stock_item_id: Some(malt.id),
                    rate_per_liter: Some(dec("0.2")),
                }],
            })
            .await
            .unwrap();

        let err = stock.delete(malt.id).await.unwrap_err();
        assert!(matches!(err, AppError::ItemInUse(ref name) if name == "Malt"));

        // Once the recipe is gone the item is free to delete
        recipes.delete(recipe.recipe.id).await.unwrap();
        stock.delete(malt.id).await.unwrap();
        assert!(stock.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malt_threshold_scenario() {
        let service = StockService::new(Arc::new(MemStore::new()));
        let malt = service
            .create_item(item_input("Malt", "10", "kg", "2"))
            .await
            .unwrap();

        assert!(!malt.is_below_threshold());
        assert!(service.low_stock().await.unwrap().is_empty());

        let malt = service.debit(malt.id, dec("8.5")).await.unwrap();
        assert_eq!(malt.quantity, dec("1.5"));
        assert!(malt.is_below_threshold());

        let low = service.low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, malt.id);
    }

    #[tokio::test]
    async fn listing_keeps_creation_order() {
        let service = StockService::new(Arc::new(MemStore::new()));
        for name in ["Malt", "Hops", "Yeast"] {
            service
                .create_item(item_input(name, "1", "kg", "0"))
                .await
                .unwrap();
        }

        let names: Vec<_> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, vec!["Malt", "Hops", "Yeast"]);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for gram quantities below one kilogram
    fn sub_kilo_grams() -> impl Strategy<Value = Decimal> {
        (1i64..=99_999i64).prop_map(|n| Decimal::new(n, 2)) // 0.01 to 999.99 g
    }

    /// Strategy for stock quantities
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 3))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Sub-kilogram gram input survives a canonical round trip exactly
        #[test]
        fn prop_gram_round_trip_is_exact(grams in sub_kilo_grams()) {
            let (canonical, unit) = to_canonical(grams, "g");
            prop_assert_eq!(unit, Unit::Kilograms);

            let (display, display_unit) = to_display(canonical, unit);
            prop_assert_eq!(display, grams);
            prop_assert_eq!(display_unit, "g");
        }

        /// A debit either keeps the balance non-negative or is rejected and
        /// changes nothing
        #[test]
        fn prop_debit_never_goes_negative(
            quantity in quantity_strategy(),
            amount in quantity_strategy()
        ) {
            let balance = if amount <= quantity {
                quantity - amount
            } else {
                quantity // rejected debit leaves the balance alone
            };
            prop_assert!(balance >= Decimal::ZERO);
        }

        /// Threshold comparison is inclusive at the boundary
        #[test]
        fn prop_threshold_inclusive(
            threshold in quantity_strategy(),
            above in quantity_strategy()
        ) {
            prop_assert!(threshold <= threshold);
            prop_assert!(!(threshold + above <= threshold));
        }
    }
}
