//! Sales ledger tests
//!
//! Covers the remaining-units guard, atomic counter advancement and the
//! open-lot / sale projections.

use std::str::FromStr;
use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;

use brasserie_backend::error::AppError;
use brasserie_backend::services::lot::{CreateLotInput, LotService};
use brasserie_backend::services::sale::{RecordSaleInput, SaleService};
use brasserie_backend::store::MemStore;
use shared::models::ProductKind;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn services() -> (LotService, SaleService) {
    let store = Arc::new(MemStore::new());
    (LotService::new(store.clone()), SaleService::new(store))
}

fn lot_input(name: &str, volume: &str, unit_size: &str) -> CreateLotInput {
    CreateLotInput {
        name: name.to_string(),
        kind: ProductKind::Other,
        recipe_id: None,
        volume_liters: dec(volume),
        unit_size_liters: dec(unit_size),
    }
}

fn sale_input(lot_id: uuid::Uuid, client: &str, units: i32, price: &str) -> RecordSaleInput {
    RecordSaleInput {
        lot_id,
        client: client.to_string(),
        units,
        unit_price: dec(price),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn recording_a_sale_advances_the_counter() {
        let (lots, sales) = services();
        let lot = lots.create_lot(lot_input("Batch 1", "10", "0.5")).await.unwrap();

        let sale = sales
            .record_sale(sale_input(lot.id, "Le Comptoir", 5, "3.50"))
            .await
            .unwrap();

        assert_eq!(sale.units, 5);
        assert_eq!(sale.unit_price, dec("3.50"));

        let lot = lots.get(lot.id).await.unwrap();
        assert_eq!(lot.units_sold, 5);
        assert_eq!(lot.remaining_units(), 15);
    }

    #[tokio::test]
    async fn oversell_scenario() {
        let (lots, sales) = services();

        // 100 L in 0.33 L bottles packages into 303 units
        let lot = lots.create_lot(lot_input("Batch 1", "100", "0.33")).await.unwrap();
        assert_eq!(lot.unit_count, 303);

        sales
            .record_sale(sale_input(lot.id, "Le Comptoir", 300, "3.00"))
            .await
            .unwrap();

        // 3 units remain, a request for 5 fails and changes nothing
        let err = sales
            .record_sale(sale_input(lot.id, "Chez Marcel", 5, "3.00"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientUnits {
                requested: 5,
                remaining: 3
            }
        ));

        let lot = lots.get(lot.id).await.unwrap();
        assert_eq!(lot.units_sold, 300);
        assert_eq!(sales.list_sales().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn selling_exactly_the_remainder_closes_the_lot() {
        let (lots, sales) = services();
        let lot = lots.create_lot(lot_input("Batch 1", "10", "0.5")).await.unwrap();

        sales
            .record_sale(sale_input(lot.id, "Le Comptoir", 20, "3.00"))
            .await
            .unwrap();

        let lot = lots.get(lot.id).await.unwrap();
        assert_eq!(lot.remaining_units(), 0);
        assert!(sales.open_lots().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_lot_reports_not_found() {
        let (_, sales) = services();

        let err = sales
            .record_sale(sale_input(uuid::Uuid::new_v4(), "Le Comptoir", 1, "3.00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn invalid_inputs_are_rejected() {
        let (lots, sales) = services();
        let lot = lots.create_lot(lot_input("Batch 1", "10", "0.5")).await.unwrap();

        assert!(matches!(
            sales
                .record_sale(sale_input(lot.id, "Le Comptoir", 0, "3.00"))
                .await
                .unwrap_err(),
            AppError::InvalidQuantity { .. }
        ));
        assert!(matches!(
            sales
                .record_sale(sale_input(lot.id, "Le Comptoir", 1, "-0.50"))
                .await
                .unwrap_err(),
            AppError::InvalidQuantity { .. }
        ));
        assert!(matches!(
            sales
                .record_sale(sale_input(lot.id, "  ", 1, "3.00"))
                .await
                .unwrap_err(),
            AppError::Validation { .. }
        ));

        // No side effects from any rejected request
        assert_eq!(lots.get(lot.id).await.unwrap().units_sold, 0);
    }

    #[tokio::test]
    async fn free_giveaways_are_allowed() {
        let (lots, sales) = services();
        let lot = lots.create_lot(lot_input("Batch 1", "10", "0.5")).await.unwrap();

        let sale = sales
            .record_sale(sale_input(lot.id, "Tasting stand", 2, "0"))
            .await
            .unwrap();
        assert_eq!(sale.unit_price, Decimal::ZERO);
    }

    #[tokio::test]
    async fn open_lots_lists_only_sellable_lots_newest_first() {
        let (lots, sales) = services();
        let sold_out = lots.create_lot(lot_input("Batch 1", "1", "0.5")).await.unwrap();
        let open_a = lots.create_lot(lot_input("Batch 2", "10", "0.5")).await.unwrap();
        let open_b = lots.create_lot(lot_input("Batch 3", "10", "0.5")).await.unwrap();

        sales
            .record_sale(sale_input(sold_out.id, "Le Comptoir", 2, "3.00"))
            .await
            .unwrap();

        let open: Vec<_> = sales
            .open_lots()
            .await
            .unwrap()
            .into_iter()
            .map(|lot| lot.id)
            .collect();
        assert_eq!(open, vec![open_b.id, open_a.id]);
    }

    #[tokio::test]
    async fn sales_are_listed_newest_first() {
        let (lots, sales) = services();
        let lot = lots.create_lot(lot_input("Batch 1", "10", "0.5")).await.unwrap();

        sales
            .record_sale(sale_input(lot.id, "First", 1, "3.00"))
            .await
            .unwrap();
        sales
            .record_sale(sale_input(lot.id, "Second", 1, "3.00"))
            .await
            .unwrap();

        let clients: Vec<_> = sales
            .list_sales()
            .await
            .unwrap()
            .into_iter()
            .map(|sale| sale.client)
            .collect();
        assert_eq!(clients, vec!["Second", "First"]);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Replaying any request sequence against the guard never oversells
        #[test]
        fn prop_units_sold_never_exceeds_unit_count(
            unit_count in 1i32..=1_000,
            requests in prop::collection::vec(1i32..=100, 1..30)
        ) {
            let mut units_sold = 0;
            for request in requests {
                let remaining = unit_count - units_sold;
                if request <= remaining {
                    units_sold += request;
                }
                prop_assert!(units_sold <= unit_count);
                prop_assert!(units_sold >= 0);
            }
        }

        /// A rejected request leaves the counter exactly where it was
        #[test]
        fn prop_rejected_sale_changes_nothing(
            unit_count in 1i32..=100,
            over in 1i32..=100
        ) {
            let units_sold = unit_count; // fully sold
            let request = over;
            let remaining = unit_count - units_sold;

            // Guard rejects, counter must not move
            prop_assert!(request > remaining);
            prop_assert_eq!(units_sold, unit_count);
        }
    }
}
