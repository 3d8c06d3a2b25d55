//! Pure derivation and validation helpers for the stock ledger
//!
//! Everything here is side-effect free; the backend services call these and
//! hand the results to the persistence layer.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{IngredientDraw, IngredientSpec, RecipeIngredient, StockItem};

/// How malformed ingredient rows are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngredientPolicy {
    /// Rows with a missing stock item or a missing/non-positive rate are
    /// dropped
    #[default]
    Lenient,
    /// Any malformed row rejects the whole request
    Strict,
}

/// Reduce raw ingredient rows to (stock item, rate) pairs, order preserved.
///
/// Under the lenient policy incomplete rows are skipped; under the strict
/// policy the first incomplete row fails the call.
pub fn filter_ingredient_specs(
    specs: &[IngredientSpec],
    policy: IngredientPolicy,
) -> Result<Vec<(Uuid, Decimal)>, &'static str> {
    let mut kept = Vec::with_capacity(specs.len());
    for spec in specs {
        match (spec.stock_item_id, spec.rate_per_liter) {
            (Some(id), Some(rate)) if rate > Decimal::ZERO => kept.push((id, rate)),
            _ if policy == IngredientPolicy::Strict => {
                return Err("ingredient rows require a stock item and a positive rate");
            }
            _ => {}
        }
    }
    Ok(kept)
}

/// Units a lot packages into: floor(volume / unit size).
///
/// `None` when either value is non-positive or the quotient overflows.
pub fn packaged_unit_count(volume: Decimal, unit_size: Decimal) -> Option<i32> {
    if volume <= Decimal::ZERO || unit_size <= Decimal::ZERO {
        return None;
    }
    (volume / unit_size).floor().to_i32()
}

/// Consumption plan for applying a recipe at the given output volume:
/// required = rate × volume, per ingredient, recipe order preserved.
pub fn consumption_for(ingredients: &[RecipeIngredient], volume: Decimal) -> Vec<IngredientDraw> {
    ingredients
        .iter()
        .map(|ing| IngredientDraw {
            stock_item_id: ing.stock_item_id,
            required: ing.rate_per_liter * volume,
        })
        .collect()
}

/// Items at or below their alert threshold, listing order preserved
pub fn below_threshold(items: &[StockItem]) -> Vec<&StockItem> {
    items.iter().filter(|item| item.is_below_threshold()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Unit;
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn spec(id: Option<Uuid>, rate: Option<&str>) -> IngredientSpec {
        IngredientSpec {
            stock_item_id: id,
            rate_per_liter: rate.map(dec),
        }
    }

    fn item(quantity: &str, threshold: &str) -> StockItem {
        StockItem {
            id: Uuid::new_v4(),
            name: "Malt".to_string(),
            quantity: dec(quantity),
            unit: Unit::Kilograms,
            supplier: None,
            alert_threshold: dec(threshold),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn lenient_policy_drops_incomplete_rows() {
        let id = Uuid::new_v4();
        let specs = vec![
            spec(Some(id), Some("0.2")),
            spec(None, Some("0.5")),
            spec(Some(Uuid::new_v4()), None),
            spec(Some(Uuid::new_v4()), Some("0")),
            spec(Some(Uuid::new_v4()), Some("-1")),
        ];
        let kept = filter_ingredient_specs(&specs, IngredientPolicy::Lenient).unwrap();
        assert_eq!(kept, vec![(id, dec("0.2"))]);
    }

    #[test]
    fn strict_policy_rejects_incomplete_rows() {
        let specs = vec![spec(Some(Uuid::new_v4()), Some("0.2")), spec(None, Some("0.5"))];
        assert!(filter_ingredient_specs(&specs, IngredientPolicy::Strict).is_err());
    }

    #[test]
    fn strict_policy_accepts_complete_rows() {
        let specs = vec![spec(Some(Uuid::new_v4()), Some("0.2"))];
        assert_eq!(
            filter_ingredient_specs(&specs, IngredientPolicy::Strict)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn unit_count_floors_the_quotient() {
        assert_eq!(packaged_unit_count(dec("100"), dec("0.33")), Some(303));
        assert_eq!(packaged_unit_count(dec("10"), dec("0.5")), Some(20));
        assert_eq!(packaged_unit_count(dec("1"), dec("0.75")), Some(1));
    }

    #[test]
    fn unit_count_requires_positive_inputs() {
        assert_eq!(packaged_unit_count(dec("0"), dec("0.33")), None);
        assert_eq!(packaged_unit_count(dec("-5"), dec("0.33")), None);
        assert_eq!(packaged_unit_count(dec("10"), dec("0")), None);
    }

    #[test]
    fn consumption_scales_rates_by_volume() {
        let ingredient = RecipeIngredient {
            id: Uuid::new_v4(),
            recipe_id: Uuid::new_v4(),
            stock_item_id: Uuid::new_v4(),
            rate_per_liter: dec("0.2"),
        };
        let plan = consumption_for(std::slice::from_ref(&ingredient), dec("10"));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].stock_item_id, ingredient.stock_item_id);
        assert_eq!(plan[0].required, dec("2"));
    }

    #[test]
    fn threshold_filter_keeps_order() {
        let low_a = item("1.5", "2");
        let fine = item("10", "2");
        let low_b = item("2", "2");
        let items = vec![low_a.clone(), fine, low_b.clone()];
        let low: Vec<_> = below_threshold(&items).iter().map(|i| i.id).collect();
        assert_eq!(low, vec![low_a.id, low_b.id]);
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(item("2", "2").is_below_threshold());
        assert!(!item("2.01", "2").is_below_threshold());
    }
}
