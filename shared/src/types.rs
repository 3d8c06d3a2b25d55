//! Canonical units and quantity conversion
//!
//! All stock quantities are stored in a canonical unit: kilograms for mass,
//! liters for volume, a generic count for everything else. User input arrives
//! in whatever unit was typed and is normalized on the way in; sub-unit
//! quantities are scaled back up for display.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Canonical storage unit for a stock quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Kilograms,
    Liters,
    Count,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kilograms => "kg",
            Unit::Liters => "L",
            Unit::Count => "unit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "kg" => Some(Unit::Kilograms),
            "L" => Some(Unit::Liters),
            "unit" => Some(Unit::Count),
            _ => None,
        }
    }
}

impl core::fmt::Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a user-entered quantity/unit pair to canonical storage units.
///
/// Gram-family inputs become kilograms, milliliters and centiliters become
/// liters. Anything unrecognized keeps its quantity and lands on the generic
/// count unit.
pub fn to_canonical(quantity: Decimal, unit: &str) -> (Decimal, Unit) {
    match unit.to_lowercase().as_str() {
        "g" | "gram" | "grams" | "gramme" | "grammes" => {
            (quantity / Decimal::from(1000), Unit::Kilograms)
        }
        "kg" | "kilogram" | "kilograms" => (quantity, Unit::Kilograms),
        "ml" | "milliliter" | "millilitre" => (quantity / Decimal::from(1000), Unit::Liters),
        "cl" => (quantity / Decimal::from(100), Unit::Liters),
        "l" | "liter" | "liters" | "litre" | "litres" => (quantity, Unit::Liters),
        _ => (quantity, Unit::Count),
    }
}

/// Scale a canonical quantity to a readable display unit.
///
/// Sub-kilogram masses show as grams, sub-liter volumes as milliliters.
pub fn to_display(quantity: Decimal, unit: Unit) -> (Decimal, &'static str) {
    match unit {
        Unit::Kilograms if quantity < Decimal::ONE => (quantity * Decimal::from(1000), "g"),
        Unit::Liters if quantity < Decimal::ONE => (quantity * Decimal::from(1000), "mL"),
        _ => (quantity, unit.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn grams_normalize_to_kilograms() {
        assert_eq!(to_canonical(dec("500"), "g"), (dec("0.5"), Unit::Kilograms));
        assert_eq!(to_canonical(dec("500"), "grams"), (dec("0.5"), Unit::Kilograms));
        assert_eq!(to_canonical(dec("2500"), "gramme"), (dec("2.5"), Unit::Kilograms));
    }

    #[test]
    fn milliliters_and_centiliters_normalize_to_liters() {
        assert_eq!(to_canonical(dec("330"), "ml"), (dec("0.33"), Unit::Liters));
        assert_eq!(to_canonical(dec("75"), "cl"), (dec("0.75"), Unit::Liters));
    }

    #[test]
    fn canonical_inputs_pass_through() {
        assert_eq!(to_canonical(dec("10"), "kg"), (dec("10"), Unit::Kilograms));
        assert_eq!(to_canonical(dec("20"), "L"), (dec("20"), Unit::Liters));
    }

    #[test]
    fn unrecognized_units_keep_their_quantity() {
        assert_eq!(to_canonical(dec("12"), "sack"), (dec("12"), Unit::Count));
        assert_eq!(to_canonical(dec("3"), ""), (dec("3"), Unit::Count));
    }

    #[test]
    fn sub_unit_quantities_display_scaled_up() {
        assert_eq!(to_display(dec("0.5"), Unit::Kilograms), (dec("500"), "g"));
        assert_eq!(to_display(dec("0.33"), Unit::Liters), (dec("330"), "mL"));
    }

    #[test]
    fn whole_quantities_display_unchanged() {
        assert_eq!(to_display(dec("1"), Unit::Kilograms), (dec("1"), "kg"));
        assert_eq!(to_display(dec("2.5"), Unit::Liters), (dec("2.5"), "L"));
        assert_eq!(to_display(dec("0.5"), Unit::Count), (dec("0.5"), "unit"));
    }

    #[test]
    fn gram_round_trip_is_exact() {
        let (canonical, unit) = to_canonical(dec("250"), "g");
        let (display, display_unit) = to_display(canonical, unit);
        assert_eq!(display, dec("250"));
        assert_eq!(display_unit, "g");
    }

    #[test]
    fn unit_strings_round_trip() {
        for unit in [Unit::Kilograms, Unit::Liters, Unit::Count] {
            assert_eq!(Unit::from_str(unit.as_str()), Some(unit));
        }
        assert_eq!(Unit::from_str("bogus"), None);
    }
}
