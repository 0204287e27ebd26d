//! Measurement units and conversion between them.
//!
//! Recipes may express an ingredient in a different unit than the one its
//! raw material is stocked in. Conversion goes through a grams-equivalent
//! base table (milliliters are treated 1:1 with grams), with a direct
//! pairwise table for units that have no mass/volume equivalent. Count-based
//! units never convert to mass or volume; callers must treat that case
//! explicitly instead of guessing.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of units a raw material or recipe ingredient can use.
///
/// Each variant carries a canonical snake_case code (serde/database
/// representation), a short abbreviation, and a Spanish display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Grams,
    Kilograms,
    Pounds,
    Ounces,
    Milliliters,
    Liters,
    Tablespoons,
    Teaspoons,
    Cups,
    Pieces,
    Dozen,
}

impl Unit {
    pub const ALL: [Unit; 11] = [
        Unit::Grams,
        Unit::Kilograms,
        Unit::Pounds,
        Unit::Ounces,
        Unit::Milliliters,
        Unit::Liters,
        Unit::Tablespoons,
        Unit::Teaspoons,
        Unit::Cups,
        Unit::Pieces,
        Unit::Dozen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Grams => "grams",
            Unit::Kilograms => "kilograms",
            Unit::Pounds => "pounds",
            Unit::Ounces => "ounces",
            Unit::Milliliters => "milliliters",
            Unit::Liters => "liters",
            Unit::Tablespoons => "tablespoons",
            Unit::Teaspoons => "teaspoons",
            Unit::Cups => "cups",
            Unit::Pieces => "pieces",
            Unit::Dozen => "dozen",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "grams" => Some(Unit::Grams),
            "kilograms" => Some(Unit::Kilograms),
            "pounds" => Some(Unit::Pounds),
            "ounces" => Some(Unit::Ounces),
            "milliliters" => Some(Unit::Milliliters),
            "liters" => Some(Unit::Liters),
            "tablespoons" => Some(Unit::Tablespoons),
            "teaspoons" => Some(Unit::Teaspoons),
            "cups" => Some(Unit::Cups),
            "pieces" => Some(Unit::Pieces),
            "dozen" => Some(Unit::Dozen),
            _ => None,
        }
    }

    /// Short abbreviation for receipts and labels
    pub fn code(&self) -> &'static str {
        match self {
            Unit::Grams => "g",
            Unit::Kilograms => "kg",
            Unit::Pounds => "lb",
            Unit::Ounces => "oz",
            Unit::Milliliters => "ml",
            Unit::Liters => "l",
            Unit::Tablespoons => "cda",
            Unit::Teaspoons => "cdta",
            Unit::Cups => "tz",
            Unit::Pieces => "u",
            Unit::Dozen => "doc",
        }
    }

    /// Display label in Spanish
    pub fn label_es(&self) -> &'static str {
        match self {
            Unit::Grams => "Gramos",
            Unit::Kilograms => "Kilogramos",
            Unit::Pounds => "Libras",
            Unit::Ounces => "Onzas",
            Unit::Milliliters => "Mililitros",
            Unit::Liters => "Litros",
            Unit::Tablespoons => "Cucharadas",
            Unit::Teaspoons => "Cucharaditas",
            Unit::Cups => "Tazas",
            Unit::Pieces => "Unidades",
            Unit::Dozen => "Docenas",
        }
    }

    /// Grams-equivalent of one of this unit. Milliliters share the base
    /// with grams (kitchen ingredients are treated 1:1). Count-based units
    /// have no equivalent and return None.
    fn base_equivalent(&self) -> Option<Decimal> {
        match self {
            Unit::Grams | Unit::Milliliters => Some(Decimal::ONE),
            Unit::Kilograms | Unit::Liters => Some(Decimal::from(1000)),
            // 1 lb = 453.592 g
            Unit::Pounds => Some(Decimal::new(453_592, 3)),
            // 1 oz = 28.3495 g
            Unit::Ounces => Some(Decimal::new(283_495, 4)),
            Unit::Tablespoons => Some(Decimal::from(15)),
            Unit::Teaspoons => Some(Decimal::from(5)),
            Unit::Cups => Some(Decimal::from(240)),
            Unit::Pieces | Unit::Dozen => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two units that cannot be related by any conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no conversion from {from} to {to}")]
pub struct UnconvertibleUnits {
    pub from: Unit,
    pub to: Unit,
}

/// Direct factor for ordered pairs outside the grams-equivalent table.
fn pairwise_factor(from: Unit, to: Unit) -> Option<Decimal> {
    match (from, to) {
        (Unit::Dozen, Unit::Pieces) => Some(Decimal::from(12)),
        (Unit::Pieces, Unit::Dozen) => Some(Decimal::ONE / Decimal::from(12)),
        _ => None,
    }
}

/// Convert a quantity from one unit to another.
///
/// Identity conversions return the quantity untouched. No rounding is
/// applied at this layer; display rounding is the caller's concern.
pub fn convert(quantity: Decimal, from: Unit, to: Unit) -> Result<Decimal, UnconvertibleUnits> {
    if from == to {
        return Ok(quantity);
    }

    if let (Some(factor_from), Some(factor_to)) = (from.base_equivalent(), to.base_equivalent()) {
        return Ok(quantity * factor_from / factor_to);
    }

    if let Some(factor) = pairwise_factor(from, to) {
        return Ok(quantity * factor);
    }

    Err(UnconvertibleUnits { from, to })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_identity_conversion() {
        for unit in Unit::ALL {
            let qty = dec("123.456");
            assert_eq!(convert(qty, unit, unit).unwrap(), qty);
        }
    }

    #[test]
    fn test_kilograms_to_grams() {
        assert_eq!(convert(dec("2"), Unit::Kilograms, Unit::Grams).unwrap(), dec("2000"));
    }

    #[test]
    fn test_pounds_to_grams() {
        assert_eq!(convert(dec("1"), Unit::Pounds, Unit::Grams).unwrap(), dec("453.592"));
    }

    #[test]
    fn test_tablespoons_to_grams() {
        assert_eq!(convert(dec("5"), Unit::Tablespoons, Unit::Grams).unwrap(), dec("75"));
    }

    #[test]
    fn test_tablespoons_to_kilograms() {
        assert_eq!(
            convert(dec("5"), Unit::Tablespoons, Unit::Kilograms).unwrap(),
            dec("0.075")
        );
    }

    #[test]
    fn test_liters_to_milliliters() {
        assert_eq!(convert(dec("1.5"), Unit::Liters, Unit::Milliliters).unwrap(), dec("1500"));
    }

    #[test]
    fn test_dozen_to_pieces() {
        assert_eq!(convert(dec("3"), Unit::Dozen, Unit::Pieces).unwrap(), dec("36"));
    }

    #[test]
    fn test_pieces_to_dozen_round_trip() {
        let twelve = dec("12");
        let as_dozen = convert(twelve, Unit::Pieces, Unit::Dozen).unwrap();
        let back = convert(as_dozen, Unit::Dozen, Unit::Pieces).unwrap();
        assert!((back - twelve).abs() < dec("0.000001"));
    }

    #[test]
    fn test_count_units_do_not_convert_to_mass() {
        assert!(convert(dec("10"), Unit::Pieces, Unit::Grams).is_err());
        assert!(convert(dec("10"), Unit::Kilograms, Unit::Dozen).is_err());
        assert!(convert(dec("1"), Unit::Dozen, Unit::Liters).is_err());
    }

    #[test]
    fn test_unconvertible_error_carries_both_units() {
        let err = convert(dec("1"), Unit::Pieces, Unit::Grams).unwrap_err();
        assert_eq!(err.from, Unit::Pieces);
        assert_eq!(err.to, Unit::Grams);
    }

    #[test]
    fn test_as_str_round_trip() {
        for unit in Unit::ALL {
            assert_eq!(Unit::from_str(unit.as_str()), Some(unit));
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert_eq!(Unit::from_str("Kilogramos (kg)"), None);
        assert_eq!(Unit::from_str(""), None);
    }
}
