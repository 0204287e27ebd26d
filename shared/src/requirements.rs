//! Recipe requirement planning against raw-material stock.
//!
//! A recipe lists each ingredient in its own unit; the raw material backing
//! it is stocked in a possibly different unit. Planning scales the recipe by
//! the batch count and converts every line into the stock unit so the ledger
//! can compare and deduct. An ingredient whose unit cannot be related to the
//! stock unit is a hard-missing item: availability is never assumed when the
//! conversion is unknown.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::units::{convert, Unit};

/// One recipe ingredient joined with the stocked material it draws from.
#[derive(Debug, Clone)]
pub struct IngredientLine {
    pub material_id: Uuid,
    pub material_name: String,
    /// Quantity for a single batch, expressed in `recipe_unit`
    pub quantity: Decimal,
    pub recipe_unit: Unit,
    pub stock_unit: Unit,
    /// Current stock of the material, expressed in `stock_unit`
    pub stock_quantity: Decimal,
}

/// Requirement for one raw material, expressed in its stock unit.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialRequirement {
    pub material_id: Uuid,
    pub material_name: String,
    /// None when the recipe unit cannot be related to the stock unit
    pub required_quantity: Option<Decimal>,
    pub recipe_unit: Unit,
    pub stock_unit: Unit,
}

/// One entry of a deficiency report.
///
/// `required_quantity` is None for ingredients whose units could not be
/// converted; those are reported as missing regardless of stock level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shortfall {
    pub material_id: Uuid,
    pub material_name: String,
    pub required_quantity: Option<Decimal>,
    pub available_quantity: Decimal,
    pub recipe_unit: Unit,
    pub stock_unit: Unit,
}

/// Scale a recipe's ingredient lines by `batches` and express each
/// requirement in the stock unit of its material.
pub fn plan_requirements(lines: &[IngredientLine], batches: i32) -> Vec<MaterialRequirement> {
    let multiplier = Decimal::from(batches);

    lines
        .iter()
        .map(|line| {
            let required_in_recipe_unit = line.quantity * multiplier;
            let required_quantity =
                convert(required_in_recipe_unit, line.recipe_unit, line.stock_unit).ok();

            MaterialRequirement {
                material_id: line.material_id,
                material_name: line.material_name.clone(),
                required_quantity,
                recipe_unit: line.recipe_unit,
                stock_unit: line.stock_unit,
            }
        })
        .collect()
}

/// Compare planned requirements against current stock and return every
/// deficient ingredient, not just the first.
pub fn find_shortfalls(lines: &[IngredientLine], batches: i32) -> Vec<Shortfall> {
    let requirements = plan_requirements(lines, batches);

    requirements
        .into_iter()
        .zip(lines.iter())
        .filter_map(|(req, line)| {
            let insufficient = match req.required_quantity {
                Some(required) => line.stock_quantity < required,
                None => true,
            };

            insufficient.then(|| Shortfall {
                material_id: req.material_id,
                material_name: req.material_name,
                required_quantity: req.required_quantity,
                available_quantity: line.stock_quantity,
                recipe_unit: req.recipe_unit,
                stock_unit: req.stock_unit,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(
        name: &str,
        quantity: &str,
        recipe_unit: Unit,
        stock_unit: Unit,
        stock: &str,
    ) -> IngredientLine {
        IngredientLine {
            material_id: Uuid::new_v4(),
            material_name: name.to_string(),
            quantity: dec(quantity),
            recipe_unit,
            stock_unit,
            stock_quantity: dec(stock),
        }
    }

    #[test]
    fn test_requirement_in_same_unit() {
        let lines = vec![line("Harina", "500", Unit::Grams, Unit::Grams, "1000")];
        let reqs = plan_requirements(&lines, 1);
        assert_eq!(reqs[0].required_quantity, Some(dec("500")));
    }

    #[test]
    fn test_requirement_scales_with_batches() {
        let lines = vec![line("Harina", "500", Unit::Grams, Unit::Grams, "1000")];
        let reqs = plan_requirements(&lines, 3);
        assert_eq!(reqs[0].required_quantity, Some(dec("1500")));
    }

    #[test]
    fn test_requirement_converted_to_stock_unit() {
        // 5 tablespoons of vanilla at 15 g each, stocked in grams
        let lines = vec![line("Vainilla", "5", Unit::Tablespoons, Unit::Grams, "100")];
        let reqs = plan_requirements(&lines, 1);
        assert_eq!(reqs[0].required_quantity, Some(dec("75")));
    }

    #[test]
    fn test_requirement_converted_to_kilograms() {
        let lines = vec![line("Vainilla", "5", Unit::Tablespoons, Unit::Kilograms, "1")];
        let reqs = plan_requirements(&lines, 1);
        assert_eq!(reqs[0].required_quantity, Some(dec("0.075")));
    }

    #[test]
    fn test_unconvertible_requirement_is_none() {
        let lines = vec![line("Huevos", "3", Unit::Pieces, Unit::Kilograms, "2")];
        let reqs = plan_requirements(&lines, 1);
        assert_eq!(reqs[0].required_quantity, None);
    }

    #[test]
    fn test_no_shortfalls_when_stock_suffices() {
        let lines = vec![
            line("Harina", "500", Unit::Grams, Unit::Grams, "1000"),
            line("Azucar", "1", Unit::Kilograms, Unit::Grams, "1500"),
        ];
        assert!(find_shortfalls(&lines, 1).is_empty());
    }

    #[test]
    fn test_exact_stock_is_sufficient() {
        let lines = vec![line("Harina", "500", Unit::Grams, Unit::Grams, "500")];
        assert!(find_shortfalls(&lines, 1).is_empty());
    }

    #[test]
    fn test_all_shortfalls_are_collected() {
        let lines = vec![
            line("Harina", "500", Unit::Grams, Unit::Grams, "100"),
            line("Azucar", "200", Unit::Grams, Unit::Grams, "1000"),
            line("Levadura", "50", Unit::Grams, Unit::Grams, "10"),
        ];
        let shortfalls = find_shortfalls(&lines, 1);
        assert_eq!(shortfalls.len(), 2);
        assert_eq!(shortfalls[0].material_name, "Harina");
        assert_eq!(shortfalls[0].required_quantity, Some(dec("500")));
        assert_eq!(shortfalls[0].available_quantity, dec("100"));
        assert_eq!(shortfalls[1].material_name, "Levadura");
    }

    #[test]
    fn test_unconvertible_ingredient_reported_missing() {
        // Plenty of stock, but pieces cannot be related to kilograms
        let lines = vec![line("Huevos", "3", Unit::Pieces, Unit::Kilograms, "100")];
        let shortfalls = find_shortfalls(&lines, 1);
        assert_eq!(shortfalls.len(), 1);
        assert_eq!(shortfalls[0].required_quantity, None);
        assert_eq!(shortfalls[0].available_quantity, dec("100"));
    }

    #[test]
    fn test_batch_count_pushes_stock_into_shortfall() {
        let lines = vec![line("Harina", "500", Unit::Grams, Unit::Grams, "1000")];
        assert!(find_shortfalls(&lines, 2).is_empty());
        let shortfalls = find_shortfalls(&lines, 3);
        assert_eq!(shortfalls.len(), 1);
        assert_eq!(shortfalls[0].required_quantity, Some(dec("1500")));
    }
}
