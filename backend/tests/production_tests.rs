//! Production orchestration tests
//!
//! Covers requirement planning, the complete-deficiency-report policy and
//! the check-all-then-commit-all property: a production either deducts every
//! ingredient or leaves stock completely untouched.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use shared::{find_shortfalls, plan_requirements, IngredientLine, Shortfall, Unit};

// Helper to create Decimal from string
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

// ============================================================================
// Integration Helpers (in-memory ledger mirror of the orchestrator)
// ============================================================================

/// Outcome of a simulated production against an in-memory stock ledger
struct ProduceOutcome {
    shortfalls: Vec<Shortfall>,
    runs_recorded: u32,
}

/// Mirror of the orchestrator's check-all-then-commit-all flow: collect every
/// shortfall first, deduct only when there are none, record the run last.
fn simulate_produce(
    stock: &mut HashMap<Uuid, Decimal>,
    lines: &[IngredientLine],
    batches: i32,
) -> ProduceOutcome {
    let shortfalls = find_shortfalls(lines, batches);
    if !shortfalls.is_empty() {
        return ProduceOutcome {
            shortfalls,
            runs_recorded: 0,
        };
    }

    for requirement in plan_requirements(lines, batches) {
        if let Some(required) = requirement.required_quantity {
            let balance = stock.get_mut(&requirement.material_id).unwrap();
            *balance -= required;
        }
    }

    ProduceOutcome {
        shortfalls: Vec::new(),
        runs_recorded: 1,
    }
}

fn stock_of(lines: &[IngredientLine]) -> HashMap<Uuid, Decimal> {
    lines
        .iter()
        .map(|l| (l.material_id, l.stock_quantity))
        .collect()
}

/// Refresh the lines' stock view from the ledger between operations
fn refresh(lines: &mut [IngredientLine], stock: &HashMap<Uuid, Decimal>) {
    for line in lines.iter_mut() {
        line.stock_quantity = stock[&line.material_id];
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Flour 1000 g in stock, bread takes 500 g per batch: one batch leaves
    /// 500 g and records exactly one run
    #[test]
    fn test_successful_production_deducts_and_records() {
        let lines = vec![line("Harina", "500", Unit::Grams, Unit::Grams, "1000")];
        let mut stock = stock_of(&lines);

        let outcome = simulate_produce(&mut stock, &lines, 1);

        assert!(outcome.shortfalls.is_empty());
        assert_eq!(outcome.runs_recorded, 1);
        assert_eq!(stock[&lines[0].material_id], dec("500"));
    }

    /// Producing with 100 g in stock against a 500 g requirement reports the
    /// exact deficiency and changes nothing
    #[test]
    fn test_insufficient_production_reports_and_keeps_stock() {
        let lines = vec![line("Harina", "500", Unit::Grams, Unit::Grams, "100")];
        let mut stock = stock_of(&lines);

        let outcome = simulate_produce(&mut stock, &lines, 1);

        assert_eq!(outcome.runs_recorded, 0);
        assert_eq!(outcome.shortfalls.len(), 1);
        assert_eq!(outcome.shortfalls[0].material_name, "Harina");
        assert_eq!(outcome.shortfalls[0].required_quantity, Some(dec("500")));
        assert_eq!(outcome.shortfalls[0].available_quantity, dec("100"));
        assert_eq!(stock[&lines[0].material_id], dec("100"));
    }

    /// Every deficient ingredient appears in the report, not just the first
    #[test]
    fn test_deficiency_report_is_complete() {
        let lines = vec![
            line("Harina", "500", Unit::Grams, Unit::Grams, "100"),
            line("Azucar", "200", Unit::Grams, Unit::Grams, "5000"),
            line("Mantequilla", "250", Unit::Grams, Unit::Grams, "0"),
            line("Levadura", "10", Unit::Grams, Unit::Grams, "3"),
        ];
        let mut stock = stock_of(&lines);

        let outcome = simulate_produce(&mut stock, &lines, 1);

        let names: Vec<&str> = outcome
            .shortfalls
            .iter()
            .map(|s| s.material_name.as_str())
            .collect();
        assert_eq!(names, vec!["Harina", "Mantequilla", "Levadura"]);
    }

    /// One missing ingredient blocks the whole batch: the plentiful ones are
    /// not deducted either
    #[test]
    fn test_no_partial_deduction_on_failure() {
        let lines = vec![
            line("Harina", "500", Unit::Grams, Unit::Grams, "10000"),
            line("Levadura", "10", Unit::Grams, Unit::Grams, "3"),
        ];
        let mut stock = stock_of(&lines);
        let before = stock.clone();

        let outcome = simulate_produce(&mut stock, &lines, 1);

        assert_eq!(outcome.runs_recorded, 0);
        assert_eq!(stock, before);
    }

    /// A recipe unit with no relation to the stock unit is a hard-missing
    /// item even with plenty of stock
    #[test]
    fn test_unconvertible_ingredient_blocks_production() {
        let lines = vec![line("Huevos", "2", Unit::Pieces, Unit::Kilograms, "999")];
        let mut stock = stock_of(&lines);

        let outcome = simulate_produce(&mut stock, &lines, 1);

        assert_eq!(outcome.runs_recorded, 0);
        assert_eq!(outcome.shortfalls.len(), 1);
        assert_eq!(outcome.shortfalls[0].required_quantity, None);
        assert_eq!(stock[&lines[0].material_id], dec("999"));
    }

    /// Unconvertible shortfalls serialize with an explicit null requirement
    /// so API clients can tell them apart from plain deficits
    #[test]
    fn test_shortfall_report_serialization() {
        let lines = vec![line("Huevos", "2", Unit::Pieces, Unit::Kilograms, "999")];
        let shortfalls = find_shortfalls(&lines, 1);

        let json = serde_json::to_value(&shortfalls[0]).unwrap();
        assert!(json["required_quantity"].is_null());
        assert_eq!(json["material_name"], "Huevos");
        assert_eq!(json["recipe_unit"], "pieces");
        assert_eq!(json["stock_unit"], "kilograms");
    }

    /// Requirements come back in the stock unit of each material
    #[test]
    fn test_requirements_expressed_in_stock_units() {
        let lines = vec![
            line("Vainilla", "5", Unit::Tablespoons, Unit::Grams, "100"),
            line("Leche", "2", Unit::Cups, Unit::Liters, "5"),
        ];

        let reqs = plan_requirements(&lines, 1);

        assert_eq!(reqs[0].required_quantity, Some(dec("75")));
        assert_eq!(reqs[1].required_quantity, Some(dec("0.48")));
        assert_eq!(reqs[0].stock_unit, Unit::Grams);
        assert_eq!(reqs[1].stock_unit, Unit::Liters);
    }

    /// Back-to-back batches drain stock exactly once per run
    #[test]
    fn test_sequential_productions_accumulate_deductions() {
        let mut lines = vec![line("Harina", "500", Unit::Grams, Unit::Grams, "1600")];
        let mut stock = stock_of(&lines);

        assert_eq!(simulate_produce(&mut stock, &lines, 1).runs_recorded, 1);
        refresh(&mut lines, &stock);
        assert_eq!(simulate_produce(&mut stock, &lines, 2).runs_recorded, 1);
        refresh(&mut lines, &stock);

        // 1600 - 500 - 1000 = 100: a third batch no longer fits
        let outcome = simulate_produce(&mut stock, &lines, 1);
        assert_eq!(outcome.runs_recorded, 0);
        assert_eq!(stock[&lines[0].material_id], dec("100"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for positive stock/ingredient quantities (0.1 to 1000.0)
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 1))
    }

    fn batch_strategy() -> impl Strategy<Value = i32> {
        1i32..=20
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Stock never goes negative, whatever the sequence of productions
        #[test]
        fn prop_no_negative_stock(
            per_batch in quantity_strategy(),
            initial in quantity_strategy(),
            batches in prop::collection::vec(batch_strategy(), 1..15)
        ) {
            let mut lines = vec![line("Harina", &per_batch.to_string(), Unit::Grams, Unit::Grams, &initial.to_string())];
            let mut stock = stock_of(&lines);

            for batch in batches {
                simulate_produce(&mut stock, &lines, batch);
                refresh(&mut lines, &stock);
                prop_assert!(stock[&lines[0].material_id] >= Decimal::ZERO);
            }
        }

        /// A failed production changes nothing; a successful one deducts the
        /// exact planned requirement
        #[test]
        fn prop_all_or_nothing(
            per_batch in quantity_strategy(),
            initial in quantity_strategy(),
            batches in batch_strategy()
        ) {
            let lines = vec![line("Harina", &per_batch.to_string(), Unit::Grams, Unit::Grams, &initial.to_string())];
            let mut stock = stock_of(&lines);
            let before = stock[&lines[0].material_id];

            let required = per_batch * Decimal::from(batches);
            let outcome = simulate_produce(&mut stock, &lines, batches);
            let after = stock[&lines[0].material_id];

            if outcome.runs_recorded == 1 {
                prop_assert_eq!(after, before - required);
            } else {
                prop_assert_eq!(after, before);
                prop_assert!(!outcome.shortfalls.is_empty());
            }
        }

        /// Shortfall entries always carry both quantities of the comparison
        #[test]
        fn prop_shortfalls_carry_required_and_available(
            per_batch in quantity_strategy(),
            initial in quantity_strategy(),
            batches in batch_strategy()
        ) {
            let lines = vec![line("Harina", &per_batch.to_string(), Unit::Grams, Unit::Grams, &initial.to_string())];
            let shortfalls = find_shortfalls(&lines, batches);

            for shortfall in shortfalls {
                prop_assert_eq!(shortfall.available_quantity, initial);
                let required = shortfall.required_quantity.unwrap();
                prop_assert!(required > initial);
                prop_assert_eq!(required, per_batch * Decimal::from(batches));
            }
        }
    }
}
