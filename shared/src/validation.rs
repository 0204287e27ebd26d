//! Validation utilities for the Bakery Back-Office Platform

use rust_decimal::Decimal;

// ============================================================================
// Quantity Validations
// ============================================================================

/// Validate that a stock or ingredient quantity is strictly positive
pub fn validate_positive_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be greater than zero");
    }
    Ok(())
}

/// Validate a production or sale quantity (whole units, strictly positive)
pub fn validate_batch_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be a positive whole number");
    }
    Ok(())
}

/// Validate that a price is not negative
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Money Derivations
// ============================================================================

/// Resolve the (unit_cost, total_cost) pair of an inflow.
///
/// Either side may be supplied; the other is derived as
/// `total = quantity * unit`. When both are supplied the unit cost wins and
/// the total is recomputed from it.
pub fn derive_inflow_costs(
    quantity: Decimal,
    unit_cost: Option<Decimal>,
    total_cost: Option<Decimal>,
) -> Result<(Decimal, Decimal), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be greater than zero");
    }

    match (unit_cost, total_cost) {
        (Some(unit), _) => {
            if unit < Decimal::ZERO {
                return Err("Unit cost cannot be negative");
            }
            Ok((unit, unit * quantity))
        }
        (None, Some(total)) => {
            if total < Decimal::ZERO {
                return Err("Total cost cannot be negative");
            }
            Ok((total / quantity, total))
        }
        (None, None) => Err("Either unit cost or total cost is required"),
    }
}

/// Sum of line subtotals for a sale: `quantity * unit_price` per line.
pub fn compute_sale_total(lines: &[(i32, Decimal)]) -> Decimal {
    lines
        .iter()
        .fold(Decimal::ZERO, |acc, (quantity, unit_price)| {
            acc + Decimal::from(*quantity) * unit_price
        })
}

/// Sellable quantity of a recipe: cumulative produced minus cumulative sold.
pub fn available_to_sell(total_produced: i64, total_sold: i64) -> i64 {
    total_produced - total_sold
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    // ========================================================================
    // Quantity Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_positive_quantity() {
        assert!(validate_positive_quantity(dec("0.1")).is_ok());
        assert!(validate_positive_quantity(dec("1000")).is_ok());
        assert!(validate_positive_quantity(Decimal::ZERO).is_err());
        assert!(validate_positive_quantity(dec("-5")).is_err());
    }

    #[test]
    fn test_validate_batch_quantity() {
        assert!(validate_batch_quantity(1).is_ok());
        assert!(validate_batch_quantity(500).is_ok());
        assert!(validate_batch_quantity(0).is_err());
        assert!(validate_batch_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Decimal::ZERO).is_ok());
        assert!(validate_price(dec("19.90")).is_ok());
        assert!(validate_price(dec("-0.01")).is_err());
    }

    // ========================================================================
    // Money Derivation Tests
    // ========================================================================

    #[test]
    fn test_derive_costs_from_unit_cost() {
        let (unit, total) = derive_inflow_costs(dec("2000"), Some(dec("0.05")), None).unwrap();
        assert_eq!(unit, dec("0.05"));
        assert_eq!(total, dec("100.00"));
    }

    #[test]
    fn test_derive_costs_from_total_cost() {
        let (unit, total) = derive_inflow_costs(dec("2000"), None, Some(dec("100"))).unwrap();
        assert_eq!(unit, dec("0.05"));
        assert_eq!(total, dec("100"));
    }

    #[test]
    fn test_derive_costs_unit_cost_wins_over_total() {
        let (unit, total) =
            derive_inflow_costs(dec("100"), Some(dec("2")), Some(dec("999"))).unwrap();
        assert_eq!(unit, dec("2"));
        assert_eq!(total, dec("200"));
    }

    #[test]
    fn test_derive_costs_requires_one_side() {
        assert!(derive_inflow_costs(dec("100"), None, None).is_err());
    }

    #[test]
    fn test_derive_costs_rejects_negative() {
        assert!(derive_inflow_costs(dec("100"), Some(dec("-1")), None).is_err());
        assert!(derive_inflow_costs(dec("100"), None, Some(dec("-1"))).is_err());
        assert!(derive_inflow_costs(Decimal::ZERO, Some(dec("1")), None).is_err());
    }

    #[test]
    fn test_compute_sale_total() {
        let lines = vec![(3, dec("12.50")), (1, dec("8.00"))];
        assert_eq!(compute_sale_total(&lines), dec("45.50"));
    }

    #[test]
    fn test_compute_sale_total_empty() {
        assert_eq!(compute_sale_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_available_to_sell() {
        assert_eq!(available_to_sell(10, 7), 3);
        assert_eq!(available_to_sell(5, 5), 0);
    }

    // ========================================================================
    // General Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name@domain.com.ar").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
        assert!(validate_email("@.").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
    }
}
