//! Product lines: the billing unit shared by orders and payments.

use jotti_core::error::ValidationErrors;
use serde::{Deserialize, Serialize};

/// Minimum trimmed length of a product name.
pub const MIN_NAME_LEN: usize = 3;
/// Maximum trimmed length of a product name.
pub const MAX_NAME_LEN: usize = 30;
/// Highest accepted unit price, in cents.
pub const MAX_UNIT_PRICE_CENTS: i64 = 99_999;

/// One line of an order or payment: a product at a unit price, times a
/// quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLine {
    /// Product identifier.
    pub product_id: i64,
    /// Product name at the time of the fact.
    pub name: String,
    /// Unit price at the time of the fact, in cents.
    pub unit_price_cents: i64,
    /// Number of units.
    pub quantity: i64,
}

impl ProductLine {
    /// Price of the whole line, or `None` on overflow.
    #[must_use]
    pub fn total_cents(&self) -> Option<i64> {
        self.unit_price_cents.checked_mul(self.quantity)
    }

    /// Records every violated field constraint under `path`
    /// (e.g. `products[2]`).
    pub fn validate_into(&self, path: &str, errors: &mut ValidationErrors) {
        if self.product_id < 1 {
            errors.push(format!("{path}.productId"), "must be at least 1");
        }
        let name_len = self.name.trim().chars().count();
        if name_len < MIN_NAME_LEN {
            errors.push(format!("{path}.name"), "name too short");
        } else if name_len > MAX_NAME_LEN {
            errors.push(format!("{path}.name"), "name too long");
        }
        if self.unit_price_cents < 0 {
            errors.push(format!("{path}.unitPriceCents"), "must be non-negative");
        } else if self.unit_price_cents > MAX_UNIT_PRICE_CENTS {
            errors.push(format!("{path}.unitPriceCents"), "price too high");
        }
        if self.quantity < 1 {
            errors.push(format!("{path}.quantity"), "must be at least 1");
        }
    }
}

/// Validates a non-empty list of product lines stored under `field`.
pub fn validate_lines(field: &str, lines: &[ProductLine], errors: &mut ValidationErrors) {
    if lines.is_empty() {
        errors.push(field, "must contain at least one product");
    }
    for (i, line) in lines.iter().enumerate() {
        line.validate_into(&format!("{field}[{i}]"), errors);
    }
}

/// Sums `unit_price_cents × quantity` over `lines`.
///
/// # Errors
///
/// Returns a violation on `total_field` if the sum overflows.
pub fn sum_lines(lines: &[ProductLine], total_field: &str) -> Result<i64, ValidationErrors> {
    lines
        .iter()
        .try_fold(0_i64, |acc, line| {
            line.total_cents().and_then(|total| acc.checked_add(total))
        })
        .ok_or_else(|| ValidationErrors::single(total_field, "total overflows"))
}
