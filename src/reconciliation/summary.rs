use crate::reconciliation::engine::ReconciliationResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate figures over a reconciliation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    /// Number of months reconciled.
    pub rows: usize,
    /// Months where quantity or price differ.
    pub breaks: usize,
    /// Months present in only one book.
    pub unmatched: usize,
    /// Σ |quantity_diff|.
    pub total_quantity_mismatch: Decimal,
    /// Σ quantity_diff.
    pub net_quantity_diff: Decimal,
    /// Σ price_diff.
    pub net_price_diff: Decimal,
}

impl ReconciliationSummary {
    pub fn from_result(result: &ReconciliationResult) -> Self {
        let mut summary = Self {
            rows: result.len(),
            breaks: 0,
            unmatched: 0,
            total_quantity_mismatch: Decimal::ZERO,
            net_quantity_diff: Decimal::ZERO,
            net_price_diff: Decimal::ZERO,
        };
        for row in result {
            if row.has_break() {
                summary.breaks += 1;
            }
            if !row.is_matched() {
                summary.unmatched += 1;
            }
            summary.total_quantity_mismatch += row.quantity_diff.abs();
            summary.net_quantity_diff += row.quantity_diff;
            summary.net_price_diff += row.price_diff;
        }
        summary
    }

    /// True when both books agree on every month.
    pub fn is_clean(&self) -> bool {
        self.breaks == 0
    }
}

impl std::fmt::Display for ReconciliationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total Trades Reconciled:   {}", self.rows)?;
        writeln!(f, "Months With Breaks:        {}", self.breaks)?;
        writeln!(f, "One-Sided Months:          {}", self.unmatched)?;
        writeln!(f, "Total Quantity Mismatches: {}", self.total_quantity_mismatch)?;
        writeln!(f)?;
        writeln!(f, "Total Quantity Difference: {}", self.net_quantity_diff)?;
        writeln!(f, "Total Price Difference:    {}", self.net_price_diff)?;
        Ok(())
    }
}

/// Render the full diff table followed by its summary.
pub fn render_reconciliation(result: &ReconciliationResult) -> String {
    let summary = ReconciliationSummary::from_result(result);
    format!("=== Reconciliation Summary ===\n{result}\n{summary}")
}

/// Print the diff table and its summary to stdout.
pub fn print_reconciliation_summary(result: &ReconciliationResult) {
    println!("{}", render_reconciliation(result));
}
