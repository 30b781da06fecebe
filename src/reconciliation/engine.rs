use crate::core::error::ReconError;
use crate::core::period::PeriodKey;
use crate::core::side::Side;
use crate::core::trade::{TradeLeg, TradeTable};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Decimal places of every numeric column in a reconciliation row.
const RESULT_DP: u32 = 2;

/// One month of a reconciliation: both sides plus their differences.
///
/// A side that has no row for the month is `None`. Differences treat a
/// missing side as zero, so a one-sided month shows that side's full value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationRow {
    pub month: PeriodKey,
    pub quantity_mwh_internal: Option<Decimal>,
    pub quantity_mwh_clearer: Option<Decimal>,
    /// internal − clearer.
    pub quantity_diff: Decimal,
    pub price_eur_per_mwh_internal: Option<Decimal>,
    pub price_eur_per_mwh_clearer: Option<Decimal>,
    /// internal − clearer.
    pub price_diff: Decimal,
}

impl ReconciliationRow {
    fn from_sides(month: PeriodKey, internal: Option<&TradeLeg>, clearer: Option<&TradeLeg>) -> Self {
        let qty_int = internal.map(|l| l.quantity_mwh());
        let qty_clr = clearer.map(|l| l.quantity_mwh());
        let px_int = internal.map(|l| l.price_eur_per_mwh());
        let px_clr = clearer.map(|l| l.price_eur_per_mwh());

        let quantity_diff = qty_int.unwrap_or(Decimal::ZERO) - qty_clr.unwrap_or(Decimal::ZERO);
        let price_diff = px_int.unwrap_or(Decimal::ZERO) - px_clr.unwrap_or(Decimal::ZERO);

        Self {
            month,
            quantity_mwh_internal: qty_int.map(round),
            quantity_mwh_clearer: qty_clr.map(round),
            quantity_diff: round(quantity_diff),
            price_eur_per_mwh_internal: px_int.map(round),
            price_eur_per_mwh_clearer: px_clr.map(round),
            price_diff: round(price_diff),
        }
    }

    /// Whether the month appears in both books.
    pub fn is_matched(&self) -> bool {
        self.quantity_mwh_internal.is_some() && self.quantity_mwh_clearer.is_some()
    }

    /// Whether the two books disagree on quantity or price for this month.
    pub fn has_break(&self) -> bool {
        !self.quantity_diff.is_zero() || !self.price_diff.is_zero()
    }
}

fn round(value: Decimal) -> Decimal {
    value.round_dp(RESULT_DP)
}

/// The diff table produced by [`reconcile_trades`], sorted by month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReconciliationResult {
    rows: Vec<ReconciliationRow>,
}

impl ReconciliationResult {
    pub fn rows(&self) -> &[ReconciliationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up the row for a month.
    pub fn row(&self, month: &PeriodKey) -> Option<&ReconciliationRow> {
        self.rows
            .binary_search_by(|r| r.month.cmp(month))
            .ok()
            .map(|idx| &self.rows[idx])
    }

    /// Rows where the books disagree.
    pub fn breaks(&self) -> impl Iterator<Item = &ReconciliationRow> {
        self.rows.iter().filter(|r| r.has_break())
    }
}

impl<'a> IntoIterator for &'a ReconciliationResult {
    type Item = &'a ReconciliationRow;
    type IntoIter = std::slice::Iter<'a, ReconciliationRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

fn fmt_opt(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

impl fmt::Display for ReconciliationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>4}  {:<8} {:>12} {:>12} {:>12} {:>10} {:>10} {:>10}",
            "", "month", "qty_int", "qty_clr", "qty_diff", "px_int", "px_clr", "px_diff"
        )?;
        for (idx, row) in self.rows.iter().enumerate() {
            writeln!(
                f,
                "{:>4}  {:<8} {:>12} {:>12} {:>12} {:>10} {:>10} {:>10}",
                idx,
                row.month,
                fmt_opt(row.quantity_mwh_internal),
                fmt_opt(row.quantity_mwh_clearer),
                row.quantity_diff,
                fmt_opt(row.price_eur_per_mwh_internal),
                fmt_opt(row.price_eur_per_mwh_clearer),
                row.price_diff
            )?;
        }
        Ok(())
    }
}

/// Index a monthly table by month, rejecting repeated months.
fn index_by_month(table: &TradeTable, side: Side) -> Result<BTreeMap<&PeriodKey, &TradeLeg>, ReconError> {
    let mut index = BTreeMap::new();
    for leg in table {
        if index.insert(leg.period(), leg).is_some() {
            return Err(ReconError::DuplicatePeriod {
                side,
                period: leg.period().clone(),
            });
        }
    }
    Ok(index)
}

/// Reconcile an internal book against a clearer book, month by month.
///
/// Performs a full outer join on the month key: every month present in
/// either table yields exactly one row. Differences are `internal − clearer`
/// with a missing side counted as zero. All numeric columns are rounded to
/// 2 decimals and rows are sorted ascending by month.
///
/// # Errors
///
/// [`ReconError::DuplicatePeriod`] if either table holds more than one row
/// for a month. Net the table with
/// [`NettingEngine::net_monthly`](crate::reconciliation::netting::NettingEngine::net_monthly)
/// first.
///
/// # Examples
///
/// ```
/// use power_recon::core::trade::{TradeLeg, TradeTable};
/// use power_recon::reconciliation::engine::reconcile_trades;
/// use rust_decimal_macros::dec;
///
/// let internal: TradeTable = vec![TradeLeg::new("2025-04", dec!(100), dec!(30))].into_iter().collect();
/// let clearer: TradeTable = vec![TradeLeg::new("2025-04", dec!(90), dec!(30))].into_iter().collect();
///
/// let result = reconcile_trades(&internal, &clearer).unwrap();
/// assert_eq!(result.rows()[0].quantity_diff, dec!(10.00));
/// assert_eq!(result.rows()[0].price_diff, dec!(0));
/// ```
pub fn reconcile_trades(
    internal_trades: &TradeTable,
    clearer_trades: &TradeTable,
) -> Result<ReconciliationResult, ReconError> {
    let internal = index_by_month(internal_trades, Side::Internal)?;
    let clearer = index_by_month(clearer_trades, Side::Clearer)?;

    let mut months: Vec<&PeriodKey> = internal.keys().chain(clearer.keys()).copied().collect();
    months.sort();
    months.dedup();

    let rows: Vec<ReconciliationRow> = months
        .into_iter()
        .map(|month| {
            ReconciliationRow::from_sides(
                month.clone(),
                internal.get(month).copied(),
                clearer.get(month).copied(),
            )
        })
        .collect();

    log::debug!(
        "reconciled {} internal and {} clearer rows into {} months",
        internal_trades.len(),
        clearer_trades.len(),
        rows.len()
    );
    Ok(ReconciliationResult { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn table(rows: &[(&str, Decimal, Decimal)]) -> TradeTable {
        rows.iter()
            .map(|(month, qty, price)| TradeLeg::new(*month, *qty, *price))
            .collect()
    }

    #[test]
    fn test_matched_month() {
        let internal = table(&[("2025-04", dec!(100), dec!(30))]);
        let clearer = table(&[("2025-04", dec!(90), dec!(30))]);
        let result = reconcile_trades(&internal, &clearer).unwrap();

        assert_eq!(result.len(), 1);
        let row = &result.rows()[0];
        assert_eq!(row.month.as_str(), "2025-04");
        assert_eq!(row.quantity_diff, dec!(10.00));
        assert_eq!(row.price_diff, dec!(0.00));
        assert!(row.is_matched());
        assert!(row.has_break());
    }

    #[test]
    fn test_outer_join_one_sided_months() {
        let internal = table(&[
            ("2025-06", dec!(40), dec!(31.5)),
            ("2025-04", dec!(100), dec!(30)),
        ]);
        let clearer = table(&[
            ("2025-04", dec!(100), dec!(30)),
            ("2025-05", dec!(75), dec!(28.25)),
        ]);
        let result = reconcile_trades(&internal, &clearer).unwrap();

        let months: Vec<&str> = result.rows().iter().map(|r| r.month.as_str()).collect();
        assert_eq!(months, ["2025-04", "2025-05", "2025-06"]);

        let may = result.row(&"2025-05".into()).unwrap();
        assert_eq!(may.quantity_mwh_internal, None);
        assert_eq!(may.quantity_diff, dec!(-75));
        assert_eq!(may.price_diff, dec!(-28.25));

        let june = result.row(&"2025-06".into()).unwrap();
        assert_eq!(june.quantity_mwh_clearer, None);
        assert_eq!(june.quantity_diff, dec!(40));
        assert_eq!(june.price_diff, dec!(31.5));

        assert!(!result.row(&"2025-04".into()).unwrap().has_break());
        assert_eq!(result.breaks().count(), 2);
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        let internal = table(&[("2025-04", dec!(100.126), dec!(30.004))]);
        let clearer = table(&[("2025-04", dec!(100), dec!(30))]);
        let row = reconcile_trades(&internal, &clearer).unwrap().rows()[0].clone();

        assert_eq!(row.quantity_mwh_internal, Some(dec!(100.13)));
        assert_eq!(row.quantity_diff, dec!(0.13));
        assert_eq!(row.price_eur_per_mwh_internal, Some(dec!(30.00)));
        assert_eq!(row.price_diff, dec!(0.00));
    }

    #[test]
    fn test_duplicate_month_rejected() {
        let internal = table(&[("2025-04", dec!(1), dec!(1))]);
        let clearer = table(&[("2025-04", dec!(1), dec!(1)), ("2025-04", dec!(2), dec!(1))]);
        match reconcile_trades(&internal, &clearer) {
            Err(ReconError::DuplicatePeriod { side, period }) => {
                assert_eq!(side, Side::Clearer);
                assert_eq!(period.as_str(), "2025-04");
            }
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_inputs() {
        let result = reconcile_trades(&TradeTable::new(), &TradeTable::new()).unwrap();
        assert!(result.is_empty());

        let clearer = table(&[("2025-04", dec!(5), dec!(50))]);
        let result = reconcile_trades(&TradeTable::new(), &clearer).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.rows()[0].quantity_diff, dec!(-5));
    }
}
