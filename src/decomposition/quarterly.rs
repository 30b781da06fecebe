//! Quarterly-to-monthly contract decomposition.
//!
//! A quarterly contract is split into three monthly legs of equal quantity,
//! each carrying the quarterly price unchanged (flat price, no forward curve).

use crate::core::period::{Month, PeriodKey, Quarter};
use crate::core::trade::{ContractType, TradeLeg, TradeTable};
use rust_decimal::Decimal;

/// The quarter every record is decomposed into unless configured otherwise.
pub const DEFAULT_QUARTER: Quarter = Quarter::from_parts(2025, 2);

/// How the target months of a quarterly record are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarPolicy {
    /// Every record lands in the same quarter, whatever its stated period.
    Fixed(Quarter),
    /// Use the record's own quarter label; records whose period is not a
    /// quarter label fall back to `fallback`.
    FromPeriod { fallback: Quarter },
}

impl Default for CalendarPolicy {
    fn default() -> Self {
        CalendarPolicy::Fixed(DEFAULT_QUARTER)
    }
}

impl CalendarPolicy {
    /// Months a given record is split into.
    pub fn months_for(&self, row: &TradeLeg) -> [Month; 3] {
        match self {
            CalendarPolicy::Fixed(quarter) => quarter.months(),
            CalendarPolicy::FromPeriod { fallback } => match row.period().as_quarter() {
                Some(quarter) => quarter.months(),
                None => {
                    log::warn!(
                        "period '{}' is not a quarter label, decomposing into {}",
                        row.period(),
                        fallback
                    );
                    fallback.months()
                }
            },
        }
    }
}

/// Configuration for batch decomposition.
#[derive(Debug, Clone)]
pub struct DecomposeConfig {
    pub calendar: CalendarPolicy,
    /// Trade id assigned to the first generated leg.
    pub start_trade_id: u64,
}

impl Default for DecomposeConfig {
    fn default() -> Self {
        Self {
            calendar: CalendarPolicy::default(),
            start_trade_id: 1,
        }
    }
}

/// Split one quarterly record into its three monthly legs for the default
/// quarter (April to June 2025).
///
/// Leg ids run `start_trade_id`, `start_trade_id + 1`, `start_trade_id + 2`.
///
/// # Examples
///
/// ```
/// use power_recon::core::trade::TradeLeg;
/// use power_recon::decomposition::quarterly::convert_qtr_into_months;
/// use rust_decimal_macros::dec;
///
/// let legs = convert_qtr_into_months(&TradeLeg::new("Q2-25", dec!(300), dec!(42)), 1);
/// assert_eq!(legs.len(), 3);
/// assert!(legs.iter().all(|l| l.quantity_mwh() == dec!(100)));
/// ```
pub fn convert_qtr_into_months(row: &TradeLeg, start_trade_id: u64) -> TradeTable {
    decompose_quarter(row, start_trade_id, &CalendarPolicy::default())
}

/// Split one quarterly record into three monthly legs chosen by `calendar`.
///
/// Ids that would pass `u64::MAX` are left unassigned.
pub fn decompose_quarter(row: &TradeLeg, start_trade_id: u64, calendar: &CalendarPolicy) -> TradeTable {
    monthly_legs(row, Some(start_trade_id), calendar)
}

fn monthly_legs(row: &TradeLeg, first_id: Option<u64>, calendar: &CalendarPolicy) -> TradeTable {
    let months = calendar.months_for(row);
    let qty_per_month = row.quantity_mwh() / Decimal::from(months.len());
    let price = row.price_eur_per_mwh();

    months
        .iter()
        .enumerate()
        .map(|(offset, month)| {
            let leg = TradeLeg::new(PeriodKey::from(*month), qty_per_month, price)
                .with_contract_type(ContractType::QuarterlyDecomposed);
            match first_id.and_then(|id| id.checked_add(offset as u64)) {
                Some(trade_id) => leg.with_trade_id(trade_id),
                None => leg,
            }
        })
        .collect()
}

/// Decompose every row of `trades` with the default configuration.
pub fn add_monthly_legs_to_trades(trades: &TradeTable) -> TradeTable {
    decompose_table(trades, &DecomposeConfig::default())
}

/// Decompose every row of `trades` and concatenate the legs in row order.
///
/// Trade ids continue across rows, so every generated leg in the output has
/// a distinct id. Once the id space is exhausted, further legs carry no id.
pub fn decompose_table(trades: &TradeTable, config: &DecomposeConfig) -> TradeTable {
    let mut out = TradeTable::new();
    let mut next_id = Some(config.start_trade_id);
    let mut unassigned = 0;
    for row in trades {
        let legs = monthly_legs(row, next_id, &config.calendar);
        next_id = next_id.and_then(|id| id.checked_add(legs.len() as u64));
        unassigned += legs.iter().filter(|l| l.trade_id().is_none()).count();
        out.append(legs);
    }
    if unassigned > 0 {
        log::warn!(
            "trade ids from {} exhausted, {} legs have no id",
            config.start_trade_id,
            unassigned
        );
    }
    log::debug!("decomposed {} quarterly rows into {} legs", trades.len(), out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fixed_window_ignores_stated_period() {
        let row = TradeLeg::new("Q4-26", dec!(90), dec!(55.5));
        let legs = convert_qtr_into_months(&row, 10);

        let periods: Vec<&str> = legs.iter().map(|l| l.period().as_str()).collect();
        assert_eq!(periods, ["2025-04", "2025-05", "2025-06"]);

        let ids: Vec<u64> = legs.iter().filter_map(|l| l.trade_id()).collect();
        assert_eq!(ids, [10, 11, 12]);

        for leg in &legs {
            assert_eq!(leg.quantity_mwh(), dec!(30));
            assert_eq!(leg.price_eur_per_mwh(), dec!(55.5));
            assert_eq!(leg.contract_type(), Some(&ContractType::QuarterlyDecomposed));
        }
    }

    #[test]
    fn test_uneven_split_conserves_quantity() {
        let row = TradeLeg::new("Q2-25", dec!(100), dec!(30));
        let legs = convert_qtr_into_months(&row, 1);
        let diff = (legs.total_quantity() - dec!(100)).abs();
        assert!(diff < dec!(0.000000000001));
    }

    #[test]
    fn test_from_period_policy() {
        let policy = CalendarPolicy::FromPeriod {
            fallback: DEFAULT_QUARTER,
        };
        let legs = decompose_quarter(&TradeLeg::new("Q3-25", dec!(3), dec!(1)), 1, &policy);
        let periods: Vec<&str> = legs.iter().map(|l| l.period().as_str()).collect();
        assert_eq!(periods, ["2025-07", "2025-08", "2025-09"]);

        let legs = decompose_quarter(&TradeLeg::new("Cal-25", dec!(3), dec!(1)), 1, &policy);
        assert_eq!(legs.legs()[0].period().as_str(), "2025-04");
    }

    #[test]
    fn test_batch_preserves_order_and_ids() {
        let trades: TradeTable = vec![
            TradeLeg::new("Q2-25", dec!(300), dec!(40)),
            TradeLeg::new("Q2-25", dec!(150), dec!(44)),
        ]
        .into_iter()
        .collect();

        let legs = add_monthly_legs_to_trades(&trades);
        assert_eq!(legs.len(), 6);
        assert_eq!(legs.legs()[0].price_eur_per_mwh(), dec!(40));
        assert_eq!(legs.legs()[3].price_eur_per_mwh(), dec!(44));
        assert_eq!(legs.legs()[3].quantity_mwh(), dec!(50));

        let ids: Vec<u64> = legs.iter().filter_map(|l| l.trade_id()).collect();
        assert_eq!(ids, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_ids_stop_at_u64_max() {
        let legs = convert_qtr_into_months(&TradeLeg::new("Q2-25", dec!(3), dec!(1)), u64::MAX - 1);
        let ids: Vec<Option<u64>> = legs.iter().map(|l| l.trade_id()).collect();
        assert_eq!(ids, [Some(u64::MAX - 1), Some(u64::MAX), None]);

        let trades: TradeTable = vec![
            TradeLeg::new("Q2-25", dec!(3), dec!(1)),
            TradeLeg::new("Q2-25", dec!(6), dec!(1)),
        ]
        .into_iter()
        .collect();
        let config = DecomposeConfig {
            start_trade_id: u64::MAX - 2,
            ..Default::default()
        };
        let legs = decompose_table(&trades, &config);
        assert_eq!(legs.len(), 6);
        let ids: Vec<u64> = legs.iter().filter_map(|l| l.trade_id()).collect();
        assert_eq!(ids, [u64::MAX - 2, u64::MAX - 1, u64::MAX]);
    }

    #[test]
    fn test_empty_batch() {
        assert!(add_monthly_legs_to_trades(&TradeTable::new()).is_empty());
    }
}
