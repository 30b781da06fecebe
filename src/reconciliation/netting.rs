use crate::core::error::ReconError;
use crate::core::period::PeriodKey;
use crate::core::trade::{ContractType, TradeLeg, TradeTable};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Relative distance from a whole number below which a summed quantity is
/// treated as that whole number before truncation.
///
/// Splitting a quarter into thirds leaves a residue in the last representable
/// digit (`100 / 3 * 3 = 99.999…9`). This is far below any quantity written
/// to a book, so `10.9999999996` still truncates to `10`.
const QUANTITY_RESIDUE: Decimal = Decimal::from_parts(1, 0, 0, false, 20);

/// Decimal places of the net price.
const NET_PRICE_DP: u32 = 1;

/// Running totals for one period.
#[derive(Debug, Default)]
struct PeriodAccumulator {
    quantity: Decimal,
    notional: Decimal,
}

/// Nets trade legs into one position per period.
pub struct NettingEngine;

impl NettingEngine {
    /// Collapse every period of `trades` into a single net leg.
    ///
    /// # Algorithm
    ///
    /// 1. Group legs by period, keeping the order periods first appear in.
    /// 2. Net quantity = Σ quantity, truncated toward zero to whole MWh.
    /// 3. Net price = Σ(price × quantity) / Σ quantity, rounded to 1 decimal.
    ///
    /// Output legs carry the `Net Monthly Trade` contract type and no trade id.
    ///
    /// # Errors
    ///
    /// [`ReconError::ZeroNetQuantity`] when a period's quantities sum to zero,
    /// since its weighted-average price is undefined.
    /// [`ReconError::Overflow`] when a notional or a running sum leaves the
    /// decimal range.
    pub fn net_monthly(trades: &TradeTable) -> Result<TradeTable, ReconError> {
        let mut order: Vec<&PeriodKey> = Vec::new();
        let mut totals: HashMap<&PeriodKey, PeriodAccumulator> = HashMap::new();

        for leg in trades {
            let acc = totals.entry(leg.period()).or_insert_with(|| {
                order.push(leg.period());
                PeriodAccumulator::default()
            });
            let overflow = || ReconError::Overflow {
                period: leg.period().clone(),
            };
            let notional = leg
                .price_eur_per_mwh()
                .checked_mul(leg.quantity_mwh())
                .ok_or_else(overflow)?;
            acc.quantity = acc.quantity.checked_add(leg.quantity_mwh()).ok_or_else(overflow)?;
            acc.notional = acc.notional.checked_add(notional).ok_or_else(overflow)?;
        }

        let mut net = TradeTable::new();
        for period in order {
            let acc = &totals[period];
            net.add(Self::net_leg(period, acc)?);
        }
        log::debug!("netted {} legs into {} periods", trades.len(), net.len());
        Ok(net)
    }

    fn net_leg(period: &PeriodKey, acc: &PeriodAccumulator) -> Result<TradeLeg, ReconError> {
        if acc.quantity.is_zero() {
            return Err(ReconError::ZeroNetQuantity {
                period: period.clone(),
            });
        }
        let average_price = acc
            .notional
            .checked_div(acc.quantity)
            .ok_or_else(|| ReconError::Overflow {
                period: period.clone(),
            })?;
        let quantity = snap_residue(acc.quantity).trunc();

        Ok(TradeLeg::new(
            period.clone(),
            quantity,
            average_price.round_dp(NET_PRICE_DP),
        )
        .with_contract_type(ContractType::NetMonthlyTrade))
    }
}

fn snap_residue(quantity: Decimal) -> Decimal {
    let whole = quantity.round();
    let tolerance = quantity.abs().max(Decimal::ONE) * QUANTITY_RESIDUE;
    if (quantity - whole).abs() <= tolerance {
        whole
    } else {
        quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decomposition::quarterly::add_monthly_legs_to_trades;
    use rust_decimal_macros::dec;

    fn table(rows: &[(&str, Decimal, Decimal)]) -> TradeTable {
        rows.iter()
            .map(|(period, qty, price)| TradeLeg::new(*period, *qty, *price))
            .collect()
    }

    #[test]
    fn test_weighted_average_price() {
        let trades = table(&[
            ("2025-04", dec!(100), dec!(30)),
            ("2025-04", dec!(50), dec!(36)),
        ]);
        let net = NettingEngine::net_monthly(&trades).unwrap();
        assert_eq!(net.len(), 1);

        let leg = &net.legs()[0];
        assert_eq!(leg.quantity_mwh(), dec!(150));
        // (100*30 + 50*36) / 150 = 32
        assert_eq!(leg.price_eur_per_mwh(), dec!(32.0));
        assert_eq!(leg.contract_type(), Some(&ContractType::NetMonthlyTrade));
        assert!(leg.trade_id().is_none());
    }

    #[test]
    fn test_price_rounds_to_one_decimal() {
        let trades = table(&[
            ("2025-05", dec!(1), dec!(10)),
            ("2025-05", dec!(2), dec!(11)),
        ]);
        // 32 / 3 = 10.666…
        let net = NettingEngine::net_monthly(&trades).unwrap();
        assert_eq!(net.legs()[0].price_eur_per_mwh(), dec!(10.7));
    }

    #[test]
    fn test_quantity_truncates() {
        let trades = table(&[
            ("2025-04", dec!(10.4), dec!(30)),
            ("2025-04", dec!(10.5), dec!(30)),
        ]);
        let net = NettingEngine::net_monthly(&trades).unwrap();
        assert_eq!(net.legs()[0].quantity_mwh(), dec!(20));
    }

    #[test]
    fn test_quantity_just_below_whole_truncates() {
        let trades = table(&[("2025-04", dec!(10.9999999996), dec!(30))]);
        let net = NettingEngine::net_monthly(&trades).unwrap();
        assert_eq!(net.legs()[0].quantity_mwh(), dec!(10));

        let trades = table(&[
            ("2025-04", dec!(-3.0000000004), dec!(30)),
            ("2025-04", dec!(-4), dec!(30)),
        ]);
        let net = NettingEngine::net_monthly(&trades).unwrap();
        assert_eq!(net.legs()[0].quantity_mwh(), dec!(-7));
    }

    #[test]
    fn test_large_decomposed_quantity_nets_whole() {
        let quarterly = table(&[
            ("Q2-25", dec!(1000000), dec!(30)),
            ("Q2-25", dec!(1000000), dec!(30)),
            ("Q2-25", dec!(1000000), dec!(30)),
        ]);
        let net = NettingEngine::net_monthly(&add_monthly_legs_to_trades(&quarterly)).unwrap();
        // 3 × 333333.33… per month
        assert!(net.iter().all(|l| l.quantity_mwh() == dec!(1000000)));
    }

    #[test]
    fn test_quantity_sum_overflow_is_an_error() {
        let half = Decimal::MAX / dec!(2) + Decimal::ONE;
        let trades = table(&[("2025-04", half, dec!(0)), ("2025-04", half, dec!(0))]);
        match NettingEngine::net_monthly(&trades).unwrap_err() {
            ReconError::Overflow { period } => assert_eq!(period.as_str(), "2025-04"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_notional_sum_overflow_is_an_error() {
        let big = Decimal::MAX / dec!(4);
        let trades = table(&[("2025-05", big, dec!(3)), ("2025-05", big, dec!(3))]);
        let err = NettingEngine::net_monthly(&trades).unwrap_err();
        assert!(matches!(err, ReconError::Overflow { .. }));
    }

    #[test]
    fn test_decomposed_thirds_net_to_whole_quantity() {
        let quarterly = table(&[("Q2-25", dec!(100), dec!(30)), ("Q2-25", dec!(200), dec!(33))]);
        let legs = add_monthly_legs_to_trades(&quarterly);
        let net = NettingEngine::net_monthly(&legs).unwrap();

        assert_eq!(net.len(), 3);
        for leg in &net {
            assert_eq!(leg.quantity_mwh(), dec!(100));
            // (33.33…*30 + 66.66…*33) / 100 = 32
            assert_eq!(leg.price_eur_per_mwh(), dec!(32.0));
        }
    }

    #[test]
    fn test_first_appearance_order() {
        let trades = table(&[
            ("2025-06", dec!(1), dec!(1)),
            ("2025-04", dec!(1), dec!(1)),
            ("2025-06", dec!(1), dec!(1)),
            ("2025-05", dec!(1), dec!(1)),
        ]);
        let net = NettingEngine::net_monthly(&trades).unwrap();
        let periods: Vec<&str> = net.iter().map(|l| l.period().as_str()).collect();
        assert_eq!(periods, ["2025-06", "2025-04", "2025-05"]);
    }

    #[test]
    fn test_zero_quantity_is_an_error() {
        let trades = table(&[
            ("2025-04", dec!(100), dec!(30)),
            ("2025-05", dec!(50), dec!(30)),
            ("2025-05", dec!(-50), dec!(31)),
        ]);
        let err = NettingEngine::net_monthly(&trades).unwrap_err();
        match err {
            ReconError::ZeroNetQuantity { period } => assert_eq!(period.as_str(), "2025-05"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_table() {
        let net = NettingEngine::net_monthly(&TradeTable::new()).unwrap();
        assert!(net.is_empty());
    }
}
