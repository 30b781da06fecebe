//! Declarative per-month shocks for stress testing.
//!
//! A [`ShockSpec`] maps a month to a [`MonthShock`]: a relative price move
//! (`price_pct`, `0.10` = +10 %) and/or an absolute quantity move
//! (`qty_abs`, MWh). In JSON it reads
//! `{"2025-04": {"price_pct": 0.10, "qty_abs": -50}}`; any other kind name
//! is rejected at parse time.

use crate::core::period::PeriodKey;
use crate::core::side::Side;
use crate::core::trade::TradeTable;
use crate::simulation::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShockKind {
    /// Multiply the price by `1 + magnitude`.
    PricePct,
    /// Add `magnitude` MWh to the quantity.
    QtyAbs,
}

impl fmt::Display for ShockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShockKind::PricePct => f.write_str("price_pct"),
            ShockKind::QtyAbs => f.write_str("qty_abs"),
        }
    }
}

/// The shocks for a single month. Both kinds are optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonthShock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_pct: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty_abs: Option<Decimal>,
}

impl MonthShock {
    pub fn get(&self, kind: ShockKind) -> Option<Decimal> {
        match kind {
            ShockKind::PricePct => self.price_pct,
            ShockKind::QtyAbs => self.qty_abs,
        }
    }

    pub fn set(&mut self, kind: ShockKind, magnitude: Decimal) {
        match kind {
            ShockKind::PricePct => self.price_pct = Some(magnitude),
            ShockKind::QtyAbs => self.qty_abs = Some(magnitude),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.price_pct.is_none() && self.qty_abs.is_none()
    }
}

/// Month → shocks mapping.
///
/// # Examples
///
/// ```
/// use power_recon::simulation::shock::{ShockKind, ShockSpec};
/// use rust_decimal_macros::dec;
///
/// let spec = ShockSpec::new()
///     .with("2025-04", ShockKind::PricePct, dec!(0.10))
///     .with("2025-04", ShockKind::QtyAbs, dec!(-50));
///
/// let parsed: ShockSpec =
///     serde_json::from_str(r#"{"2025-04": {"price_pct": 0.10, "qty_abs": -50}}"#).unwrap();
/// assert_eq!(spec, parsed);
/// assert!(serde_json::from_str::<ShockSpec>(r#"{"2025-04": {"price_pc": 0.1}}"#).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShockSpec {
    months: BTreeMap<PeriodKey, MonthShock>,
}

impl ShockSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ShockSpec::set`].
    pub fn with(mut self, month: impl Into<PeriodKey>, kind: ShockKind, magnitude: Decimal) -> Self {
        self.set(month, kind, magnitude);
        self
    }

    /// Set one shock kind for a month, replacing any previous magnitude of that kind.
    pub fn set(&mut self, month: impl Into<PeriodKey>, kind: ShockKind, magnitude: Decimal) {
        self.months.entry(month.into()).or_default().set(kind, magnitude);
    }

    pub fn get(&self, month: &PeriodKey) -> Option<&MonthShock> {
        self.months.get(month)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PeriodKey, &MonthShock)> {
        self.months.iter()
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

/// Apply `shocks` to a copy of `table`, logging skipped months via `log`.
///
/// See [`apply_shocks_with`].
pub fn apply_shocks(table: &TradeTable, shocks: &ShockSpec, side: Side) -> TradeTable {
    apply_shocks_with(table, shocks, side, &mut LogSink)
}

/// Apply `shocks` to a copy of `table`, reporting skipped months to `sink`.
///
/// For each shocked month present in the table, every row of that month has
/// its price multiplied by `1 + price_pct` and `qty_abs` added to its
/// quantity. The two kinds act on the original values independently, so
/// their order is irrelevant. A month absent from the table is reported as
/// [`Diagnostic::ShockMonthMissing`] and skipped. An adjustment whose result
/// leaves the decimal range is reported as [`Diagnostic::ShockOverflow`] and
/// not applied to that row. `side` only labels the diagnostics.
pub fn apply_shocks_with(
    table: &TradeTable,
    shocks: &ShockSpec,
    side: Side,
    sink: &mut dyn DiagnosticSink,
) -> TradeTable {
    let mut out = table.clone();

    for (month, shock) in shocks.iter() {
        if !out.contains_period(month) {
            sink.report(Diagnostic::ShockMonthMissing {
                side,
                month: month.clone(),
            });
            continue;
        }
        for leg in out.legs_mut().iter_mut().filter(|leg| leg.period() == month) {
            if let Some(pct) = shock.price_pct {
                let shocked = Decimal::ONE
                    .checked_add(pct)
                    .and_then(|factor| leg.price_eur_per_mwh().checked_mul(factor));
                match shocked {
                    Some(price) => leg.set_price_eur_per_mwh(price),
                    None => sink.report(overflow(side, month, ShockKind::PricePct)),
                }
            }
            if let Some(delta) = shock.qty_abs {
                match leg.quantity_mwh().checked_add(delta) {
                    Some(quantity) => leg.set_quantity_mwh(quantity),
                    None => sink.report(overflow(side, month, ShockKind::QtyAbs)),
                }
            }
        }
    }
    out
}

fn overflow(side: Side, month: &PeriodKey, kind: ShockKind) -> Diagnostic {
    Diagnostic::ShockOverflow {
        side,
        month: month.clone(),
        kind,
    }
}
