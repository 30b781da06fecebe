use crate::core::period::PeriodKey;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Contract type label carried by a trade leg.
///
/// The two engine-produced labels are typed; anything else a source system
/// reports is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContractType {
    /// A monthly leg produced by splitting a quarterly contract.
    QuarterlyDecomposed,
    /// One net position per month produced by the netting engine.
    NetMonthlyTrade,
    /// A label defined by the source book.
    Other(String),
}

impl ContractType {
    pub fn as_str(&self) -> &str {
        match self {
            ContractType::QuarterlyDecomposed => "Quarterly decomposed",
            ContractType::NetMonthlyTrade => "Net Monthly Trade",
            ContractType::Other(label) => label,
        }
    }
}

impl From<String> for ContractType {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Quarterly decomposed" => ContractType::QuarterlyDecomposed,
            "Net Monthly Trade" => ContractType::NetMonthlyTrade,
            _ => ContractType::Other(label),
        }
    }
}

impl From<&str> for ContractType {
    fn from(label: &str) -> Self {
        Self::from(label.to_string())
    }
}

impl From<ContractType> for String {
    fn from(ct: ContractType) -> Self {
        ct.as_str().to_string()
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a trade table: a position for a single period.
///
/// Quantities are MWh and prices EUR/MWh. Quantities are not required to be
/// non-negative; shocks and source data may push them below zero.
///
/// # Examples
///
/// ```
/// use power_recon::core::trade::TradeLeg;
/// use rust_decimal_macros::dec;
///
/// let leg = TradeLeg::new("2025-04", dec!(100), dec!(30)).with_trade_id(7);
/// assert_eq!(leg.period().as_str(), "2025-04");
/// assert_eq!(leg.trade_id(), Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLeg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trade_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contract_type: Option<ContractType>,
    /// The `month` column; `contract_period` is accepted on input.
    #[serde(rename = "month", alias = "contract_period")]
    period: PeriodKey,
    quantity_mwh: Decimal,
    price_eur_per_mwh: Decimal,
}

impl TradeLeg {
    pub fn new(period: impl Into<PeriodKey>, quantity_mwh: Decimal, price_eur_per_mwh: Decimal) -> Self {
        Self {
            trade_id: None,
            contract_type: None,
            period: period.into(),
            quantity_mwh,
            price_eur_per_mwh,
        }
    }

    pub fn with_trade_id(mut self, trade_id: u64) -> Self {
        self.trade_id = Some(trade_id);
        self
    }

    pub fn with_contract_type(mut self, contract_type: impl Into<ContractType>) -> Self {
        self.contract_type = Some(contract_type.into());
        self
    }

    // --- Accessors ---

    pub fn trade_id(&self) -> Option<u64> {
        self.trade_id
    }

    pub fn contract_type(&self) -> Option<&ContractType> {
        self.contract_type.as_ref()
    }

    pub fn period(&self) -> &PeriodKey {
        &self.period
    }

    pub fn quantity_mwh(&self) -> Decimal {
        self.quantity_mwh
    }

    pub fn price_eur_per_mwh(&self) -> Decimal {
        self.price_eur_per_mwh
    }

    pub(crate) fn set_quantity_mwh(&mut self, quantity_mwh: Decimal) {
        self.quantity_mwh = quantity_mwh;
    }

    pub(crate) fn set_price_eur_per_mwh(&mut self, price_eur_per_mwh: Decimal) {
        self.price_eur_per_mwh = price_eur_per_mwh;
    }
}

/// An ordered sequence of trade legs.
///
/// Engine operations take a table by reference and return a new one; a table
/// handed to the engine is never modified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeTable {
    legs: Vec<TradeLeg>,
}

impl TradeTable {
    pub fn new() -> Self {
        Self { legs: Vec::new() }
    }

    pub fn add(&mut self, leg: TradeLeg) {
        self.legs.push(leg);
    }

    /// Append every leg of `other`, preserving order.
    pub fn append(&mut self, other: TradeTable) {
        self.legs.extend(other.legs);
    }

    pub fn legs(&self) -> &[TradeLeg] {
        &self.legs
    }

    pub(crate) fn legs_mut(&mut self) -> &mut [TradeLeg] {
        &mut self.legs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TradeLeg> {
        self.legs.iter()
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Distinct periods, in order of first appearance.
    pub fn periods(&self) -> Vec<PeriodKey> {
        let mut seen = HashSet::new();
        self.legs
            .iter()
            .filter(|leg| seen.insert(leg.period()))
            .map(|leg| leg.period().clone())
            .collect()
    }

    pub fn contains_period(&self, period: &PeriodKey) -> bool {
        self.legs.iter().any(|leg| leg.period() == period)
    }

    /// All legs for one period.
    pub fn legs_for(&self, period: &PeriodKey) -> impl Iterator<Item = &TradeLeg> {
        let period = period.clone();
        self.legs.iter().filter(move |leg| *leg.period() == period)
    }

    pub fn total_quantity(&self) -> Decimal {
        self.legs.iter().map(|leg| leg.quantity_mwh()).sum()
    }
}

impl FromIterator<TradeLeg> for TradeTable {
    fn from_iter<T: IntoIterator<Item = TradeLeg>>(iter: T) -> Self {
        Self {
            legs: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for TradeTable {
    type Item = TradeLeg;
    type IntoIter = std::vec::IntoIter<TradeLeg>;

    fn into_iter(self) -> Self::IntoIter {
        self.legs.into_iter()
    }
}

impl<'a> IntoIterator for &'a TradeTable {
    type Item = &'a TradeLeg;
    type IntoIter = std::slice::Iter<'a, TradeLeg>;

    fn into_iter(self) -> Self::IntoIter {
        self.legs.iter()
    }
}

impl fmt::Display for TradeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>8}  {:<22} {:<10} {:>14} {:>12}",
            "trade_id", "contract_type", "period", "quantity_mwh", "price"
        )?;
        for leg in &self.legs {
            let id = leg.trade_id.map(|id| id.to_string()).unwrap_or_default();
            let ct = leg.contract_type.as_ref().map(|c| c.as_str()).unwrap_or("");
            writeln!(
                f,
                "{:>8}  {:<22} {:<10} {:>14} {:>12}",
                id,
                ct,
                leg.period,
                leg.quantity_mwh.round_dp(4),
                leg.price_eur_per_mwh.round_dp(4)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_table() -> TradeTable {
        let mut table = TradeTable::new();
        table.add(TradeLeg::new("2025-05", dec!(10), dec!(40)));
        table.add(TradeLeg::new("2025-04", dec!(20), dec!(35)));
        table.add(TradeLeg::new("2025-05", dec!(30), dec!(42)));
        table
    }

    #[test]
    fn test_periods_first_appearance_order() {
        let periods = sample_table().periods();
        assert_eq!(periods, vec![PeriodKey::new("2025-05"), PeriodKey::new("2025-04")]);
    }

    #[test]
    fn test_legs_for_and_totals() {
        let table = sample_table();
        assert_eq!(table.legs_for(&PeriodKey::new("2025-05")).count(), 2);
        assert_eq!(table.total_quantity(), dec!(60));
        assert!(table.contains_period(&"2025-04".into()));
        assert!(!table.contains_period(&"2025-06".into()));
    }

    #[test]
    fn test_contract_type_labels() {
        assert_eq!(
            ContractType::from("Net Monthly Trade"),
            ContractType::NetMonthlyTrade
        );
        assert_eq!(
            ContractType::from("Baseload"),
            ContractType::Other("Baseload".to_string())
        );
        assert_eq!(ContractType::QuarterlyDecomposed.to_string(), "Quarterly decomposed");
    }

    #[test]
    fn test_leg_accepts_contract_period_alias() {
        let json = r#"{"contract_period": "2025-06", "quantity_mwh": 12.5, "price_eur_per_mwh": "41.2"}"#;
        let leg: TradeLeg = serde_json::from_str(json).unwrap();
        assert_eq!(leg.period().as_str(), "2025-06");
        assert_eq!(leg.quantity_mwh(), dec!(12.5));
        assert_eq!(leg.price_eur_per_mwh(), dec!(41.2));
        assert!(leg.trade_id().is_none());
    }
}
