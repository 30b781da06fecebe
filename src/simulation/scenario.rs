//! What-if analysis: shock each book independently, then reconcile.

use crate::core::error::ReconError;
use crate::core::side::Side;
use crate::core::trade::TradeTable;
use crate::reconciliation::engine::{reconcile_trades, ReconciliationResult};
use crate::reconciliation::summary::ReconciliationSummary;
use crate::simulation::diagnostics::{DiagnosticSink, LogSink};
use crate::simulation::shock::{apply_shocks_with, ShockSpec};
use serde::{Deserialize, Serialize};

/// Shock both books and reconcile the shocked tables.
///
/// A missing shock spec means no shocks for that side. Skipped shock months
/// are logged as warnings.
///
/// # Examples
///
/// ```
/// use power_recon::core::trade::{TradeLeg, TradeTable};
/// use power_recon::simulation::scenario::run_scenario;
/// use power_recon::simulation::shock::{ShockKind, ShockSpec};
/// use rust_decimal_macros::dec;
///
/// let book: TradeTable = vec![TradeLeg::new("2025-04", dec!(100), dec!(30))].into_iter().collect();
/// let shocks = ShockSpec::new().with("2025-04", ShockKind::PricePct, dec!(0.10));
///
/// let result = run_scenario(&book, &book, Some(&shocks), None).unwrap();
/// assert_eq!(result.rows()[0].price_diff, dec!(3.00));
/// ```
pub fn run_scenario(
    internal_base: &TradeTable,
    clearer_base: &TradeTable,
    shocks_int: Option<&ShockSpec>,
    shocks_clr: Option<&ShockSpec>,
) -> Result<ReconciliationResult, ReconError> {
    run_scenario_with(internal_base, clearer_base, shocks_int, shocks_clr, &mut LogSink)
}

/// [`run_scenario`] with diagnostics routed to `sink`.
pub fn run_scenario_with(
    internal_base: &TradeTable,
    clearer_base: &TradeTable,
    shocks_int: Option<&ShockSpec>,
    shocks_clr: Option<&ShockSpec>,
    sink: &mut dyn DiagnosticSink,
) -> Result<ReconciliationResult, ReconError> {
    let no_shocks = ShockSpec::new();
    let int_shocked = apply_shocks_with(
        internal_base,
        shocks_int.unwrap_or(&no_shocks),
        Side::Internal,
        sink,
    );
    let clr_shocked = apply_shocks_with(
        clearer_base,
        shocks_clr.unwrap_or(&no_shocks),
        Side::Clearer,
        sink,
    );
    reconcile_trades(&int_shocked, &clr_shocked)
}

/// A named pair of shock specifications.
///
/// ```json
/// {"name": "april spike", "internal": {"2025-04": {"price_pct": 0.25}}}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default, skip_serializing_if = "ShockSpec::is_empty")]
    pub internal: ShockSpec,
    #[serde(default, skip_serializing_if = "ShockSpec::is_empty")]
    pub clearer: ShockSpec,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_internal(mut self, shocks: ShockSpec) -> Self {
        self.internal = shocks;
        self
    }

    pub fn with_clearer(mut self, shocks: ShockSpec) -> Self {
        self.clearer = shocks;
        self
    }
}

/// Result of one named scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub summary: ReconciliationSummary,
    pub result: ReconciliationResult,
}

/// Run every scenario against the same pair of base books.
///
/// Scenarios are independent: each starts from the unshocked bases.
pub fn run_scenarios(
    internal_base: &TradeTable,
    clearer_base: &TradeTable,
    scenarios: &[Scenario],
) -> Result<Vec<ScenarioOutcome>, ReconError> {
    scenarios
        .iter()
        .map(|scenario| {
            log::debug!("running scenario '{}'", scenario.name);
            let result = run_scenario(
                internal_base,
                clearer_base,
                Some(&scenario.internal),
                Some(&scenario.clearer),
            )?;
            Ok(ScenarioOutcome {
                name: scenario.name.clone(),
                summary: ReconciliationSummary::from_result(&result),
                result,
            })
        })
        .collect()
}
