//! # power-recon
//!
//! Energy trade reconciliation and stress-shock engine.
//!
//! Given two independently reported views of the same power deals (an
//! internal book and a clearer book) this crate breaks quarterly contracts
//! into monthly legs, nets them per month, reconciles the two books month by
//! month and replays the reconciliation under hypothetical market shocks.
//!
//! ## Architecture
//!
//! - **core**: Periods, trade legs and tables, sides, errors
//! - **decomposition**: Quarterly contracts split into monthly legs
//! - **reconciliation**: Monthly netting, the two-book diff, summaries
//! - **simulation**: Shocks, scenario runs, random book generation
//! - **io**: CSV / JSON loading of books and shock files
//!
//! Every engine operation takes its inputs by reference and returns a new
//! table; nothing is mutated in place.

pub mod core;
pub mod decomposition;
pub mod io;
pub mod reconciliation;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::error::ReconError;
    pub use crate::core::period::{Month, PeriodKey, Quarter};
    pub use crate::core::side::Side;
    pub use crate::core::trade::{ContractType, TradeLeg, TradeTable};
    pub use crate::decomposition::quarterly::{
        add_monthly_legs_to_trades, convert_qtr_into_months, CalendarPolicy, DecomposeConfig,
    };
    pub use crate::reconciliation::engine::{reconcile_trades, ReconciliationResult, ReconciliationRow};
    pub use crate::reconciliation::netting::NettingEngine;
    pub use crate::reconciliation::summary::ReconciliationSummary;
    pub use crate::simulation::scenario::{run_scenario, Scenario};
    pub use crate::simulation::shock::{apply_shocks, MonthShock, ShockKind, ShockSpec};
}
