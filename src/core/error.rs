use crate::core::period::PeriodKey;
use crate::core::side::Side;
use thiserror::Error;

/// Errors raised by the reconciliation pipeline.
///
/// Conditions the pipeline recovers from (a shock aimed at a month the table
/// does not have, a loader that cannot read its file) are reported as
/// diagnostics instead and never appear here.
#[derive(Debug, Error)]
pub enum ReconError {
    #[error("total quantity for period {period} is zero; weighted average price is undefined")]
    ZeroNetQuantity { period: PeriodKey },

    #[error("{side} table has more than one row for month {period}; net it before reconciling")]
    DuplicatePeriod { side: Side, period: PeriodKey },

    #[error("invalid period '{0}': expected YYYY-MM or a quarter label such as Q2-25")]
    InvalidPeriod(String),

    #[error("arithmetic overflow while netting period {period}")]
    Overflow { period: PeriodKey },

    #[error("missing required column '{column}' in {origin}")]
    MissingColumn { column: &'static str, origin: String },

    #[error("invalid {column} value '{value}' on row {row}")]
    InvalidValue {
        column: &'static str,
        value: String,
        row: usize,
    },

    #[error("unsupported file format for '{path}': expected .csv or .json")]
    UnsupportedFormat { path: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
