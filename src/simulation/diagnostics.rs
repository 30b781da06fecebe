//! Non-fatal diagnostics raised while applying shocks.
//!
//! The engine never prints. It hands each diagnostic to a [`DiagnosticSink`];
//! [`LogSink`] forwards them to the `log` facade, [`CollectingSink`] keeps
//! them for inspection.

use crate::core::period::PeriodKey;
use crate::core::side::Side;
use crate::simulation::shock::ShockKind;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A shock targeted a month the table has no rows for; it was skipped.
    ShockMonthMissing { side: Side, month: PeriodKey },
    /// Applying `kind` to a row of `month` left the decimal range; that
    /// adjustment was not applied to the row.
    ShockOverflow {
        side: Side,
        month: PeriodKey,
        kind: ShockKind,
    },
}

impl Diagnostic {
    pub fn side(&self) -> Side {
        match self {
            Diagnostic::ShockMonthMissing { side, .. } | Diagnostic::ShockOverflow { side, .. } => *side,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ShockMonthMissing { side, month } => {
                write!(f, "{side}: month {month} not present, skipping")
            }
            Diagnostic::ShockOverflow { side, month, kind } => {
                write!(f, "{side}: {kind} shock on month {month} overflows, row left unshocked")
            }
        }
    }
}

pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Emits every diagnostic as a `log::warn!` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
    }
}

/// Keeps diagnostics in memory.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_inner(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_month_message() {
        let d = Diagnostic::ShockMonthMissing {
            side: Side::Clearer,
            month: PeriodKey::new("2025-13"),
        };
        assert_eq!(d.to_string(), "clearer: month 2025-13 not present, skipping");

        let mut sink = CollectingSink::new();
        sink.report(d.clone());
        assert_eq!(sink.into_inner(), vec![d]);
    }

    #[test]
    fn test_overflow_message() {
        let d = Diagnostic::ShockOverflow {
            side: Side::Internal,
            month: PeriodKey::new("2025-04"),
            kind: ShockKind::PricePct,
        };
        assert_eq!(
            d.to_string(),
            "internal: price_pct shock on month 2025-04 overflows, row left unshocked"
        );
        assert_eq!(d.side(), Side::Internal);
    }
}
