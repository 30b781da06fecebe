//! File loading for trade books and shock files.
//!
//! Trade books are read from CSV (header row required) or JSON (an array of
//! row objects). Either format needs a period column named `month` or
//! `contract_period`, plus `quantity_mwh` and `price_eur_per_mwh`;
//! `trade_id` and `contract_type` are optional.
//!
//! ```text
//! trade_id,contract_type,month,quantity_mwh,price_eur_per_mwh
//! 1,Net Monthly Trade,2025-04,100,30.5
//! ```

use crate::core::error::ReconError;
use crate::core::trade::{TradeLeg, TradeTable};
use crate::simulation::scenario::Scenario;
use crate::simulation::shock::ShockSpec;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::str::FromStr;

const PERIOD_COLUMNS: [&str; 2] = ["month", "contract_period"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
}

fn format_of(path: &Path) -> Result<Format, ReconError> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("csv") => Ok(Format::Csv),
        Some("json") => Ok(Format::Json),
        _ => Err(ReconError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

/// Read a trade book, failing on any I/O, parse, or schema problem.
pub fn read_trade_table(path: impl AsRef<Path>) -> Result<TradeTable, ReconError> {
    let path = path.as_ref();
    let table = match format_of(path)? {
        Format::Csv => parse_csv(File::open(path)?, &path.display().to_string())?,
        Format::Json => serde_json::from_reader(BufReader::new(File::open(path)?))?,
    };
    log::debug!("loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Read a trade book, returning an empty table if it cannot be loaded.
///
/// The failure is logged as a warning naming the file.
pub fn load_data(path: impl AsRef<Path>) -> TradeTable {
    let path = path.as_ref();
    read_trade_table(path).unwrap_or_else(|e| {
        log::warn!("error loading data from {}: {}", path.display(), e);
        TradeTable::new()
    })
}

fn column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn required(
    headers: &csv::StringRecord,
    name: &'static str,
    origin: &str,
) -> Result<usize, ReconError> {
    column(headers, name).ok_or_else(|| ReconError::MissingColumn {
        column: name,
        origin: origin.to_string(),
    })
}

fn parse_decimal(raw: &str, column: &'static str, row: usize) -> Result<Decimal, ReconError> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| ReconError::InvalidValue {
            column,
            value: raw.to_string(),
            row,
        })
}

/// Parse CSV trade rows from any reader. `origin` names the source in errors.
pub fn parse_csv<R: Read>(reader: R, origin: &str) -> Result<TradeTable, ReconError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let period_idx = PERIOD_COLUMNS
        .iter()
        .find_map(|name| column(&headers, name))
        .ok_or_else(|| ReconError::MissingColumn {
            column: "month",
            origin: origin.to_string(),
        })?;
    let qty_idx = required(&headers, "quantity_mwh", origin)?;
    let price_idx = required(&headers, "price_eur_per_mwh", origin)?;
    let id_idx = column(&headers, "trade_id");
    let type_idx = column(&headers, "contract_type");

    let mut table = TradeTable::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        // 1-based, counting the header line
        let row = i + 2;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let mut leg = TradeLeg::new(
            field(period_idx),
            parse_decimal(field(qty_idx), "quantity_mwh", row)?,
            parse_decimal(field(price_idx), "price_eur_per_mwh", row)?,
        );
        if let Some(raw) = id_idx.map(field).filter(|s| !s.is_empty()) {
            let id = raw.parse::<u64>().map_err(|_| ReconError::InvalidValue {
                column: "trade_id",
                value: raw.to_string(),
                row,
            })?;
            leg = leg.with_trade_id(id);
        }
        if let Some(raw) = type_idx.map(field).filter(|s| !s.is_empty()) {
            leg = leg.with_contract_type(raw);
        }
        table.add(leg);
    }
    Ok(table)
}

/// Write a trade book as CSV with the standard column set.
pub fn write_csv<W: Write>(writer: W, table: &TradeTable) -> Result<(), ReconError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["trade_id", "contract_type", "month", "quantity_mwh", "price_eur_per_mwh"])?;
    for leg in table {
        wtr.write_record([
            leg.trade_id().map(|id| id.to_string()).unwrap_or_default(),
            leg.contract_type().map(|c| c.to_string()).unwrap_or_default(),
            leg.period().to_string(),
            leg.quantity_mwh().to_string(),
            leg.price_eur_per_mwh().to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a trade book to `path`, choosing the format by extension.
pub fn write_trade_table(path: impl AsRef<Path>, table: &TradeTable) -> Result<(), ReconError> {
    let path = path.as_ref();
    match format_of(path)? {
        Format::Csv => write_csv(File::create(path)?, table),
        Format::Json => {
            serde_json::to_writer_pretty(File::create(path)?, table)?;
            Ok(())
        }
    }
}

/// Read a JSON shock specification, e.g. `{"2025-04": {"price_pct": 0.1}}`.
pub fn read_shock_spec(path: impl AsRef<Path>) -> Result<ShockSpec, ReconError> {
    Ok(serde_json::from_reader(BufReader::new(File::open(path)?))?)
}

/// Read a JSON array of named scenarios.
pub fn read_scenarios(path: impl AsRef<Path>) -> Result<Vec<Scenario>, ReconError> {
    Ok(serde_json::from_reader(BufReader::new(File::open(path)?))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::trade::ContractType;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_csv_with_contract_period() {
        let data = "\
trade_id,contract_type,contract_period,quantity_mwh,price_eur_per_mwh
1,Quarterly decomposed,2025-04,33.5,30
2,,2025-05, 40 ,31.25
";
        let table = parse_csv(data.as_bytes(), "inline").unwrap();
        assert_eq!(table.len(), 2);

        let first = &table.legs()[0];
        assert_eq!(first.trade_id(), Some(1));
        assert_eq!(first.contract_type(), Some(&ContractType::QuarterlyDecomposed));
        assert_eq!(first.quantity_mwh(), dec!(33.5));

        let second = &table.legs()[1];
        assert_eq!(second.contract_type(), None);
        assert_eq!(second.period().as_str(), "2025-05");
        assert_eq!(second.quantity_mwh(), dec!(40));
        assert_eq!(second.price_eur_per_mwh(), dec!(31.25));
    }

    #[test]
    fn test_missing_column() {
        let data = "month,quantity_mwh\n2025-04,10\n";
        match parse_csv(data.as_bytes(), "inline") {
            Err(ReconError::MissingColumn { column, .. }) => assert_eq!(column, "price_eur_per_mwh"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_number_reports_row() {
        let data = "month,quantity_mwh,price_eur_per_mwh\n2025-04,10,30\n2025-05,ten,30\n";
        match parse_csv(data.as_bytes(), "inline") {
            Err(ReconError::InvalidValue { column, row, .. }) => {
                assert_eq!(column, "quantity_mwh");
                assert_eq!(row, 3);
            }
            other => panic!("expected invalid value, got {other:?}"),
        }
    }

    #[test]
    fn test_load_data_missing_file_is_empty() {
        let table = load_data("/nonexistent/power-recon/trades.csv");
        assert!(table.is_empty());
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            read_trade_table("trades.xlsx"),
            Err(ReconError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_csv_write_then_parse() {
        let table: TradeTable = vec![
            TradeLeg::new("2025-04", dec!(100), dec!(30.5))
                .with_trade_id(3)
                .with_contract_type(ContractType::NetMonthlyTrade),
            TradeLeg::new("2025-05", dec!(-20), dec!(28)),
        ]
        .into_iter()
        .collect();

        let mut buf = Vec::new();
        write_csv(&mut buf, &table).unwrap();
        let parsed = parse_csv(buf.as_slice(), "buffer").unwrap();
        assert_eq!(parsed, table);
    }
}
