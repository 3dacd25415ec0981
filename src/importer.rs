use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use csv::StringRecord;
use rust_decimal::Decimal;

use crate::categorizer::contains_any;
use crate::dates::normalize_date;
use crate::error::{Result, VizError};
use crate::models::{BusinessMonth, Record, SalesRow};
use crate::settings::StatementSettings;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a money cell: thousands separators, quotes and currency symbols are
/// stripped and `(12.50)` reads as negative. Any other stray character, including
/// whitespace inside the number, makes the cell unparseable.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '"' | '$' | '\u{20a6}' | '\u{20ac}' | '\u{a3}'))
        .map(|c| if c == '\u{2212}' { '-' } else { c })
        .collect();
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return Decimal::from_str(inner).ok().map(|d| -d);
    }
    Decimal::from_str(s).ok()
}

fn open_reader(file_path: &Path) -> Result<csv::Reader<std::fs::File>> {
    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(file_path)?)
}

/// Map each wanted header to its column index; a missing header is fatal.
fn resolve_columns(headers: &StringRecord, wanted: &[&str], file_path: &Path) -> Result<Vec<usize>> {
    wanted
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
                .ok_or_else(|| VizError::MissingColumn {
                    column: name.to_string(),
                    file: file_path.display().to_string(),
                })
        })
        .collect()
}

fn field<'r>(record: &'r StringRecord, idx: usize) -> &'r str {
    record.get(idx).unwrap_or("").trim()
}

// ---------------------------------------------------------------------------
// Bank statement
// ---------------------------------------------------------------------------

pub struct StatementLoad {
    pub records: Vec<Record>,
    /// Rows dropped because the description hit an exclusion word.
    pub excluded: usize,
    /// Rows dropped by `skip_rows`.
    pub skipped: usize,
}

pub fn load_statement(file_path: &Path, settings: &StatementSettings) -> Result<StatementLoad> {
    let mut rdr = open_reader(file_path)?;
    let cols = &settings.columns;
    let idx = resolve_columns(
        rdr.headers()?,
        &[cols.date.as_str(), cols.description.as_str(), cols.amount.as_str()],
        file_path,
    )?;
    let (idx_date, idx_desc, idx_amount) = (idx[0], idx[1], idx[2]);

    let mut records = Vec::new();
    let mut excluded = 0usize;
    let mut skipped = 0usize;

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1.
        let line = i + 2;
        if i < settings.skip_rows {
            skipped += 1;
            continue;
        }
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let description = field(&record, idx_desc).to_string();
        if contains_any(&description, &settings.exclude) {
            excluded += 1;
            continue;
        }
        let date = normalize_date(field(&record, idx_date))?;
        let raw_amount = field(&record, idx_amount);
        let amount = parse_amount(raw_amount).ok_or_else(|| VizError::InvalidAmount {
            row: line,
            value: raw_amount.to_string(),
        })?;
        records.push(Record::new(date, description, amount));
    }

    tracing::debug!(
        file = %file_path.display(),
        loaded = records.len(),
        excluded,
        skipped,
        "loaded statement"
    );
    Ok(StatementLoad {
        records,
        excluded,
        skipped,
    })
}

// ---------------------------------------------------------------------------
// Sales export + VIP list
// ---------------------------------------------------------------------------

const SALES_COLUMNS: &[&str] = &["date", "customer", "category", "region", "price", "quantity"];

pub fn load_sales(file_path: &Path) -> Result<Vec<SalesRow>> {
    let mut rdr = open_reader(file_path)?;
    let idx = resolve_columns(rdr.headers()?, SALES_COLUMNS, file_path)?;

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let line = i + 2;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let raw_price = field(&record, idx[4]);
        let price = parse_amount(raw_price).ok_or_else(|| VizError::InvalidNumber {
            field: "price",
            row: line,
            value: raw_price.to_string(),
        })?;
        let raw_qty = field(&record, idx[5]);
        let quantity = raw_qty.parse::<u32>().map_err(|_| VizError::InvalidNumber {
            field: "quantity",
            row: line,
            value: raw_qty.to_string(),
        })?;
        rows.push(SalesRow {
            date: normalize_date(field(&record, idx[0]))?,
            customer: field(&record, idx[1]).to_string(),
            category: field(&record, idx[2]).to_string(),
            region: field(&record, idx[3]).to_string(),
            price,
            quantity,
        });
    }
    tracing::debug!(file = %file_path.display(), rows = rows.len(), "loaded sales");
    Ok(rows)
}

/// Customer name to VIP level.
pub fn load_vip(file_path: &Path) -> Result<HashMap<String, String>> {
    let mut rdr = open_reader(file_path)?;
    let idx = resolve_columns(rdr.headers()?, &["customer", "vip_level"], file_path)?;
    let mut levels = HashMap::new();
    for result in rdr.records() {
        let record = result?;
        let customer = field(&record, idx[0]);
        if customer.is_empty() {
            continue;
        }
        levels.insert(customer.to_string(), field(&record, idx[1]).to_string());
    }
    Ok(levels)
}

// ---------------------------------------------------------------------------
// Business metrics
// ---------------------------------------------------------------------------

const BUSINESS_COLUMNS: &[&str] = &["month", "sales", "satisfaction", "ad_spend"];

pub fn load_business(file_path: &Path) -> Result<Vec<BusinessMonth>> {
    let mut rdr = open_reader(file_path)?;
    let idx = resolve_columns(rdr.headers()?, BUSINESS_COLUMNS, file_path)?;

    let mut months = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let line = i + 2;
        let label = field(&record, idx[0]);
        if label.is_empty() {
            continue;
        }
        let number = |field_name: &'static str, col: usize| {
            let raw = field(&record, col);
            parse_amount(raw).ok_or_else(|| VizError::InvalidNumber {
                field: field_name,
                row: line,
                value: raw.to_string(),
            })
        };
        let sales = number("sales", idx[1])?;
        let ad_spend = number("ad_spend", idx[3])?;
        let raw_sat = field(&record, idx[2]);
        let satisfaction = raw_sat.parse::<f64>().map_err(|_| VizError::InvalidNumber {
            field: "satisfaction",
            row: line,
            value: raw_sat.to_string(),
        })?;
        months.push(BusinessMonth {
            label: label.to_string(),
            long_name: long_month_name(label),
            sales,
            satisfaction,
            ad_spend,
        });
    }
    Ok(months)
}

/// "Jan" or "january" to "January"; anything else is returned unchanged.
pub fn long_month_name(label: &str) -> String {
    chrono::Month::from_str(label)
        .map(|m| m.name().to_string())
        .unwrap_or_else(|_| label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    const HEADER: &str = "Trans. Date,Value Date,Description,Debit/Credit(\u{20a6}),Balance After(\u{20a6}),Channel,Transaction Reference\n";

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(dec!(1234.56)));
        assert_eq!(parse_amount("\"-500.00\""), Some(dec!(-500.00)));
        assert_eq!(parse_amount("  -42.50  "), Some(dec!(-42.50)));
        assert_eq!(parse_amount("\u{20a6}2,000"), Some(dec!(2000)));
        assert_eq!(parse_amount("-$50.00"), Some(dec!(-50.00)));
        assert_eq!(parse_amount("(1,234.56)"), Some(dec!(-1234.56)));
        assert_eq!(parse_amount("not_a_number"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_parse_amount_keeps_unicode_minus_sign() {
        assert_eq!(parse_amount("\u{2212}500.00"), Some(dec!(-500.00)));
        assert_eq!(parse_amount("\u{2212}\u{20a6}1,200"), Some(dec!(-1200)));
    }

    #[test]
    fn test_parse_amount_rejects_stray_characters() {
        assert_eq!(parse_amount("1 234"), None);
        assert_eq!(parse_amount("\u{2013}500"), None);
        assert_eq!(parse_amount("500\u{a0}00"), None);
    }

    #[test]
    fn test_load_statement_filters_and_parses() {
        let dir = tempfile::tempdir().unwrap();
        let content = format!(
            "{HEADER}\
01 May 2025 09:12:44,01 May 2025,Transfer to Ama,\"-5,000.00\",10000.00,Mobile,ref1\n\
03 May 2025 10:00:00,03 May 2025,OWealth Withdrawal(Transaction Payment),2000.00,12000.00,Mobile,ref2\n\
15 May 2025 18:30:00,15 May 2025,Mobile Data,-1000.00,11000.00,Mobile,ref3\n\
02 Jun 2025 08:00:00,02 Jun 2025,Salary,150000.00,161000.00,Bank,ref4\n"
        );
        let path = write_file(dir.path(), "stmt.csv", &content);
        let load = load_statement(&path, &StatementSettings::default()).unwrap();
        assert_eq!(load.excluded, 1);
        assert_eq!(load.skipped, 0);
        assert_eq!(load.records.len(), 3);
        assert_eq!(load.records[0].date, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
        assert_eq!(load.records[0].amount, dec!(-5000.00));
        assert_eq!(load.records[2].description, "Salary");
        assert_eq!(load.records[2].amount, dec!(150000.00));
    }

    #[test]
    fn test_load_statement_skips_leading_rows() {
        let dir = tempfile::tempdir().unwrap();
        let content = format!(
            "{HEADER}\
01 May 2025,x,sample row,-1.00,0,x,x\n\
02 May 2025,x,Airtime,-200.00,0,x,x\n"
        );
        let path = write_file(dir.path(), "stmt.csv", &content);
        let settings = StatementSettings {
            skip_rows: 1,
            ..StatementSettings::default()
        };
        let load = load_statement(&path, &settings).unwrap();
        assert_eq!(load.skipped, 1);
        assert_eq!(load.records.len(), 1);
        assert_eq!(load.records[0].description, "Airtime");
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad.csv", "Date,Description,Amount\n2025-05-01,x,-1\n");
        match load_statement(&path, &StatementSettings::default()) {
            Err(VizError::MissingColumn { column, .. }) => assert_eq!(column, "Trans. Date"),
            other => panic!("expected MissingColumn, got {:?}", other.map(|l| l.records)),
        }
    }

    #[test]
    fn test_bad_date_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let content = format!("{HEADER}sometime,x,Airtime,-200.00,0,x,x\n");
        let path = write_file(dir.path(), "stmt.csv", &content);
        let err = load_statement(&path, &StatementSettings::default()).err().unwrap();
        assert!(matches!(err, VizError::InvalidDate(ref s) if s == "sometime"));
    }

    #[test]
    fn test_bad_amount_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let content = format!("{HEADER}01 May 2025,x,Airtime,-200.00,0,x,x\n02 May 2025,x,Airtime,lots,0,x,x\n");
        let path = write_file(dir.path(), "stmt.csv", &content);
        let err = load_statement(&path, &StatementSettings::default()).err().unwrap();
        assert!(matches!(err, VizError::InvalidAmount { row: 3, .. }));
    }

    #[test]
    fn test_load_sales_and_vip() {
        let dir = tempfile::tempdir().unwrap();
        let sales = write_file(
            dir.path(),
            "sales.csv",
            "date,customer,category,region,price,quantity\n\
2025-01-03,Ada,Tech,CA,120.00,2\n\
2025-01-04,Ben,Home,NY,15.50,1\n",
        );
        let vip = write_file(dir.path(), "vip.csv", "customer,vip_level\nAda,Gold\n");
        let rows = load_sales(&sales).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].total(), dec!(240.00));
        assert_eq!(rows[1].region, "NY");
        let levels = load_vip(&vip).unwrap();
        assert_eq!(levels.get("Ada").map(String::as_str), Some("Gold"));
    }

    #[test]
    fn test_load_sales_rejects_bad_quantity() {
        let dir = tempfile::tempdir().unwrap();
        let sales = write_file(
            dir.path(),
            "sales.csv",
            "date,customer,category,region,price,quantity\n2025-01-03,Ada,Tech,CA,120.00,two\n",
        );
        let err = load_sales(&sales).unwrap_err();
        assert!(matches!(err, VizError::InvalidNumber { field: "quantity", row: 2, .. }));
    }

    #[test]
    fn test_load_business() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "biz.csv",
            "month,sales,satisfaction,ad_spend\nJan,12000,7.2,4000\nFeb,18000,8.0,4200\n",
        );
        let months = load_business(&path).unwrap();
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].long_name, "January");
        assert_eq!(months[1].sales, dec!(18000));
        assert_eq!(months[1].satisfaction, 8.0);
    }

    #[test]
    fn test_long_month_name() {
        assert_eq!(long_month_name("Jun"), "June");
        assert_eq!(long_month_name("Q3"), "Q3");
    }
}
