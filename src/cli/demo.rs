use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use crate::error::{Result, VizError};
use crate::fmt::money;
use crate::settings::StatementColumns;

const STATEMENT_FILE: &str = "sample_statement.csv";
const SALES_FILE: &str = "sales_data.csv";
const VIP_FILE: &str = "vip.csv";

const YEAR: i32 = 2025;
/// May through October.
const MONTHS: [u32; 6] = [5, 6, 7, 8, 9, 10];
const OPENING_BALANCE: i64 = 180_000;

struct DemoTxn {
    date: NaiveDateTime,
    description: &'static str,
    /// Naira; negative is a debit.
    amount: Decimal,
}

/// Lines that show up every month.
struct RecurringTxn {
    day: u32,
    description: &'static str,
    amount: i64,
}

const RECURRING: &[RecurringTxn] = &[
    RecurringTxn { day: 1, description: "Salary from Brightline Ltd", amount: 350_000 },
    RecurringTxn { day: 2, description: "Transfer to Adaeze Okafor", amount: -25_000 },
    RecurringTxn { day: 3, description: "Mobile Data purchase 10GB", amount: -5_000 },
    RecurringTxn { day: 6, description: "Airtime top-up MTN", amount: -2_000 },
    RecurringTxn { day: 10, description: "Electricity token IKEDC", amount: -15_000 },
    RecurringTxn { day: 10, description: "Electronic Money Transfer Levy", amount: -50 },
    RecurringTxn { day: 28, description: "SMS Alert Charges", amount: -150 },
];

/// One-off lines; each month picks a few based on its index.
const ROTATING: &[RecurringTxn] = &[
    RecurringTxn { day: 8, description: "Transfer to Chinedu Eze", amount: -40_000 },
    RecurringTxn { day: 12, description: "POS purchase Shoprite Lekki", amount: -12_500 },
    RecurringTxn { day: 14, description: "Netflix subscription", amount: -4_400 },
    RecurringTxn { day: 16, description: "Card maintenance fee", amount: -50 },
    RecurringTxn { day: 18, description: "Transfer to Landlord Ikoyi Homes", amount: -120_000 },
    RecurringTxn { day: 20, description: "OWealth Withdrawal", amount: 20_000 },
    RecurringTxn { day: 21, description: "Uber trip", amount: -3_200 },
    RecurringTxn { day: 22, description: "Save to Target savings", amount: -10_000 },
    RecurringTxn { day: 24, description: "Airtime top-up Glo", amount: -1_000 },
];

const SALES_HEADER: [&str; 6] = ["date", "customer", "category", "region", "price", "quantity"];

/// (date, customer, category, region, price, quantity)
const SALES: &[(&str, &str, &str, &str, &str, u32)] = &[
    ("2024-01-02", "Alice", "Tech", "CA", "120.00", 2),
    ("2024-01-03", "Ben", "Home", "NY", "45.50", 1),
    ("2024-01-05", "Chloe", "Fashion", "TX", "80.00", 3),
    ("2024-01-05", "David", "Tech", "WA", "250.00", 1),
    ("2024-01-09", "Emma", "Toys", "FL", "19.99", 4),
    ("2024-01-11", "Alice", "Home", "CA", "60.00", 2),
    ("2024-01-12", "Ben", "Tech", "NY", "99.00", 1),
    ("2024-01-12", "Chloe", "Tech", "TX", "210.00", 1),
    ("2024-01-16", "David", "Fashion", "WA", "35.00", 2),
    ("2024-01-19", "Emma", "Home", "CA", "150.00", 1),
    ("2024-01-19", "Alice", "Fashion", "CA", "75.00", 3),
    ("2024-01-23", "Ben", "Toys", "NY", "25.00", 2),
    ("2024-01-26", "Chloe", "Home", "TX", "110.00", 2),
    ("2024-01-26", "David", "Tech", "WA", "180.00", 1),
    ("2024-01-30", "Emma", "Fashion", "FL", "40.00", 1),
];

const VIP: &[(&str, &str)] = &[
    ("Alice", "Gold"),
    ("Chloe", "Gold"),
    ("Ben", "Silver"),
    ("David", "Bronze"),
];

fn at(day: u32, month: u32, i: usize) -> Result<NaiveDateTime> {
    let date = NaiveDate::from_ymd_opt(YEAR, month, day)
        .ok_or_else(|| VizError::InvalidDate(format!("{YEAR}-{month}-{day}")))?;
    // Deterministic time of day so rows on the same date keep their order.
    let time = NaiveTime::from_hms_opt(8 + (i % 12) as u32, (i * 7 % 60) as u32, (i * 13 % 60) as u32)
        .unwrap_or(NaiveTime::MIN);
    Ok(date.and_time(time))
}

/// Six months of statement lines, in date order.
fn generate_transactions() -> Result<Vec<DemoTxn>> {
    let mut txns = Vec::new();
    for (idx, &month) in MONTHS.iter().enumerate() {
        for (i, r) in RECURRING.iter().enumerate() {
            // Transfers creep up a little each month.
            let amount = if r.description.starts_with("Transfer") {
                r.amount - (idx as i64 % 3) * 2_500
            } else {
                r.amount
            };
            txns.push(DemoTxn {
                date: at(r.day, month, i)?,
                description: r.description,
                amount: Decimal::from(amount),
            });
        }
        for j in 0..3usize {
            let r = &ROTATING[(idx * 3 + j) % ROTATING.len()];
            txns.push(DemoTxn {
                date: at(r.day, month, RECURRING.len() + j)?,
                description: r.description,
                amount: Decimal::from(r.amount),
            });
        }
    }
    txns.sort_by_key(|t| t.date);
    Ok(txns)
}

fn write_statement(path: &Path) -> Result<usize> {
    let txns = generate_transactions()?;
    let cols = StatementColumns::default();
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        cols.date.as_str(),
        "Value Date",
        cols.description.as_str(),
        cols.amount.as_str(),
        "Balance After(\u{20a6})",
    ])?;
    let mut balance = Decimal::from(OPENING_BALANCE);
    for t in &txns {
        balance += t.amount;
        wtr.write_record([
            t.date.format("%d %b %Y %H:%M:%S").to_string(),
            t.date.format("%d %b %Y").to_string(),
            t.description.to_string(),
            money(t.amount, ""),
            money(balance, ""),
        ])?;
    }
    wtr.flush()?;
    Ok(txns.len())
}

fn write_sales(path: &Path) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(SALES_HEADER)?;
    for (date, customer, category, region, price, quantity) in SALES {
        wtr.write_record([*date, *customer, *category, *region, *price, quantity.to_string().as_str()])?;
    }
    wtr.flush()?;
    Ok(SALES.len())
}

fn write_vip(path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["customer", "vip_level"])?;
    for (customer, level) in VIP {
        wtr.write_record([*customer, *level])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn run(dir: Option<PathBuf>) -> Result<()> {
    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)?;

    let statement = dir.join(STATEMENT_FILE);
    // Idempotency guard
    if statement.exists() {
        println!("Demo data already present ({} exists).", statement.display());
        return Ok(());
    }

    let txn_count = write_statement(&statement)?;
    let sales_count = write_sales(&dir.join(SALES_FILE))?;
    write_vip(&dir.join(VIP_FILE))?;
    tracing::info!(dir = %dir.display(), txn_count, sales_count, "wrote demo data");

    println!("Demo data written to {}", dir.display());
    println!("  Statement:    {STATEMENT_FILE} ({txn_count} transactions)");
    println!("  Sales:        {SALES_FILE} ({sales_count} rows)");
    println!("  VIP list:     {VIP_FILE}");
    println!();
    println!("Try these next:");
    println!("  dataviz summary {}", statement.display());
    println!("  dataviz expenses {}", statement.display());
    println!(
        "  dataviz insights {} --vip {}",
        dir.join(SALES_FILE).display(),
        dir.join(VIP_FILE).display()
    );
    println!("  dataviz business");

    Ok(())
}
