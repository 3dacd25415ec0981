use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

/// One parsed statement line. Negative amounts are debits.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
}

impl Record {
    pub fn new(date: NaiveDate, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
        }
    }

    pub fn is_debit(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    pub fn month(&self) -> MonthKey {
        MonthKey::of(self.date)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub record: Record,
    pub category: String,
}

/// Calendar month used as the grouping key for monthly buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Abbreviated month name, e.g. "May".
    pub fn label(&self) -> String {
        self.first_day()
            .map(|d| d.format("%b").to_string())
            .unwrap_or_else(|| self.key())
    }

    /// Full month name, e.g. "June".
    pub fn long_name(&self) -> String {
        self.first_day()
            .map(|d| d.format("%B").to_string())
            .unwrap_or_else(|| self.key())
    }

    /// Sortable key, e.g. "2025-05".
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Months since year 0, for calendar arithmetic.
    pub fn ordinal(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthBucket {
    pub month: MonthKey,
    /// Sum of negative amounts (never positive).
    pub debit: Decimal,
    /// Sum of positive amounts (never negative).
    pub credit: Decimal,
}

impl MonthBucket {
    pub fn total(&self) -> Decimal {
        self.debit + self.credit
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBucket {
    pub category: String,
    pub total: Decimal,
}

/// The largest-magnitude entry of a series, used for chart annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct Peak<T> {
    pub label: String,
    pub value: T,
}

/// One line of a sales export, before enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRow {
    pub date: NaiveDate,
    pub customer: String,
    pub category: String,
    pub region: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl SalesRow {
    pub fn total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Sales line after region mapping, tiering and the VIP join.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnrichedSale {
    pub date: NaiveDate,
    pub customer: String,
    pub category: String,
    pub region: String,
    pub price: Decimal,
    pub quantity: u32,
    pub total: Decimal,
    pub tier: Tier,
    pub vip_level: Option<String>,
    pub day: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tier {
    Premium,
    Mid,
    Budget,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Premium => "Premium",
            Self::Mid => "Mid",
            Self::Budget => "Budget",
        }
    }
}

/// One month of the business dashboard dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessMonth {
    pub label: String,
    pub long_name: String,
    pub sales: Decimal,
    /// Customer satisfaction on a 1-10 scale.
    pub satisfaction: f64,
    pub ad_spend: Decimal,
}
