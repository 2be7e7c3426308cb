use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::RowError;

// ---------------------------------------------------------------------------
// CalendarMonth – the year-month grouping key
// ---------------------------------------------------------------------------

/// A calendar month, i.e. a date truncated to the first day of its month.
///
/// Field order matters: the derived `Ord` compares `year` first, then `month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl CalendarMonth {
    /// Truncate a date to its month.
    pub fn from_date(date: NaiveDate) -> Self {
        CalendarMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Months since year 0, used as a continuous plot coordinate.
    pub fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    /// Inverse of [`CalendarMonth::ordinal`].
    pub fn from_ordinal(ordinal: i64) -> Self {
        CalendarMonth {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ---------------------------------------------------------------------------
// OrderRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single order line item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub ship_date: NaiveDate,
    pub customer_name: Option<String>,
    pub segment: Option<String>,
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub product_name: String,
    pub sales: f64,

    // -- derived at load time --
    pub year: i32,
    pub month: u32,
    pub year_month: CalendarMonth,
}

/// Raw (already decoded) field values for one row, before derivation.
#[derive(Debug, Clone, Default)]
pub struct RawOrder {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub ship_date: NaiveDate,
    pub customer_name: Option<String>,
    pub segment: Option<String>,
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub product_name: String,
    pub sales: f64,
}

impl OrderRecord {
    /// Attach the calendar attributes derived from `order_date`.
    pub fn from_raw(raw: RawOrder) -> Self {
        let date = raw.order_date;
        OrderRecord {
            order_id: raw.order_id,
            order_date: raw.order_date,
            ship_date: raw.ship_date,
            customer_name: raw.customer_name,
            segment: raw.segment,
            region: raw.region,
            category: raw.category,
            sub_category: raw.sub_category,
            product_name: raw.product_name,
            sales: raw.sales,
            year: date.year(),
            month: date.month(),
            year_month: CalendarMonth::from_date(date),
        }
    }
}

// ---------------------------------------------------------------------------
// SkippedRow – a row dropped by a permissive load
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based CSV line (header is line 1) or Parquet row number.
    pub line: u64,
    pub error: RowError,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed option sets for the filter widgets.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// All order rows, in source order.
    pub records: Vec<OrderRecord>,
    /// Rows dropped during a permissive load.
    pub skipped: Vec<SkippedRow>,
    pub years: BTreeSet<i32>,
    pub regions: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub sub_categories: BTreeSet<String>,
}

impl Dataset {
    /// Build option indices from the loaded records.
    pub fn from_records(records: Vec<OrderRecord>, skipped: Vec<SkippedRow>) -> Self {
        let mut years = BTreeSet::new();
        let mut regions = BTreeSet::new();
        let mut categories = BTreeSet::new();
        let mut sub_categories = BTreeSet::new();

        for rec in &records {
            years.insert(rec.year);
            regions.insert(rec.region.clone());
            categories.insert(rec.category.clone());
            sub_categories.insert(rec.sub_category.clone());
        }

        Dataset {
            records,
            skipped,
            years,
            regions,
            categories,
            sub_categories,
        }
    }

    /// Number of loaded rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows dropped by a permissive load.
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}
