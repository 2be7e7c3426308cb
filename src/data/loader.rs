use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Date32Type, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::temporal_conversions::date32_to_datetime;
use chrono::{Datelike, NaiveDate};
use csv::ByteRecord;
use encoding_rs::WINDOWS_1252;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::{DateParseError, LoadError, RowError};
use super::model::{Dataset, OrderRecord, RawOrder, SkippedRow};

pub const ORDER_ID: &str = "Order ID";
pub const ORDER_DATE: &str = "Order Date";
pub const SHIP_DATE: &str = "Ship Date";
pub const REGION: &str = "Region";
pub const CATEGORY: &str = "Category";
pub const SUB_CATEGORY: &str = "Sub-Category";
pub const PRODUCT_NAME: &str = "Product Name";
pub const SALES: &str = "Sales";
pub const CUSTOMER_NAME: &str = "Customer Name";
pub const SEGMENT: &str = "Segment";

/// Columns every source must carry.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    ORDER_ID,
    ORDER_DATE,
    SHIP_DATE,
    REGION,
    CATEGORY,
    SUB_CATEGORY,
    PRODUCT_NAME,
    SALES,
];

/// Accepted date layouts, tried in order. Month/day/year is canonical.
pub const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

/// `%Y` also matches one to three digits; anything earlier is a short year.
const MIN_YEAR: i32 = 1000;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What to do with a row whose dates or sales amount cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// Skip the row and record it in [`Dataset::skipped`].
    #[default]
    Permissive,
    /// Abort the whole load on the first bad row.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// CSV field delimiter.
    pub delimiter: u8,
    pub row_policy: RowPolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            row_policy: RowPolicy::Permissive,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an order dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – header row, Latin-1 text (the reference export)
/// * `.parquet`      – same column names, dates as text or `Date32`
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" | "txt" => {
            let file = open(path)?;
            load_reader(file, options)?
        }
        "parquet" | "pq" => load_parquet(path, options)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    log::info!(
        "Loaded {} order rows from {} ({} skipped)",
        dataset.len(),
        path.display(),
        dataset.skipped_count()
    );
    Ok(dataset)
}

fn open(path: &Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Column resolution (shared by CSV and Parquet)
// ---------------------------------------------------------------------------

/// Position of every known column in the source header.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    order_id: usize,
    order_date: usize,
    ship_date: usize,
    region: usize,
    category: usize,
    sub_category: usize,
    product_name: usize,
    sales: usize,
    customer_name: Option<usize>,
    segment: Option<usize>,
}

impl ColumnIndex {
    fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self, LoadError> {
        let find = |name: &str| headers.iter().position(|h| h.as_ref().trim() == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| find(**name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        let required = |name: &str| find(name).unwrap_or_default();
        Ok(ColumnIndex {
            order_id: required(ORDER_ID),
            order_date: required(ORDER_DATE),
            ship_date: required(SHIP_DATE),
            region: required(REGION),
            category: required(CATEGORY),
            sub_category: required(SUB_CATEGORY),
            product_name: required(PRODUCT_NAME),
            sales: required(SALES),
            customer_name: find(CUSTOMER_NAME),
            segment: find(SEGMENT),
        })
    }
}

// ---------------------------------------------------------------------------
// Row accumulation with the skip/abort policy
// ---------------------------------------------------------------------------

struct RowCollector {
    policy: RowPolicy,
    records: Vec<OrderRecord>,
    skipped: Vec<SkippedRow>,
}

impl RowCollector {
    fn new(policy: RowPolicy) -> Self {
        Self {
            policy,
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn push(&mut self, line: u64, row: Result<RawOrder, RowError>) -> Result<(), LoadError> {
        match row {
            Ok(raw) => self.records.push(OrderRecord::from_raw(raw)),
            Err(error) => match self.policy {
                RowPolicy::Strict => return Err(LoadError::Row { line, source: error }),
                RowPolicy::Permissive => {
                    log::warn!("Skipping line {line}: {error}");
                    self.skipped.push(SkippedRow { line, error });
                }
            },
        }
        Ok(())
    }

    fn finish(self) -> Dataset {
        Dataset::from_records(self.records, self.skipped)
    }
}

// -- field parsers --

/// Parse a date in any of [`DATE_FORMATS`].
pub fn parse_date(column: &'static str, text: &str) -> Result<NaiveDate, DateParseError> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| {
            NaiveDate::parse_from_str(text, fmt)
                .ok()
                .filter(|date| date.year() >= MIN_YEAR)
        })
        .ok_or_else(|| DateParseError {
            column,
            value: text.to_string(),
        })
}

fn parse_sales(text: &str) -> Result<f64, RowError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .and_then(checked_sales)
        .ok_or_else(|| RowError::InvalidSales {
            value: text.to_string(),
        })
}

fn checked_sales(value: f64) -> Option<f64> {
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn non_empty(column: &'static str, value: Option<Cow<'_, str>>) -> Result<String, RowError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.into_owned()),
        _ => Err(RowError::MissingField { column }),
    }
}

fn optional(value: Option<Cow<'_, str>>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(Cow::into_owned)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Decode a field as Windows-1252 (a superset of ISO-8859-1's printable range).
fn decode_field(field: &[u8]) -> Cow<'_, str> {
    WINDOWS_1252.decode_without_bom_handling(field).0
}

/// Parse an order table from any CSV byte stream.
///
/// Rows shorter than the header report the missing column as a row error,
/// so they follow the [`RowPolicy`] like any other bad row.
pub fn load_reader<R: Read>(reader: R, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                // `decode` sniffs and strips a UTF-8 BOM on the first header.
                WINDOWS_1252.decode(h).0.into_owned()
            } else {
                decode_field(h).into_owned()
            }
        })
        .collect();
    let cols = ColumnIndex::resolve(&headers)?;

    let mut collector = RowCollector::new(options.row_policy);
    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        collector.push(line, csv_row(&record, &cols))?;
    }

    Ok(collector.finish())
}

fn csv_row(record: &ByteRecord, cols: &ColumnIndex) -> Result<RawOrder, RowError> {
    let field = |idx: usize| record.get(idx).map(decode_field);
    let text = |column: &'static str, idx: usize| non_empty(column, field(idx));

    Ok(RawOrder {
        order_id: text(ORDER_ID, cols.order_id)?,
        order_date: parse_date(ORDER_DATE, &text(ORDER_DATE, cols.order_date)?)?,
        ship_date: parse_date(SHIP_DATE, &text(SHIP_DATE, cols.ship_date)?)?,
        customer_name: cols.customer_name.and_then(|i| optional(field(i))),
        segment: cols.segment.and_then(|i| optional(field(i))),
        region: text(REGION, cols.region)?,
        category: text(CATEGORY, cols.category)?,
        sub_category: text(SUB_CATEGORY, cols.sub_category)?,
        product_name: text(PRODUCT_NAME, cols.product_name)?,
        sales: parse_sales(&text(SALES, cols.sales)?)?,
    })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the same column names as the CSV export.
///
/// Expected types:
/// - text columns: `Utf8` or `LargeUtf8`
/// - `Order Date` / `Ship Date`: `Date32`, or text in one of [`DATE_FORMATS`]
/// - `Sales`: `Float64`, `Float32`, `Int64` or `Int32`
fn load_parquet(path: &Path, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let file = open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let cols = ColumnIndex::resolve(&names)?;
    let reader = builder.build()?;

    let mut collector = RowCollector::new(options.row_policy);
    let mut row_no: u64 = 0;

    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            row_no += 1;
            let parsed = parquet_row(batch.columns(), &names, &cols, row)?;
            collector.push(row_no, parsed)?;
        }
    }

    Ok(collector.finish())
}

/// Outer `Result` is a schema problem (fatal); inner is a row problem.
fn parquet_row(
    columns: &[ArrayRef],
    names: &[String],
    cols: &ColumnIndex,
    row: usize,
) -> Result<Result<RawOrder, RowError>, LoadError> {
    let text = |idx: usize| text_cell(&columns[idx], &names[idx], row);

    macro_rules! required {
        ($column:expr, $idx:expr) => {
            match non_empty($column, text($idx)?) {
                Ok(v) => v,
                Err(e) => return Ok(Err(e)),
            }
        };
    }
    macro_rules! row_try {
        ($e:expr) => {
            match $e {
                Ok(v) => v,
                Err(e) => return Ok(Err(e.into())),
            }
        };
    }

    let order_id = required!(ORDER_ID, cols.order_id);
    let order_date = row_try!(date_cell(&columns[cols.order_date], ORDER_DATE, row)?);
    let ship_date = row_try!(date_cell(&columns[cols.ship_date], SHIP_DATE, row)?);
    let customer_name = match cols.customer_name {
        Some(i) => optional(text(i)?),
        None => None,
    };
    let segment = match cols.segment {
        Some(i) => optional(text(i)?),
        None => None,
    };
    let region = required!(REGION, cols.region);
    let category = required!(CATEGORY, cols.category);
    let sub_category = required!(SUB_CATEGORY, cols.sub_category);
    let product_name = required!(PRODUCT_NAME, cols.product_name);
    let sales = row_try!(sales_cell(&columns[cols.sales], row)?);

    Ok(Ok(RawOrder {
        order_id,
        order_date,
        ship_date,
        customer_name,
        segment,
        region,
        category,
        sub_category,
        product_name,
        sales,
    }))
}

// -- Arrow cell helpers --

fn unsupported(column: &str, col: &ArrayRef) -> LoadError {
    LoadError::UnsupportedColumnType {
        column: column.to_string(),
        found: format!("{:?}", col.data_type()),
    }
}

fn text_cell<'a>(
    col: &'a ArrayRef,
    column: &str,
    row: usize,
) -> Result<Option<Cow<'a, str>>, LoadError> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row),
        _ => return Err(unsupported(column, col)),
    };
    Ok(Some(Cow::Borrowed(value)))
}

fn date_cell(
    col: &ArrayRef,
    column: &'static str,
    row: usize,
) -> Result<Result<NaiveDate, RowError>, LoadError> {
    if col.is_null(row) {
        return Ok(Err(RowError::MissingField { column }));
    }
    let parsed = match col.data_type() {
        DataType::Date32 => {
            let days = col.as_primitive::<Date32Type>().value(row);
            date32_to_datetime(days)
                .map(|dt| dt.date())
                .ok_or_else(|| DateParseError {
                    column,
                    value: days.to_string(),
                })
        }
        DataType::Utf8 | DataType::LargeUtf8 => {
            let text = text_cell(col, column, row)?.unwrap_or_default();
            parse_date(column, &text)
        }
        _ => return Err(unsupported(column, col)),
    };
    Ok(parsed.map_err(RowError::from))
}

fn sales_cell(col: &ArrayRef, row: usize) -> Result<Result<f64, RowError>, LoadError> {
    if col.is_null(row) {
        return Ok(Err(RowError::MissingField { column: SALES }));
    }
    let value = match col.data_type() {
        DataType::Float64 => col.as_primitive::<Float64Type>().value(row),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(row) as f64,
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row) as f64,
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row) as f64,
        _ => return Err(unsupported(SALES, col)),
    };
    Ok(checked_sales(value).ok_or_else(|| RowError::InvalidSales {
        value: value.to_string(),
    }))
}
