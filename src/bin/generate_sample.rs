use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use chrono::{Duration, NaiveDate};
use clap::Parser;
use encoding_rs::WINDOWS_1252;
use parquet::arrow::ArrowWriter;

/// Write a synthetic superstore dataset as Latin-1 CSV and as Parquet.
#[derive(Debug, Parser)]
struct Cli {
    /// Directory for `sample_superstore.csv` / `.parquet`.
    #[arg(default_value = ".")]
    out_dir: PathBuf,

    /// Number of order lines.
    #[arg(long, default_value_t = 2000)]
    rows: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

const REGIONS: [&str; 4] = ["Central", "East", "South", "West"];
const SEGMENTS: [&str; 3] = ["Consumer", "Corporate", "Home Office"];
const CUSTOMERS: [&str; 8] = [
    "Claire Gute",
    "Darrin Van Huff",
    "Seán O'Donnell",
    "Brosina Hoffman",
    "Andrew Allen",
    "Zoë Lefèvre",
    "Irene Maddox",
    "Harold Pawlan",
];

/// (category, sub-category, products with base price)
const CATALOGUE: [(&str, &str, &[(&str, f64)]); 6] = [
    (
        "Furniture",
        "Chairs",
        &[
            ("Global Deluxe High-Back Manager's Chair", 420.0),
            ("Hon Comfortselect Task Chair", 180.0),
        ],
    ),
    (
        "Furniture",
        "Tables",
        &[("Bretford CR4500 Series Slim Rectangular Table", 520.0)],
    ),
    (
        "Office Supplies",
        "Paper",
        &[("Xerox 1967 Papier Crème", 18.0), ("Easy-staple paper", 12.0)],
    ),
    (
        "Office Supplies",
        "Binders",
        &[("Fellowes PB500 Electric Punch Plastic Comb Binding Machine", 1200.0)],
    ),
    (
        "Technology",
        "Phones",
        &[("Apple iPhone", 650.0), ("Polycom SoundStation Café Conference Phone", 300.0)],
    ),
    ("Technology", "Accessories", &[("Logitech Wireless Mouse M325", 28.0)]),
];

struct Row {
    order_id: String,
    order_date: NaiveDate,
    ship_date: NaiveDate,
    customer: &'static str,
    segment: &'static str,
    region: &'static str,
    category: &'static str,
    sub_category: &'static str,
    product: &'static str,
    sales: f64,
}

fn generate(rng: &mut SimpleRng, n: usize) -> Vec<Row> {
    let first_day = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap_or_default();
    let span_days = 4 * 365;

    let mut rows = Vec::with_capacity(n);
    let mut order_no = 100_000;
    while rows.len() < n {
        // One order holds 1-3 line items sharing id, dates, customer and region.
        order_no += 1 + rng.below(50);
        let order_date = first_day + Duration::days(rng.below(span_days) as i64);
        let ship_date = order_date + Duration::days(1 + rng.below(6) as i64);
        let customer = *rng.pick(&CUSTOMERS);
        let segment = *rng.pick(&SEGMENTS);
        let region = *rng.pick(&REGIONS);
        let order_id = format!("CA-{}-{order_no}", order_date.format("%Y"));

        for _ in 0..(1 + rng.below(3)) {
            let (category, sub_category, products) = *rng.pick(&CATALOGUE);
            let (product, price) = *rng.pick(products);
            let qty = 1 + rng.below(5) as u32;
            let discount = 1.0 - 0.2 * rng.next_f64();
            let sales = (price * qty as f64 * discount * 100.0).round() / 100.0;

            rows.push(Row {
                order_id: order_id.clone(),
                order_date,
                ship_date,
                customer,
                segment,
                region,
                category,
                sub_category,
                product,
                sales,
            });
        }
    }
    rows.truncate(n);
    rows
}

fn write_csv(rows: &[Row], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Row ID",
        "Order ID",
        "Order Date",
        "Ship Date",
        "Customer Name",
        "Segment",
        "Region",
        "Category",
        "Sub-Category",
        "Product Name",
        "Sales",
    ])?;
    for (i, r) in rows.iter().enumerate() {
        writer.write_record([
            (i + 1).to_string(),
            r.order_id.clone(),
            r.order_date.format("%m/%d/%Y").to_string(),
            r.ship_date.format("%m/%d/%Y").to_string(),
            r.customer.to_string(),
            r.segment.to_string(),
            r.region.to_string(),
            r.category.to_string(),
            r.sub_category.to_string(),
            r.product.to_string(),
            format!("{:.2}", r.sales),
        ])?;
    }
    let utf8 = String::from_utf8(writer.into_inner().context("flushing CSV")?)?;

    // Same single-byte encoding as the reference export.
    let (latin1, _, unmappable) = WINDOWS_1252.encode(&utf8);
    if unmappable {
        log::warn!("Some characters could not be represented in Windows-1252");
    }
    std::fs::write(path, latin1).with_context(|| format!("writing {}", path.display()))
}

fn write_parquet(rows: &[Row], path: &Path) -> Result<RecordBatch> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    let days = |d: NaiveDate| (d - epoch).num_days() as i32;
    let text = |f: fn(&Row) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let dates = |f: fn(&Row) -> NaiveDate| -> ArrayRef {
        Arc::new(Date32Array::from(rows.iter().map(|r| days(f(r))).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("Order ID", DataType::Utf8, false),
        Field::new("Order Date", DataType::Date32, false),
        Field::new("Ship Date", DataType::Date32, false),
        Field::new("Customer Name", DataType::Utf8, false),
        Field::new("Segment", DataType::Utf8, false),
        Field::new("Region", DataType::Utf8, false),
        Field::new("Category", DataType::Utf8, false),
        Field::new("Sub-Category", DataType::Utf8, false),
        Field::new("Product Name", DataType::Utf8, false),
        Field::new("Sales", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            text(|r| r.order_id.as_str()),
            dates(|r| r.order_date),
            dates(|r| r.ship_date),
            text(|r| r.customer),
            text(|r| r.segment),
            text(|r| r.region),
            text(|r| r.category),
            text(|r| r.sub_category),
            text(|r| r.product),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.sales))) as ArrayRef,
        ],
    )?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(batch)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut rng = SimpleRng::new(cli.seed);
    let rows = generate(&mut rng, cli.rows);

    std::fs::create_dir_all(&cli.out_dir)?;
    let csv_path = cli.out_dir.join("sample_superstore.csv");
    let parquet_path = cli.out_dir.join("sample_superstore.parquet");

    write_csv(&rows, &csv_path)?;
    let batch = write_parquet(&rows, &parquet_path)?;

    println!("{}", pretty_format_batches(&[batch.slice(0, batch.num_rows().min(5))])?);
    println!(
        "Wrote {} order lines to {} and {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
