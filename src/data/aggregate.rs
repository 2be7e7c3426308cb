use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use super::model::{CalendarMonth, OrderRecord};

/// Number of entries in the product ranking.
pub const TOP_N: usize = 5;

/// Characters of a product name kept in its display label.
pub const SHORT_NAME_CHARS: usize = 20;

// ---------------------------------------------------------------------------
// Scalar metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SalesMetrics {
    pub total_sales: f64,
    /// Distinct order ids.
    pub total_orders: usize,
    /// `total_sales / total_orders`, or 0 when there are no orders.
    pub average_order_value: f64,
}

impl SalesMetrics {
    pub fn from_rows(rows: &[&OrderRecord]) -> Self {
        let total_sales: f64 = rows.iter().map(|r| r.sales).sum();
        let total_orders = rows
            .iter()
            .map(|r| r.order_id.as_str())
            .collect::<HashSet<_>>()
            .len();
        let average_order_value = if total_orders == 0 {
            0.0
        } else {
            total_sales / total_orders as f64
        };
        SalesMetrics {
            total_sales,
            total_orders,
            average_order_value,
        }
    }
}

// ---------------------------------------------------------------------------
// Monthly series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlySales {
    pub month: CalendarMonth,
    pub sales: f64,
}

/// Sales summed per month, ascending. Months without rows are absent.
pub fn monthly_sales(rows: &[&OrderRecord]) -> Vec<MonthlySales> {
    let mut by_month: BTreeMap<CalendarMonth, f64> = BTreeMap::new();
    for r in rows {
        *by_month.entry(r.year_month).or_default() += r.sales;
    }
    by_month
        .into_iter()
        .map(|(month, sales)| MonthlySales { month, sales })
        .collect()
}

// ---------------------------------------------------------------------------
// Product ranking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSales {
    pub product_name: String,
    /// Display label: first [`SHORT_NAME_CHARS`] characters followed by `...`.
    pub short_name: String,
    pub sales: f64,
}

/// Truncate a product name for chart labels.
pub fn short_name(name: &str) -> String {
    let head: String = name.chars().take(SHORT_NAME_CHARS).collect();
    format!("{head}...")
}

/// Sum sales per product and keep the `n` best sellers.
///
/// Groups are kept in first-seen order and the sort is stable, so equal
/// totals rank in the order their product first appeared.
pub fn top_products(rows: &[&OrderRecord], n: usize) -> Vec<ProductSales> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, f64)> = Vec::new();

    for r in rows {
        let name = r.product_name.as_str();
        match position.get(name) {
            Some(&i) => groups[i].1 += r.sales,
            None => {
                position.insert(name, groups.len());
                groups.push((name, r.sales));
            }
        }
    }

    // `sort_by` is stable.
    groups.sort_by(|a, b| b.1.total_cmp(&a.1));

    groups
        .into_iter()
        .take(n)
        .map(|(name, sales)| ProductSales {
            product_name: name.to_string(),
            short_name: short_name(name),
            sales,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Region breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSales {
    pub region: String,
    pub sales: f64,
    /// Fraction of the subset's total sales (0 when the total is 0).
    pub share: f64,
}

/// Sales summed per region, ordered by region name.
pub fn region_sales(rows: &[&OrderRecord]) -> Vec<RegionSales> {
    let mut by_region: BTreeMap<&str, f64> = BTreeMap::new();
    for r in rows {
        *by_region.entry(r.region.as_str()).or_default() += r.sales;
    }
    let total: f64 = by_region.values().sum();
    by_region
        .into_iter()
        .map(|(region, sales)| RegionSales {
            region: region.to_string(),
            sales,
            share: if total > 0.0 { sales / total } else { 0.0 },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::model::RawOrder;

    fn rec(id: &str, ymd: (i32, u32, u32), region: &str, product: &str, sales: f64) -> OrderRecord {
        let d = NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap();
        OrderRecord::from_raw(RawOrder {
            order_id: id.into(),
            order_date: d,
            ship_date: d,
            region: region.into(),
            category: "Furniture".into(),
            sub_category: "Chairs".into(),
            product_name: product.into(),
            sales,
            ..Default::default()
        })
    }

    #[test]
    fn metrics_on_empty_subset_are_zero() {
        let m = SalesMetrics::from_rows(&[]);
        assert_eq!(m, SalesMetrics::default());
        assert_eq!(m.average_order_value, 0.0);
    }

    #[test]
    fn orders_are_counted_once_per_id() {
        let a = rec("CA-1", (2023, 1, 1), "East", "A", 30.0);
        let b = rec("CA-1", (2023, 1, 2), "East", "B", 20.0);
        let c = rec("CA-2", (2023, 1, 3), "East", "A", 10.0);
        let m = SalesMetrics::from_rows(&[&a, &b, &c]);
        assert_eq!(m.total_sales, 60.0);
        assert_eq!(m.total_orders, 2);
        assert_eq!(m.average_order_value, m.total_sales / m.total_orders as f64);
    }

    #[test]
    fn monthly_series_is_ascending_without_gaps_filled() {
        let rows = [
            rec("1", (2023, 5, 9), "East", "A", 5.0),
            rec("2", (2023, 1, 31), "East", "A", 1.0),
            rec("3", (2023, 5, 1), "East", "A", 2.0),
            rec("4", (2022, 12, 1), "East", "A", 4.0),
        ];
        let refs: Vec<&OrderRecord> = rows.iter().collect();
        let series = monthly_sales(&refs);

        let months: Vec<String> = series.iter().map(|m| m.month.to_string()).collect();
        assert_eq!(months, vec!["2022-12", "2023-01", "2023-05"]);
        assert_eq!(series[2].sales, 7.0);
        assert!(series.windows(2).all(|w| w[0].month < w[1].month));
    }

    #[test]
    fn top_products_ranks_sums_and_keeps_first_seen_order_on_ties() {
        let rows = [
            rec("1", (2023, 1, 1), "East", "Tie first", 10.0),
            rec("2", (2023, 1, 1), "East", "Big", 40.0),
            rec("3", (2023, 1, 1), "East", "Tie second", 10.0),
            rec("4", (2023, 1, 1), "East", "Small", 1.0),
            rec("5", (2023, 1, 1), "East", "Big", 5.0),
            rec("6", (2023, 1, 1), "East", "Tie third", 10.0),
            rec("7", (2023, 1, 1), "East", "Smallest", 0.5),
        ];
        let refs: Vec<&OrderRecord> = rows.iter().collect();
        let top = top_products(&refs, TOP_N);

        let names: Vec<&str> = top.iter().map(|p| p.product_name.as_str()).collect();
        assert_eq!(names, vec!["Big", "Tie first", "Tie second", "Tie third", "Small"]);
        assert_eq!(top[0].sales, 45.0);
    }

    #[test]
    fn top_products_shorter_than_n() {
        let rows = [rec("1", (2023, 1, 1), "East", "Only", 3.0)];
        let refs: Vec<&OrderRecord> = rows.iter().collect();
        assert_eq!(top_products(&refs, TOP_N).len(), 1);
        assert!(top_products(&[], TOP_N).is_empty());
    }

    #[test]
    fn short_name_truncates_by_characters() {
        assert_eq!(
            short_name("Global Deluxe High-Back Manager's Chair"),
            "Global Deluxe High-B..."
        );
        assert_eq!(short_name("Café Crème Dispenser Large"), "Café Crème Dispenser...");
        assert_eq!(short_name("Pen"), "Pen...");
    }

    #[test]
    fn region_shares_sum_to_one() {
        let rows = [
            rec("1", (2023, 1, 1), "West", "A", 75.0),
            rec("2", (2023, 1, 1), "East", "A", 25.0),
        ];
        let refs: Vec<&OrderRecord> = rows.iter().collect();
        let regions = region_sales(&refs);

        assert_eq!(regions[0].region, "East");
        assert_eq!(regions[0].share, 0.25);
        assert_eq!(regions[1].share, 0.75);
    }

    #[test]
    fn zero_total_region_share_is_zero() {
        let rows = [rec("1", (2023, 1, 1), "West", "A", 0.0)];
        let refs: Vec<&OrderRecord> = rows.iter().collect();
        assert_eq!(region_sales(&refs)[0].share, 0.0);
    }
}
