use serde::Serialize;

use super::aggregate::{
    monthly_sales, region_sales, top_products, MonthlySales, ProductSales, RegionSales,
    SalesMetrics, TOP_N,
};
use super::filter::{filtered_indices, DateRange, FilterCriteria};
use super::model::{Dataset, OrderRecord};

/// Rows shown in the raw-data table.
pub const PREVIEW_ROWS: usize = 50;

/// Everything the dashboard renders for one set of criteria.
///
/// A pure function of `(dataset, criteria)`; rebuilt on every filter change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub criteria: FilterCriteria,
    /// The range actually applied (explicit or full-year fallback).
    pub range: DateRange,
    #[serde(skip)]
    pub row_indices: Vec<usize>,
    pub metrics: SalesMetrics,
    pub monthly_sales: Vec<MonthlySales>,
    pub top_products: Vec<ProductSales>,
    pub region_sales: Vec<RegionSales>,
}

impl DashboardView {
    pub fn compute(dataset: &Dataset, criteria: &FilterCriteria) -> Self {
        let row_indices = filtered_indices(dataset, criteria);
        let rows: Vec<&OrderRecord> = row_indices.iter().map(|&i| &dataset.records[i]).collect();

        DashboardView {
            criteria: criteria.clone(),
            range: criteria.effective_range(),
            metrics: SalesMetrics::from_rows(&rows),
            monthly_sales: monthly_sales(&rows),
            top_products: top_products(&rows, TOP_N),
            region_sales: region_sales(&rows),
            row_indices,
        }
    }

    /// Number of filtered rows.
    pub fn row_count(&self) -> usize {
        self.row_indices.len()
    }

    /// The first [`PREVIEW_ROWS`] filtered rows.
    pub fn preview<'a>(
        &'a self,
        dataset: &'a Dataset,
    ) -> impl Iterator<Item = &'a OrderRecord> + 'a {
        self.row_indices
            .iter()
            .take(PREVIEW_ROWS)
            .filter_map(move |&i| dataset.records.get(i))
    }

    /// The applied period: the bare year when the whole year is shown,
    /// otherwise the explicit range.
    pub fn period_label(&self) -> String {
        if self.range == DateRange::full_year(self.criteria.year) {
            self.criteria.year.to_string()
        } else {
            format!("{} to {}", self.range.start, self.range.end)
        }
    }

    /// Pretty JSON of the aggregates (row indices are left out).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
