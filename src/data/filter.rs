use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use super::model::{Dataset, OrderRecord};

// ---------------------------------------------------------------------------
// Date range
// ---------------------------------------------------------------------------

/// An inclusive date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// `[Jan 1, Dec 31]` of `year`.
    pub fn full_year(year: i32) -> Self {
        DateRange {
            start: NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A date range as the user entered it. Either end may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRangeInput {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRangeInput {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// The interval, if both ends are present and in order.
    pub fn well_formed(&self) -> Option<DateRange> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start <= end => Some(DateRange { start, end }),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// The filters selected for one render.
///
/// * `regions` empty → nothing matches
/// * `categories` empty → no category restriction
/// * `subcategories` empty → no sub-category restriction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub year: i32,
    pub date_range: Option<DateRangeInput>,
    pub regions: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub subcategories: BTreeSet<String>,
}

impl FilterCriteria {
    /// Criteria for `year` with no region selected yet.
    pub fn for_year(year: i32) -> Self {
        FilterCriteria {
            year,
            date_range: None,
            regions: BTreeSet::new(),
            categories: BTreeSet::new(),
            subcategories: BTreeSet::new(),
        }
    }

    pub fn with_date_range(mut self, input: DateRangeInput) -> Self {
        self.date_range = Some(input);
        self
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_subcategories<I, S>(mut self, subcategories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subcategories = subcategories.into_iter().map(Into::into).collect();
        self
    }

    /// The explicit range when well formed, otherwise the whole selected year.
    pub fn effective_range(&self) -> DateRange {
        self.date_range
            .as_ref()
            .and_then(DateRangeInput::well_formed)
            .unwrap_or_else(|| DateRange::full_year(self.year))
    }

    /// Whether a single record passes every predicate.
    pub fn matches(&self, rec: &OrderRecord, range: &DateRange) -> bool {
        range.contains(rec.order_date)
            && self.regions.contains(&rec.region)
            && (self.categories.is_empty() || self.categories.contains(&rec.category))
            && (self.subcategories.is_empty() || self.subcategories.contains(&rec.sub_category))
    }
}

// ---------------------------------------------------------------------------
// Row selection
// ---------------------------------------------------------------------------

/// Return indices of records that pass all filters, in source order.
pub fn filtered_indices(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    let range = criteria.effective_range();
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec, &range))
        .map(|(i, _)| i)
        .collect()
}

/// Return the records that pass all filters, in source order.
pub fn filter_rows<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> Vec<&'a OrderRecord> {
    let range = criteria.effective_range();
    dataset
        .records
        .iter()
        .filter(|rec| criteria.matches(rec, &range))
        .collect()
}

// ---------------------------------------------------------------------------
// Sub-category options
// ---------------------------------------------------------------------------

/// Sub-categories occurring in rows of the selected categories, or in the
/// whole dataset when no category is selected.
pub fn subcategory_options(dataset: &Dataset, categories: &BTreeSet<String>) -> BTreeSet<String> {
    if categories.is_empty() {
        return dataset.sub_categories.clone();
    }
    dataset
        .records
        .iter()
        .filter(|rec| categories.contains(&rec.category))
        .map(|rec| rec.sub_category.clone())
        .collect()
}

/// Drop selected sub-categories that are no longer offered under the
/// criteria's categories. Returns the pruned criteria and what was dropped.
pub fn reconcile_subcategories(
    dataset: &Dataset,
    criteria: FilterCriteria,
) -> (FilterCriteria, BTreeSet<String>) {
    let options = subcategory_options(dataset, &criteria.categories);
    let (kept, dropped): (BTreeSet<String>, BTreeSet<String>) = criteria
        .subcategories
        .iter()
        .cloned()
        .partition(|s| options.contains(s));
    (
        FilterCriteria {
            subcategories: kept,
            ..criteria
        },
        dropped,
    )
}
