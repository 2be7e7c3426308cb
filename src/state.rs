use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::data::filter::{reconcile_subcategories, subcategory_options, DateRange, DateRangeInput};
use crate::data::{DashboardView, Dataset, DatasetCache, FilterCriteria, LoadError, LoadOptions};

/// Region pre-selected when a dataset is loaded, if present.
pub const DEFAULT_REGION: &str = "East";

// ---------------------------------------------------------------------------
// Selection – the widget state behind the sidebar
// ---------------------------------------------------------------------------

/// Which multi-select filter a widget edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterColumn {
    Region,
    Category,
    SubCategory,
}

/// Mutable sidebar state; turned into a fresh [`FilterCriteria`] on every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub year: i32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub regions: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub subcategories: BTreeSet<String>,
}

impl Selection {
    /// Defaults for a freshly loaded dataset: earliest year, its full range,
    /// the default region (or every region), no category restriction.
    pub fn initial(dataset: &Dataset) -> Self {
        let year = dataset.years.first().copied().unwrap_or(1970);
        let range = DateRange::full_year(year);
        let regions = if dataset.regions.contains(DEFAULT_REGION) {
            BTreeSet::from([DEFAULT_REGION.to_string()])
        } else {
            dataset.regions.clone()
        };
        Selection {
            year,
            start: range.start,
            end: range.end,
            regions,
            categories: BTreeSet::new(),
            subcategories: BTreeSet::new(),
        }
    }

    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            year: self.year,
            date_range: Some(DateRangeInput::new(self.start, self.end)),
            regions: self.regions.clone(),
            categories: self.categories.clone(),
            subcategories: self.subcategories.clone(),
        }
    }

    fn set_mut(&mut self, column: FilterColumn) -> &mut BTreeSet<String> {
        match column {
            FilterColumn::Region => &mut self.regions,
            FilterColumn::Category => &mut self.categories,
            FilterColumn::SubCategory => &mut self.subcategories,
        }
    }

    pub fn selected(&self, column: FilterColumn) -> &BTreeSet<String> {
        match column {
            FilterColumn::Region => &self.regions,
            FilterColumn::Category => &self.categories,
            FilterColumn::SubCategory => &self.subcategories,
        }
    }
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Home,
    MonthlySales,
    TopProducts,
    SalesByRegion,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Home, Tab::MonthlySales, Tab::TopProducts, Tab::SalesByRegion];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::MonthlySales => "Monthly Sales",
            Tab::TopProducts => "Top Products",
            Tab::SalesByRegion => "Sales by Region",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Arc<Dataset>>,

    /// Where the dataset came from.
    pub source: Option<PathBuf>,

    pub load_options: LoadOptions,
    pub cache: DatasetCache,

    /// Current sidebar selection (None until a dataset is loaded).
    pub selection: Option<Selection>,

    /// Aggregates for the current selection (cached).
    pub view: Option<DashboardView>,

    /// Region colours, stable across filter changes.
    pub region_colors: ColorMap,

    pub tab: Tab,

    /// Shown when a category change cleared sub-category selections.
    pub notice: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(load_options: LoadOptions) -> Self {
        Self {
            load_options,
            ..Self::default()
        }
    }

    /// Load (or reuse from cache) the dataset at `path` and make it current.
    ///
    /// On error the current dataset is kept.
    pub fn open_path(&mut self, path: &Path) -> Result<(), LoadError> {
        let dataset = self.cache.get_or_load(path, &self.load_options)?;
        self.source = Some(path.to_path_buf());
        self.set_dataset(dataset);
        Ok(())
    }

    /// Ingest a newly loaded dataset, initialise filters and colours.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.selection = Some(Selection::initial(&dataset));
        self.region_colors = ColorMap::new(&dataset.regions);
        self.dataset = Some(dataset);
        self.notice = None;
        self.status_message = None;
        self.recompute();
    }

    /// Recompute `view` after a selection change.
    pub fn recompute(&mut self) {
        self.view = match (&self.dataset, &self.selection) {
            (Some(ds), Some(sel)) => Some(DashboardView::compute(ds, &sel.criteria())),
            _ => None,
        };
    }

    /// Sub-categories to offer given the selected categories.
    pub fn subcategory_options(&self) -> BTreeSet<String> {
        match (&self.dataset, &self.selection) {
            (Some(ds), Some(sel)) => subcategory_options(ds, &sel.categories),
            _ => BTreeSet::new(),
        }
    }

    /// All values a multi-select widget can offer.
    pub fn options(&self, column: FilterColumn) -> BTreeSet<String> {
        let Some(ds) = &self.dataset else {
            return BTreeSet::new();
        };
        match column {
            FilterColumn::Region => ds.regions.clone(),
            FilterColumn::Category => ds.categories.clone(),
            FilterColumn::SubCategory => self.subcategory_options(),
        }
    }

    /// Select a year; the date range snaps to that full year.
    pub fn set_year(&mut self, year: i32) {
        if let Some(sel) = &mut self.selection {
            let range = DateRange::full_year(year);
            sel.year = year;
            sel.start = range.start;
            sel.end = range.end;
        }
        self.recompute();
    }

    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        if let Some(sel) = &mut self.selection {
            sel.start = start;
            sel.end = end;
        }
        self.recompute();
    }

    /// Toggle a single value in a multi-select filter.
    pub fn toggle_filter_value(&mut self, column: FilterColumn, value: &str) {
        if let Some(sel) = &mut self.selection {
            let selected = sel.set_mut(column);
            if !selected.remove(value) {
                selected.insert(value.to_string());
            }
        }
        self.after_change(column);
    }

    /// Select all offered values in a column.
    pub fn select_all(&mut self, column: FilterColumn) {
        let all = self.options(column);
        if let Some(sel) = &mut self.selection {
            *sel.set_mut(column) = all;
        }
        self.after_change(column);
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: FilterColumn) {
        if let Some(sel) = &mut self.selection {
            sel.set_mut(column).clear();
        }
        self.after_change(column);
    }

    fn after_change(&mut self, column: FilterColumn) {
        if column == FilterColumn::Category {
            self.reconcile_subcategories();
        }
        self.recompute();
    }

    /// Drop sub-categories that the new category choice no longer offers,
    /// and say so in `notice`.
    fn reconcile_subcategories(&mut self) {
        let (Some(ds), Some(sel)) = (&self.dataset, &mut self.selection) else {
            return;
        };
        let (pruned, dropped) = reconcile_subcategories(ds, sel.criteria());
        sel.subcategories = pruned.subcategories;

        if dropped.is_empty() {
            self.notice = None;
        } else {
            let names: Vec<&str> = dropped.iter().map(String::as_str).collect();
            let msg = format!(
                "Cleared sub-categories not in the selected categories: {}",
                names.join(", ")
            );
            log::info!("{msg}");
            self.notice = Some(msg);
        }
    }
}
