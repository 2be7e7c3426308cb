//! Data layer: order types, loading, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  .csv (Latin-1) / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset  (cache: reuse while mtime unchanged)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Dataset  │  Vec<OrderRecord>, option sets, skipped rows
//!   └──────────┘
//!        │   + FilterCriteria
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  date / region / category / sub-category predicates
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate  │  metrics, monthly series, top products, regions
//!   └───────────┘
//!        │
//!        ▼
//!    DashboardView
//! ```

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod view;

pub use cache::DatasetCache;
pub use error::{DateParseError, LoadError, RowError};
pub use filter::{filter_rows, filtered_indices, DateRangeInput, FilterCriteria};
pub use loader::{load_file, load_reader, LoadOptions, RowPolicy};
pub use model::{CalendarMonth, Dataset, OrderRecord};
pub use view::DashboardView;
