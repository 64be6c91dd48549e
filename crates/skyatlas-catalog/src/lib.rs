//! World-city catalog for SkyAtlas.
//!
//! Fetches city records page by page, deduplicates them into a growing
//! collection, and answers search, filter, sort and autocomplete queries
//! over whatever has been loaded so far.

pub mod aggregator;
pub mod client;
pub mod dedup;
pub mod error;
pub mod query;
pub mod suggest;
pub mod text;
pub mod types;

pub use aggregator::{
    AggregatorSnapshot, CatalogEvent, CityAggregator, PageOutcome, PaginationCursor, SkipReason,
};
pub use client::{CatalogClient, CatalogSource};
pub use dedup::{dedup, CityCollection, DedupOutcome};
pub use error::CatalogError;
pub use query::{filter_sort, FilterSortSpec, SortKey, SortOrder};
pub use suggest::{suggest, DEFAULT_SUGGESTION_LIMIT};
pub use types::{CityRecord, RawCity, RecordsPage};
