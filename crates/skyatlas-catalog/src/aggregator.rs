//! Incremental city aggregator.
//!
//! Owns the growing [`CityCollection`] and the pagination cursor. Pages are
//! requested one at a time (a second request while one is outstanding is a
//! no-op), merged through [`dedup`], and every state change is announced on
//! the aggregator's [`EventBus`].

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use skyatlas_core::EventBus;
use tokio::sync::broadcast;

use crate::client::CatalogSource;
use crate::dedup::{dedup, CityCollection, DedupOutcome};
use crate::error::CatalogError;
use crate::query::{filter_sort, FilterSortSpec};
use crate::suggest::{suggest, DEFAULT_SUGGESTION_LIMIT};
use crate::types::CityRecord;

/// Position in the remote catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationCursor {
    pub offset: usize,
    pub page_size: usize,
    pub exhausted: bool,
}

impl PaginationCursor {
    pub fn new(page_size: usize) -> Self {
        Self {
            offset: 0,
            page_size: page_size.max(1),
            exhausted: false,
        }
    }

    /// Move past a page that returned `raw_len` records.
    ///
    /// The offset always advances by a full page. Exhaustion looks at the raw
    /// page length only: a full page of duplicates does not exhaust.
    fn advance(&mut self, raw_len: usize) {
        self.offset += self.page_size;
        self.exhausted = raw_len < self.page_size;
    }
}

/// Why a page request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InFlight,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Skipped(SkipReason),
    Merged {
        /// Records the catalog returned, before validation and dedup.
        raw: usize,
        /// Records that made it into the collection.
        added: usize,
        /// Collection size after the merge.
        total: usize,
        exhausted: bool,
    },
}

/// State-change notifications for a rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    PageMerged {
        offset: usize,
        added: usize,
        total: usize,
        exhausted: bool,
    },
    PageFailed {
        offset: usize,
        message: String,
    },
    CountriesLoaded {
        count: usize,
    },
}

/// Point-in-time view of the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatorSnapshot {
    pub cursor: PaginationCursor,
    pub loaded: usize,
    pub in_flight: bool,
    pub total_available: Option<u64>,
}

#[derive(Debug)]
struct State {
    collection: CityCollection,
    cursor: PaginationCursor,
    in_flight: bool,
    total_available: Option<u64>,
    countries: Vec<String>,
}

/// Clears the in-flight flag however the request future ends.
struct InFlightGuard<'a> {
    state: &'a Mutex<State>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().in_flight = false;
    }
}

pub struct CityAggregator {
    source: Arc<dyn CatalogSource>,
    state: Mutex<State>,
    events: EventBus<CatalogEvent>,
}

impl CityAggregator {
    pub fn new(source: Arc<dyn CatalogSource>, page_size: usize) -> Self {
        Self {
            source,
            state: Mutex::new(State {
                collection: CityCollection::new(),
                cursor: PaginationCursor::new(page_size),
                in_flight: false,
                total_available: None,
                countries: Vec::new(),
            }),
            events: EventBus::default(),
        }
    }

    /// Fetch and merge the next page.
    ///
    /// Returns `Skipped` without touching the network when a page is already
    /// in flight or the cursor is exhausted. On failure the cursor and
    /// collection are left as they were and the error is returned; calling
    /// again retries the same offset.
    pub async fn request_next_page(&self) -> Result<PageOutcome, CatalogError> {
        let (offset, limit) = {
            let mut state = self.state.lock();
            if state.in_flight {
                tracing::debug!("Page request ignored: fetch already in flight");
                return Ok(PageOutcome::Skipped(SkipReason::InFlight));
            }
            if state.cursor.exhausted {
                tracing::debug!("Page request ignored: catalog exhausted");
                return Ok(PageOutcome::Skipped(SkipReason::Exhausted));
            }
            state.in_flight = true;
            (state.cursor.offset, state.cursor.page_size)
        };
        let _guard = InFlightGuard { state: &self.state };

        let page = match self.source.fetch_page(offset, limit).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failed to fetch catalog page at offset {}: {}", offset, e);
                self.events.publish(CatalogEvent::PageFailed {
                    offset,
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        let raw = page.results.len();
        let outcome = {
            let mut state = self.state.lock();
            let collection = std::mem::take(&mut state.collection);
            let DedupOutcome { merged, added } =
                dedup(collection, page.results.into_iter().map(CityRecord::from));
            state.collection = merged;
            state.cursor.advance(raw);
            if page.total_count.is_some() {
                state.total_available = page.total_count;
            }
            state.in_flight = false;

            PageOutcome::Merged {
                raw,
                added,
                total: state.collection.len(),
                exhausted: state.cursor.exhausted,
            }
        };

        if let PageOutcome::Merged {
            added,
            total,
            exhausted,
            ..
        } = outcome
        {
            tracing::info!(
                "Merged catalog page at offset {}: {} raw, {} new, {} total{}",
                offset,
                raw,
                added,
                total,
                if exhausted { " (exhausted)" } else { "" }
            );
            self.events.publish(CatalogEvent::PageMerged {
                offset,
                added,
                total,
                exhausted,
            });
        }

        Ok(outcome)
    }

    /// Filtered, sorted copy of the loaded cities.
    pub fn query(&self, spec: &FilterSortSpec) -> Vec<CityRecord> {
        let state = self.state.lock();
        filter_sort(state.collection.records(), spec)
    }

    /// Up to five cities whose name starts with `prefix`.
    pub fn suggest(&self, prefix: &str) -> Vec<CityRecord> {
        let state = self.state.lock();
        suggest(state.collection.records(), prefix, DEFAULT_SUGGESTION_LIMIT)
    }

    /// Distinct timezones of the loaded cities, sorted.
    pub fn timezones(&self) -> Vec<String> {
        let state = self.state.lock();
        state
            .collection
            .iter()
            .map(|c| c.timezone.trim())
            .filter(|tz| !tz.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Fetch the country facet list and keep it for [`Self::countries`].
    pub async fn load_countries(&self) -> Result<Vec<String>, CatalogError> {
        let countries = self.source.fetch_countries().await.map_err(|e| {
            tracing::warn!("Failed to load country list: {}", e);
            e
        })?;

        self.state.lock().countries = countries.clone();
        tracing::info!("Loaded {} countries", countries.len());
        self.events.publish(CatalogEvent::CountriesLoaded {
            count: countries.len(),
        });
        Ok(countries)
    }

    /// Country list from the last successful [`Self::load_countries`].
    pub fn countries(&self) -> Vec<String> {
        self.state.lock().countries.clone()
    }

    /// Copy of every loaded city in first-seen order.
    pub fn records(&self) -> Vec<CityRecord> {
        self.state.lock().collection.records().to_vec()
    }

    pub fn len(&self) -> usize {
        self.state.lock().collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cursor(&self) -> PaginationCursor {
        self.state.lock().cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.state.lock().cursor.exhausted
    }

    pub fn snapshot(&self) -> AggregatorSnapshot {
        let state = self.state.lock();
        AggregatorSnapshot {
            cursor: state.cursor,
            loaded: state.collection.len(),
            in_flight: state.in_flight,
            total_available: state.total_available,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }
}
