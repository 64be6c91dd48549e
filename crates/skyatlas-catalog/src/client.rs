//! opendatasoft city catalog client.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use skyatlas_core::CatalogConfig;
use tracing::instrument;

use crate::error::CatalogError;
use crate::types::{FacetResponse, RecordsPage};

/// Facet carrying the English country name.
const COUNTRY_FACET: &str = "cou_name_en";

/// Where the aggregator gets its pages from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch `limit` raw records starting at `offset`.
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<RecordsPage, CatalogError>;

    /// Fetch the distinct list of country names.
    async fn fetch_countries(&self) -> Result<Vec<String>, CatalogError>;
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
    dataset: String,
}

impl CatalogClient {
    pub fn new(base_url: &str, dataset: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            dataset: dataset.to_string(),
        })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        Self::new(
            &config.base_url,
            &config.dataset,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn records_url(&self) -> String {
        format!(
            "{}/api/explore/v2.1/catalog/datasets/{}/records",
            self.base_url, self.dataset
        )
    }

    fn search_url(&self) -> String {
        format!("{}/api/records/1.0/search/", self.base_url)
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CatalogError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| CatalogError::Parse(format!("JSON parse error: {}", e)))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(CatalogError::ApiError {
                status: status.as_u16(),
                message: error_message(&text).unwrap_or(text),
            })
        }
    }
}

/// Pull `message` out of an opendatasoft error body.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl CatalogSource for CatalogClient {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<RecordsPage, CatalogError> {
        let response = self
            .client
            .get(self.records_url())
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await?;

        let page: RecordsPage = self.handle_response(response).await?;
        tracing::debug!(
            "Catalog returned {} records (total {:?})",
            page.results.len(),
            page.total_count
        );
        Ok(page)
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_countries(&self) -> Result<Vec<String>, CatalogError> {
        let response = self
            .client
            .get(self.search_url())
            .query(&[
                ("dataset", self.dataset.as_str()),
                ("q", ""),
                ("rows", "0"),
                ("facet", COUNTRY_FACET),
            ])
            .send()
            .await?;

        let body: FacetResponse = self.handle_response(response).await?;
        let mut groups = body.facet_groups;
        let index = groups
            .iter()
            .position(|g| g.name == COUNTRY_FACET)
            .unwrap_or(0);

        if index >= groups.len() {
            return Ok(Vec::new());
        }
        Ok(groups
            .swap_remove(index)
            .facets
            .into_iter()
            .map(|f| f.name)
            .collect())
    }
}
