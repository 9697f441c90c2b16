//! Region directory HTTP client

use crate::{
    error::DirectoryError,
    types::{DirectoryLayout, RegionRecord, SubRegionRecord},
};
use cascade_runtime::retry::{RetryPolicy, retry_with_predicate};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Region directory client
///
/// Every request is bounded by the client timeout and retried according to
/// the retry policy while the failure is retryable.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    client: Client,
    base_url: Url,
    layout: DirectoryLayout,
    retry: RetryPolicy,
}

impl DirectoryClient {
    /// Create a client with default timeout and retry policy
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::InvalidBaseUrl` if `base_url` is not an
    /// absolute http(s) URL.
    pub fn new(base_url: &str, layout: DirectoryLayout) -> Result<Self, DirectoryError> {
        Self::builder(base_url).layout(layout).build()
    }

    /// Start configuring a client for `base_url`
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> DirectoryClientBuilder {
        DirectoryClientBuilder {
            base_url: base_url.into(),
            layout: DirectoryLayout::default(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::builder().jitter(true).build(),
        }
    }

    /// Layout this client speaks
    #[must_use]
    pub const fn layout(&self) -> DirectoryLayout {
        self.layout
    }

    /// Fetch all region codes, ordered by name
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted, or the first
    /// non-retryable error.
    pub async fn regions(&self) -> Result<Vec<String>, DirectoryError> {
        let url = self.endpoint(self.layout.region_segments())?;
        tracing::debug!(%url, "Fetching regions");

        let records: Vec<RegionRecord> = self.get_json(url).await?;
        Ok(records.into_iter().map(|r| r.code).collect())
    }

    /// Fetch the sub-region names of `code`, ordered by name
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted, or the first
    /// non-retryable error.
    pub async fn sub_regions(&self, code: &str) -> Result<Vec<String>, DirectoryError> {
        let url = self.endpoint(&self.layout.sub_region_segments(code))?;
        tracing::debug!(%url, region = code, "Fetching sub-regions");

        let records: Vec<SubRegionRecord> = self.get_json(url).await?;
        Ok(records.into_iter().map(|r| r.name).collect())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, DirectoryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| DirectoryError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut()
            .clear()
            .append_pair("orderBy", self.layout.order_by());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, DirectoryError> {
        retry_with_predicate(
            &self.retry,
            || self.get_once(url.clone()),
            DirectoryError::is_retryable,
        )
        .await
    }

    async fn get_once<T: DeserializeOwned>(&self, url: Url) -> Result<T, DirectoryError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DirectoryError::Decode(e.to_string()))
    }
}

/// Builder for [`DirectoryClient`]
#[derive(Debug, Clone)]
pub struct DirectoryClientBuilder {
    base_url: String,
    layout: DirectoryLayout,
    timeout: Duration,
    retry: RetryPolicy,
}

impl DirectoryClientBuilder {
    /// Set the URL layout
    #[must_use]
    pub fn layout(mut self, layout: DirectoryLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::InvalidBaseUrl` for unusable URLs and
    /// `DirectoryError::RequestFailed` if the HTTP client cannot be created.
    pub fn build(self) -> Result<DirectoryClient, DirectoryError> {
        let base_url = Url::parse(self.base_url.trim())
            .map_err(|e| DirectoryError::InvalidBaseUrl(format!("{}: {e}", self.base_url)))?;

        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(DirectoryError::InvalidBaseUrl(self.base_url));
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| DirectoryError::RequestFailed(e.to_string()))?;

        Ok(DirectoryClient {
            client,
            base_url,
            layout: self.layout,
            retry: self.retry,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_path_and_segments() {
        let client = DirectoryClient::new(
            "https://servicodados.ibge.gov.br/api/v1/",
            DirectoryLayout::Ibge,
        )
        .unwrap();

        let url = client
            .endpoint(&DirectoryLayout::Ibge.sub_region_segments("SP"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://servicodados.ibge.gov.br/api/v1/localidades/estados/SP/municipios?orderBy=nome"
        );
    }

    #[test]
    fn test_endpoint_escapes_codes() {
        let client = DirectoryClient::new("http://localhost:8080", DirectoryLayout::Generic).unwrap();

        let url = client
            .endpoint(&DirectoryLayout::Generic.sub_region_segments("north east"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/regions/north%20east/subregions?orderBy=name"
        );
    }

    #[test]
    fn test_rejects_non_http_base_urls() {
        assert!(matches!(
            DirectoryClient::new("ftp://example.com", DirectoryLayout::Generic),
            Err(DirectoryError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            DirectoryClient::new("not a url", DirectoryLayout::Generic),
            Err(DirectoryError::InvalidBaseUrl(_))
        ));
    }
}
