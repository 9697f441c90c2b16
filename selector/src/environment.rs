//! Injected dependencies of the selector.
//!
//! The reducer never performs I/O itself. Directory lookups and navigation
//! go through the traits below so tests can substitute scripted versions.

use crate::config::{DEFAULT_NEXT_SCREEN, DirectoryConfig};
use crate::error::SelectorError;
use crate::types::{ConfirmPolicy, NavigationParams, RegionCode, SubRegionName};
use cascade_core::environment::Clock;
use cascade_runtime::retry::RetryPolicy;
use region_directory::{DirectoryClient, DirectoryError};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Source of region and sub-region lists
///
/// Methods return boxed futures so the directory can live behind
/// `Arc<dyn RegionDirectory>` in the environment.
pub trait RegionDirectory: Send + Sync {
    /// All regions, ordered by name
    ///
    /// # Errors
    ///
    /// Returns `SelectorError::Network` when the lookup fails.
    fn regions(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RegionCode>, SelectorError>> + Send + '_>>;

    /// Sub-regions of `region`, ordered by name
    ///
    /// # Errors
    ///
    /// Returns `SelectorError::Network` when the lookup fails.
    fn sub_regions(
        &self,
        region: RegionCode,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SubRegionName>, SelectorError>> + Send + '_>>;
}

/// Receiver of the confirmed selection
///
/// Navigation is fire-and-forget: control leaves the selector and nothing is
/// returned.
pub trait Navigator: Send + Sync {
    /// Move to `screen` carrying `params`
    fn navigate_to(&self, screen: &str, params: NavigationParams);
}

/// [`RegionDirectory`] backed by the HTTP directory client
#[derive(Debug, Clone)]
pub struct HttpRegionDirectory {
    client: DirectoryClient,
}

impl HttpRegionDirectory {
    /// Wraps an existing client
    #[must_use]
    pub const fn new(client: DirectoryClient) -> Self {
        Self { client }
    }

    /// Builds the client from configuration
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::InvalidBaseUrl` if the configured URL is unusable.
    pub fn from_config(config: &DirectoryConfig) -> Result<Self, DirectoryError> {
        let retry = RetryPolicy::builder()
            .max_retries(config.max_retries)
            .jitter(true)
            .build();

        let client = DirectoryClient::builder(config.base_url.clone())
            .layout(config.layout)
            .timeout(config.timeout())
            .retry_policy(retry)
            .build()?;

        Ok(Self::new(client))
    }
}

impl RegionDirectory for HttpRegionDirectory {
    fn regions(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RegionCode>, SelectorError>> + Send + '_>> {
        Box::pin(async move {
            let codes = self.client.regions().await?;
            Ok(codes.into_iter().map(RegionCode::new).collect())
        })
    }

    fn sub_regions(
        &self,
        region: RegionCode,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SubRegionName>, SelectorError>> + Send + '_>> {
        Box::pin(async move {
            let names = self.client.sub_regions(region.as_str()).await?;
            Ok(names.into_iter().map(SubRegionName::new).collect())
        })
    }
}

/// Environment dependencies for the selector reducer
#[derive(Clone)]
pub struct SelectorEnvironment {
    /// Region lookups
    pub directory: Arc<dyn RegionDirectory>,
    /// Destination of confirmed selections
    pub navigator: Arc<dyn Navigator>,
    /// Timestamps for loaded lists
    pub clock: Arc<dyn Clock>,
    /// Treatment of incomplete selections on confirm
    pub confirm_policy: ConfirmPolicy,
    /// Screen id passed to the navigator
    pub next_screen: Arc<str>,
}

impl SelectorEnvironment {
    /// Creates an environment with the default confirm policy and screen
    #[must_use]
    pub fn new(
        directory: Arc<dyn RegionDirectory>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            directory,
            navigator,
            clock,
            confirm_policy: ConfirmPolicy::default(),
            next_screen: Arc::from(DEFAULT_NEXT_SCREEN),
        }
    }

    /// Sets the confirm policy
    #[must_use]
    pub fn with_confirm_policy(mut self, policy: ConfirmPolicy) -> Self {
        self.confirm_policy = policy;
        self
    }

    /// Sets the screen id passed to the navigator
    #[must_use]
    pub fn with_next_screen(mut self, screen: impl Into<Arc<str>>) -> Self {
        self.next_screen = screen.into();
        self
    }
}

impl std::fmt::Debug for SelectorEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectorEnvironment")
            .field("confirm_policy", &self.confirm_policy)
            .field("next_screen", &self.next_screen)
            .finish_non_exhaustive()
    }
}
