//! Scripted collaborators for tests and demos.

use crate::environment::{Navigator, RegionDirectory};
use crate::error::SelectorError;
use crate::types::{NavigationParams, RegionCode, SubRegionName};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct DirectoryScript {
    regions: Vec<RegionCode>,
    sub_regions: HashMap<RegionCode, Vec<SubRegionName>>,
    region_failures: usize,
    sub_region_failures: HashMap<RegionCode, usize>,
    gates: HashMap<RegionCode, Arc<Notify>>,
    region_calls: usize,
    sub_region_calls: Vec<RegionCode>,
}

/// In-memory region directory with scripted answers
///
/// Answers are fixed up front. A region can be made to fail a number of
/// times before succeeding, and its sub-region fetch can be gated so a test
/// decides when the answer arrives.
#[derive(Debug, Clone, Default)]
pub struct MockRegionDirectory {
    script: Arc<Mutex<DirectoryScript>>,
}

impl MockRegionDirectory {
    /// Create an empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, DirectoryScript> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Serve these regions, in this order
    #[must_use]
    pub fn with_regions<I, S>(self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script().regions = codes.into_iter().map(RegionCode::new).collect();
        self
    }

    /// Serve these sub-regions for `region`, in this order
    #[must_use]
    pub fn with_sub_regions<I, S>(self, region: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names.into_iter().map(SubRegionName::new).collect();
        self.script().sub_regions.insert(RegionCode::new(region), names);
        self
    }

    /// Fail the next `times` region fetches
    #[must_use]
    pub fn fail_regions(self, times: usize) -> Self {
        self.script().region_failures = times;
        self
    }

    /// Fail the next `times` sub-region fetches for `region`
    #[must_use]
    pub fn fail_sub_regions(self, region: &str, times: usize) -> Self {
        self.script()
            .sub_region_failures
            .insert(RegionCode::new(region), times);
        self
    }

    /// Hold every sub-region fetch for `region` until the gate is notified
    ///
    /// Each `notify_one` releases one fetch.
    #[must_use]
    pub fn gate(&self, region: &str) -> Arc<Notify> {
        Arc::clone(
            self.script()
                .gates
                .entry(RegionCode::new(region))
                .or_default(),
        )
    }

    /// Number of region fetches started
    #[must_use]
    pub fn region_calls(&self) -> usize {
        self.script().region_calls
    }

    /// Regions whose sub-regions were requested, in call order
    #[must_use]
    pub fn sub_region_calls(&self) -> Vec<RegionCode> {
        self.script().sub_region_calls.clone()
    }
}

impl RegionDirectory for MockRegionDirectory {
    fn regions(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RegionCode>, SelectorError>> + Send + '_>> {
        Box::pin(async move {
            let mut script = self.script();
            script.region_calls += 1;

            if script.region_failures > 0 {
                script.region_failures -= 1;
                return Err(SelectorError::Network {
                    message: "region directory unavailable".to_string(),
                });
            }

            Ok(script.regions.clone())
        })
    }

    fn sub_regions(
        &self,
        region: RegionCode,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SubRegionName>, SelectorError>> + Send + '_>> {
        Box::pin(async move {
            let gate = {
                let mut script = self.script();
                script.sub_region_calls.push(region.clone());
                script.gates.get(&region).cloned()
            };

            if let Some(gate) = gate {
                gate.notified().await;
            }

            let mut script = self.script();
            if let Some(remaining) = script.sub_region_failures.get_mut(&region) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(SelectorError::Network {
                        message: format!("sub-regions of {region} unavailable"),
                    });
                }
            }

            script
                .sub_regions
                .get(&region)
                .cloned()
                .ok_or_else(|| SelectorError::Network {
                    message: format!("404 for region {region}"),
                })
        })
    }
}

/// Navigator that records every request
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    calls: Arc<Mutex<Vec<(String, NavigationParams)>>>,
}

impl RecordingNavigator {
    /// Create a navigator with no recorded calls
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All navigation requests, oldest first
    #[must_use]
    pub fn calls(&self) -> Vec<(String, NavigationParams)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent navigation request
    #[must_use]
    pub fn last(&self) -> Option<(String, NavigationParams)> {
        self.calls().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&self, screen: &str, params: NavigationParams) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((screen.to_string(), params));
    }
}
