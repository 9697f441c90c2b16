//! Errors surfaced by the selector

use crate::types::{MissingSelection, RegionCode, SubRegionName};
use region_directory::DirectoryError;
use thiserror::Error;

/// User-visible selector failures
///
/// None of these are fatal: network failures leave the affected list in a
/// retryable state and invalid input leaves the state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// A directory fetch was rejected or timed out
    #[error("Network failure: {message}")]
    Network {
        /// Failure description
        message: String,
    },

    /// Confirm was attempted with an unset value
    #[error("Cannot confirm: {missing} not selected")]
    IncompleteSelection {
        /// The unset part
        missing: MissingSelection,
    },

    /// The region is not one of the loaded options
    #[error("Unknown region: {0}")]
    UnknownRegion(RegionCode),

    /// The sub-region is not one of the loaded options
    #[error("Unknown sub-region: {0}")]
    UnknownSubRegion(SubRegionName),
}

impl SelectorError {
    /// Whether the error came from the network and a retry may help
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

impl From<DirectoryError> for SelectorError {
    fn from(error: DirectoryError) -> Self {
        Self::Network {
            message: error.to_string(),
        }
    }
}
