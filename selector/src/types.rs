//! Domain types for the cascading region selector.
//!
//! A region is identified by a short code and keys the sub-region fetch. A
//! sub-region is identified by its display name. Both lists are loaded from a
//! region directory and tracked with their own load status and request token.

use crate::error::SelectorError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Picker value meaning "nothing selected"
pub const UNSET_SENTINEL: &str = "0";

/// Map raw picker input to a selection, treating the sentinel as unset
fn parse_picker_value(input: &str) -> Option<String> {
    let value = input.trim();
    if value.is_empty() || value == UNSET_SENTINEL {
        None
    } else {
        Some(value.to_string())
    }
}

/// Identifier of a top-level region, e.g. `SP`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionCode(String);

impl RegionCode {
    /// Creates a region code
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Parses a picker value; `"0"` and blank input mean unset
    ///
    /// ```
    /// use region_selector::RegionCode;
    ///
    /// assert_eq!(RegionCode::parse_selection("SP"), Some(RegionCode::new("SP")));
    /// assert_eq!(RegionCode::parse_selection("0"), None);
    /// assert_eq!(RegionCode::parse_selection("  "), None);
    /// ```
    #[must_use]
    pub fn parse_selection(input: &str) -> Option<Self> {
        parse_picker_value(input).map(Self)
    }

    /// Returns the code as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RegionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

/// Display name of a sub-region, e.g. `Campinas`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubRegionName(String);

impl SubRegionName {
    /// Creates a sub-region name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Parses a picker value; `"0"` and blank input mean unset
    #[must_use]
    pub fn parse_selection(input: &str) -> Option<Self> {
        parse_picker_value(input).map(Self)
    }

    /// Returns the name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubRegionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

/// Token attached to a fetch; only the latest token may write its list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Returns the raw token value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic source of request tokens, shared by both lists
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenCounter {
    last: u64,
}

impl TokenCounter {
    /// Issues a token greater than every token issued before
    pub const fn issue(&mut self) -> RequestToken {
        self.last = self.last.saturating_add(1);
        RequestToken(self.last)
    }

    /// The most recently issued token, if any
    #[must_use]
    pub const fn last(&self) -> Option<RequestToken> {
        if self.last == 0 {
            None
        } else {
            Some(RequestToken(self.last))
        }
    }
}

/// Load status of a dependent list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing requested yet, or the last request was withdrawn
    #[default]
    Idle,
    /// A fetch is in flight
    Loading {
        /// Token of the in-flight fetch
        token: RequestToken,
    },
    /// The items reflect a completed fetch
    Loaded,
    /// The last fetch failed; a retry is possible
    Failed {
        /// Human-readable failure
        message: String,
    },
}

/// A list loaded from the directory together with its load bookkeeping
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListState<T> {
    /// Current options, in directory order
    pub items: Vec<T>,
    /// Load status of the latest request
    pub status: LoadStatus,
    /// Region the items were requested for (sub-region list only)
    pub for_region: Option<RegionCode>,
    /// When the items were last replaced
    pub fetched_at: Option<DateTime<Utc>>,
    latest: Option<RequestToken>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: LoadStatus::Idle,
            for_region: None,
            fetched_at: None,
            latest: None,
        }
    }
}

impl<T: PartialEq> ListState<T> {
    /// Whether `item` is one of the current options
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }
}

impl<T> ListState<T> {
    /// Whether a fetch is in flight
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.status, LoadStatus::Loading { .. })
    }

    /// Whether the items reflect a completed fetch
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self.status, LoadStatus::Loaded)
    }

    /// Whether the last fetch failed
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.status, LoadStatus::Failed { .. })
    }

    /// Latest token issued for this list
    #[must_use]
    pub const fn latest_token(&self) -> Option<RequestToken> {
        self.latest
    }

    /// Whether a completion carrying `token` may write this list
    #[must_use]
    pub fn accepts(&self, token: RequestToken) -> bool {
        self.latest == Some(token)
    }

    /// Marks a new fetch as in flight
    pub(crate) fn begin(&mut self, token: RequestToken) {
        self.latest = Some(token);
        self.status = LoadStatus::Loading { token };
    }

    /// Withdraws any in-flight fetch without starting a new one
    pub(crate) fn invalidate(&mut self, token: RequestToken) {
        self.latest = Some(token);
        if self.is_loading() {
            self.status = LoadStatus::Idle;
        }
    }

    /// Replaces the items with a completed fetch
    pub(crate) fn finish(&mut self, items: Vec<T>, at: DateTime<Utc>) {
        self.items = items;
        self.status = LoadStatus::Loaded;
        self.fetched_at = Some(at);
    }

    /// Records a failed fetch
    pub(crate) fn fail(&mut self, message: String) {
        self.status = LoadStatus::Failed { message };
    }
}

/// Which part of a selection is unset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingSelection {
    /// No region chosen
    Region,
    /// No sub-region chosen
    SubRegion,
    /// Neither chosen
    Both,
}

impl std::fmt::Display for MissingSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Region => write!(f, "region"),
            Self::SubRegion => write!(f, "sub-region"),
            Self::Both => write!(f, "region and sub-region"),
        }
    }
}

/// The pair of values the user has picked; `None` is unset
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Chosen region
    pub region: Option<RegionCode>,
    /// Chosen sub-region of `region`
    pub sub_region: Option<SubRegionName>,
}

impl Selection {
    /// Which values are still unset, if any
    #[must_use]
    pub const fn missing(&self) -> Option<MissingSelection> {
        match (&self.region, &self.sub_region) {
            (Some(_), Some(_)) => None,
            (None, Some(_)) => Some(MissingSelection::Region),
            (Some(_), None) => Some(MissingSelection::SubRegion),
            (None, None) => Some(MissingSelection::Both),
        }
    }

    /// Navigation parameters carrying both values unmodified
    #[must_use]
    pub fn params(&self) -> NavigationParams {
        NavigationParams {
            selected_region: self.region.clone(),
            selected_sub_region: self.sub_region.clone(),
        }
    }
}

/// Parameters handed to the navigation collaborator on confirm
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationParams {
    /// Region at confirm time
    pub selected_region: Option<RegionCode>,
    /// Sub-region at confirm time
    pub selected_sub_region: Option<SubRegionName>,
}

/// How `Confirm` treats an incomplete selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfirmPolicy {
    /// Reject confirm while either value is unset
    #[default]
    RequireComplete,
    /// Forward whatever is selected, unset values included
    ForwardAsIs,
}

impl ConfirmPolicy {
    /// Parses `require-complete` or `forward-as-is` (case-insensitive)
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "require-complete" => Some(Self::RequireComplete),
            "forward-as-is" => Some(Self::ForwardAsIs),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConfirmPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequireComplete => write!(f, "require-complete"),
            Self::ForwardAsIs => write!(f, "forward-as-is"),
        }
    }
}

/// State of the selector
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectorState {
    /// Region options
    pub regions: ListState<RegionCode>,
    /// Sub-region options of the selected region
    pub sub_regions: ListState<SubRegionName>,
    /// Current picks
    pub selection: Selection,
    /// Last failure or rejected input, cleared by the next success
    pub last_error: Option<SelectorError>,
    /// Parameters of the last completed navigation
    pub navigated: Option<NavigationParams>,
    /// Source of request tokens
    pub tokens: TokenCounter,
}

impl SelectorState {
    /// Creates an empty, uninitialized selector state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Actions of the selector: user intents and effect results
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectorAction {
    // ========== User intents ==========
    /// Load the region list
    Initialize,

    /// Pick a region, or clear it with `None`
    SelectRegion(Option<RegionCode>),

    /// Pick a sub-region, or clear it with `None`
    SelectSubRegion(Option<SubRegionName>),

    /// Hand the selection to the navigator
    Confirm,

    /// Re-fetch the region list after a failure
    RetryRegions,

    /// Re-fetch the sub-regions of the selected region
    RetrySubRegions,

    // ========== Effect results ==========
    /// Region fetch completed
    RegionsLoaded {
        /// Token the fetch was issued with
        token: RequestToken,
        /// Regions in directory order
        regions: Vec<RegionCode>,
    },

    /// Region fetch failed
    RegionsFailed {
        /// Token the fetch was issued with
        token: RequestToken,
        /// Failure
        error: SelectorError,
    },

    /// Sub-region fetch completed
    SubRegionsLoaded {
        /// Token the fetch was issued with
        token: RequestToken,
        /// Region the fetch was for
        region: RegionCode,
        /// Sub-regions in directory order
        sub_regions: Vec<SubRegionName>,
    },

    /// Sub-region fetch failed
    SubRegionsFailed {
        /// Token the fetch was issued with
        token: RequestToken,
        /// Region the fetch was for
        region: RegionCode,
        /// Failure
        error: SelectorError,
    },

    /// The navigator accepted the selection
    Navigated {
        /// Parameters that were forwarded
        params: NavigationParams,
    },

    /// Confirm was refused
    ConfirmRejected {
        /// Why
        reason: SelectorError,
    },
}
