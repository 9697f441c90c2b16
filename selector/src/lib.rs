//! Cascading region/sub-region selection.
//!
//! The selector owns two dependent lists. The region list is fetched once at
//! initialization; the sub-region list is replaced whenever a different region
//! is picked. Confirming hands both picks to a [`Navigator`].
//!
//! It is built as a reducer, so the same logic runs under the store runtime,
//! in the terminal demo and in tests with scripted collaborators.
//!
//! # Quick Start
//!
//! ```no_run
//! use region_selector::{
//!     HttpRegionDirectory, RegionCode, SelectorAction, SelectorEnvironment, SelectorReducer,
//!     SelectorState, config::SelectorConfig, mocks::RecordingNavigator,
//! };
//! use cascade_core::environment::SystemClock;
//! use cascade_runtime::Store;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SelectorConfig::from_env()?;
//! let env = SelectorEnvironment::new(
//!     Arc::new(HttpRegionDirectory::from_config(&config.directory)?),
//!     Arc::new(RecordingNavigator::new()),
//!     Arc::new(SystemClock),
//! );
//! let store = Store::new(SelectorState::new(), SelectorReducer::new(), env);
//!
//! store.send(SelectorAction::Initialize).await?.wait().await;
//! store
//!     .send(SelectorAction::SelectRegion(RegionCode::parse_selection("SP")))
//!     .await?
//!     .wait()
//!     .await;
//!
//! let cities = store.state(|s| s.sub_regions.items.len()).await;
//! println!("SP has {cities} municipalities");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod environment;
pub mod error;
pub mod mocks;
pub mod reducer;
pub mod types;

// Re-export commonly used types
pub use environment::{HttpRegionDirectory, Navigator, RegionDirectory, SelectorEnvironment};
pub use error::SelectorError;
pub use reducer::{REGION_FETCH, SUB_REGION_FETCH, SelectorReducer};
pub use types::{
    ConfirmPolicy, ListState, LoadStatus, MissingSelection, NavigationParams, RegionCode,
    RequestToken, Selection, SelectorAction, SelectorState, SubRegionName,
};
