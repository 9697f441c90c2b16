//! # Region Directory Client
//!
//! Rust client for read-only region directory services: a list of top-level
//! regions (identified by short codes) and, per region, the list of its
//! sub-regions (identified by display name). Both lists come back ordered by
//! name.
//!
//! Two URL layouts are supported: a generic `/regions` layout and the layout
//! of the IBGE localities API, which serves Brazilian states and their
//! municipalities.
//!
//! ## Example
//!
//! ```no_run
//! use region_directory::{DirectoryClient, DirectoryLayout};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DirectoryClient::builder("https://servicodados.ibge.gov.br/api/v1")
//!         .layout(DirectoryLayout::Ibge)
//!         .build()?;
//!
//!     let states = client.regions().await?;
//!     let cities = client.sub_regions(&states[0]).await?;
//!     println!("{} has {} cities", states[0], cities.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod types;

// Re-export main types for convenience
pub use client::{DirectoryClient, DirectoryClientBuilder};
pub use error::DirectoryError;
pub use types::{DirectoryLayout, RegionRecord, SubRegionRecord};
