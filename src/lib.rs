//! # rustharvest
//!
//! Scholarly record harvester backed by SerpApi's Google Scholar engine.
//!
//! ## Modules
//!
//! - [`harvest`] - Paged harvesting (by author or by title)
//! - [`extract`] - Raw result to [`ResearchRecord`] normalization
//! - [`date`] - Publication year inference from summaries
//! - [`dedup`] - Identity-key deduplication across passes
//! - [`filter`] - Date-range and title narrowing, display pagination
//! - [`service`] - Listing and export flows
//! - [`server`] - axum HTTP service
//! - [`export`] - CSV export
//! - [`store`] - JSON-file record library
//! - [`provider`] - SerpApi HTTP client
//! - [`config`] - Provider and harvest settings
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustharvest::{HarvestOptions, Harvester, ProviderConfig, SerpApiClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SerpApiClient::new(ProviderConfig::new("your-serpapi-key"))?;
//!     let harvester = Harvester::new(client);
//!     let records = harvester
//!         .harvest_by_author("Geoffrey Hinton", &HarvestOptions::default())
//!         .await?;
//!     println!("Found {} records", records.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod date;
pub mod dedup;
pub mod error;
pub mod export;
pub mod extract;
pub mod filter;
pub mod harvest;
pub mod provider;
pub mod record;
pub mod server;
pub mod service;
pub mod store;

pub use config::{HarvestOptions, ProviderConfig};
pub use error::{HarvestError, Result};
pub use harvest::{Harvester, SearchMode};
pub use provider::{SearchProvider, SerpApiClient};
pub use record::ResearchRecord;
