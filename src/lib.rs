//! Resilient listing crawler for the Dabang real-estate map.
//!
//! Drives a Chromium session over the map view, resolves UI elements
//! through ordered fallback selectors, walks infinite scroll and
//! pagination, and normalizes Korean card text into structured listings
//! with CSV export.
//!
//! # Usage
//!
//! ```rust,ignore
//! use dabang_scraper::{PropertyType, ScrapeRequest, ScraperService};
//! use dabang_scraper::export::save_csv;
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = ScraperService::new();
//!
//!     let request = ScrapeRequest::new("부산 기장군")
//!         .with_property_types(vec![PropertyType::OneRoom])
//!         .with_item_limit(100);
//!
//!     let outcome = service.call(request).await.unwrap();
//!     let path = save_csv(&outcome.listings, "./output".as_ref(), "부산 기장군").unwrap();
//!     println!("saved: {:?}", path);
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod dedup;
pub mod error;
pub mod export;
pub mod locate;
pub mod parse;
pub mod selectors;
pub mod service;
pub mod signal;
pub mod traits;

pub use config::ScraperConfig;
pub use crawler::{
    DabangScraper, Listing, PropertyType, SaleFilters, ScrapeOutcome, ScrapeRequest,
};
pub use error::ScraperError;
pub use selectors::SelectorTable;
pub use service::ScraperService;
pub use signal::PauseSignal;
pub use traits::Crawler;
