//! Dabang map crawler: session lifecycle, navigation, scrolling, card
//! capture and the orchestrator tying them together.

pub mod blocking;
pub mod extract;
pub mod navigate;
pub mod scraper;
pub mod scroll;
pub mod session;
pub mod types;

pub use scraper::DabangScraper;
pub use scroll::{ScrollTracker, ScrollVerdict};
pub use session::CrawlSession;
pub use types::{
    retry_modes, Listing, PropertyType, SaleFilters, ScrapeOutcome, ScrapeRequest, SessionMode,
};
