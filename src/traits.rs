use async_trait::async_trait;

use crate::crawler::types::ScrapeOutcome;
use crate::error::ScraperError;
use crate::signal::PauseSignal;

#[async_trait]
pub trait Crawler: Send + Sync {
    /// Runs the crawl to completion, checking `signal` at suspension
    /// points.
    async fn run(&mut self, signal: &PauseSignal) -> Result<ScrapeOutcome, ScraperError>;
}
