use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::config::ScraperConfig;
use crate::crawler::types::{ScrapeOutcome, ScrapeRequest};
use crate::crawler::DabangScraper;
use crate::error::ScraperError;
use crate::signal::PauseSignal;

/// `tower::Service` wrapper around the crawler.
///
/// The service owns the pause signal so callers can stop or pause an
/// in-flight crawl from outside: clone the service, keep a handle to
/// [`pause_signal`](Self::pause_signal), drive `call` elsewhere.
#[derive(Debug, Clone, Default)]
pub struct ScraperService {
    config: ScraperConfig,
    signal: PauseSignal,
}

impl ScraperService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ScraperConfig) -> Self {
        self.config = config;
        self
    }

    /// Control handle shared with every crawl started by this service.
    pub fn pause_signal(&self) -> PauseSignal {
        self.signal.clone()
    }
}

impl Service<ScrapeRequest> for ScraperService {
    type Response = ScrapeOutcome;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ScrapeRequest) -> Self::Future {
        // the signal is scoped to one run: a stop or pause left over from
        // an earlier call must not leak into this one
        self.signal.reset();

        info!(
            "scrape request received: region='{}', {} type(s)",
            req.region_keyword,
            req.property_types.len()
        );

        let config = self.config.clone();
        let signal = self.signal.clone();

        Box::pin(async move {
            let scraper = DabangScraper::new(req).with_config(config);
            let outcome = scraper.run(&signal).await?;

            info!(
                "scrape finished: {} listings from {} cards",
                outcome.listings.len(),
                outcome.total_cards
            );

            Ok(outcome)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_shares_one_signal() {
        let service = ScraperService::new();
        let handle = service.pause_signal();
        handle.request_stop();
        assert!(service.pause_signal().should_stop());
    }

    #[test]
    fn test_stale_stop_does_not_leak_into_next_call() {
        let mut service = ScraperService::new();
        service.pause_signal().request_stop();
        assert!(service.pause_signal().should_stop());

        // building the future is enough: the signal is reset before the
        // crawl starts, so the new run is not born stopped
        let _fut = service.call(ScrapeRequest::new("기장"));
        assert!(!service.pause_signal().should_stop());
    }

    #[test]
    fn test_clone_keeps_signal_linked() {
        let service = ScraperService::new();
        let clone = service.clone();
        clone.pause_signal().request_pause();
        assert!(service.pause_signal().is_paused());
    }
}
