//! Crawl orchestrator: drives one browser session per property-type pass
//! and assembles the final outcome.

use async_trait::async_trait;
use chromiumoxide::Page;
use chrono::Local;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::dedup::dedup_listings;
use crate::error::ScraperError;
use crate::locate::{resolve_all, Scope};
use crate::selectors::{field, SelectorTable};
use crate::signal::PauseSignal;
use crate::traits::Crawler;

use super::blocking::dump_diagnostics;
use super::extract::{assemble_listing, collect_raw_card};
use super::navigate::NavigationController;
use super::scroll::ScrollController;
use super::session::CrawlSession;
use super::types::{
    retry_modes, Listing, PropertyType, ScrapeOutcome, ScrapeRequest, SessionMode,
};

pub struct DabangScraper {
    request: ScrapeRequest,
    config: ScraperConfig,
    table: SelectorTable,
}

impl DabangScraper {
    pub fn new(request: ScrapeRequest) -> Self {
        Self {
            request,
            config: ScraperConfig::default(),
            table: SelectorTable::dabang(),
        }
    }

    pub fn with_config(mut self, config: ScraperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_table(mut self, table: SelectorTable) -> Self {
        self.table = table;
        self
    }

    pub fn request(&self) -> &ScrapeRequest {
        &self.request
    }

    /// Runs every property-type pass and returns the merged outcome.
    /// A failed pass is logged and skipped; only zero successful passes
    /// out of one requested type surface as an error to the caller.
    pub async fn run(&self, signal: &PauseSignal) -> Result<ScrapeOutcome, ScraperError> {
        let types = self.request.expanded_types();
        info!(
            "starting crawl: region='{}', {} property type(s)",
            self.request.region_keyword,
            types.len()
        );

        let mut listings: Vec<Listing> = Vec::new();
        let mut total_cards = 0usize;
        let mut last_err: Option<ScraperError> = None;
        let mut succeeded = 0usize;

        for (i, pt) in types.iter().enumerate() {
            if signal.should_stop() {
                info!("stop requested; skipping remaining passes");
                break;
            }
            if i > 0 {
                sleep(self.config.inter_pass_delay).await;
            }

            match self.crawl_type(*pt, signal).await {
                Ok((mut pass, cards)) => {
                    info!(
                        "pass '{}' collected {} listings from {} cards",
                        pt.label(),
                        pass.len(),
                        cards
                    );
                    listings.append(&mut pass);
                    total_cards += cards;
                    succeeded += 1;
                }
                Err(e) => {
                    warn!("pass '{}' failed: {}", pt.label(), e);
                    last_err = Some(e);
                }
            }
        }

        if succeeded == 0 {
            if let Some(e) = last_err {
                return Err(e);
            }
        }

        if self.request.dedupe {
            listings = dedup_listings(listings);
        }
        info!("crawl finished with {} listings", listings.len());

        Ok(ScrapeOutcome {
            listings,
            region_keyword: self.request.region_keyword.clone(),
            total_cards,
        })
    }

    /// One property-type pass with mode escalation: a headless pass that
    /// surfaces zero cards is retried once with a visible browser.
    async fn crawl_type(
        &self,
        property_type: PropertyType,
        signal: &PauseSignal,
    ) -> Result<(Vec<Listing>, usize), ScraperError> {
        let mut last: (Vec<Listing>, usize) = (Vec::new(), 0);

        for mode in retry_modes(self.request.headless) {
            if signal.should_stop() {
                break;
            }
            let session = CrawlSession::launch(&self.config, mode.headless()).await?;
            let result = self
                .drive(session.page(), property_type, mode, signal)
                .await;
            session.close().await;

            match result {
                Ok((listings, cards)) if !listings.is_empty() => {
                    return Ok((listings, cards));
                }
                Ok(empty) => {
                    last = empty;
                    if mode == SessionMode::Headless {
                        warn!(
                            "headless pass for '{}' came back empty; retrying with visible browser",
                            property_type.label()
                        );
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Ok(last)
    }

    /// Navigate, surface, parse: the full flow on one live page.
    async fn drive(
        &self,
        page: &Page,
        property_type: PropertyType,
        mode: SessionMode,
        signal: &PauseSignal,
    ) -> Result<(Vec<Listing>, usize), ScraperError> {
        let nav = NavigationController::new(page, &self.table, &self.config);
        nav.open_category(property_type).await?;
        nav.search_region(&self.request.region_keyword).await?;
        nav.apply_filters(property_type, &self.request.sale_filters)
            .await;

        let scroll = ScrollController::new(page, &self.table, &self.config, signal);
        let browse_all = self.request.region_keyword.trim().is_empty();

        let mut listings: Vec<Listing> = Vec::new();
        let mut total_cards = 0usize;

        if browse_all {
            total_cards = scroll.surface_all().await;
            self.parse_visible_cards(page, property_type, signal, &mut listings)
                .await;
        } else {
            let mut pages = 0usize;
            loop {
                pages += 1;
                let cards = scroll.grow_page().await;
                total_cards += cards;
                debug!("page {} surfaced {} cards", pages, cards);

                self.parse_visible_cards(page, property_type, signal, &mut listings)
                    .await;

                if signal.should_stop() || self.item_limit_reached(listings.len()) {
                    break;
                }
                if self.request.page_limit > 0 && pages >= self.request.page_limit {
                    info!("page limit {} reached", self.request.page_limit);
                    break;
                }
                if !scroll.advance_page().await {
                    debug!("no further pages after page {}", pages);
                    break;
                }
            }
        }

        if listings.is_empty() && self.request.diagnostics {
            let tag = format!(
                "{}_{}",
                property_type.label(),
                if mode.headless() { "headless" } else { "headed" }
            );
            dump_diagnostics(page, &self.config, &tag).await;
        }

        Ok((listings, total_cards))
    }

    /// Parses every currently rendered card into `listings`, honoring the
    /// pause signal, the price bounds and the item limit. Per-card failures
    /// skip the card.
    async fn parse_visible_cards(
        &self,
        page: &Page,
        property_type: PropertyType,
        signal: &PauseSignal,
        listings: &mut Vec<Listing>,
    ) {
        let cards = resolve_all(&Scope::Page(page), &self.table, field::CARD_ROOT).await;
        let now = Local::now();

        for card in &cards {
            if signal.should_stop() || self.item_limit_reached(listings.len()) {
                break;
            }
            signal.wait_if_paused().await;

            let raw = collect_raw_card(card, &self.table).await;
            let Some(listing) =
                assemble_listing(&raw, property_type, &self.config.base_url, now)
            else {
                debug!("card without address skipped");
                continue;
            };
            if !self.within_price_bounds(listing.price_won) {
                continue;
            }
            listings.push(listing);
        }
    }

    fn item_limit_reached(&self, len: usize) -> bool {
        self.request.item_limit > 0 && len >= self.request.item_limit
    }

    fn within_price_bounds(&self, price_won: i64) -> bool {
        if let Some(min) = self.request.price_min {
            if price_won < min {
                return false;
            }
        }
        if let Some(max) = self.request.price_max {
            if price_won > max {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl Crawler for DabangScraper {
    async fn run(&mut self, signal: &PauseSignal) -> Result<ScrapeOutcome, ScraperError> {
        DabangScraper::run(self, signal).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraper_with(request: ScrapeRequest) -> DabangScraper {
        DabangScraper::new(request)
    }

    #[test]
    fn test_item_limit_semantics() {
        let s = scraper_with(ScrapeRequest::new("기장").with_item_limit(3));
        assert!(!s.item_limit_reached(2));
        assert!(s.item_limit_reached(3));

        let unbounded = scraper_with(ScrapeRequest::new("기장"));
        assert!(!unbounded.item_limit_reached(10_000));
    }

    #[test]
    fn test_price_bounds() {
        let s = scraper_with(
            ScrapeRequest::new("기장").with_price_range(Some(300_000), Some(700_000)),
        );
        assert!(!s.within_price_bounds(100_000));
        assert!(s.within_price_bounds(300_000));
        assert!(s.within_price_bounds(700_000));
        assert!(!s.within_price_bounds(900_000));

        let open = scraper_with(ScrapeRequest::new("기장"));
        assert!(open.within_price_bounds(0));
    }
}
